//! Argument templates: one Tera template per [`ToolKind`].
//!
//! | Tool    | Template        | Rendered arguments                         |
//! |---------|-----------------|--------------------------------------------|
//! | export  | `export.tera`   | `-a<screen>` `-p<properties>`               |
//! | diff    | `diff.tera`     | `-b<base>` `-t<target>` `-m<outfile>`       |
//! | inserts | `inserts.tera`  | `-t<table>` `-f<outfile>` [`-w<filter>`] `-p<properties>` |
//!
//! Each rendered line is one argument; blank lines are dropped. Values
//! containing control characters are rejected before rendering, so a filter
//! or name cannot span lines. A single argument therefore cannot carry a line
//! break, even where the tool itself would accept one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tera::Tera;

use mxpatch_core::ToolKind;

use crate::context::InvocationContext;
use crate::error::{io_err, InvokeError};

// ---------------------------------------------------------------------------
// Embedded templates: baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    ("export.tera", include_str!("templates/export.tera")),
    ("diff.tera", include_str!("templates/diff.tera")),
    ("inserts.tera", include_str!("templates/inserts.tera")),
];

fn template_name(kind: ToolKind) -> String {
    format!("{kind}.tera")
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, InvokeError> {
    let mut templates = Vec::new();
    for kind in ToolKind::all() {
        let name = template_name(*kind);
        let path: PathBuf = dir.join(&name);
        if !path.is_file() {
            continue;
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        tracing::debug!(template = %name, path = %path.display(), "using user template");
        templates.push((name, contents));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, InvokeError> {
    let mut templates: HashMap<String, String> = TPLS
        .iter()
        .map(|(name, content)| (name.to_string(), content.to_string()))
        .collect();
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    let items: Vec<(String, String)> = templates.into_iter().collect();
    tera.add_raw_templates(items)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// ArgumentTemplates
// ---------------------------------------------------------------------------

/// Tera-based argument builder with optional user overrides.
///
/// `user_template_dir` may contain `export.tera`, `diff.tera` or
/// `inserts.tera`; any file present replaces the embedded default.
pub struct ArgumentTemplates {
    tera: Tera,
}

impl ArgumentTemplates {
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, InvokeError> {
        Ok(Self {
            tera: build_tera(user_template_dir)?,
        })
    }

    /// Render the tool-specific argument list for `kind`.
    pub fn render_args(
        &self,
        kind: ToolKind,
        ctx: &InvocationContext,
    ) -> Result<Vec<String>, InvokeError> {
        ctx.check_arguments()?;
        let tera_ctx = ctx.to_tera_context()?;
        let rendered = self.tera.render(&template_name(kind), &tera_ctx)?;
        Ok(split_args(&rendered))
    }
}

fn split_args(rendered: &str) -> Vec<String> {
    rendered
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
