//! The [`ToolInvoker`] seam and its process-backed implementation.
//!
//! ## Conventional output paths
//!
//! | Tool    | Written by the tool              | Returned to the caller            |
//! |---------|----------------------------------|-----------------------------------|
//! | export  | `<exportRoot>/<screen>.xml`      | `<exportRoot>/<screen>-<ENV>.xml` |
//! | diff    | `<exportRoot>/<outfile>.mxs`     | same                              |
//! | inserts | `<outputRoot>/<outfile>.dbc`     | same                              |
//!
//! The tools give no structured result. An artifact that does not appear at
//! its conventional path means "resource absent" and is reported as `None`.

use std::path::{Path, PathBuf};

use mxpatch_core::{Config, EnvironmentName, ResolvedEnvironment, ToolKind};

use crate::context::InvocationContext;
use crate::engine::ArgumentTemplates;
use crate::error::{io_err, InvokeError};
use crate::process::ProcessConfig;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// One tool call.
#[derive(Debug, Clone, Copy)]
pub enum ToolRequest<'a> {
    /// Export one screen from `env`.
    Export {
        resource: &'a str,
        env: &'a ResolvedEnvironment,
    },
    /// Diff two exports; the result turns `base` into `target`.
    Diff {
        base: &'a Path,
        target: &'a Path,
        outfile: &'a str,
    },
    /// Generate insert statements for `table` in `env`.
    Inserts {
        table: &'a str,
        filter: Option<&'a str>,
        outfile: &'a str,
        env: &'a ResolvedEnvironment,
    },
}

impl ToolRequest<'_> {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolRequest::Export { .. } => ToolKind::Export,
            ToolRequest::Diff { .. } => ToolKind::Diff,
            ToolRequest::Inserts { .. } => ToolKind::Inserts,
        }
    }

    /// Short label for logs: the screen, table, or diff output name.
    pub fn label(&self) -> &str {
        match self {
            ToolRequest::Export { resource, .. } => resource,
            ToolRequest::Diff { outfile, .. } => outfile,
            ToolRequest::Inserts { table, .. } => table,
        }
    }

    fn context(&self, working_dir: &Path) -> InvocationContext {
        let working_dir = working_dir.display().to_string();
        match *self {
            ToolRequest::Export { resource, env } => InvocationContext {
                resource: resource.to_string(),
                environment: env.name.to_string(),
                properties: Some(env.properties.display().to_string()),
                working_dir,
                ..Default::default()
            },
            ToolRequest::Diff {
                base,
                target,
                outfile,
            } => InvocationContext {
                resource: outfile.to_string(),
                base: Some(base.display().to_string()),
                target: Some(target.display().to_string()),
                outfile: Some(outfile.to_string()),
                working_dir,
                ..Default::default()
            },
            ToolRequest::Inserts {
                table,
                filter,
                outfile,
                env,
            } => InvocationContext {
                resource: table.to_string(),
                environment: env.name.to_string(),
                properties: Some(env.properties.display().to_string()),
                outfile: Some(outfile.to_string()),
                filter: filter.map(str::to_string),
                working_dir,
                ..Default::default()
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Directories the tools run in and write to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolLayout {
    pub export_root: PathBuf,
    pub output_root: PathBuf,
}

impl ToolLayout {
    pub fn from_config(config: &Config) -> Self {
        Self {
            export_root: config.export_root(),
            output_root: config.output_root(),
        }
    }

    pub fn working_dir(&self, kind: ToolKind) -> &Path {
        match kind {
            ToolKind::Export | ToolKind::Diff => &self.export_root,
            ToolKind::Inserts => &self.output_root,
        }
    }

    /// Where the tool itself writes its artifact for `request`.
    pub fn conventional_path(&self, request: &ToolRequest<'_>) -> PathBuf {
        let (stem, kind) = match request {
            ToolRequest::Export { resource, .. } => (*resource, ToolKind::Export),
            ToolRequest::Diff { outfile, .. } => (*outfile, ToolKind::Diff),
            ToolRequest::Inserts { outfile, .. } => (*outfile, ToolKind::Inserts),
        };
        self.working_dir(kind)
            .join(format!("{stem}.{}", kind.extension()))
    }

    /// Environment-tagged name an export is moved to, `<screen>-<ENV>.xml`.
    pub fn tagged_export_path(&self, resource: &str, env: &EnvironmentName) -> PathBuf {
        self.export_root.join(format!(
            "{resource}-{env}.{}",
            ToolKind::Export.extension()
        ))
    }
}

/// Fully qualified entry-point class of each tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolClasses {
    pub export: String,
    pub diff: String,
    pub inserts: String,
}

impl ToolClasses {
    pub fn from_config(config: &Config) -> Self {
        Self {
            export: config.screens.export_class.clone(),
            diff: config.screens.diff_class.clone(),
            inserts: config.tables.insert_class.clone(),
        }
    }

    pub fn for_kind(&self, kind: ToolKind) -> &str {
        match kind {
            ToolKind::Export => &self.export,
            ToolKind::Diff => &self.diff,
            ToolKind::Inserts => &self.inserts,
        }
    }
}

// ---------------------------------------------------------------------------
// ToolInvoker
// ---------------------------------------------------------------------------

/// Runs one vendor tool call and reports where its artifact is.
///
/// `Ok(None)` means the artifact never appeared: the resource does not exist
/// in that environment, or the tool failed without saying so. The two cannot
/// be told apart.
pub trait ToolInvoker {
    fn invoke(&self, request: &ToolRequest<'_>) -> Result<Option<PathBuf>, InvokeError>;
}

/// [`ToolInvoker`] that spawns the vendor tools as child processes.
pub struct ExternalTool {
    process: ProcessConfig,
    templates: ArgumentTemplates,
    layout: ToolLayout,
    classes: ToolClasses,
}

impl ExternalTool {
    pub fn new(
        process: ProcessConfig,
        templates: ArgumentTemplates,
        layout: ToolLayout,
        classes: ToolClasses,
    ) -> Self {
        Self {
            process,
            templates,
            layout,
            classes,
        }
    }

    /// Build from configuration; `user_template_dir` may hold argument overrides.
    pub fn from_config(
        config: &Config,
        user_template_dir: Option<&Path>,
    ) -> Result<Self, InvokeError> {
        Ok(Self::new(
            ProcessConfig::from_config(config)?,
            ArgumentTemplates::new(user_template_dir)?,
            ToolLayout::from_config(config),
            ToolClasses::from_config(config),
        ))
    }

    pub fn layout(&self) -> &ToolLayout {
        &self.layout
    }

    fn run(&self, request: &ToolRequest<'_>) -> Result<(), InvokeError> {
        let kind = request.kind();
        let cwd = self.layout.working_dir(kind);
        std::fs::create_dir_all(cwd).map_err(|e| io_err(cwd, e))?;

        let args = self.templates.render_args(kind, &request.context(cwd))?;
        let mut cmd = self.process.command(self.classes.for_kind(kind), &args, cwd);
        tracing::debug!(tool = %kind, target = request.label(), ?args, "spawning tool");

        let output = cmd.output().map_err(|e| InvokeError::Spawn {
            program: self.process.runtime.clone(),
            source: e,
        })?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::debug!(tool = %kind, target = request.label(), stderr = %stderr.trim(), "tool stderr");
        }
        if !output.status.success() {
            tracing::warn!(
                tool = %kind,
                target = request.label(),
                status = %output.status,
                "tool exited with failure status"
            );
        }
        Ok(())
    }
}

impl ToolInvoker for ExternalTool {
    fn invoke(&self, request: &ToolRequest<'_>) -> Result<Option<PathBuf>, InvokeError> {
        let produced = self.layout.conventional_path(request);
        remove_if_present(&produced)?;

        self.run(request)?;

        if !produced.is_file() {
            tracing::debug!(path = %produced.display(), "no artifact at conventional path");
            return Ok(None);
        }

        match request {
            ToolRequest::Export { resource, env } => {
                let tagged = self.layout.tagged_export_path(resource, &env.name);
                relocate(&produced, &tagged)?;
                tracing::info!(path = %tagged.display(), "exported");
                Ok(Some(tagged))
            }
            _ => {
                tracing::info!(path = %produced.display(), "wrote");
                Ok(Some(produced))
            }
        }
    }
}

/// Move `from` to `to`, replacing whatever is at `to`.
fn relocate(from: &Path, to: &Path) -> Result<(), InvokeError> {
    remove_if_present(to)?;
    std::fs::rename(from, to).map_err(|e| io_err(to, e))
}

/// Delete `path` if it exists. Stale artifacts at a conventional path would
/// otherwise be mistaken for fresh output.
fn remove_if_present(path: &Path) -> Result<(), InvokeError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed stale artifact");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_err(path, e)),
    }
}
