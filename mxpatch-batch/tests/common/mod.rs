//! In-memory stand-in for the vendor tools.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use mxpatch_core::{EnvironmentName, ResolvedEnvironment, WorkItem};
use mxpatch_invoker::{InvokeError, ToolInvoker, ToolRequest};
use mxpatch_worklist::{WorkListError, WorkListProvider};
use tempfile::TempDir;

pub const MARKER: &str = "</presentation>";

/// Writes artifacts into a temp dir from canned per-environment content.
pub struct FakeInvoker {
    dir: TempDir,
    screens: HashMap<(String, String), String>,
    tables: HashMap<(String, String), String>,
    failing: Vec<String>,
    calls: RefCell<Vec<String>>,
}

impl FakeInvoker {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
            screens: HashMap::new(),
            tables: HashMap::new(),
            failing: Vec::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn screen(mut self, env: &str, name: &str, body: &str) -> Self {
        self.screens
            .insert((env.to_string(), name.to_string()), body.to_string());
        self
    }

    pub fn table(mut self, env: &str, name: &str, body: &str) -> Self {
        self.tables
            .insert((env.to_string(), name.to_string()), body.to_string());
        self
    }

    /// Every request naming `resource` fails to spawn.
    pub fn failing(mut self, resource: &str) -> Self {
        self.failing.push(resource.to_string());
        self
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn write(&self, file: String, body: &str) -> PathBuf {
        let path = self.dir.path().join(file);
        std::fs::write(&path, body).expect("write artifact");
        path
    }
}

impl ToolInvoker for FakeInvoker {
    fn invoke(&self, request: &ToolRequest<'_>) -> Result<Option<PathBuf>, InvokeError> {
        let call = match request {
            ToolRequest::Export { resource, env } => format!("export {resource} {}", env.name),
            ToolRequest::Diff {
                base,
                target,
                outfile,
            } => format!(
                "diff {} {} {outfile}",
                file_name(base),
                file_name(target)
            ),
            ToolRequest::Inserts {
                table,
                filter,
                outfile,
                env,
            } => format!(
                "inserts {table} {} {outfile} {}",
                env.name,
                filter.unwrap_or("-")
            ),
        };
        self.calls.borrow_mut().push(call);

        if self.failing.iter().any(|f| f == request.label()) {
            return Err(InvokeError::Spawn {
                program: PathBuf::from("/fake/java"),
                source: std::io::Error::new(std::io::ErrorKind::Other, "boom"),
            });
        }

        Ok(match request {
            ToolRequest::Export { resource, env } => self
                .screens
                .get(&(env.name.to_string(), resource.to_string()))
                .map(|body| self.write(format!("{resource}-{}.xml", env.name), body)),
            ToolRequest::Diff {
                base,
                target,
                outfile,
            } => {
                let same = std::fs::read(base).ok() == std::fs::read(target).ok();
                let body = if same {
                    "<changes>\n</changes>\n".to_string()
                } else {
                    format!("<changes>\n<presentation id=\"{outfile}\">\n{MARKER}\n</changes>\n")
                };
                Some(self.write(format!("{outfile}.mxs"), &body))
            }
            ToolRequest::Inserts {
                table, outfile, env, ..
            } => self
                .tables
                .get(&(env.name.to_string(), table.to_string()))
                .map(|body| self.write(format!("{outfile}.dbc"), body)),
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn env(name: &str) -> ResolvedEnvironment {
    ResolvedEnvironment {
        name: EnvironmentName::from(name),
        properties: PathBuf::from(format!("/props/{name}.properties")),
    }
}

/// Work list over fixed names.
pub struct Names(pub Vec<&'static str>);

impl WorkListProvider for Names {
    fn list_resources(&self) -> Result<Vec<WorkItem>, WorkListError> {
        Ok(self.0.iter().map(|n| WorkItem::named(*n)).collect())
    }
}

/// Work list whose source is down.
pub struct Unavailable;

impl WorkListProvider for Unavailable {
    fn list_resources(&self) -> Result<Vec<WorkItem>, WorkListError> {
        Err(WorkListError::SourceUnavailable {
            source_name: "db:1433/maxdb".to_string(),
            reason: "connection refused".to_string(),
        })
    }
}
