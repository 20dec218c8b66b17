//! Error types for mxpatch-invoker.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while preparing or running a vendor tool.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// No usable runtime was found in any of the searched locations.
    #[error("runtime not found (searched: {})", display_paths(.searched))]
    RuntimeNotFound { searched: Vec<PathBuf> },

    /// A classpath entry could not be joined (it contains the path separator).
    #[error("invalid classpath: {0}")]
    Classpath(String),

    /// Tera template engine error.
    #[error("argument template error: {0}")]
    Tera(#[from] tera::Error),

    /// A value cannot be passed as a single argument line.
    #[error("invalid {field} {value:?}: {reason}")]
    InvalidArgument {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// The child process could not be started at all.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem error around an artifact, with annotated path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl InvokeError {
    /// True when the tools cannot run at all on this machine.
    pub fn is_runtime_missing(&self) -> bool {
        matches!(self, InvokeError::RuntimeNotFound { .. })
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "PATH".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convenience constructor for [`InvokeError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> InvokeError {
    InvokeError::Io {
        path: path.into(),
        source,
    }
}
