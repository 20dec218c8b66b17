//! Error types for mxpatch-batch.

use std::path::PathBuf;

use thiserror::Error;

use mxpatch_invoker::InvokeError;
use mxpatch_worklist::WorkListError;

use crate::scrub::ScrubError;

/// Errors that stop a run before or between items.
///
/// Per-item failures do not surface here; they become
/// [`ItemOutcome::Error`](crate::pipeline::ItemOutcome::Error) entries in the
/// report.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The starting output-name template cannot be split into base + ordinal.
    #[error("invalid output name template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    /// The screen pipeline needs a destination environment.
    #[error("no destination environment given")]
    MissingDestination,

    #[error(transparent)]
    Invoke(#[from] InvokeError),

    #[error(transparent)]
    WorkList(#[from] WorkListError),

    /// A document could not be scrubbed.
    #[error("failed to scrub {path}: {source}")]
    Scrub {
        path: PathBuf,
        #[source]
        source: ScrubError,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`BatchError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> BatchError {
    BatchError::Io {
        path: path.into(),
        source,
    }
}
