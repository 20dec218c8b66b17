//! Process exit codes.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | success (including an ad-hoc diff with no changes)   |
//! | 1    | any other error                                      |
//! | 2    | runtime not found or configuration missing           |
//! | 3    | ad-hoc resource missing in the source environment    |
//! | 4    | ad-hoc resource missing in the destination           |

use std::fmt;

use mxpatch_batch::{BatchError, ItemOutcome};
use mxpatch_core::ConfigError;
use mxpatch_invoker::InvokeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Failure = 1,
    NotConfigured = 2,
    MissingSource = 3,
    MissingDestination = 4,
}

impl From<ExitStatus> for i32 {
    fn from(status: ExitStatus) -> Self {
        status as i32
    }
}

/// The single item of an ad-hoc run did not produce an artifact.
#[derive(Debug)]
pub struct ItemFailure {
    pub resource: String,
    pub outcome: ItemOutcome,
}

impl ItemFailure {
    /// `None` when the outcome is a success (created or empty).
    pub fn from_outcome(resource: &str, outcome: &ItemOutcome) -> Option<Self> {
        match outcome {
            ItemOutcome::Created { .. } | ItemOutcome::Empty => None,
            other => Some(Self {
                resource: resource.to_string(),
                outcome: other.clone(),
            }),
        }
    }

    fn status(&self) -> ExitStatus {
        match self.outcome {
            ItemOutcome::MissingSource => ExitStatus::MissingSource,
            ItemOutcome::MissingDestination => ExitStatus::MissingDestination,
            _ => ExitStatus::Failure,
        }
    }
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            ItemOutcome::Error { reason } => write!(f, "{}: {reason}", self.resource),
            ItemOutcome::MissingDestination => write!(
                f,
                "{}: missing in destination (creating screens is not supported)",
                self.resource
            ),
            other => write!(f, "{}: {}", self.resource, other.label()),
        }
    }
}

impl std::error::Error for ItemFailure {}

/// Pick the exit code for an error by inspecting its cause chain.
pub fn code_for(err: &anyhow::Error) -> ExitStatus {
    for cause in err.chain() {
        if let Some(failure) = cause.downcast_ref::<ItemFailure>() {
            return failure.status();
        }
        let not_configured = if let Some(e) = cause.downcast_ref::<ConfigError>() {
            e.is_missing_configuration()
        } else if let Some(e) = cause.downcast_ref::<InvokeError>() {
            e.is_runtime_missing()
        } else if let Some(BatchError::Invoke(e)) = cause.downcast_ref::<BatchError>() {
            e.is_runtime_missing()
        } else {
            false
        };
        if not_configured {
            return ExitStatus::NotConfigured;
        }
    }
    ExitStatus::Failure
}
