//! Domain types shared by the screen and table pipelines.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name for a deployment environment (e.g. `DEV`, `TEST`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnvironmentName(pub String);

impl fmt::Display for EnvironmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for EnvironmentName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EnvironmentName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The vendor tools mxpatch knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Single-screen presentation export.
    Export,
    /// Presentation diff between two exports.
    Diff,
    /// Bulk insert-script generator for a table.
    Inserts,
}

impl ToolKind {
    /// All tool kinds in a stable order.
    pub fn all() -> &'static [ToolKind] {
        &[ToolKind::Export, ToolKind::Diff, ToolKind::Inserts]
    }

    /// File extension of the artifact the tool writes.
    pub fn extension(&self) -> &'static str {
        match self {
            ToolKind::Export => "xml",
            ToolKind::Diff => "mxs",
            ToolKind::Inserts => "dbc",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolKind::Export => write!(f, "export"),
            ToolKind::Diff => write!(f, "diff"),
            ToolKind::Inserts => write!(f, "inserts"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One resource (screen or table) to push through a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Screen name or table name.
    pub name: String,
    /// SQL filter clause; table pipeline only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Row id from the work-list source, informational.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    /// Explicit output base name; when set it bypasses the batch naming scheme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl WorkItem {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filter: None,
            unique_id: None,
            output: None,
        }
    }

    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_output(mut self, output: Option<String>) -> Self {
        self.output = output;
        self
    }
}

/// A file written by the export tool for one (resource, environment) pair,
/// already relocated to its environment-tagged name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub resource: String,
    pub environment: EnvironmentName,
    pub path: PathBuf,
}

/// Output of diffing two exports, or of generating and scrubbing one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultArtifact {
    pub path: PathBuf,
    /// True when the artifact encodes no change.
    pub empty: bool,
    /// Inverse diff, when one was requested and produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub undo: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
