//! Work lists for `mxpatch` batch runs.
//!
//! A [`WorkListProvider`] yields the ordered [`WorkItem`]s a pipeline walks.
//! Two sources exist:
//!
//! - [`SqlWorkList`] queries the source environment's database (screens batch)
//! - [`BulkFile`] reads a `table,where,outfile` CSV (tables batch)
//!
//! Ad-hoc runs name their single item directly and need no provider.
//!
//! Order is whatever the source yields; nothing is sorted. A source that
//! cannot be read fails the whole list, never a partial one.

use std::path::PathBuf;

use mxpatch_core::WorkItem;
use thiserror::Error;

pub mod bulk;
pub mod sql;

pub use bulk::BulkFile;
pub use sql::SqlWorkList;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Errors from enumerating a work list.
#[derive(Debug, Error)]
pub enum WorkListError {
    /// The database could not be reached or the query failed.
    #[error("work-list source {source_name} unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// The bulk file is missing or malformed.
    #[error("failed to read bulk file {path}: {source}")]
    Bulk {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A bulk row has an empty `table` column.
    #[error("{path}: row {row} has no table name")]
    MissingName { path: PathBuf, row: u64 },
}

/// Produces the ordered items of one batch.
pub trait WorkListProvider {
    fn list_resources(&self) -> Result<Vec<WorkItem>, WorkListError>;
}
