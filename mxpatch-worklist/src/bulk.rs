//! Bulk CSV work list for the table pipeline.
//!
//! ```text
//! table,where,outfile
//! ASSETATTRIBUTE,assetattrid like 'PUMP%',
//! MAXDOMAIN,,V1000_010
//! ```
//!
//! Blank `where` / `outfile` cells are treated as absent. Rows are returned in
//! file order.

use std::path::{Path, PathBuf};

use mxpatch_core::WorkItem;
use serde::Deserialize;

use crate::{WorkListError, WorkListProvider};

#[derive(Debug, Deserialize)]
struct BulkRow {
    table: String,
    #[serde(rename = "where", default)]
    filter: Option<String>,
    #[serde(default)]
    outfile: Option<String>,
}

/// CSV file listing tables to export.
#[derive(Debug, Clone)]
pub struct BulkFile {
    path: PathBuf,
}

impl BulkFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn bulk_err(&self, source: csv::Error) -> WorkListError {
        WorkListError::Bulk {
            path: self.path.clone(),
            source,
        }
    }
}

impl WorkListProvider for BulkFile {
    fn list_resources(&self) -> Result<Vec<WorkItem>, WorkListError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| self.bulk_err(e))?;

        let mut items = Vec::new();
        for (idx, row) in reader.deserialize::<BulkRow>().enumerate() {
            let row = row.map_err(|e| self.bulk_err(e))?;
            if row.table.is_empty() {
                return Err(WorkListError::MissingName {
                    path: self.path.clone(),
                    row: idx as u64 + 1,
                });
            }
            items.push(
                WorkItem::named(row.table)
                    .with_filter(non_blank(row.filter))
                    .with_output(non_blank(row.outfile)),
            );
        }
        tracing::debug!(path = %self.path.display(), items = items.len(), "read bulk file");
        Ok(items)
    }
}

fn non_blank(cell: Option<String>) -> Option<String> {
    cell.filter(|s| !s.trim().is_empty())
}
