//! `mxpatch tables <SOURCE>`: generate and scrub insert scripts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use mxpatch_batch::{run_tables, RunOptions, Scope};
use mxpatch_core::WorkItem;
use mxpatch_worklist::BulkFile;

use super::{report, Session};

/// Arguments for `mxpatch tables`.
#[derive(Args, Debug)]
pub struct TablesArgs {
    /// Environment whose data is scripted.
    pub source: String,

    /// Script a single table.
    #[arg(long, value_name = "NAME", required_unless_present = "bulk", conflicts_with = "bulk")]
    pub table: Option<String>,

    /// Row filter for --table, e.g. "domainid = 'ASSETSTATUS'".
    #[arg(long = "where", value_name = "CLAUSE", requires = "table")]
    pub filter: Option<String>,

    /// Output name for --table (overrides --start).
    #[arg(long, value_name = "NAME", requires = "table")]
    pub output: Option<String>,

    /// CSV file with `table,where,outfile` rows.
    #[arg(long, value_name = "FILE")]
    pub bulk: Option<PathBuf>,

    /// First output name of the run, e.g. V1000_006; later ones count up.
    #[arg(long, value_name = "TEMPLATE")]
    pub start: Option<String>,

    /// Keep the generated scripts as they are.
    #[arg(long)]
    pub no_scrub: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl TablesArgs {
    pub fn run(self) -> Result<()> {
        let session = Session::open()?;
        let source = session.resolve(&self.source)?;

        let options = RunOptions {
            start: self.start,
            undo: false,
            cleanup: false,
            no_scrub: self.no_scrub,
        };
        let ctx = session.context(source, None, options);

        let report = match (self.table, self.bulk) {
            (Some(table), _) => {
                let item = WorkItem::named(table)
                    .with_filter(self.filter)
                    .with_output(self.output);
                run_tables(&ctx, Scope::AdHoc(item))
            }
            (None, Some(bulk)) => run_tables(&ctx, Scope::Batch(&BulkFile::new(bulk))),
            (None, None) => anyhow::bail!("either --table or --bulk is required"),
        }
        .with_context(|| format!("table run in {} failed", self.source))?;

        report::finish(&report, self.json)
    }
}
