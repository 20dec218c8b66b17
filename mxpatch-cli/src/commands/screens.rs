//! `mxpatch screens <SOURCE> <DEST>`: export, diff and classify screens.
//!
//! With `--screen` one presentation is processed (ad-hoc); otherwise every
//! screen the source database lists is (batch).

use anyhow::{Context, Result};
use clap::Args;

use mxpatch_batch::{run_screens, RunOptions, Scope};
use mxpatch_core::WorkItem;
use mxpatch_worklist::SqlWorkList;

use super::{report, Session};

/// Arguments for `mxpatch screens`.
#[derive(Args, Debug)]
pub struct ScreensArgs {
    /// Environment the changes come from.
    pub source: String,

    /// Environment the patch will be applied to.
    pub dest: String,

    /// Process a single screen instead of the whole list.
    #[arg(long, value_name = "NAME")]
    pub screen: Option<String>,

    /// Output name for the single screen (overrides --start).
    #[arg(long, value_name = "NAME", requires = "screen")]
    pub output: Option<String>,

    /// First output name of the run, e.g. V1000_006; later ones count up.
    #[arg(long, value_name = "TEMPLATE")]
    pub start: Option<String>,

    /// Also write the inverse diff for every non-empty result.
    #[arg(long)]
    pub undo: bool,

    /// Delete exports and empty diffs; log skipped screens.
    #[arg(long)]
    pub cleanup: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl ScreensArgs {
    pub fn run(self) -> Result<()> {
        let session = Session::open()?;
        let source = session.resolve(&self.source)?;
        let dest = session.resolve(&self.dest)?;

        let options = RunOptions {
            start: self.start,
            undo: self.undo,
            cleanup: self.cleanup,
            no_scrub: false,
        };
        let ctx = session.context(source.clone(), Some(dest), options);

        let report = match self.screen {
            Some(screen) => {
                let item = WorkItem::named(screen).with_output(self.output);
                run_screens(&ctx, Scope::AdHoc(item))
            }
            None => {
                let coordinates = source.coordinates().with_context(|| {
                    format!("cannot read database coordinates for '{}'", source.name)
                })?;
                let query = session.config().screens.list_query.clone();
                run_screens(&ctx, Scope::Batch(&SqlWorkList::new(coordinates, query)))
            }
        }
        .with_context(|| format!("screen run {} → {} failed", self.source, self.dest))?;

        report::finish(&report, self.json)
    }
}
