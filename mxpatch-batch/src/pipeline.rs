//! Shared pipeline entrypoint used by the CLI.
//!
//! [`run_screens`] and [`run_tables`] walk a [`Scope`] item by item. One
//! item's failure never stops the loop; it is recorded in the
//! [`BatchReport`]. Only errors that make the whole run meaningless (bad
//! template, unreadable work list) are returned as `Err`.

use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

use mxpatch_core::config::{log_dir_at, Config};
use mxpatch_core::{ResolvedEnvironment, ResultArtifact, WorkItem};
use mxpatch_invoker::ToolInvoker;
use mxpatch_worklist::WorkListProvider;

use crate::error::BatchError;
use crate::naming::{screen_auto_name, BatchRunState, NameScheme, NameSource};
use crate::skip_log::write_skip_log;
use crate::{screens, tables};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Which items a run covers.
pub enum Scope<'a> {
    /// One item named by the caller.
    AdHoc(WorkItem),
    /// Every item the provider lists, in its order.
    Batch(&'a dyn WorkListProvider),
}

/// Per-run switches from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Starting output-name template, e.g. `V1000_006`.
    pub start: Option<String>,
    /// Also produce the inverse diff for non-empty screen diffs.
    pub undo: bool,
    /// Delete exports and empty diffs; write a skip log.
    pub cleanup: bool,
    /// Keep generated table scripts as-is.
    pub no_scrub: bool,
}

/// Installation settings the pipelines need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub closing_marker: String,
    pub author: String,
    pub structural_key: String,
    pub log_dir: PathBuf,
}

impl PipelineSettings {
    pub fn from_config(config: &Config, home: &Path) -> Self {
        Self {
            closing_marker: config.screens.closing_marker.clone(),
            author: config.tables.author.clone(),
            structural_key: config.tables.structural_key.clone(),
            log_dir: log_dir_at(home, config),
        }
    }
}

/// Everything one run needs, built once by the caller.
pub struct RunContext<'a> {
    pub invoker: &'a dyn ToolInvoker,
    pub source: ResolvedEnvironment,
    /// Required by the screen pipeline, ignored by the table pipeline.
    pub destination: Option<ResolvedEnvironment>,
    pub options: RunOptions,
    pub settings: PipelineSettings,
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Result of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ItemOutcome {
    Created {
        output: PathBuf,
        #[serde(skip_serializing_if = "Option::is_none")]
        undo: Option<PathBuf>,
    },
    /// The diff encodes no change.
    Empty,
    MissingSource,
    MissingDestination,
    MissingBoth,
    Error {
        reason: String,
    },
}

impl ItemOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, ItemOutcome::Created { .. })
    }

    pub fn error(reason: impl ToString) -> Self {
        ItemOutcome::Error {
            reason: reason.to_string(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ItemOutcome::Created { .. } => "created",
            ItemOutcome::Empty => "empty",
            ItemOutcome::MissingSource => "missing in source",
            ItemOutcome::MissingDestination => "missing in destination",
            ItemOutcome::MissingBoth => "missing in both",
            ItemOutcome::Error { .. } => "error",
        }
    }
}

impl From<ResultArtifact> for ItemOutcome {
    fn from(artifact: ResultArtifact) -> Self {
        if artifact.empty {
            ItemOutcome::Empty
        } else {
            ItemOutcome::Created {
                output: artifact.path,
                undo: artifact.undo,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    pub resource: String,
    /// Output name used for this item, whether or not anything was created.
    pub name: String,
    pub name_source: NameSource,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
}

/// Count of items per outcome kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub created: usize,
    pub empty: usize,
    pub missing_source: usize,
    pub missing_destination: usize,
    pub missing_both: usize,
    pub error: usize,
}

impl OutcomeCounts {
    fn record(&mut self, outcome: &ItemOutcome) {
        let slot = match outcome {
            ItemOutcome::Created { .. } => &mut self.created,
            ItemOutcome::Empty => &mut self.empty,
            ItemOutcome::MissingSource => &mut self.missing_source,
            ItemOutcome::MissingDestination => &mut self.missing_destination,
            ItemOutcome::MissingBoth => &mut self.missing_both,
            ItemOutcome::Error { .. } => &mut self.error,
        };
        *slot += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    Screens,
    Tables,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    AdHoc,
    Batch,
}

/// Observable result of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub pipeline: PipelineKind,
    pub mode: RunMode,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    pub items: Vec<ItemReport>,
    pub counts: OutcomeCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_log: Option<PathBuf>,
}

impl BatchReport {
    /// Outcome of the only item of an ad-hoc run.
    pub fn single_outcome(&self) -> Option<&ItemOutcome> {
        match (self.mode, self.items.as_slice()) {
            (RunMode::AdHoc, [only]) => Some(&only.outcome),
            _ => None,
        }
    }

    /// Output names of created items, in run order.
    pub fn created_names(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|i| i.outcome.is_created())
            .map(|i| i.name.as_str())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Entrypoints
// ---------------------------------------------------------------------------

/// Export, diff and classify screens from `ctx.source` against `ctx.destination`.
pub fn run_screens(ctx: &RunContext<'_>, scope: Scope<'_>) -> Result<BatchReport, BatchError> {
    let dest = ctx
        .destination
        .as_ref()
        .ok_or(BatchError::MissingDestination)?;
    drive(
        ctx,
        PipelineKind::Screens,
        scope,
        |item| screen_auto_name(&item.name, &ctx.source.name, &dest.name),
        |item, name| screens::process_screen(ctx, dest, &item.name, name),
    )
}

/// Generate (and scrub) insert scripts for tables in `ctx.source`.
pub fn run_tables(ctx: &RunContext<'_>, scope: Scope<'_>) -> Result<BatchReport, BatchError> {
    drive(
        ctx,
        PipelineKind::Tables,
        scope,
        |item| item.name.clone(),
        |item, name| tables::process_table(ctx, item, name),
    )
}

fn drive(
    ctx: &RunContext<'_>,
    pipeline: PipelineKind,
    scope: Scope<'_>,
    auto_name: impl Fn(&WorkItem) -> String,
    mut process: impl FnMut(&WorkItem, &str) -> ItemOutcome,
) -> Result<BatchReport, BatchError> {
    let mut state = BatchRunState::new(NameScheme::from_start(ctx.options.start.as_deref())?);
    let (mode, items) = match scope {
        Scope::AdHoc(item) => (RunMode::AdHoc, vec![item]),
        Scope::Batch(list) => (RunMode::Batch, list.list_resources()?),
    };
    tracing::info!(
        pipeline = ?pipeline,
        source = %ctx.source.name,
        items = items.len(),
        "starting run"
    );

    let mut report = BatchReport {
        pipeline,
        mode,
        source: ctx.source.name.to_string(),
        destination: ctx.destination.as_ref().map(|d| d.name.to_string()),
        items: Vec::with_capacity(items.len()),
        counts: OutcomeCounts::default(),
        skip_log: None,
    };

    for item in &items {
        let (name, name_source) = state.name_for(item, || auto_name(item));
        let outcome = process(item, &name);
        log_outcome(&item.name, &name, &outcome);

        match &outcome {
            ItemOutcome::Created { .. } => state.advance(&name_source),
            ItemOutcome::Empty if ctx.options.cleanup => state.record_skip(&item.name),
            _ => {}
        }
        report.counts.record(&outcome);
        report.items.push(ItemReport {
            resource: item.name.clone(),
            name,
            name_source,
            outcome,
        });
    }

    if ctx.options.cleanup {
        match write_skip_log(&ctx.settings.log_dir, state.skipped(), Local::now()) {
            Ok(path) => report.skip_log = Some(path),
            Err(e) => tracing::error!(error = %e, "could not write skip log"),
        }
    }
    Ok(report)
}

fn log_outcome(resource: &str, name: &str, outcome: &ItemOutcome) {
    match outcome {
        ItemOutcome::Created { output, .. } => {
            tracing::info!(resource, output = %output.display(), "created")
        }
        ItemOutcome::Empty => tracing::info!(resource, name, "no changes"),
        ItemOutcome::Error { reason } => tracing::warn!(resource, %reason, "item failed"),
        other => tracing::warn!(resource, outcome = other.label(), "skipped"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_json_is_tagged() {
        let json = serde_json::to_value(ItemOutcome::Created {
            output: PathBuf::from("/x/a.mxs"),
            undo: None,
        })
        .unwrap();
        assert_eq!(json["outcome"], "created");
        assert_eq!(json["output"], "/x/a.mxs");
        assert!(json.get("undo").is_none());

        let json = serde_json::to_value(ItemOutcome::MissingDestination).unwrap();
        assert_eq!(json["outcome"], "missing_destination");
    }

    #[test]
    fn result_artifact_converts_by_emptiness() {
        let empty = ResultArtifact {
            path: PathBuf::from("a.mxs"),
            empty: true,
            undo: None,
        };
        assert_eq!(ItemOutcome::from(empty), ItemOutcome::Empty);

        let full = ResultArtifact {
            path: PathBuf::from("a.mxs"),
            empty: false,
            undo: Some(PathBuf::from("a-undo.mxs")),
        };
        assert!(ItemOutcome::from(full).is_created());
    }

    #[test]
    fn counts_per_kind() {
        let mut counts = OutcomeCounts::default();
        counts.record(&ItemOutcome::Empty);
        counts.record(&ItemOutcome::Empty);
        counts.record(&ItemOutcome::error("boom"));
        assert_eq!(counts.empty, 2);
        assert_eq!(counts.error, 1);
        assert_eq!(counts.created, 0);
    }
}
