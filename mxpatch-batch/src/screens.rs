//! Per-item state machine of the screen pipeline.
//!
//! ```text
//! Pending → SourceExported → DestinationExported
//!         → MissingSource | MissingDestination | MissingBoth | Diffed
//! Diffed  → Empty | Created → (undo) → (cleanup)
//! ```
//!
//! The diff turns the destination into the source; the undo diff is the
//! same call with the two exports swapped.

use mxpatch_core::{ExportArtifact, ResolvedEnvironment, ResultArtifact};
use mxpatch_invoker::{InvokeError, ToolInvoker, ToolRequest};

use crate::classify::is_empty_diff_file;
use crate::error::BatchError;
use crate::naming::undo_name;
use crate::pipeline::{ItemOutcome, RunContext};
use crate::writer::remove_file;

/// Run one screen through export, diff, classification and cleanup.
pub(crate) fn process_screen(
    ctx: &RunContext<'_>,
    dest: &ResolvedEnvironment,
    resource: &str,
    name: &str,
) -> ItemOutcome {
    // Both exports are attempted before classifying.
    let source = export(ctx.invoker, resource, &ctx.source);
    let destination = export(ctx.invoker, resource, dest);

    let outcome = match (&source, &destination) {
        (Err(e), _) | (_, Err(e)) => ItemOutcome::error(e),
        (Ok(Some(src)), Ok(Some(dst))) => match diff(ctx, src, dst, name) {
            Ok(outcome) => outcome,
            Err(e) => ItemOutcome::error(e),
        },
        (Ok(Some(_)), Ok(None)) => ItemOutcome::MissingDestination,
        (Ok(None), Ok(Some(_))) => ItemOutcome::MissingSource,
        (Ok(None), Ok(None)) => ItemOutcome::MissingBoth,
    };

    if ctx.options.cleanup {
        for artifact in [source, destination].into_iter().flatten().flatten() {
            if let Err(e) = remove_file(&artifact.path) {
                tracing::warn!(resource, error = %e, "could not remove export");
            }
        }
    }
    outcome
}

fn export(
    invoker: &dyn ToolInvoker,
    resource: &str,
    env: &ResolvedEnvironment,
) -> Result<Option<ExportArtifact>, InvokeError> {
    let path = invoker.invoke(&ToolRequest::Export { resource, env })?;
    if path.is_none() {
        tracing::debug!(resource, env = %env.name, "no export produced");
    }
    Ok(path.map(|path| ExportArtifact {
        resource: resource.to_string(),
        environment: env.name.clone(),
        path,
    }))
}

fn diff(
    ctx: &RunContext<'_>,
    source: &ExportArtifact,
    dest: &ExportArtifact,
    name: &str,
) -> Result<ItemOutcome, BatchError> {
    let Some(path) = ctx.invoker.invoke(&ToolRequest::Diff {
        base: &dest.path,
        target: &source.path,
        outfile: name,
    })?
    else {
        return Ok(ItemOutcome::error("diff tool produced no output"));
    };

    let mut artifact = ResultArtifact {
        empty: is_empty_diff_file(&path, &ctx.settings.closing_marker)?,
        path,
        undo: None,
    };

    if artifact.empty {
        if ctx.options.cleanup {
            remove_file(&artifact.path)?;
        }
        return Ok(artifact.into());
    }

    if ctx.options.undo {
        let undo = undo_name(name);
        // An undo failure still leaves the forward diff Created.
        artifact.undo = match ctx.invoker.invoke(&ToolRequest::Diff {
            base: &source.path,
            target: &dest.path,
            outfile: &undo,
        }) {
            Ok(None) => {
                tracing::warn!(resource = %source.resource, name = %undo, "undo diff produced no output");
                None
            }
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(resource = %source.resource, name = %undo, error = %e, "undo diff failed");
                None
            }
        };
    }
    Ok(artifact.into())
}
