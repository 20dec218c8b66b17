//! Per-item step of the table pipeline: generate inserts, then scrub.

use mxpatch_core::WorkItem;
use mxpatch_invoker::ToolRequest;

use crate::pipeline::{ItemOutcome, RunContext};
use crate::scrub::{scrub_file, ScrubMetadata};

pub(crate) fn process_table(ctx: &RunContext<'_>, item: &WorkItem, name: &str) -> ItemOutcome {
    let request = ToolRequest::Inserts {
        table: &item.name,
        filter: item.filter.as_deref(),
        outfile: name,
        env: &ctx.source,
    };
    let generated = match ctx.invoker.invoke(&request) {
        Ok(Some(path)) => path,
        Ok(None) => return ItemOutcome::MissingSource,
        Err(e) => return ItemOutcome::error(e),
    };

    if ctx.options.no_scrub {
        return ItemOutcome::Created {
            output: generated,
            undo: None,
        };
    }

    let meta = ScrubMetadata::for_table(
        &ctx.settings.author,
        &ctx.settings.structural_key,
        &item.name,
        item.filter.as_deref(),
        name,
    );
    match scrub_file(&generated, &meta) {
        Ok(output) => ItemOutcome::Created { output, undo: None },
        Err(e) => ItemOutcome::error(e),
    }
}
