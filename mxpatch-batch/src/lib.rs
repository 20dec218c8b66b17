//! # mxpatch-batch
//!
//! Batch orchestration of the screen and table pipelines.
//!
//! Call [`pipeline::run_screens`] to export and diff screens between two
//! environments, or [`pipeline::run_tables`] to generate and scrub table
//! insert scripts. Both take a [`pipeline::Scope`] (one ad-hoc item or a
//! work list) and return a [`pipeline::BatchReport`].

pub mod classify;
pub mod error;
pub mod naming;
pub mod pipeline;
pub mod scrub;
pub mod skip_log;

mod screens;
mod tables;
mod writer;

pub use classify::is_empty_diff;
pub use error::BatchError;
pub use naming::{BatchRunState, NameScheme, OrdinalTemplate};
pub use pipeline::{
    run_screens, run_tables, BatchReport, ItemOutcome, ItemReport, PipelineSettings, RunContext,
    RunOptions, Scope,
};
pub use scrub::{scrub_document, scrub_file, ScrubMetadata};
