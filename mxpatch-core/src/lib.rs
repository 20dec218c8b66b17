//! mxpatch core library: domain types, configuration, environment resolution.
//!
//! - [`types`]: newtypes and domain structs shared by every pipeline
//! - [`error`]: [`ConfigError`]
//! - [`config`]: load / save / init of `~/.mxpatch/config.yaml`
//! - [`environment`]: environment resolver and vendor properties parsing

pub mod config;
pub mod environment;
pub mod error;
pub mod types;

pub use config::Config;
pub use environment::{ConnectionCoordinates, EnvironmentRegistry, ResolvedEnvironment};
pub use error::ConfigError;
pub use types::{EnvironmentName, ExportArtifact, ResultArtifact, ToolKind, WorkItem};
