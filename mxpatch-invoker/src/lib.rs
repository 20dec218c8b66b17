//! # mxpatch-invoker
//!
//! Runs the vendor export, diff and insert-generator tools as child
//! processes and reports where their artifacts landed.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mxpatch_core::{config, EnvironmentRegistry};
//! use mxpatch_invoker::{ExternalTool, ToolInvoker, ToolRequest};
//!
//! fn export_one() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = config::load()?;
//!     let env = EnvironmentRegistry::from_config(&cfg).resolve("DEV")?;
//!     let tool = ExternalTool::from_config(&cfg, None)?;
//!     match tool.invoke(&ToolRequest::Export { resource: "ASSET", env: &env })? {
//!         Some(path) => println!("exported to {}", path.display()),
//!         None => println!("ASSET does not exist in DEV"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod process;
pub mod tool;

pub use context::InvocationContext;
pub use engine::ArgumentTemplates;
pub use error::InvokeError;
pub use process::ProcessConfig;
pub use tool::{ExternalTool, ToolClasses, ToolInvoker, ToolLayout, ToolRequest};
