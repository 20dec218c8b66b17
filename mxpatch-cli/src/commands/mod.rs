pub mod envs;
pub mod init;
pub mod report;
pub mod screens;
pub mod tables;

use std::path::PathBuf;

use anyhow::{Context, Result};

use mxpatch_batch::{PipelineSettings, RunContext, RunOptions};
use mxpatch_core::{config, Config, EnvironmentRegistry, ResolvedEnvironment};
use mxpatch_invoker::ExternalTool;

/// Loaded configuration plus the tool runner, shared by the pipeline commands.
pub struct Session {
    home: PathBuf,
    config: Config,
    registry: EnvironmentRegistry,
    tool: ExternalTool,
}

impl Session {
    pub fn open() -> Result<Self> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let config = config::load_at(&home).context("failed to load configuration")?;
        let registry = EnvironmentRegistry::from_config(&config);
        let tool = ExternalTool::from_config(&config, Some(&config::templates_dir_at(&home)))
            .context("cannot prepare vendor tools")?;
        Ok(Self {
            home,
            config,
            registry,
            tool,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn resolve(&self, name: &str) -> Result<ResolvedEnvironment> {
        self.registry
            .resolve(name)
            .with_context(|| format!("cannot use environment '{name}'"))
    }

    pub fn context(
        &self,
        source: ResolvedEnvironment,
        destination: Option<ResolvedEnvironment>,
        options: RunOptions,
    ) -> RunContext<'_> {
        RunContext {
            invoker: &self.tool,
            source,
            destination,
            options,
            settings: PipelineSettings::from_config(&self.config, &self.home),
        }
    }
}
