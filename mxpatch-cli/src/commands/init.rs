//! `mxpatch init [--maximo-root <dir>] [--force]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use mxpatch_core::config;

/// Write a starter configuration.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Root of the Maximo installation (defaults to the current directory).
    #[arg(long, value_name = "DIR")]
    pub maximo_root: Option<PathBuf>,

    /// Overwrite an existing configuration.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let root = match self.maximo_root {
            Some(root) => root,
            None => std::env::current_dir().context("cannot read current directory")?,
        };
        let root = root
            .canonicalize()
            .with_context(|| format!("cannot resolve path '{}'", root.display()))?;

        let home = dirs::home_dir().context("could not determine home directory")?;
        let cfg = config::init_at(&home, root.clone(), self.force)
            .context("failed to write configuration")?;

        println!("✓ Configuration written for '{}'", root.display());
        println!("  Saved to: {}", config::config_path_at(&home).display());
        println!("  Export root: {}", cfg.export_root().display());
        println!("  Output root: {}", cfg.output_root().display());
        println!("  Add environments under `environments:` before running screens or tables.");
        Ok(())
    }
}
