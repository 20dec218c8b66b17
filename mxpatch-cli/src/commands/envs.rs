//! `mxpatch envs`: configured environments and their properties files.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use mxpatch_core::config;

/// Arguments for `mxpatch envs`.
#[derive(Args, Debug)]
pub struct EnvsArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize, Tabled)]
struct EnvRow {
    #[tabled(rename = "environment")]
    name: String,
    #[tabled(rename = "properties")]
    properties: String,
    #[tabled(rename = "found")]
    found: bool,
}

impl EnvsArgs {
    pub fn run(self) -> Result<()> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let cfg = config::load_at(&home).context("failed to load configuration")?;

        let rows: Vec<EnvRow> = cfg
            .environments
            .iter()
            .map(|(name, env)| EnvRow {
                name: name.to_string(),
                properties: env.properties.display().to_string(),
                found: env.properties.is_file(),
            })
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        if rows.is_empty() {
            println!("No environments configured.");
            println!(
                "  Edit {} to add some.",
                config::config_path_at(&home).display()
            );
            return Ok(());
        }

        let missing = rows.iter().filter(|r| !r.found).count();
        let mut table = Table::new(&rows);
        table.with(Style::rounded());
        println!("{table}");
        if missing > 0 {
            println!(
                "{}",
                format!("{missing} properties file(s) not found").yellow()
            );
        }
        Ok(())
    }
}
