//! mxpatch: Maximo screen and table patch generator.
//!
//! # Usage
//!
//! ```text
//! mxpatch init [--maximo-root <dir>] [--force]
//! mxpatch envs [--json]
//! mxpatch screens <SOURCE> <DEST> [--screen <name>] [--output <name>]
//!                 [--start <template>] [--undo] [--cleanup] [--json]
//! mxpatch tables <SOURCE> (--table <name> [--where <clause>] [--output <name>]
//!                         | --bulk <file.csv>) [--start <template>] [--no-scrub] [--json]
//! ```

mod commands;
mod exit;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use commands::{envs::EnvsArgs, init::InitArgs, screens::ScreensArgs, tables::TablesArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "mxpatch",
    version,
    about = "Generate Maximo screen patches and table insert scripts between environments",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a starter configuration to ~/.mxpatch/config.yaml.
    Init(InitArgs),

    /// List configured environments.
    Envs(EnvsArgs),

    /// Export and diff screens from SOURCE against DEST.
    Screens(ScreensArgs),

    /// Generate insert scripts for tables in SOURCE.
    Tables(TablesArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result: Result<()> = match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Envs(args) => args.run(),
        Commands::Screens(args) => args.run(),
        Commands::Tables(args) => args.run(),
    };
    if let Err(err) = result {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(exit::code_for(&err).into());
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
