//! Main CLI application structure

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{meter_cmd, reading_cmd, tree};
use crate::domain::ReadingId;
use crate::storage::{Config, MeterStore};

#[derive(Parser)]
#[command(name = "wattlog")]
#[command(author, version, about = "Local-first logbook for electricity meters")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Database path (overrides the config file)
    #[arg(long, global = true, env = "WATTLOG_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage meters
    #[command(subcommand)]
    Meter(meter_cmd::MeterCommands),

    /// Manage readings
    #[command(subcommand)]
    Reading(reading_cmd::ReadingCommands),

    /// Show consumption and cost for a reading
    Consumption {
        /// Meter id or name
        meter: String,

        /// Reading id (defaults to the latest reading)
        reading: Option<ReadingId>,
    },

    /// Show all meters with their readings
    Tree,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    let config = Config::load()?;
    let db_path = config.resolve_db_path(cli.db);
    output.verbose_ctx("store", &format!("Opening database at {}", db_path.display()));

    let mut store = MeterStore::open(&db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;

    match cli.command {
        Commands::Meter(cmd) => meter_cmd::run(cmd, &mut store, &output)?,
        Commands::Reading(cmd) => reading_cmd::run(cmd, &mut store, &output)?,
        Commands::Consumption { meter, reading } => {
            reading_cmd::consumption(&store, &output, &meter, reading)?
        }
        Commands::Tree => tree::show(&store, &output)?,
    }

    store.close()?;
    output.verbose("Command completed successfully");

    Ok(())
}
