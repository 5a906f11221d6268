// File: ./src/cli.rs
//! Command-line definitions for the `gridcal` binary.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "gridcal", version, about = "Turn schedule grids into calendar events")]
pub struct Cli {
    /// Use a different directory for config and data.
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Read configuration from this file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (repeat for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the time axis and merged-cell times of a sheet.
    Analyze { sheet: PathBuf },

    /// Print the extraction prompt for a sheet.
    Prompt { sheet: PathBuf },

    /// Merge the events in a raw extraction response ("-" reads stdin).
    Merge { response: String },

    /// Extract, merge and export the events of a sheet.
    Run {
        sheet: PathBuf,

        /// Use a captured response instead of the configured extractor command.
        #[arg(long)]
        response: Option<PathBuf>,

        /// Where to write the calendar (default: data dir, named after the sheet).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Validate and report without writing anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the configuration file path and effective values.
    Config {
        /// Write the effective values to the configuration file.
        #[arg(long)]
        write: bool,
    },
}

impl Cli {
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}
