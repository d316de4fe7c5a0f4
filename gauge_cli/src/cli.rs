//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "fuelgauge", version, about = "Fuel gauge CLI")]
pub struct Cli {
    /// Path to config TOML; the stock vehicle defaults apply when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drive the gauge continuously against the wall clock
    Run {
        /// Stop after this many rendered samples (default: run until ctrl-c)
        #[arg(long)]
        samples: Option<u64>,

        /// Simulated tank level at power-on, in gallons
        #[arg(long, default_value_t = 17.0)]
        start_gallons: f32,

        /// Mirror per-sample state snapshots to stderr
        #[arg(long, action = ArgAction::SetTrue)]
        diag: bool,
    },
    /// Take samples immediately under simulated scheduler time
    Sample {
        /// Number of samples to render
        #[arg(long, default_value_t = 1)]
        count: u32,

        /// Simulated tank level at power-on, in gallons
        #[arg(long, default_value_t = 17.0)]
        start_gallons: f32,
    },
    /// Fit a direct calibration curve from a raw,gallons CSV
    Fit {
        #[arg(value_name = "CSV")]
        csv: PathBuf,
    },
}
