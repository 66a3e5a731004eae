//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "fatigue", version, about = "Cyclic fatigue tester")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/fatigue.toml")]
    pub config: PathBuf,

    /// Resistance calibration CSV (header `raw,physical`, two rows)
    #[arg(long, value_name = "FILE")]
    pub resistance_calibration: Option<PathBuf>,

    /// Stretch calibration CSV (header `raw,physical`, two rows)
    #[arg(long, value_name = "FILE")]
    pub stretch_calibration: Option<PathBuf>,

    /// Log and report as JSON lines instead of plain text
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
    /// Monitor a running test and stop the actuator once the conductor fails
    Monitor {
        /// Record file (truncated)
        #[arg(long, short, value_name = "FILE")]
        output: PathBuf,
        /// Override safety.halt_bound_ohms
        #[arg(long, value_name = "OHMS")]
        halt_bound: Option<f64>,
        /// Override acquisition.record_rate_per_min
        #[arg(long, value_name = "PER_MIN")]
        record_rate: Option<u32>,
        /// Override safety.ack_timeout_ms (0 waits indefinitely)
        #[arg(long, value_name = "MS")]
        ack_timeout_ms: Option<u64>,
        /// Suppress the per-sample status lines
        #[arg(long, action = ArgAction::SetTrue)]
        quiet: bool,
    },
    /// Generate the G-code program that cycles the stretcher
    Plan {
        /// Write the program here instead of stdout
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Override motion.cycles
        #[arg(long)]
        cycles: Option<u32>,
        /// Override motion.stretch_pct
        #[arg(long, value_name = "PCT")]
        stretch_pct: Option<f64>,
        /// Override motion.offset_mm
        #[arg(long, value_name = "MM")]
        offset_mm: Option<f64>,
    },
    /// Validate config and calibration, and probe the devices
    SelfCheck,
}
