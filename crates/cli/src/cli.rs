//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Change Relay - change-feed dispatch and batch-publish pipeline
#[derive(Parser, Debug)]
#[command(
    name = "change-relay",
    author,
    version,
    about = "Change-feed dispatch and batch-publish pipeline",
    long_about = "Consumes bounded deliveries of change records, classifies each record \n\
                  by logical type, republishes them as size-bounded batches to a \n\
                  downstream transport, and routes unrecognized records to a \n\
                  dead-letter store."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "CHANGE_RELAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "CHANGE_RELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the relay pipeline
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "CHANGE_RELAY_CONFIG"
    )]
    pub config: PathBuf,

    /// Override the replay source path from configuration
    #[arg(long, env = "CHANGE_RELAY_SOURCE_PATH")]
    pub source_path: Option<PathBuf>,

    /// Override the maximum batch size in bytes from configuration
    #[arg(long, env = "CHANGE_RELAY_MAX_BATCH_BYTES")]
    pub max_batch_bytes: Option<usize>,

    /// Maximum number of invocations to process (0 = unlimited)
    #[arg(long, default_value = "0", env = "CHANGE_RELAY_MAX_INVOCATIONS")]
    pub max_invocations: u64,

    /// Pipeline timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "CHANGE_RELAY_TIMEOUT")]
    pub timeout: u64,

    /// Halt after this many consecutive failing invocations (0 = never)
    #[arg(long, default_value = "10", env = "CHANGE_RELAY_HALT_AFTER")]
    pub halt_after: u32,

    /// Validate configuration and exit without running pipeline
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "CHANGE_RELAY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show known logical types
    #[arg(long)]
    pub types: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
