//! CLI interface and argument parsing
//!
//! Commands return a process exit code: 0 success, 2 configuration error,
//! 4 connection error, 5 fatal error.

pub mod commands;

use clap::{Parser, Subcommand};

/// Wardline - hospital administration backend
#[derive(Parser, Debug)]
#[command(name = "wardline")]
#[command(version, about, long_about = None)]
#[command(author = "Wardline Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "wardline.toml", env = "WARDLINE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "WARDLINE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API
    Serve(commands::serve::ServeArgs),

    /// Apply the database schema
    Migrate(commands::migrate::MigrateArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show bed occupancy and patient census
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
