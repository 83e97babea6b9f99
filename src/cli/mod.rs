//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Beacon using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Beacon - Facility bed-capacity reporting engine
#[derive(Parser, Debug)]
#[command(name = "beacon")]
#[command(version, about, long_about = None)]
#[command(author = "Beacon Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "beacon.toml", env = "BEACON_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "BEACON_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a facility report for a measure and period
    Generate(commands::generate::GenerateArgs),

    /// Submit a stored report to the configured destination
    Send(commands::send::SendArgs),

    /// Show job records and their progress notes
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
