//! CLI parse: clap types for propsheet. No behavior; definitions only.

use crate::selection::Style;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Propsheet CLI - generate property sheets for a scene selection
#[derive(Parser)]
#[command(name = "propsheet")]
#[command(about = "Generate property sheets for editor selections in the background")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the property sheet for a selection of scene objects
    Inspect {
        /// Scene file (TOML) with type schemas and objects
        #[arg(long)]
        scene: PathBuf,
        /// Comma-separated object ids to select
        #[arg(long, value_delimiter = ',', required = true)]
        select: Vec<String>,
        /// Replace the selection right after the first request
        #[arg(long, value_delimiter = ',')]
        then_select: Vec<String>,
        /// Merge style (intersection or union); defaults to the configured style
        #[arg(long)]
        style: Option<Style>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
        /// Give up if sheets are not presented within this many milliseconds
        #[arg(long, default_value = "5000")]
        timeout_ms: u64,
    },
    /// Show the effective configuration
    Config {
        /// Output format (toml or json)
        #[arg(long, default_value = "toml")]
        format: String,
    },
}
