//! CLI command implementations.

pub mod config;
pub mod explain;
pub mod process;

use clap::{Args, Subcommand};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Recorded event JSON file.
    pub event: String,

    /// Write the response here instead of stdout.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Print the response on a single line.
    #[arg(long)]
    pub compact: bool,
}

/// Arguments for the explain command.
#[derive(Args)]
pub struct ExplainArgs {
    /// Request host (e.g., sdk.example.com).
    #[arg(long)]
    pub host: String,

    /// Request path.
    #[arg(short, long, default_value = "/")]
    pub path: String,

    /// Response status code.
    #[arg(short, long, default_value = "200")]
    pub status: u16,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the configuration.
    Validate,
}
