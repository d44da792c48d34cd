//! Edge CLI - Command line tool for the edge response security layer.
//!
//! Commands:
//! - `edge process` - Run the response handler over a recorded event
//! - `edge explain` - Show the headers a host/path/status would receive
//! - `edge config` - Manage configuration

mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{ConfigArgs, ExplainArgs, ProcessArgs};
use context::LogFormatArg;

/// Edge CLI - Run and inspect the edge response security layer
#[derive(Parser)]
#[command(name = "edge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Format of the handler's own log events
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Human)]
    log_format: LogFormatArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the response handler over a recorded event file
    Process(ProcessArgs),

    /// Show the headers a synthetic request would receive
    Explain(ExplainArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.log_format == LogFormatArg::Tracing {
        init_tracing(cli.verbose);
    }

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    let ctx = context::Context::load(cli.config.as_deref(), cli.log_format, output)?;

    // Execute command
    let result = match cli.command {
        Commands::Process(args) => commands::process::run(args, &ctx),
        Commands::Explain(args) => commands::explain::run(args, &ctx),
        Commands::Config(args) => commands::config::run(args, &ctx),
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
