//! CLI execution context.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::ValueEnum;
use edge_core::EdgeConfig;
use edge_observability::{
    EventSink, LogFormat, LogLevel, StderrSink, StructuredLogger, TracingSink,
};

use crate::output::Output;

/// Config file names searched for, in order, in each directory.
const CONFIG_NAMES: [&str; 4] = ["edge.toml", ".edge.toml", "edge.json", "config.json"];

/// Format of the handler's structured log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    /// One JSON object per line on stderr.
    Json,
    /// Readable lines on stderr.
    Human,
    /// Forward to the installed `tracing` subscriber.
    Tracing,
}

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A config file, given or discovered.
    File(PathBuf),
    /// Environment variables named after the keys.
    Environment,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Environment => write!(f, "environment"),
        }
    }
}

/// Execution context for CLI commands.
pub struct Context {
    /// Configuration source.
    pub source: ConfigSource,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    log_format: LogFormatArg,
}

impl Context {
    /// Resolve the config source. Loading is deferred so `config init`
    /// works without one.
    pub fn load(config_path: Option<&str>, log_format: LogFormatArg, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let source = match config_path {
            Some(path) => ConfigSource::File(resolve_path(&cwd, path)),
            None => find_config(&cwd)
                .map(ConfigSource::File)
                .unwrap_or(ConfigSource::Environment),
        };

        output.debug(&format!("Config source: {}", source));

        Ok(Self {
            source,
            output,
            cwd,
            log_format,
        })
    }

    /// Load the configuration without validating it.
    pub fn raw_config(&self) -> Result<EdgeConfig> {
        match &self.source {
            ConfigSource::File(path) => EdgeConfig::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display())),
            ConfigSource::Environment => EdgeConfig::from_env()
                .context("No config file found and environment is incomplete"),
        }
    }

    /// Load and validate the configuration.
    pub fn config(&self) -> Result<Arc<EdgeConfig>> {
        let config = self.raw_config()?;
        config
            .validate()
            .with_context(|| format!("Invalid config from {}", self.source))?;
        Ok(Arc::new(config))
    }

    /// Logger for the handler, writing in the selected format.
    pub fn logger(&self) -> StructuredLogger {
        let sink: Arc<dyn EventSink> = match self.log_format {
            LogFormatArg::Json => Arc::new(StderrSink::new(LogFormat::Json)),
            LogFormatArg::Human => Arc::new(StderrSink::new(LogFormat::Human)),
            LogFormatArg::Tracing => Arc::new(TracingSink),
        };

        let level = if self.output.is_verbose() {
            LogLevel::Debug
        } else {
            LogLevel::Warn
        };

        StructuredLogger::new(sink).with_min_level(level)
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        resolve_path(&self.cwd, path)
    }
}

fn resolve_path(cwd: &Path, path: &str) -> PathBuf {
    if Path::new(path).is_absolute() {
        PathBuf::from(path)
    } else {
        cwd.join(path)
    }
}

/// Find a config file in the directory tree.
fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let config_path = current.join(name);
            if config_path.is_file() {
                return Some(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    None
}
