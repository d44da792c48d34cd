//! Configuration management commands.

use std::fs;

use anyhow::{bail, Context as _, Result};
use edge_core::{generate_default_config, CONFIG_KEYS};

use super::{ConfigArgs, ConfigCommand};
use crate::context::{ConfigSource, Context};

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = ctx.raw_config()?;

    if ctx.output.is_json() {
        ctx.output.json(&config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    ctx.output.kv("source", &ctx.source.to_string());
    ctx.output.info("");

    for key in CONFIG_KEYS {
        ctx.output.kv(key, config.get(key).unwrap_or_default());
    }

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("edge.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

    ctx.output.success(&format!("Created: {}", config_path.display()));
    ctx.output.info("Replace the example origins and domain before deploying.");

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");
    ctx.output.kv("source", &ctx.source.to_string());

    let config = ctx.raw_config()?;
    let mut warnings: Vec<String> = Vec::new();

    for (key, prefix) in [("SDK_S3_HOST", &config.sdk_host), ("KM_S3_HOST", &config.km_host)] {
        if !prefix.ends_with('.') && !prefix.is_empty() {
            warnings.push(format!("{} '{}' also matches longer host names", key, prefix));
        }
    }

    if config.sdk_host.starts_with(&config.km_host) || config.km_host.starts_with(&config.sdk_host) {
        warnings.push("SDK_S3_HOST and KM_S3_HOST overlap; matching hosts get the SDK policy".to_string());
    }

    if ctx.source == ConfigSource::Environment {
        warnings.push("no config file found, using environment variables".to_string());
    }

    if let Err(e) = config.validate() {
        ctx.output.error(&format!("Error: {}", e));
        bail!("Configuration is invalid");
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "valid": true, "warnings": warnings }));
    } else if warnings.is_empty() {
        ctx.output.success("Configuration is valid");
    } else {
        ctx.output.success("Configuration is valid (with warnings)");
    }

    Ok(())
}
