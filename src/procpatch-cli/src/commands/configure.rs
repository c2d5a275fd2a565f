//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting procpatch defaults.

use crate::config::{Config, StrategyKind};
use anyhow::{bail, Result};

/// Handle the configure command
///
/// # Arguments
/// * `suffix` - Optional destination suffix to set as default
/// * `strategy` - Optional base address strategy to set as default
/// * `show` - If true, show current configuration
pub fn handle(suffix: Option<String>, strategy: Option<StrategyKind>, show: bool) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if suffix.is_none() && strategy.is_none() {
        show_usage();
        return Ok(());
    }

    apply(&mut config, suffix, strategy)?;
    config.save()?;

    println!("Suffix: {}", config.suffix());
    println!("Strategy: {:?}", config.strategy());
    if let Ok(path) = Config::config_path() {
        println!("Config saved to: {}", path.display());
    }

    Ok(())
}

fn apply(config: &mut Config, suffix: Option<String>, strategy: Option<StrategyKind>) -> Result<()> {
    if let Some(suffix) = suffix {
        if suffix.is_empty() {
            bail!("Suffix must not be empty; the patched copy would replace the original");
        }
        config.suffix = Some(suffix);
    }
    if let Some(strategy) = strategy {
        config.strategy = Some(strategy);
    }
    Ok(())
}

/// Display current configuration
fn show_config(config: &Config) {
    println!("Suffix: {}", config.suffix());
    println!("Strategy: {:?}", config.strategy());

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: procpatch configure --suffix SUFFIX");
    println!("   or: procpatch configure --strategy first|module");
    println!("   or: procpatch configure --show");
}
