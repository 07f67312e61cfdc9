use super::{FileConfig, MAX_INDENT};
use anyhow::{Context, Result};
use std::path::Path;

/// Read and parse a TOML configuration file
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, contains
/// unknown keys, or holds out-of-range values.
pub fn parse_config_file(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
        .with_context(|| format!("Invalid config file: {}", path.display()))
}

/// Parse configuration from TOML text
///
/// # Errors
///
/// Returns an error if the text is not valid TOML for [`FileConfig`] or
/// fails validation.
pub fn parse_config_str(content: &str) -> Result<FileConfig> {
    let config: FileConfig = toml::from_str(content).context("Failed to parse TOML config")?;

    validate_config(&config)?;
    Ok(config)
}

/// Range checks that need no other layer
fn validate_config(config: &FileConfig) -> Result<()> {
    if let Some(indent) = config.manifest.indent
        && indent > MAX_INDENT
    {
        anyhow::bail!("Indent must be between 0 and {MAX_INDENT}");
    }

    if config
        .manifest
        .root_token
        .as_deref()
        .is_some_and(str::is_empty)
    {
        anyhow::bail!("Root token cannot be empty");
    }

    if config
        .scan
        .pattern
        .as_deref()
        .is_some_and(|p| p.trim().is_empty())
    {
        anyhow::bail!("Pattern cannot be empty");
    }

    Ok(())
}
