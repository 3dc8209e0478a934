//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::resolve::resolve_timing;
use crate::types::KairosConfig;
use std::path::Path;

/// File name looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "kairos.toml";

/// Loads `<project_dir>/kairos.toml`, falling back to the defaults when the
/// directory has no configuration file.
pub fn load_config(project_dir: &Path) -> Result<KairosConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE_NAME);
    if !config_path.is_file() {
        return Ok(KairosConfig::default());
    }
    load_config_file(&config_path)
}

/// Loads and validates a configuration from an explicit file path.
pub fn load_config_file(path: &Path) -> Result<KairosConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<KairosConfig, ConfigError> {
    let config: KairosConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    resolve_timing(&config)?;
    Ok(config)
}
