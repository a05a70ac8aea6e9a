use std::path::Path;
use tracing::debug;

use super::{config_path, ConfigError, TagsConfig};

/// Load the configuration from `~/.tagspace/config.toml`.
///
/// Returns `Ok(TagsConfig::default())` if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file exists but cannot be read or parsed.
pub fn load_config() -> Result<TagsConfig, ConfigError> {
    load_config_from(&config_path())
}

/// Load the configuration from `path`, defaulting when it is absent.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file exists but cannot be read or parsed.
pub fn load_config_from(path: &Path) -> Result<TagsConfig, ConfigError> {
    if !path.exists() {
        debug!("Config not found at {}; using defaults", path.display());
        return Ok(TagsConfig::default());
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: TagsConfig = toml::from_str(&content).map_err(|e| ConfigError::Toml {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}
