//! ConfigStore - Local Configuration Storage

use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::CONFIG_FILE_NAME;
use crate::domain::config::AppConfig;
use crate::error::Result;
use crate::helpers::get_or_create_config_dir;

/// Default location of the config file
pub fn default_config_path() -> Result<PathBuf> {
    Ok(get_or_create_config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the TOML config, falling back to defaults when the file is missing
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(&path)?;
    let config: AppConfig = toml::from_str(&content)?;
    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// The config as it would be written to disk
pub fn config_toml(config: &AppConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

/// Save the config as TOML, creating parent directories as needed
pub fn save_config(path: Option<&Path>, config: &AppConfig) -> Result<PathBuf> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, config_toml(config)?)?;
    tracing::info!("Saved config to {}", path.display());
    Ok(path)
}
