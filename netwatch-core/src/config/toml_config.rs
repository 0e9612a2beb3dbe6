//! TOML configuration file I/O
//!
//! Handles loading and saving the monitor configuration from TOML files
//! in the user's configuration directory. A commented default file is
//! seeded on first run.

use std::path::{Path, PathBuf};

use crate::config::MonitorConfig;
use crate::error::{ConfigError, NetwatchError};

/// Default configuration file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration seeded on first run
const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Get the default configuration directory
///
/// Returns ~/.config/netwatch on Linux, or the NETWATCH_CONFIG_DIR
/// environment variable if set (used by tests).
pub fn get_config_dir() -> Result<PathBuf, NetwatchError> {
    if let Ok(config_dir) = std::env::var("NETWATCH_CONFIG_DIR") {
        return Ok(PathBuf::from(config_dir));
    }

    let home = std::env::var("HOME").map_err(|_| {
        NetwatchError::Config(ConfigError::IoError {
            message: "HOME environment variable not set".to_string(),
        })
    })?;

    Ok(PathBuf::from(home).join(".config").join("netwatch"))
}

/// Get the default configuration file path
pub fn get_config_path() -> Result<PathBuf, NetwatchError> {
    let config_dir = get_config_dir()?;
    Ok(config_dir.join(CONFIG_FILE_NAME))
}

/// Write the embedded default configuration to `path` unless a file
/// already exists there
pub fn seed_default_config(path: &Path) -> Result<(), NetwatchError> {
    if path.exists() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            NetwatchError::Config(ConfigError::IoError {
                message: format!("Failed to create config directory: {}", e),
            })
        })?;
    }

    std::fs::write(path, DEFAULT_CONFIG).map_err(|_| {
        NetwatchError::Config(ConfigError::SaveFailed {
            path: path.to_string_lossy().to_string(),
        })
    })?;

    tracing::info!("Seeded default configuration at {:?}", path);
    Ok(())
}

/// Load the monitor configuration from the default TOML file,
/// seeding the default file first if none exists
pub fn load_config() -> Result<MonitorConfig, NetwatchError> {
    let config_path = get_config_path()?;
    seed_default_config(&config_path)?;
    load_config_from_path(&config_path)
}

/// Load the monitor configuration from a specific TOML file
pub fn load_config_from_path<P: AsRef<Path>>(path: P) -> Result<MonitorConfig, NetwatchError> {
    let contents = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => NetwatchError::Config(ConfigError::LoadFailed {
            path: path.as_ref().to_string_lossy().to_string(),
        }),
        _ => NetwatchError::Config(ConfigError::IoError {
            message: format!("Failed to read config file: {}", e),
        }),
    })?;

    let config: MonitorConfig = toml::from_str(&contents).map_err(|e| {
        NetwatchError::Config(ConfigError::ValidationError {
            message: format!("Failed to parse config file: {}", e),
        })
    })?;

    config.validate()?;

    Ok(config)
}

/// Save the monitor configuration to a specific TOML file
pub fn save_config_to_path<P: AsRef<Path>>(
    config: &MonitorConfig,
    path: P,
) -> Result<(), NetwatchError> {
    config.validate()?;

    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            NetwatchError::Config(ConfigError::IoError {
                message: format!("Failed to create config directory: {}", e),
            })
        })?;
    }

    let contents = toml::to_string_pretty(config)?;

    std::fs::write(&path, contents).map_err(|_| {
        NetwatchError::Config(ConfigError::SaveFailed {
            path: path.as_ref().to_string_lossy().to_string(),
        })
    })?;

    Ok(())
}
