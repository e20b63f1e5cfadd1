//! Default paths for studyhall components
//!
//! Paths are user-writable by default (no root required):
//! - Data: `$XDG_DATA_HOME/studyhall` or `~/.local/share/studyhall`
//! - Config: `$XDG_CONFIG_HOME/studyhall/config.toml` or
//!   `~/.config/studyhall/config.toml`

use std::path::PathBuf;

/// Environment variable for overriding the data directory
pub const STUDYHALL_DATA_DIR_ENV: &str = "STUDYHALL_DATA_DIR";

/// Application subdirectory name
const APP_DIR: &str = "studyhall";

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$STUDYHALL_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/studyhall` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/studyhall` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(STUDYHALL_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking STUDYHALL_DATA_DIR.
/// Used for default values where the env var is checked separately.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$XDG_CONFIG_HOME/studyhall/config.toml` (if XDG_CONFIG_HOME is set)
/// 2. `~/.config/studyhall/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join("config.toml");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join("config.toml");
    }

    PathBuf::from("/tmp").join(APP_DIR).join("config.toml")
}
