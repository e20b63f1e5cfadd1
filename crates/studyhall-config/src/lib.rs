//! Settings parsing and validation for studyhall
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Group and auth tuning knobs
//! - Validation with clear error messages

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("groups.max_size must be at least 2, got {0}")]
    GroupTooSmall(u32),

    #[error("auth.rate_limit_attempts must be at least 1")]
    NoAttemptsAllowed,

    #[error("auth.rate_limit_window_secs must be at least 1")]
    EmptyRateWindow,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    config_version: u32,

    data_dir: Option<PathBuf>,

    #[serde(default)]
    groups: RawGroups,

    #[serde(default)]
    auth: RawAuth,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawGroups {
    max_size: u32,
}

impl Default for RawGroups {
    fn default() -> Self {
        Self { max_size: 10 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawAuth {
    rate_limit_attempts: usize,
    rate_limit_window_secs: u64,
}

impl Default for RawAuth {
    fn default() -> Self {
        Self {
            rate_limit_attempts: 5,
            rate_limit_window_secs: 60,
        }
    }
}

/// Validated settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Data directory override; `None` means the default XDG location
    pub data_dir: Option<PathBuf>,

    /// Capacity assigned to newly created groups
    pub max_group_size: u32,

    /// Credential attempts allowed per key inside the window
    pub rate_limit_attempts: usize,

    /// Sliding rate-limit window
    pub rate_limit_window: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        let groups = RawGroups::default();
        let auth = RawAuth::default();
        Self {
            data_dir: None,
            max_group_size: groups.max_size,
            rate_limit_attempts: auth.rate_limit_attempts,
            rate_limit_window: Duration::from_secs(auth.rate_limit_window_secs),
        }
    }
}

/// Load and validate settings from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load settings, falling back to defaults if the file does not exist
pub fn load_or_default(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    if path.as_ref().exists() {
        load_config(path)
    } else {
        Ok(Settings::default())
    }
}

/// Parse and validate settings from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Settings> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(Settings {
        data_dir: raw.data_dir,
        max_group_size: raw.groups.max_size,
        rate_limit_attempts: raw.auth.rate_limit_attempts,
        rate_limit_window: Duration::from_secs(raw.auth.rate_limit_window_secs),
    })
}

fn validate_config(raw: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if raw.groups.max_size < 2 {
        errors.push(ValidationError::GroupTooSmall(raw.groups.max_size));
    }
    if raw.auth.rate_limit_attempts == 0 {
        errors.push(ValidationError::NoAttemptsAllowed);
    }
    if raw.auth.rate_limit_window_secs == 0 {
        errors.push(ValidationError::EmptyRateWindow);
    }

    errors
}
