//! Configuration types and loading.
//!
//! The main entry point is [`BadgeConfig`], the contents of
//! `.colab-badge.yaml`. Every key is optional; command-line flags take
//! precedence over anything set here.

use colab_badge_core::BadgeStyle;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file looked up from the working directory.
pub const CONFIG_FILE_NAME: &str = ".colab-badge.yaml";

/// Environment variable that points at a configuration file directly.
pub const CONFIG_FILE_ENV: &str = "COLAB_BADGE_CONFIG";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// The configuration file contained invalid YAML.
    #[error("failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// The contents of `.colab-badge.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct BadgeConfig {
    /// Default GitHub repository (`owner/name`).
    #[serde(default)]
    pub repository: Option<String>,

    /// Default branch.
    #[serde(default)]
    pub branch: Option<String>,

    /// Badge rendering style.
    #[serde(default)]
    pub style: Option<BadgeStyle>,

    /// Percent-encode the branch name in badge URLs.
    #[serde(default, rename = "encode-branch")]
    pub encode_branch: Option<bool>,

    /// Repository root that notebook paths are made relative to.
    /// Relative values are resolved against the config file's directory.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

impl BadgeConfig {
    /// Returns `root` resolved against `base` (normally the directory that
    /// holds the config file).
    pub fn root_relative_to(&self, base: &Path) -> Option<PathBuf> {
        self.root.as_ref().map(|root| {
            if root.is_absolute() {
                root.clone()
            } else {
                base.join(root)
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Load configuration from `path`.
///
/// A missing or empty file yields the default [`BadgeConfig`].
///
/// # Errors
///
/// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
/// or [`ConfigError::ParseError`] if it contains invalid YAML.
pub fn load_config(path: &Path) -> Result<BadgeConfig> {
    if !path.exists() {
        return Ok(BadgeConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(BadgeConfig::default());
    }

    let config: BadgeConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Find the configuration file for a run started in `start`.
///
/// `COLAB_BADGE_CONFIG` wins if it names an existing file; otherwise the
/// directory tree is walked upward looking for `.colab-badge.yaml`.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var(CONFIG_FILE_ENV) {
        let env_path = PathBuf::from(env_path);
        if env_path.is_file() {
            return Some(env_path);
        }
    }

    let start = start.canonicalize().ok()?;
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
