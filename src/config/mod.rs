// SPDX-License-Identifier: MPL-2.0
//! This module handles the application's configuration, including loading and saving
//! user preferences to a `settings.toml` file.
//!
//! # Configuration Sections
//!
//! - `[server]` - Notification service location and credentials
//! - `[notifications]` - Sound, desktop alerts, polling and paging
//! - `[display]` - Default inbox filters
//!
//! # Path Resolution
//!
//! 1. Use `load_from_path()`/`save_to_path()` with explicit path
//! 2. Pass `--config-dir` on the command line
//! 3. Set `SCHOOLBELL_CONFIG_DIR` environment variable
//! 4. Falls back to platform-specific config directory
//!
//! # Examples
//!
//! ```no_run
//! use schoolbell::config;
//!
//! let (mut config, _warning) = config::load();
//! config.notifications.sound_enabled = Some(false);
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;

pub use defaults::*;

use crate::app::paths;
use crate::error::{Error, Result};
use crate::ui::filter::{KindFilter, ReadFilter};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "settings.toml";

/// Environment variable that supplies the bearer token when the file has none.
pub const ENV_TOKEN: &str = "SCHOOLBELL_TOKEN";

// =============================================================================
// Section Structs
// =============================================================================

/// Notification service settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Base URL of the API, without the `/notifications` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs", skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Notification behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationsConfig {
    /// Play an audible cue when a toast appears.
    #[serde(default = "default_true", skip_serializing_if = "Option::is_none")]
    pub sound_enabled: Option<bool>,

    /// Whether desktop notification permission was granted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop_notifications: Option<bool>,

    /// Seconds between unread-count polls.
    #[serde(
        default = "default_poll_interval_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub poll_interval_secs: Option<u64>,

    /// Number of notifications fetched per page.
    #[serde(default = "default_page_size", skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            sound_enabled: Some(true),
            desktop_notifications: Some(false),
            poll_interval_secs: default_poll_interval_secs(),
            page_size: default_page_size(),
        }
    }
}

/// Inbox display settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DisplayConfig {
    /// Read-state filter applied when the inbox opens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_filter: Option<ReadFilter>,

    /// Type filter applied when the inbox opens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_kind: Option<KindFilter>,
}

// =============================================================================
// Main Config Struct (Sectioned)
// =============================================================================

/// Application configuration with logical sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub notifications: NotificationsConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    /// Bearer token from the file, or from `SCHOOLBELL_TOKEN` when absent.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.server
            .token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var(ENV_TOKEN).ok().filter(|t| !t.is_empty()))
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        let secs = self
            .server
            .timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
            .clamp(MIN_REQUEST_TIMEOUT_SECS, MAX_REQUEST_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        let secs = self
            .notifications
            .poll_interval_secs
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
            .clamp(MIN_POLL_INTERVAL_SECS, MAX_POLL_INTERVAL_SECS);
        Duration::from_secs(secs)
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.notifications
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
    }

    #[must_use]
    pub fn sound_enabled(&self) -> bool {
        self.notifications.sound_enabled.unwrap_or(true)
    }

    #[must_use]
    pub fn desktop_notifications(&self) -> bool {
        self.notifications.desktop_notifications.unwrap_or(false)
    }
}

// =============================================================================
// Default Value Functions
// =============================================================================

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> Option<u64> {
    Some(DEFAULT_REQUEST_TIMEOUT_SECS)
}

fn default_true() -> Option<bool> {
    Some(true)
}

fn default_poll_interval_secs() -> Option<u64> {
    Some(DEFAULT_POLL_INTERVAL_SECS)
}

fn default_page_size() -> Option<u32> {
    Some(DEFAULT_PAGE_SIZE)
}

// =============================================================================
// Config Path Resolution
// =============================================================================

fn get_config_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    paths::get_app_config_dir_with_override(base_dir).map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

// =============================================================================
// Load Functions
// =============================================================================

/// Loads the configuration from the default path.
///
/// Returns a tuple of (config, optional_warning). If loading fails, returns
/// default config with a warning message explaining what went wrong.
pub fn load() -> (Config, Option<String>) {
    load_with_override(None)
}

/// Loads the configuration from a custom directory.
pub fn load_with_override(base_dir: Option<PathBuf>) -> (Config, Option<String>) {
    if let Some(path) = get_config_path_with_override(base_dir) {
        if path.exists() {
            match load_from_path(&path) {
                Ok(config) => return (config, None),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "settings file unreadable, using defaults");
                    return (
                        Config::default(),
                        Some("Settings could not be read, defaults are in use".to_string()),
                    );
                }
            }
        }
    }
    (Config::default(), None)
}

/// Loads configuration from a specific path.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

// =============================================================================
// Save Functions
// =============================================================================

/// Saves the configuration to the default path.
pub fn save(config: &Config) -> Result<()> {
    save_with_override(config, None)
}

/// Saves the configuration to a custom directory.
pub fn save_with_override(config: &Config, base_dir: Option<PathBuf>) -> Result<()> {
    if let Some(path) = get_config_path_with_override(base_dir) {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Saves configuration to a specific path.
pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config).map_err(Error::from)?;
    fs::write(path, content)?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
