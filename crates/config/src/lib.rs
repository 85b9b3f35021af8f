//! Chronicle configuration
//!
//! Settings live in `config.toml` and reader preferences in
//! `preferences.toml`, both in the platform config directory. Each settings
//! section implements [`ConfigSection`] so it can validate and merge itself.
//!
//! - Missing files load as defaults; corrupted files are errors
//! - Writes are atomic and keep a `.backup` of the previous file
//! - `CHRONICLE_*` environment variables override file values
//!
//! # Example
//!
//! ```rust,no_run
//! use chronicle_config::{Config, ConfigManager};
//!
//! let manager = ConfigManager::new().expect("Failed to initialize config");
//! let config = manager.load_with_env_overrides().unwrap_or_else(|e| {
//!     eprintln!("Config error: {}, using defaults", e);
//!     Config::default()
//! });
//!
//! println!("Content location: {}", config.content.location);
//! ```

mod error;
mod manager;
mod persistence;
mod preferences;
mod validation;

pub mod app_config;
pub mod content_config;

pub use app_config::{AppConfig, LogLevel};
pub use content_config::ContentConfig;
pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::{
    ConfigManager, ENV_APP_LOG_LEVEL, ENV_CONTENT_LOCATION, ENV_CONTENT_TIMEOUT_SECS,
};
pub use preferences::{Preferences, PreferencesStore};
pub use validation::{ConfigSection, Validator};

use serde::{Deserialize, Serialize};

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    pub app: AppConfig,

    pub content: ContentConfig,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates every section, returning all errors found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.content.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Takes every section from `other`
    pub fn merge(&mut self, other: Config) {
        self.app.merge(other.app);
        self.content.merge(other.content);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            content: ContentConfig::default(),
        }
    }
}
