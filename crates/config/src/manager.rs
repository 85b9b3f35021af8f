//! Configuration manager - main API for settings files

use crate::persistence::TomlFile;
use crate::preferences::PreferencesStore;
use crate::{Config, ConfigError, ConfigResult, LogLevel};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Environment variable overriding `content.location`
pub const ENV_CONTENT_LOCATION: &str = "CHRONICLE_CONTENT_LOCATION";
/// Environment variable overriding `content.request_timeout_secs`
pub const ENV_CONTENT_TIMEOUT_SECS: &str = "CHRONICLE_CONTENT_TIMEOUT_SECS";
/// Environment variable overriding `app.log_level`
pub const ENV_APP_LOG_LEVEL: &str = "CHRONICLE_APP_LOG_LEVEL";

/// Loads, saves and locates the configuration and preference files
///
/// Both files live in one directory:
/// - Linux: `~/.config/chronicle/`
/// - macOS: `~/Library/Application Support/chronicle/`
/// - Windows: `%APPDATA%\chronicle\`
pub struct ConfigManager {
    file: TomlFile,
    config_dir: PathBuf,
}

impl ConfigManager {
    pub const FILE_NAME: &'static str = "config.toml";

    /// Creates a manager for the platform config directory
    pub fn new() -> ConfigResult<Self> {
        Self::with_directory(Self::default_config_dir()?)
    }

    /// Creates a manager for a custom directory
    pub fn with_directory(config_dir: PathBuf) -> ConfigResult<Self> {
        if config_dir.as_os_str().is_empty() {
            return Err(ConfigError::PathResolutionError {
                reason: "config directory must not be empty".to_string(),
            });
        }

        Ok(Self {
            file: TomlFile::new(config_dir.join(Self::FILE_NAME)),
            config_dir,
        })
    }

    fn default_config_dir() -> ConfigResult<PathBuf> {
        ProjectDirs::from("", "", "chronicle")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| ConfigError::PathResolutionError {
                reason: "Could not determine user config directory".to_string(),
            })
    }

    pub fn config_dir(&self) -> &PathBuf {
        &self.config_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }

    /// Store for the reader preferences in the same directory
    pub fn preferences(&self) -> PreferencesStore {
        PreferencesStore::in_directory(&self.config_dir)
    }

    /// Loads the configuration file, or defaults if there is none
    ///
    /// A corrupted file is an error. Invalid values are logged but still
    /// returned so they can be fixed.
    pub fn load(&self) -> ConfigResult<Config> {
        let config = match self.file.read::<Config>()? {
            Some(config) => config,
            None => {
                log::info!(
                    "Config file not found at {}, using defaults",
                    self.file.path().display()
                );
                Config::default()
            }
        };

        if let Err(errors) = config.validate() {
            log::warn!("{}", ConfigError::from_validation(&errors));
        }

        Ok(config)
    }

    /// Loads the configuration, falling back to defaults on any error
    pub fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config: {}, using defaults", e);
                Config::default()
            }
        }
    }

    /// Validates and writes the configuration atomically
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        config
            .validate()
            .map_err(|errors| ConfigError::from_validation(&errors))?;
        self.file.write(config)
    }

    /// Loads, applies `update_fn`, and saves
    pub fn update<F>(&self, update_fn: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        update_fn(&mut config);
        self.save(&config)
    }

    /// Writes a default config file if none exists
    ///
    /// Returns Ok(true) if a file was created.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.file.exists() {
            log::info!(
                "Config file already exists at {}",
                self.file.path().display()
            );
            return Ok(false);
        }

        self.save(&Config::default())?;
        Ok(true)
    }

    /// Overwrites the config file with defaults
    pub fn reset(&self) -> ConfigResult<()> {
        self.save(&Config::default())
    }

    /// Returns every validation error in the stored configuration
    pub fn validate(&self) -> ConfigResult<Vec<String>> {
        let config = self.load()?;

        match config.validate() {
            Ok(()) => Ok(Vec::new()),
            Err(errors) => Ok(errors.iter().map(|e| e.to_string()).collect()),
        }
    }

    /// Loads the configuration and applies `CHRONICLE_*` environment
    /// overrides
    ///
    /// Unparseable override values are ignored with a warning.
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;
        apply_env_overrides(&mut config, |key| std::env::var(key).ok());

        if let Err(errors) = config.validate() {
            log::warn!(
                "Config invalid after environment overrides: {}",
                ConfigError::from_validation(&errors)
            );
        }

        Ok(config)
    }
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(location) = var(ENV_CONTENT_LOCATION) {
        log::debug!("{} overrides content location", ENV_CONTENT_LOCATION);
        config.content.location = location;
    }

    if let Some(timeout) = var(ENV_CONTENT_TIMEOUT_SECS) {
        match timeout.trim().parse::<u64>() {
            Ok(secs) => config.content.request_timeout_secs = secs,
            Err(_) => log::warn!("Ignoring {}={}", ENV_CONTENT_TIMEOUT_SECS, timeout),
        }
    }

    if let Some(level) = var(ENV_APP_LOG_LEVEL) {
        match level.parse::<LogLevel>() {
            Ok(level) => config.app.log_level = level,
            Err(e) => log::warn!("Ignoring {}: {}", ENV_APP_LOG_LEVEL, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn setup_test_manager() -> (TempDir, ConfigManager) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())
            .expect("Failed to create manager");
        (temp_dir, manager)
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_empty_directory_rejected() {
        assert!(ConfigManager::with_directory(PathBuf::new()).is_err());
    }

    #[test]
    fn test_load_or_default_with_missing_file() {
        let (_temp_dir, manager) = setup_test_manager();
        assert_eq!(manager.load_or_default(), Config::default());
    }

    #[test]
    fn test_load_or_default_with_corrupt_file() {
        let (_temp_dir, manager) = setup_test_manager();
        std::fs::write(manager.config_path(), "[content\nlocation =").unwrap();
        assert!(manager.load().is_err());
        assert_eq!(manager.load_or_default(), Config::default());
    }

    #[test]
    fn test_update() {
        let (_temp_dir, manager) = setup_test_manager();
        manager
            .update(|config| config.content.location = "https://cdn.example.com".to_string())
            .expect("Should update");

        let loaded = manager.load().expect("Should load");
        assert_eq!(loaded.content.location, "https://cdn.example.com");
    }

    #[test]
    fn test_invalid_config_not_saved() {
        let (_temp_dir, manager) = setup_test_manager();
        let mut config = Config::default();
        config.content.request_timeout_secs = 0;

        let err = manager.save(&config).expect_err("Should not save invalid config");
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(!manager.config_path().exists());
    }

    #[test]
    fn test_initialize_once() {
        let (_temp_dir, manager) = setup_test_manager();
        assert!(manager.initialize().unwrap());
        assert!(manager.config_path().exists());
        assert!(!manager.initialize().unwrap());
    }

    #[test]
    fn test_validate_reports_stored_errors() {
        let (_temp_dir, manager) = setup_test_manager();
        std::fs::write(
            manager.config_path(),
            "[content]\nlocation = \"\"\nmax_redirects = 99\n",
        )
        .unwrap();

        let errors = manager.validate().unwrap();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("content.location"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[
                (ENV_CONTENT_LOCATION, "https://cdn.example.com/content"),
                (ENV_CONTENT_TIMEOUT_SECS, "5"),
                (ENV_APP_LOG_LEVEL, "debug"),
            ]),
        );

        assert_eq!(config.content.location, "https://cdn.example.com/content");
        assert_eq!(config.content.request_timeout_secs, 5);
        assert_eq!(config.app.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_bad_env_overrides_ignored() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[
                (ENV_CONTENT_TIMEOUT_SECS, "soon"),
                (ENV_APP_LOG_LEVEL, "loud"),
            ]),
        );
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_preferences_share_directory() {
        let (temp_dir, manager) = setup_test_manager();
        assert_eq!(
            manager.preferences().path(),
            temp_dir.path().join("preferences.toml")
        );
    }
}
