//! Reader preferences kept between runs

use crate::persistence::TomlFile;
use crate::validation::{ValidationError, Validator};
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Reader state persisted next to the configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Preferences {
    /// Unlocks premium deleted scenes
    pub is_premium_user: bool,

    /// Book the reader is on, starting at 1
    pub current_book: u32,

    /// Chapter id the reader is on, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_chapter: Option<String>,
}

impl Preferences {
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::at_least(self.current_book, 1, "preferences.current_book"),
            match &self.current_chapter {
                Some(chapter) => Validator::not_empty(chapter, "preferences.current_chapter"),
                None => Ok(()),
            },
        ])
    }

    /// Returns true if the reader may see a scene with this premium flag
    pub fn can_view(&self, is_premium: bool) -> bool {
        !is_premium || self.is_premium_user
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            is_premium_user: false,
            current_book: 1,
            current_chapter: None,
        }
    }
}

/// Loads and saves [`Preferences`] in `preferences.toml`
#[derive(Debug, Clone)]
pub struct PreferencesStore {
    file: TomlFile,
}

impl PreferencesStore {
    pub const FILE_NAME: &'static str = "preferences.toml";

    /// Store for `preferences.toml` inside `dir`
    pub fn in_directory(dir: &Path) -> Self {
        Self {
            file: TomlFile::new(dir.join(Self::FILE_NAME)),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }

    /// Loads the stored preferences, or defaults if none are stored
    pub fn load(&self) -> ConfigResult<Preferences> {
        let prefs: Preferences = self.file.read()?.unwrap_or_default();

        if let Err(errors) = prefs.validate() {
            log::warn!(
                "Stored preferences are invalid: {}",
                ConfigError::from_validation(&errors)
            );
        }

        Ok(prefs)
    }

    /// Validates and stores `prefs`
    pub fn save(&self, prefs: &Preferences) -> ConfigResult<()> {
        prefs
            .validate()
            .map_err(|errors| ConfigError::from_validation(&errors))?;
        self.file.write(prefs)
    }

    /// Loads, applies `update_fn`, and saves. Returns the saved preferences.
    pub fn update<F>(&self, update_fn: F) -> ConfigResult<Preferences>
    where
        F: FnOnce(&mut Preferences),
    {
        let mut prefs = self.load()?;
        update_fn(&mut prefs);
        self.save(&prefs)?;
        Ok(prefs)
    }

    /// Stores the default preferences
    pub fn reset(&self) -> ConfigResult<()> {
        self.save(&Preferences::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_store() -> (TempDir, PreferencesStore) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = PreferencesStore::in_directory(temp_dir.path());
        (temp_dir, store)
    }

    #[test]
    fn test_defaults_when_missing() {
        let (_temp_dir, store) = setup_store();
        let prefs = store.load().unwrap();
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.current_book, 1);
        assert!(!prefs.is_premium_user);
    }

    #[test]
    fn test_update_persists() {
        let (_temp_dir, store) = setup_store();

        let saved = store
            .update(|prefs| {
                prefs.is_premium_user = true;
                prefs.current_book = 2;
                prefs.current_chapter = Some("b2c3".to_string());
            })
            .unwrap();

        assert_eq!(store.load().unwrap(), saved);
        assert!(store.path().ends_with("preferences.toml"));
    }

    #[test]
    fn test_book_zero_rejected() {
        let (_temp_dir, store) = setup_store();
        let result = store.update(|prefs| prefs.current_book = 0);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
        assert!(store.load().unwrap().current_book >= 1);
    }

    #[test]
    fn test_reset() {
        let (_temp_dir, store) = setup_store();
        store.update(|prefs| prefs.is_premium_user = true).unwrap();
        store.reset().unwrap();
        assert_eq!(store.load().unwrap(), Preferences::default());
    }

    #[test]
    fn test_can_view() {
        let mut prefs = Preferences::default();
        assert!(prefs.can_view(false));
        assert!(!prefs.can_view(true));

        prefs.is_premium_user = true;
        assert!(prefs.can_view(true));
    }

    #[test]
    fn test_empty_chapter_is_invalid() {
        let prefs = Preferences {
            current_chapter: Some(String::new()),
            ..Preferences::default()
        };
        assert!(prefs.validate().is_err());
    }
}
