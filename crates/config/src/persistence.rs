//! Atomic TOML file persistence
//!
//! Writes go to a temporary file in the target directory and are renamed
//! into place, so a crash never leaves a half-written file. The previous
//! file is copied to `<name>.backup` before it is replaced.

use crate::{ConfigError, ConfigResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// One TOML file on disk
#[derive(Debug, Clone)]
pub(crate) struct TomlFile {
    path: PathBuf,
}

impl TomlFile {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads and parses the file. Returns `None` if it does not exist.
    ///
    /// An empty or whitespace-only file is an error rather than defaults.
    pub(crate) fn read<T: DeserializeOwned>(&self) -> ConfigResult<Option<T>> {
        if !self.path.exists() {
            log::debug!("{} not found", self.path.display());
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| ConfigError::ReadError {
            path: self.path.clone(),
            source: e,
        })?;

        if contents.trim().is_empty() {
            return Err(ConfigError::ReadError {
                path: self.path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "file is empty or contains only whitespace",
                ),
            });
        }

        toml::from_str(&contents)
            .map(Some)
            .map_err(|e| ConfigError::ParseError {
                path: self.path.clone(),
                source: e,
            })
    }

    /// Serializes `value` and replaces the file atomically
    pub(crate) fn write<T: Serialize>(&self, value: &T) -> ConfigResult<()> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| ConfigError::PathResolutionError {
                reason: format!("{} has no parent directory", self.path.display()),
            })?;

        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| ConfigError::DirectoryCreationError {
                path: dir.to_path_buf(),
                source: e,
            })?;
            log::info!("Created directory {}", dir.display());
        }

        if self.path.exists() {
            self.backup()?;
        }

        let contents = toml::to_string_pretty(value)?;

        let mut temp_file = NamedTempFile::new_in(dir)?;
        temp_file.write_all(contents.as_bytes())?;
        temp_file.flush()?;
        temp_file
            .persist(&self.path)
            .map_err(|e| ConfigError::WriteError {
                path: self.path.clone(),
                source: e.error,
            })?;

        log::info!("Saved {}", self.path.display());
        Ok(())
    }

    /// Path of the copy kept from the previous write
    pub(crate) fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".backup");
        PathBuf::from(name)
    }

    fn backup(&self) -> ConfigResult<()> {
        let backup_path = self.backup_path();
        fs::copy(&self.path, &backup_path).map_err(|e| ConfigError::BackupError {
            path: self.path.clone(),
            source: e,
        })?;
        log::debug!("Backed up {} to {}", self.path.display(), backup_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    fn sample() -> Sample {
        Sample {
            name: "chronicle".to_string(),
            count: 3,
        }
    }

    fn setup() -> (TempDir, TomlFile) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file = TomlFile::new(temp_dir.path().join("settings.toml"));
        (temp_dir, file)
    }

    #[test]
    fn test_missing_file_reads_as_none() {
        let (_temp_dir, file) = setup();
        assert!(file.read::<Sample>().unwrap().is_none());
    }

    #[test]
    fn test_write_then_read() {
        let (_temp_dir, file) = setup();
        file.write(&sample()).unwrap();
        assert_eq!(file.read::<Sample>().unwrap(), Some(sample()));
    }

    #[test]
    fn test_write_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = TomlFile::new(temp_dir.path().join("nested").join("settings.toml"));
        file.write(&sample()).unwrap();
        assert!(file.exists());
    }

    #[test]
    fn test_backup_on_overwrite() {
        let (_temp_dir, file) = setup();
        file.write(&sample()).unwrap();
        assert!(!file.backup_path().exists());

        file.write(&Sample {
            name: "second".to_string(),
            count: 4,
        })
        .unwrap();

        assert!(file.backup_path().ends_with("settings.toml.backup"));
        let backup = fs::read_to_string(file.backup_path()).unwrap();
        assert!(backup.contains("chronicle"));
    }

    #[test]
    fn test_empty_file_is_error() {
        let (_temp_dir, file) = setup();
        fs::write(file.path(), "  \n").unwrap();
        assert!(matches!(
            file.read::<Sample>(),
            Err(ConfigError::ReadError { .. })
        ));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let (_temp_dir, file) = setup();
        fs::write(file.path(), "this is not valid TOML {{{").unwrap();
        assert!(matches!(
            file.read::<Sample>(),
            Err(ConfigError::ParseError { .. })
        ));
    }
}
