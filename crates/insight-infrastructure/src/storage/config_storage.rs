//! Config file storage for `AppConfig`.
//!
//! Loads and saves the TOML config with the same temp-file-then-rename
//! discipline as the table writers, plus an exclusive lock around updates.

use std::fs;
use std::path::{Path, PathBuf};

use insight_core::config::AppConfig;

use super::atomic_file::{FileLock, StorageError, write_atomic};

/// A config file handle.
///
/// Provides:
/// - **Atomicity**: Saves are all-or-nothing via tmp file + atomic rename
/// - **Consistency**: TOML syntax validation on load/save
/// - **Isolation**: File locking prevents concurrent read-modify-write races
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    /// Creates a new config storage handle.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the config file (usually `config.toml`)
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the config file.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(AppConfig))`: Successfully loaded
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<AppConfig>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(toml::from_str(&content)?))
    }

    /// Loads the config file, falling back to defaults when absent.
    pub fn load_or_default(&self) -> Result<AppConfig, StorageError> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Saves the config atomically.
    pub fn save(&self, config: &AppConfig) -> Result<(), StorageError> {
        let toml_string = toml::to_string_pretty(config)?;
        write_atomic(&self.path, toml_string.as_bytes())
    }

    /// Updates the config under an exclusive lock.
    ///
    /// Reads the current config (or defaults), applies `f`, and writes the
    /// result back atomically. The lock is held for the whole cycle.
    pub fn update<F>(&self, f: F) -> Result<AppConfig, StorageError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut config = self.load_or_default()?;
        f(&mut config);
        self.save(&config)?;

        Ok(config)
    }
}
