//! Platform path resolution for the application's config and data.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/chrono-insight/        # Config directory
//! └── config.toml                  # Application configuration
//!
//! ~/.local/share/chrono-insight/   # Data directory (default base_dir)
//! ├── default_data/                # Shared corpus tables
//! └── user_sessions/               # One session_<id>/ per upload session
//! ```

use std::path::PathBuf;

/// Application directory name under the platform config/data roots.
pub const APP_DIR_NAME: &str = "chrono-insight";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
    /// Platform data directory could not be determined.
    DataDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
            PathError::DataDirNotFound => write!(f, "Cannot find data directory"),
        }
    }
}

impl std::error::Error for PathError {}

pub struct InsightPaths;

impl InsightPaths {
    /// Returns the application config directory (e.g. `~/.config/chrono-insight/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the application data directory, used as the fallback base
    /// for the corpus and session roots.
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::DataDirNotFound)
    }
}
