use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default name of the shared corpus directory under the base directory.
pub const DEFAULT_DATA_DIR_NAME: &str = "default_data";
/// Default name of the sessions root under the base directory.
pub const SESSIONS_DIR_NAME: &str = "user_sessions";
/// Default analyzer timeout.
pub const DEFAULT_ANALYZER_TIMEOUT_SECS: u64 = 600;

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage locations. Unset entries fall back to the platform data dir;
/// relative entries are taken relative to `base_dir`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct PathsConfig {
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
    #[serde(default)]
    pub default_data_dir: Option<PathBuf>,
    #[serde(default)]
    pub sessions_dir: Option<PathBuf>,
}

/// Fully resolved storage locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub base_dir: PathBuf,
    pub default_data_dir: PathBuf,
    pub sessions_dir: PathBuf,
}

impl PathsConfig {
    pub fn resolve(&self, fallback_base: &Path) -> ResolvedPaths {
        let base_dir = self
            .base_dir
            .clone()
            .unwrap_or_else(|| fallback_base.to_path_buf());
        let under_base = |configured: &Option<PathBuf>, name: &str| match configured {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => base_dir.join(path),
            None => base_dir.join(name),
        };

        ResolvedPaths {
            default_data_dir: under_base(&self.default_data_dir, DEFAULT_DATA_DIR_NAME),
            sessions_dir: under_base(&self.sessions_dir, SESSIONS_DIR_NAME),
            base_dir,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct UploadConfig {
    /// Accepted extensions, without the leading dot
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["pdf".to_string()]
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Analyzer executable; `None` leaves processing unavailable
    #[serde(default)]
    pub command: Option<String>,
    /// Leading arguments; the upload directory is appended after them
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AnalyzerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_ANALYZER_TIMEOUT_SECS
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}
