//! Error types for Chrono-Insight.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// A shared error type for every Chrono-Insight crate.
///
/// Variants mirror the failure classes of the session pipeline: unknown
/// sessions, filesystem failures, malformed uploads, an unreachable analyzer
/// and an analyzer run that produced nothing.
#[derive(Error, Debug, Clone)]
pub enum InsightError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound { entity_type: String, id: String },

    /// Directory creation or file write failure
    #[error("Filesystem error at '{}': {message}", path.display())]
    Filesystem { path: PathBuf, message: String },

    /// Malformed upload payload (scoped to a single file)
    #[error("Failed to decode upload '{file}': {message}")]
    Decode { file: String, message: String },

    /// The external analyzer is not installed or not reachable
    #[error("Analyzer unavailable: {0}")]
    Unavailable(String),

    /// The analyzer ran but extracted zero records
    #[error("No insights extracted from uploaded documents")]
    EmptyResult,

    /// The analyzer call timed out or was cancelled by the caller
    #[error("Analyzer run cancelled: {0}")]
    Cancelled(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl InsightError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Creates a NotFound error for a session id
    pub fn session_not_found(id: impl Into<String>) -> Self {
        Self::not_found("session", id)
    }

    /// Creates a Filesystem error bound to a path
    pub fn filesystem(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Filesystem {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Creates a Decode error for one uploaded file
    pub fn decode(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Creates an Unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a Filesystem error
    pub fn is_filesystem(&self) -> bool {
        matches!(self, Self::Filesystem { .. })
    }

    /// Check if this is a Decode error
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Check if the analyzer could not be reached
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// Check if the analyzer returned zero records
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::EmptyResult)
    }

    /// Check if the run was cancelled or timed out
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for InsightError {
    fn from(err: std::io::Error) -> Self {
        Self::Filesystem {
            path: PathBuf::new(),
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for InsightError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for InsightError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for InsightError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for InsightError {
    fn from(err: csv::Error) -> Self {
        Self::Serialization {
            format: "CSV".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, InsightError>`.
pub type Result<T> = std::result::Result<T, InsightError>;
