//! Processing status shown next to an active session.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a session stands relative to the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProcessingStatus {
    /// Uploads changed since the last successful run.
    ReadyToProcess { files: usize },
    /// The last run succeeded and nothing changed since.
    Processed { files: usize, insights: usize },
    /// Nothing pending and no insights recorded yet.
    Uploaded { files: usize },
}

impl ProcessingStatus {
    pub fn needs_processing(&self) -> bool {
        matches!(self, Self::ReadyToProcess { .. })
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadyToProcess { files } => write!(f, "Ready to process {} PDFs", files),
            Self::Processed { files, insights } => {
                write!(f, "Processed {} PDFs ({} insights)", files, insights)
            }
            Self::Uploaded { files } => write!(f, "{} PDFs uploaded - Ready to process", files),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_strings() {
        assert_eq!(
            ProcessingStatus::ReadyToProcess { files: 2 }.to_string(),
            "Ready to process 2 PDFs"
        );
        assert_eq!(
            ProcessingStatus::Processed { files: 2, insights: 7 }.to_string(),
            "Processed 2 PDFs (7 insights)"
        );
        assert_eq!(
            ProcessingStatus::Uploaded { files: 0 }.to_string(),
            "0 PDFs uploaded - Ready to process"
        );
    }

    #[test]
    fn test_needs_processing() {
        assert!(ProcessingStatus::ReadyToProcess { files: 1 }.needs_processing());
        assert!(!ProcessingStatus::Uploaded { files: 1 }.needs_processing());
    }
}
