use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use super::status::ProcessingStatus;
use crate::dataset::TableKind;

/// Length of a generated session identifier (hex characters).
pub const SESSION_ID_LEN: usize = 8;

/// Opaque identifier of one upload workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Draws a fresh short identifier from a v4 UUID.
    ///
    /// Uniqueness is only guaranteed by the caller re-drawing on collision
    /// against its registry.
    pub fn generate() -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        Self(simple[..SESSION_ID_LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory name used for this session under the sessions root.
    pub fn dir_name(&self) -> String {
        format!("session_{}", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One upload workspace and everything known about it.
///
/// Records are owned by the session store; every other component works on
/// cloned snapshots and goes through the store to mutate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unique identifier of the session
    pub id: SessionId,
    /// Timestamp when the session was created
    pub created_at: DateTime<Utc>,
    /// Root directory holding both workspace directories
    pub session_dir: PathBuf,
    /// Directory receiving decoded uploads
    pub upload_dir: PathBuf,
    /// Directory receiving the five derived tables
    pub derived_dir: PathBuf,
    /// Append-only log of accepted upload names (duplicates permitted)
    pub uploaded_files: Vec<String>,
    /// Derived tables present after the last successful run
    pub processed_artifacts: BTreeSet<TableKind>,
    /// Number of insight records from the last successful run
    pub insight_count: usize,
    /// When the last successful run committed
    pub last_processed_at: Option<DateTime<Utc>>,
    /// When an ingestion last accepted a file
    pub last_updated_at: Option<DateTime<Utc>>,
    /// True whenever uploads changed since the last successful run
    pub dirty: bool,
    /// Bumped by every accepting ingestion; lets a run detect uploads that
    /// landed while the analyzer was working
    pub upload_generation: u64,
}

impl SessionRecord {
    /// Creates an empty record for freshly created workspace directories.
    pub fn new(id: SessionId, session_dir: PathBuf, upload_dir: PathBuf, derived_dir: PathBuf) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            session_dir,
            upload_dir,
            derived_dir,
            uploaded_files: Vec::new(),
            processed_artifacts: BTreeSet::new(),
            insight_count: 0,
            last_processed_at: None,
            last_updated_at: None,
            dirty: false,
            upload_generation: 0,
        }
    }

    pub fn file_count(&self) -> usize {
        self.uploaded_files.len()
    }

    /// Records a batch of accepted uploads.
    ///
    /// No-op for an empty batch so a fully rejected upload leaves the
    /// session clean.
    pub fn record_uploads<I>(&mut self, names: I, at: DateTime<Utc>)
    where
        I: IntoIterator<Item = String>,
    {
        let before = self.uploaded_files.len();
        self.uploaded_files.extend(names);
        if self.uploaded_files.len() > before {
            self.dirty = true;
            self.upload_generation += 1;
            self.last_updated_at = Some(at);
        }
    }

    /// Commits the outcome of a successful pipeline run.
    ///
    /// `observed_generation` is the upload generation seen when the run
    /// started; if uploads arrived since, the session stays dirty.
    pub fn commit_processing(
        &mut self,
        insight_count: usize,
        artifacts: BTreeSet<TableKind>,
        observed_generation: u64,
        at: DateTime<Utc>,
    ) {
        self.insight_count = insight_count;
        self.processed_artifacts = artifacts;
        self.last_processed_at = Some(at);
        self.dirty = self.upload_generation != observed_generation;
    }

    /// Human-facing processing state of this session.
    pub fn processing_status(&self) -> ProcessingStatus {
        let files = self.file_count();
        if self.dirty {
            ProcessingStatus::ReadyToProcess { files }
        } else if self.insight_count > 0 {
            ProcessingStatus::Processed {
                files,
                insights: self.insight_count,
            }
        } else {
            ProcessingStatus::Uploaded { files }
        }
    }
}
