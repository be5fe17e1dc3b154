//! Dashboard use case: the actions a front-end exposes to the user.
//!
//! This module provides the `DashboardUseCase` which orchestrates
//! `SessionStore`, `UploadIngestor`, `PipelineRunner` and `ModeController`
//! so a front-end only deals with one object.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use insight_core::dataset::{DatasetSummary, DerivedDataset};
use insight_core::mode::ViewMode;
use insight_core::session::{ProcessingStatus, SessionId, SessionRecord};
use insight_core::upload::UploadedDocument;
use insight_core::{InsightError, Result};
use insight_infrastructure::{DataLoader, IngestReport, SessionStore, UploadIngestor};

use crate::mode_controller::ModeController;
use crate::pipeline_runner::{PipelineRunner, RunOutcome};

/// Where an upload goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadMode {
    /// Always start a fresh session
    New,
    /// Add to the current session, creating one if there is none
    #[default]
    Append,
}

#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub session_id: SessionId,
    /// True when the upload created the session
    pub created: bool,
    pub report: IngestReport,
}

/// Display-facing facts about the active session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOverview {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    pub file_count: usize,
    pub insight_count: usize,
    pub last_processed_at: Option<DateTime<Utc>>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub status: ProcessingStatus,
}

impl From<&SessionRecord> for SessionOverview {
    fn from(record: &SessionRecord) -> Self {
        Self {
            id: record.id.clone(),
            created_at: record.created_at,
            file_count: record.file_count(),
            insight_count: record.insight_count,
            last_processed_at: record.last_processed_at,
            last_updated_at: record.last_updated_at,
            status: record.processing_status(),
        }
    }
}

/// Everything the header of the dashboard shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub mode: ViewMode,
    pub data_path: PathBuf,
    pub summary: DatasetSummary,
    pub session: Option<SessionOverview>,
}

/// Use case for the dashboard actions.
///
/// # Responsibilities
///
/// - Routing uploads into a new or the current session
/// - Processing the current session
/// - Switching, resetting and clearing the view
/// - Loading the active dataset and its headline metrics
pub struct DashboardUseCase {
    store: Arc<SessionStore>,
    ingestor: UploadIngestor,
    runner: PipelineRunner,
    modes: ModeController,
    loader: DataLoader,
}

impl DashboardUseCase {
    pub fn new(
        store: Arc<SessionStore>,
        ingestor: UploadIngestor,
        runner: PipelineRunner,
        modes: ModeController,
    ) -> Self {
        Self {
            store,
            ingestor,
            runner,
            modes,
            loader: DataLoader::new(),
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn modes(&self) -> &ModeController {
        &self.modes
    }

    pub fn runner(&self) -> &PipelineRunner {
        &self.runner
    }

    /// Uploads files and switches the view to the receiving session.
    ///
    /// # Errors
    ///
    /// Returns `InsightError::Filesystem` if a new session cannot be created.
    pub async fn upload(&self, files: Vec<UploadedDocument>, mode: UploadMode) -> Result<UploadOutcome> {
        let current = match mode {
            UploadMode::New => None,
            UploadMode::Append => self.modes.active_session().await.map(|record| record.id),
        };

        let (session_id, created) = match current {
            Some(id) => (id, false),
            None => (self.store.create_session().await?, true),
        };

        let report = self.ingestor.ingest(&session_id, files).await?;
        self.modes.set_session(&session_id).await;

        Ok(UploadOutcome {
            session_id,
            created,
            report,
        })
    }

    /// Processes the current session.
    ///
    /// # Errors
    ///
    /// Returns `InsightError::NotFound` when no session is active, otherwise
    /// whatever [`PipelineRunner::run`] reports.
    pub async fn process_current(&self) -> Result<RunOutcome> {
        let state = self.modes.current().await;
        let id = state
            .active_session_id()
            .ok_or_else(|| InsightError::not_found("session", "<current>"))?;
        self.runner.run(id).await
    }

    /// Switches the view to a session, falling back to default if unknown.
    pub async fn switch_to_session(&self, id: &SessionId) -> ViewMode {
        self.modes.set_session(id).await
    }

    pub async fn reset_to_default(&self) {
        self.modes.set_default().await;
    }

    /// Removes a session; resets the view if it was the current one.
    pub async fn clear_session(&self, id: &SessionId) {
        let was_current = self.modes.current().await.active_session_id() == Some(id);
        self.store.remove_session(id).await;
        if was_current {
            self.modes.set_default().await;
        }
    }

    /// Removes the current session, if any, and returns its id.
    pub async fn clear_current(&self) -> Option<SessionId> {
        let id = self.modes.current().await.active_session_id().cloned()?;
        self.clear_session(&id).await;
        Some(id)
    }

    pub async fn sessions(&self) -> Vec<SessionRecord> {
        self.store.list_sessions().await
    }

    /// Processing status of the current session; `None` when none is active.
    pub async fn processing_status(&self) -> Option<ProcessingStatus> {
        self.modes
            .active_session()
            .await
            .map(|record| record.processing_status())
    }

    /// Loads the dataset the current mode points at.
    pub async fn load_active(&self) -> DerivedDataset {
        let path = self.modes.resolve_data_path().await;
        self.loader.load(&path)
    }

    pub async fn overview(&self) -> Overview {
        let data_path = self.modes.resolve_data_path().await;
        let summary = self.loader.load(&data_path).summary();
        let session = self
            .modes
            .active_session()
            .await
            .map(|record| SessionOverview::from(&record));

        Overview {
            mode: self.modes.current().await.mode,
            data_path,
            summary,
            session,
        }
    }
}
