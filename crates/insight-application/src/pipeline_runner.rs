//! Runs the analyzer over a session's uploads and commits the derived tables.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use insight_core::analyzer::DocumentAnalyzer;
use insight_core::dataset::TableKind;
use insight_core::session::SessionId;
use insight_core::{InsightError, Result};
use insight_infrastructure::{DerivedTables, SessionStore};

/// Result of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub session_id: SessionId,
    pub insight_count: usize,
    pub artifacts: BTreeSet<TableKind>,
    /// True when uploads arrived while the analyzer was running
    pub still_dirty: bool,
}

/// Drives one analysis run per call.
///
/// # Run sequence
///
/// 1. Check the analyzer is available
/// 2. Take the session's pipeline gate and note its upload generation
/// 3. Call the analyzer (bounded by the timeout and the cancel token)
/// 4. Reduce and stage all five tables off the runtime threads
/// 5. Under the record lock: rename the staged tables and update metadata
///
/// A failure at any step before 5 leaves the record and the derived
/// directory exactly as they were.
pub struct PipelineRunner {
    store: Arc<SessionStore>,
    analyzer: Arc<dyn DocumentAnalyzer>,
    timeout: Duration,
}

impl PipelineRunner {
    pub fn new(store: Arc<SessionStore>, analyzer: Arc<dyn DocumentAnalyzer>, timeout: Duration) -> Self {
        Self {
            store,
            analyzer,
            timeout,
        }
    }

    pub fn analyzer_name(&self) -> String {
        self.analyzer.name()
    }

    /// Processes a session's uploads.
    ///
    /// # Errors
    ///
    /// - `InsightError::Unavailable` if the analyzer cannot run
    /// - `InsightError::NotFound` if the session is unknown or removed mid-run
    /// - `InsightError::EmptyResult` if the analyzer extracted nothing
    /// - `InsightError::Cancelled` on timeout
    /// - `InsightError::Filesystem` if the tables cannot be written
    pub async fn run(&self, session_id: &SessionId) -> Result<RunOutcome> {
        self.run_with_cancel(session_id, CancellationToken::new()).await
    }

    /// Like [`run`](Self::run), but aborts the analyzer call when `cancel`
    /// fires.
    pub async fn run_with_cancel(
        &self,
        session_id: &SessionId,
        cancel: CancellationToken,
    ) -> Result<RunOutcome> {
        if let Err(e) = self.analyzer.is_available().await {
            tracing::warn!("Analyzer {} unavailable: {}", self.analyzer.name(), e);
            return Err(e);
        }

        let slot = self.store.slot(session_id).await?;
        let _run = slot.lock_pipeline().await;
        if slot.is_removed() {
            return Err(InsightError::session_not_found(session_id.as_str()));
        }
        let snapshot = slot.snapshot().await;
        let observed_generation = snapshot.upload_generation;

        tracing::info!(
            "Processing {} file(s) for session {} with {}",
            snapshot.file_count(),
            session_id,
            self.analyzer.name()
        );

        let analysis = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                Err(InsightError::Cancelled("run cancelled by caller".to_string()))
            }
            result = tokio::time::timeout(self.timeout, self.analyzer.analyze(&snapshot.upload_dir)) => {
                result.unwrap_or_else(|_| {
                    Err(InsightError::Cancelled(format!(
                        "analyzer exceeded {:?} timeout",
                        self.timeout
                    )))
                })
            }
        };
        let records = analysis.inspect_err(|e| {
            tracing::error!("Run aborted for session {}: {}", session_id, e);
        })?;

        if records.is_empty() {
            tracing::warn!("Analyzer returned no insights for session {}", session_id);
            return Err(InsightError::EmptyResult);
        }

        let insight_count = records.len();
        let dataset = self.analyzer.to_tables(&records);
        let derived_dir = snapshot.derived_dir.clone();
        let staged = tokio::task::spawn_blocking(move || DerivedTables::new(derived_dir).stage(&dataset))
            .await
            .map_err(|e| InsightError::internal(format!("Table staging task failed: {}", e)))?
            .inspect_err(|e| tracing::error!("Run aborted for session {}: {}", session_id, e))?;

        let (artifacts, still_dirty) = slot
            .update(move |record| -> Result<(BTreeSet<TableKind>, bool)> {
                let artifacts = staged.commit()?;
                record.commit_processing(insight_count, artifacts.clone(), observed_generation, Utc::now());
                Ok((artifacts, record.dirty))
            })
            .await??;

        tracing::info!(
            "Session {} processed: {} insights{}",
            session_id,
            insight_count,
            if still_dirty { " (new uploads pending)" } else { "" }
        );

        Ok(RunOutcome {
            session_id: session_id.clone(),
            insight_count,
            artifacts,
            still_dirty,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use insight_core::analyzer::InsightRecord;
    use std::path::Path;
    use tempfile::TempDir;

    struct SlowAnalyzer;

    #[async_trait]
    impl DocumentAnalyzer for SlowAnalyzer {
        fn name(&self) -> String {
            "slow".to_string()
        }

        async fn is_available(&self) -> Result<()> {
            Ok(())
        }

        async fn analyze(&self, _upload_dir: &Path) -> Result<Vec<InsightRecord>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }
    }

    async fn setup(timeout: Duration) -> (TempDir, Arc<SessionStore>, PipelineRunner, SessionId) {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(SessionStore::new(temp_dir.path()));
        let runner = PipelineRunner::new(store.clone(), Arc::new(SlowAnalyzer), timeout);
        let id = store.create_session().await.unwrap();
        (temp_dir, store, runner, id)
    }

    #[tokio::test]
    async fn test_timeout_is_reported_as_cancelled() {
        let (_tmp, store, runner, id) = setup(Duration::from_millis(20)).await;

        let err = runner.run(&id).await.unwrap_err();

        assert!(err.is_cancelled());
        assert!(err.to_string().contains("20ms"), "{}", err);
        let record = store.get_session(&id).await.unwrap();
        assert!(record.last_processed_at.is_none());
    }

    #[tokio::test]
    async fn test_cancel_token_aborts_run() {
        let (_tmp, _store, runner, id) = setup(Duration::from_secs(60)).await;
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = runner.run_with_cancel(&id, cancel).await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
