//! Decodes uploaded documents into a session's upload directory.

use std::sync::Arc;

use chrono::Utc;

use insight_core::session::SessionId;
use insight_core::upload::{UploadedDocument, has_allowed_extension, is_safe_file_name};
use insight_core::{InsightError, Result};

use crate::session_store::SessionStore;
use crate::storage::write_atomic_async;

/// A file that passed the name filter but could not be stored.
#[derive(Debug, Clone)]
pub struct FailedUpload {
    pub name: String,
    pub error: InsightError,
}

/// Outcome of one ingestion batch.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Names written to the workspace, in submission order
    pub accepted: Vec<String>,
    /// Names refused by the extension or file-name filter
    pub rejected: Vec<String>,
    /// Names whose payload failed to decode or write
    pub failed: Vec<FailedUpload>,
}

impl IngestReport {
    pub fn has_accepted(&self) -> bool {
        !self.accepted.is_empty()
    }
}

/// Writes uploads into session workspaces and records them.
pub struct UploadIngestor {
    store: Arc<SessionStore>,
    allowed_extensions: Vec<String>,
}

impl UploadIngestor {
    pub fn new(store: Arc<SessionStore>, allowed_extensions: Vec<String>) -> Self {
        Self {
            store,
            allowed_extensions,
        }
    }

    /// Ingests a batch of files into a session.
    ///
    /// Files with a disallowed extension or an unsafe name are rejected
    /// without error. Each remaining payload is decoded and written over any
    /// file of the same name. A decode or write failure is recorded in the
    /// report and the rest of the batch continues.
    ///
    /// # Errors
    ///
    /// Returns `InsightError::NotFound` if the session does not exist or is
    /// removed before the batch is recorded.
    pub async fn ingest(
        &self,
        session_id: &SessionId,
        files: Vec<UploadedDocument>,
    ) -> Result<IngestReport> {
        let slot = self.store.slot(session_id).await?;
        let _gate = slot.lock_ingest().await;
        if slot.is_removed() {
            return Err(InsightError::session_not_found(session_id.as_str()));
        }
        let upload_dir = slot.snapshot().await.upload_dir;

        let mut report = IngestReport::default();
        for file in files {
            if !has_allowed_extension(&file.name, &self.allowed_extensions)
                || !is_safe_file_name(&file.name)
            {
                tracing::debug!("Rejected upload {} for session {}", file.name, session_id);
                report.rejected.push(file.name);
                continue;
            }

            let bytes = match file.decode() {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!("Skipping upload {}: {}", file.name, e);
                    report.failed.push(FailedUpload {
                        name: file.name,
                        error: e,
                    });
                    continue;
                }
            };

            let target = upload_dir.join(&file.name);
            if let Err(e) = write_atomic_async(&target, &bytes).await {
                let error = e.at(&target);
                tracing::warn!("Skipping upload {}: {}", file.name, error);
                report.failed.push(FailedUpload {
                    name: file.name,
                    error,
                });
                continue;
            }

            tracing::debug!("Saved {} ({} bytes) to {}", file.name, bytes.len(), target.display());
            report.accepted.push(file.name);
        }

        if report.has_accepted() {
            let accepted = report.accepted.clone();
            slot.update(|record| record.record_uploads(accepted, Utc::now()))
                .await?;
        }

        tracing::info!(
            "Ingested {} file(s) into session {} ({} rejected, {} failed)",
            report.accepted.len(),
            session_id,
            report.rejected.len(),
            report.failed.len()
        );
        Ok(report)
    }
}
