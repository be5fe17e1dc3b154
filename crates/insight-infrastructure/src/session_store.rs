//! In-memory registry of upload sessions and their workspace directories.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, MutexGuard, RwLock};

use insight_core::session::{SessionId, SessionRecord};
use insight_core::{InsightError, Result};

/// Directory (inside a session directory) receiving decoded uploads.
pub const UPLOAD_DIR_NAME: &str = "uploaded";
/// Directory (inside a session directory) receiving the derived tables.
pub const DERIVED_DIR_NAME: &str = "processed";
/// How many identifiers are drawn before session creation gives up.
const MAX_ID_ATTEMPTS: usize = 16;

/// One registered session: its record plus the gates that serialise writers.
///
/// The record itself sits behind a read/write lock, so a snapshot always
/// reflects either the state before or after a mutation.
pub struct SessionSlot {
    record: RwLock<SessionRecord>,
    ingest_gate: Mutex<()>,
    pipeline_gate: Mutex<()>,
    removed: AtomicBool,
}

impl SessionSlot {
    fn new(record: SessionRecord) -> Self {
        Self {
            record: RwLock::new(record),
            ingest_gate: Mutex::new(()),
            pipeline_gate: Mutex::new(()),
            removed: AtomicBool::new(false),
        }
    }

    /// Returns a consistent copy of the record.
    pub async fn snapshot(&self) -> SessionRecord {
        self.record.read().await.clone()
    }

    /// Applies `f` to the record under the write lock.
    ///
    /// # Errors
    ///
    /// Returns `InsightError::NotFound` if the session was removed; in that
    /// case `f` is not called.
    pub async fn update<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut SessionRecord) -> T,
    {
        let mut record = self.record.write().await;
        if self.is_removed() {
            return Err(InsightError::session_not_found(record.id.as_str()));
        }
        Ok(f(&mut record))
    }

    /// Serialises ingestion into this session.
    pub async fn lock_ingest(&self) -> MutexGuard<'_, ()> {
        self.ingest_gate.lock().await
    }

    /// Serialises pipeline runs over this session.
    pub async fn lock_pipeline(&self) -> MutexGuard<'_, ()> {
        self.pipeline_gate.lock().await
    }

    pub fn is_removed(&self) -> bool {
        self.removed.load(Ordering::Acquire)
    }
}

/// Owns every session record for the lifetime of the process.
///
/// `SessionStore` is responsible for:
/// - Allocating collision-free identifiers
/// - Creating and deleting workspace directories
/// - Handing out per-session slots to the ingestor and the pipeline
pub struct SessionStore {
    root: PathBuf,
    sessions: RwLock<HashMap<SessionId, Arc<SessionSlot>>>,
}

impl SessionStore {
    /// Creates an empty store whose workspaces live under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Root directory holding every `session_<id>` directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates a session with a fresh identifier and empty workspace.
    ///
    /// # Errors
    ///
    /// Returns `InsightError::Filesystem` if a workspace directory cannot be
    /// created. Nothing is registered in that case.
    pub async fn create_session(&self) -> Result<SessionId> {
        self.create_with(SessionId::generate).await
    }

    /// Draws ids until one can be claimed on disk, then registers it.
    ///
    /// The registry lock is only taken for the membership checks and the
    /// final insert. Directory creation runs without it; the exclusive
    /// `create_dir` of the session directory is what claims an id.
    async fn create_with<F>(&self, mut next_id: F) -> Result<SessionId>
    where
        F: FnMut() -> SessionId,
    {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            InsightError::filesystem(&self.root, format!("Failed to create directory: {}", e))
        })?;

        for _ in 0..MAX_ID_ATTEMPTS {
            let id = next_id();
            if self.contains(&id).await {
                tracing::debug!("Session id {} already registered, drawing again", id);
                continue;
            }

            let session_dir = self.root.join(id.dir_name());
            match tokio::fs::create_dir(&session_dir).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    tracing::debug!("Session directory for {} already exists, drawing again", id);
                    continue;
                }
                Err(e) => {
                    return Err(InsightError::filesystem(
                        &session_dir,
                        format!("Failed to create directory: {}", e),
                    ));
                }
            }

            let upload_dir = session_dir.join(UPLOAD_DIR_NAME);
            let derived_dir = session_dir.join(DERIVED_DIR_NAME);
            for dir in [&upload_dir, &derived_dir] {
                if let Err(e) = tokio::fs::create_dir_all(dir).await {
                    let _ = tokio::fs::remove_dir_all(&session_dir).await;
                    return Err(InsightError::filesystem(
                        dir,
                        format!("Failed to create directory: {}", e),
                    ));
                }
            }

            let record = SessionRecord::new(id.clone(), session_dir.clone(), upload_dir, derived_dir);
            let mut sessions = self.sessions.write().await;
            if sessions.contains_key(&id) {
                drop(sessions);
                tracing::debug!("Session id {} registered concurrently, drawing again", id);
                let _ = tokio::fs::remove_dir_all(&session_dir).await;
                continue;
            }
            sessions.insert(id.clone(), Arc::new(SessionSlot::new(record)));
            drop(sessions);

            tracing::info!("Created session {}", id);
            return Ok(id);
        }

        Err(InsightError::internal(format!(
            "Could not allocate an unused session id after {} attempts",
            MAX_ID_ATTEMPTS
        )))
    }

    /// Returns the slot of a registered session.
    ///
    /// # Errors
    ///
    /// Returns `InsightError::NotFound` if `id` is not registered.
    pub async fn slot(&self, id: &SessionId) -> Result<Arc<SessionSlot>> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| InsightError::session_not_found(id.as_str()))
    }

    /// Returns a snapshot of a session record.
    pub async fn get_session(&self, id: &SessionId) -> Result<SessionRecord> {
        Ok(self.slot(id).await?.snapshot().await)
    }

    pub async fn contains(&self, id: &SessionId) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    /// Accepted upload names of a session, in ingestion order.
    pub async fn list_uploaded_files(&self, id: &SessionId) -> Result<Vec<String>> {
        Ok(self.get_session(id).await?.uploaded_files)
    }

    /// Snapshots of every session, oldest first.
    pub async fn list_sessions(&self) -> Vec<SessionRecord> {
        let slots: Vec<Arc<SessionSlot>> = self.sessions.read().await.values().cloned().collect();

        let mut records = Vec::with_capacity(slots.len());
        for slot in slots {
            records.push(slot.snapshot().await);
        }
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        records
    }

    /// Deletes a session's workspace and evicts its record.
    ///
    /// Directory deletion is best-effort: failures are logged and the
    /// record is evicted regardless. Removing an unknown id is a no-op.
    pub async fn remove_session(&self, id: &SessionId) {
        let Some(slot) = self.sessions.read().await.get(id).cloned() else {
            tracing::debug!("remove_session: {} is not registered", id);
            return;
        };

        // Waits out an in-flight ingestion so no file lands after deletion.
        let _ingest = slot.lock_ingest().await;
        let session_dir = {
            let record = slot.record.write().await;
            slot.removed.store(true, Ordering::Release);
            record.session_dir.clone()
        };

        if let Err(e) = tokio::fs::remove_dir_all(&session_dir).await {
            tracing::warn!(
                "Failed to delete workspace {} of session {}: {}",
                session_dir.display(),
                id,
                e
            );
        }

        self.sessions.write().await.remove(id);
        tracing::info!("Removed session {}", id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_session_makes_directories() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path());

        let id = store.create_session().await.unwrap();
        let record = store.get_session(&id).await.unwrap();

        assert_eq!(record.session_dir, temp_dir.path().join(id.dir_name()));
        assert!(record.upload_dir.is_dir());
        assert!(record.derived_dir.is_dir());
        assert!(record.uploaded_files.is_empty());
        assert!(!record.dirty);
    }

    #[tokio::test]
    async fn test_create_redraws_on_collision() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path());
        std::fs::create_dir_all(temp_dir.path().join("session_aaaaaaaa")).unwrap();

        let mut ids = vec!["bbbbbbbb", "aaaaaaaa"];
        let id = store
            .create_with(|| SessionId::from(ids.pop().unwrap()))
            .await
            .unwrap();
        assert_eq!(id.as_str(), "bbbbbbbb");

        let mut again = vec!["cccccccc", "bbbbbbbb"];
        let id = store
            .create_with(|| SessionId::from(again.pop().unwrap()))
            .await
            .unwrap();
        assert_eq!(id.as_str(), "cccccccc");
    }

    #[tokio::test]
    async fn test_registry_stays_readable_while_creating() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path());
        let existing = store.create_session().await.unwrap();

        let mut readable = true;
        let id = store
            .create_with(|| {
                readable &= store.sessions.try_read().is_ok();
                SessionId::from("aaaaaaaa")
            })
            .await
            .unwrap();

        assert!(readable);
        assert_eq!(id.as_str(), "aaaaaaaa");
        assert!(store.contains(&existing).await);
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_sessions() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(SessionStore::new(temp_dir.path()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.create_session().await.unwrap() })
            })
            .collect();
        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }

        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
        assert_eq!(store.list_sessions().await.len(), 8);
        for id in &ids {
            assert!(store.get_session(id).await.unwrap().derived_dir.is_dir());
        }
    }

    #[tokio::test]
    async fn test_create_gives_up_when_ids_exhausted() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path());
        store
            .create_with(|| SessionId::from("deadbeef"))
            .await
            .unwrap();

        let err = store
            .create_with(|| SessionId::from("deadbeef"))
            .await
            .unwrap_err();
        assert!(matches!(err, InsightError::Internal(_)));
    }

    #[tokio::test]
    async fn test_create_fails_when_root_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("not-a-dir");
        std::fs::write(&root, b"x").unwrap();
        let store = SessionStore::new(&root);

        let err = store.create_session().await.unwrap_err();
        assert!(err.is_filesystem());
        assert!(store.list_sessions().await.is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_session() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path());

        let err = store.get_session(&SessionId::from("missing")).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(store.list_uploaded_files(&SessionId::from("missing")).await.is_err());
    }

    #[tokio::test]
    async fn test_remove_session_deletes_workspace() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path());
        let id = store.create_session().await.unwrap();
        let record = store.get_session(&id).await.unwrap();
        let slot = store.slot(&id).await.unwrap();

        store.remove_session(&id).await;

        assert!(!record.session_dir.exists());
        assert!(!store.contains(&id).await);
        assert!(slot.is_removed());
        assert!(slot.update(|r| r.dirty = true).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_remove_tolerates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path());
        let id = store.create_session().await.unwrap();
        let record = store.get_session(&id).await.unwrap();
        std::fs::remove_dir_all(&record.session_dir).unwrap();

        store.remove_session(&id).await;
        assert!(!store.contains(&id).await);

        // Unknown ids are a no-op.
        store.remove_session(&id).await;
    }

    #[tokio::test]
    async fn test_list_sessions_oldest_first() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path());
        let first = store.create_session().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store.create_session().await.unwrap();

        let ids: Vec<SessionId> = store.list_sessions().await.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first, second]);
    }
}
