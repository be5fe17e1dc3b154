//! Tracks which dataset is shown and resolves where to read it from.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;

use insight_core::mode::{ModeState, ViewMode};
use insight_core::session::{SessionId, SessionRecord};
use insight_infrastructure::SessionStore;

/// Holds the current view mode.
///
/// The session id it keeps is only a reference: it is looked up in the
/// store on every use, and a failed lookup degrades to the default corpus.
pub struct ModeController {
    store: Arc<SessionStore>,
    default_data_dir: PathBuf,
    state: RwLock<ModeState>,
}

impl ModeController {
    pub fn new(store: Arc<SessionStore>, default_data_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            default_data_dir: default_data_dir.into(),
            state: RwLock::new(ModeState::default_mode()),
        }
    }

    /// Directory of the shared corpus.
    pub fn default_data_dir(&self) -> &Path {
        &self.default_data_dir
    }

    pub async fn current(&self) -> ModeState {
        self.state.read().await.clone()
    }

    /// Switches to the shared corpus and forgets the current session.
    pub async fn set_default(&self) {
        *self.state.write().await = ModeState::default_mode();
        tracing::debug!("View mode set to default");
    }

    /// Switches to a session's dataset.
    ///
    /// Falls back to default mode if `id` is not registered. Returns the
    /// mode actually in effect.
    pub async fn set_session(&self, id: &SessionId) -> ViewMode {
        let next = if self.store.contains(id).await {
            ModeState::session(id.clone())
        } else {
            tracing::warn!("Session {} not found, falling back to default view", id);
            ModeState::default_mode()
        };

        let mode = next.mode;
        *self.state.write().await = next;
        mode
    }

    /// The record of the active session, if it still resolves.
    pub async fn active_session(&self) -> Option<SessionRecord> {
        let state = self.current().await;
        let id = state.active_session_id()?;
        self.store.get_session(id).await.ok()
    }

    /// Directory the display layer should read.
    ///
    /// Default mode always yields the corpus. Session mode yields the
    /// session's derived directory while both the record and the directory
    /// exist, and the corpus otherwise.
    pub async fn resolve_data_path(&self) -> PathBuf {
        let state = self.current().await;
        if state.mode == ViewMode::Default {
            return self.default_data_dir.clone();
        }

        match self.active_session().await {
            Some(record) if record.derived_dir.is_dir() => record.derived_dir,
            Some(record) => {
                tracing::debug!(
                    "Derived directory {} is gone, using default corpus",
                    record.derived_dir.display()
                );
                self.default_data_dir.clone()
            }
            None => {
                tracing::debug!("Active session no longer resolves, using default corpus");
                self.default_data_dir.clone()
            }
        }
    }
}
