//! View mode: which dataset the display layer reads.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::session::SessionId;

/// Which dataset is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// The shared, pre-computed corpus.
    #[default]
    Default,
    /// The derived dataset of one upload session.
    Session,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Default => f.write_str("default"),
            ViewMode::Session => f.write_str("session"),
        }
    }
}

/// Current mode plus the session it refers to.
///
/// `session_id` is a relation, not ownership: the session may have been
/// removed from the store since, so it must be re-resolved on every use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeState {
    pub mode: ViewMode,
    pub session_id: Option<SessionId>,
}

impl ModeState {
    pub fn default_mode() -> Self {
        Self::default()
    }

    pub fn session(id: SessionId) -> Self {
        Self {
            mode: ViewMode::Session,
            session_id: Some(id),
        }
    }

    /// Session id only when the mode actually points at a session.
    pub fn active_session_id(&self) -> Option<&SessionId> {
        match self.mode {
            ViewMode::Session => self.session_id.as_ref(),
            ViewMode::Default => None,
        }
    }
}
