//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: workspace record and identifier (`SessionRecord`, `SessionId`)
//! - `status`: display-oriented processing state (`ProcessingStatus`)

mod model;
mod status;

pub use model::{SESSION_ID_LEN, SessionId, SessionRecord};
pub use status::ProcessingStatus;
