//! Domain layer for Chrono-Insight.
//!
//! Holds the types shared by every other crate: session records, the five
//! derived tables, the analyzer abstraction, upload decoding, view-mode state
//! and configuration. Nothing in here touches the filesystem.

pub mod analyzer;
pub mod config;
pub mod dataset;
pub mod error;
pub mod mode;
pub mod session;
pub mod upload;

// Re-export common error type
pub use error::{InsightError, Result};
