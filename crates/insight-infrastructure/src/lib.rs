//! Filesystem side of Chrono-Insight: workspaces, uploads, derived tables,
//! the config file and the external analyzer process.

pub mod command_analyzer;
pub mod data_loader;
pub mod derived_tables;
pub mod paths;
pub mod session_store;
pub mod storage;
pub mod upload_ingestor;

pub use command_analyzer::{CommandAnalyzer, UnavailableAnalyzer, analyzer_from_config};
pub use data_loader::DataLoader;
pub use derived_tables::{DerivedTables, StagedTables};
pub use paths::{InsightPaths, PathError};
pub use session_store::{SessionSlot, SessionStore};
pub use storage::ConfigStorage;
pub use upload_ingestor::{FailedUpload, IngestReport, UploadIngestor};
