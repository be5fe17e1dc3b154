//! Orchestration layer: the pipeline, view-mode handling and the dashboard
//! actions built on top of them.

pub mod dashboard;
pub mod mode_controller;
pub mod pipeline_runner;

pub use dashboard::{DashboardUseCase, Overview, SessionOverview, UploadMode, UploadOutcome};
pub use mode_controller::ModeController;
pub use pipeline_runner::{PipelineRunner, RunOutcome};
