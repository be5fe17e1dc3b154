#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::Notify;

use insight_application::{DashboardUseCase, ModeController, PipelineRunner};
use insight_core::Result;
use insight_core::analyzer::{DocumentAnalyzer, InsightRecord};
use insight_core::upload::UploadedDocument;
use insight_infrastructure::{SessionStore, UploadIngestor};

pub const TIMEOUT: Duration = Duration::from_secs(10);

pub fn record(domain: &str, timeframe: &str, entity: &str) -> InsightRecord {
    InsightRecord {
        domain: domain.to_string(),
        impact_type: "augmentation".to_string(),
        sentence: format!("AI reshapes {} by {}", domain, timeframe),
        timeframes: vec![timeframe.to_string()],
        ai_similarity: 0.75,
        sentiment_score: 0.3,
        magnitude: 0.5,
        pattern_type: Some("adoption".to_string()),
        entities: vec![entity.to_string()],
        source_document: Some("a.pdf".to_string()),
    }
}

pub fn three_records() -> Vec<InsightRecord> {
    vec![
        record("Healthcare", "2030", "doctors"),
        record("Finance", "2035", "banks"),
        record("Healthcare", "2040", "nurses"),
    ]
}

pub fn pdf(name: &str, body: &[u8]) -> UploadedDocument {
    UploadedDocument::from_bytes(name, "application/pdf", body)
}

/// Returns the same records on every call and counts calls.
pub struct FixedAnalyzer {
    records: Vec<InsightRecord>,
    calls: AtomicUsize,
}

impl FixedAnalyzer {
    pub fn new(records: Vec<InsightRecord>) -> Self {
        Self {
            records,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentAnalyzer for FixedAnalyzer {
    fn name(&self) -> String {
        "fixed".to_string()
    }

    async fn is_available(&self) -> Result<()> {
        Ok(())
    }

    async fn analyze(&self, _upload_dir: &Path) -> Result<Vec<InsightRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.clone())
    }
}

/// Signals `started`, then blocks until `release` is notified.
pub struct GatedAnalyzer {
    pub started: Notify,
    pub release: Notify,
    records: Vec<InsightRecord>,
}

impl GatedAnalyzer {
    pub fn new(records: Vec<InsightRecord>) -> Self {
        Self {
            started: Notify::new(),
            release: Notify::new(),
            records,
        }
    }
}

#[async_trait]
impl DocumentAnalyzer for GatedAnalyzer {
    fn name(&self) -> String {
        "gated".to_string()
    }

    async fn is_available(&self) -> Result<()> {
        Ok(())
    }

    async fn analyze(&self, _upload_dir: &Path) -> Result<Vec<InsightRecord>> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(self.records.clone())
    }
}

pub struct Harness {
    pub temp_dir: TempDir,
    pub store: Arc<SessionStore>,
    pub ingestor: UploadIngestor,
    pub runner: Arc<PipelineRunner>,
}

impl Harness {
    pub fn new(analyzer: Arc<dyn DocumentAnalyzer>) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(SessionStore::new(temp_dir.path().join("user_sessions")));
        let ingestor = UploadIngestor::new(store.clone(), vec!["pdf".to_string()]);
        let runner = Arc::new(PipelineRunner::new(store.clone(), analyzer, TIMEOUT));
        Self {
            temp_dir,
            store,
            ingestor,
            runner,
        }
    }

    pub fn corpus_dir(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("default_data")
    }
}

/// A dashboard over a fresh temp directory.
pub fn dashboard(analyzer: Arc<dyn DocumentAnalyzer>) -> (TempDir, DashboardUseCase) {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(SessionStore::new(temp_dir.path().join("user_sessions")));
    let ingestor = UploadIngestor::new(store.clone(), vec!["pdf".to_string()]);
    let runner = PipelineRunner::new(store.clone(), analyzer, TIMEOUT);
    let modes = ModeController::new(store.clone(), temp_dir.path().join("default_data"));
    (temp_dir, DashboardUseCase::new(store, ingestor, runner, modes))
}
