//! Wires config, storage and use cases together for the binary.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use insight_application::{DashboardUseCase, ModeController, PipelineRunner};
use insight_core::config::{AppConfig, ResolvedPaths};
use insight_infrastructure::{
    ConfigStorage, InsightPaths, SessionStore, UploadIngestor, analyzer_from_config,
};

/// Installs the stderr subscriber. `RUST_LOG` wins over the config filter.
pub fn init_tracing(config_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Config file to use: the explicit one, else the platform default.
pub fn config_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => InsightPaths::config_file().context("Failed to resolve config file location"),
    }
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    ConfigStorage::new(path.to_path_buf())
        .load_or_default()
        .map_err(|e| e.at(path))
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Resolves storage locations, falling back to the platform data dir.
pub fn resolve_paths(config: &AppConfig) -> Result<ResolvedPaths> {
    let fallback_base = match &config.paths.base_dir {
        Some(base) => base.clone(),
        None => InsightPaths::data_dir().context("Failed to resolve data directory")?,
    };
    Ok(config.paths.resolve(&fallback_base))
}

/// Builds the dashboard use case and everything beneath it.
pub fn build_dashboard(config: &AppConfig, paths: &ResolvedPaths) -> Arc<DashboardUseCase> {
    tracing::info!("[Bootstrap] Sessions root: {}", paths.sessions_dir.display());
    tracing::info!("[Bootstrap] Default corpus: {}", paths.default_data_dir.display());

    let store = Arc::new(SessionStore::new(paths.sessions_dir.clone()));
    let ingestor = UploadIngestor::new(store.clone(), config.upload.allowed_extensions.clone());

    let analyzer = analyzer_from_config(&config.analyzer);
    tracing::info!(
        "[Bootstrap] Analyzer: {} (timeout {}s)",
        analyzer.name(),
        config.analyzer.timeout_secs
    );
    let runner = PipelineRunner::new(store.clone(), Arc::from(analyzer), config.analyzer.timeout());
    let modes = ModeController::new(store.clone(), paths.default_data_dir.clone());

    Arc::new(DashboardUseCase::new(store, ingestor, runner, modes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_defaults_when_missing() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_explicit_base_dir_is_used() {
        let mut config = AppConfig::default();
        config.paths.base_dir = Some(PathBuf::from("/srv/insight"));

        let paths = resolve_paths(&config).unwrap();
        assert_eq!(paths.sessions_dir, PathBuf::from("/srv/insight/user_sessions"));
    }

    #[tokio::test]
    async fn test_build_dashboard_starts_in_default_mode() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.paths.base_dir = Some(temp_dir.path().to_path_buf());
        let paths = resolve_paths(&config).unwrap();

        let dashboard = build_dashboard(&config, &paths);

        let overview = dashboard.overview().await;
        assert_eq!(overview.data_path, paths.default_data_dir);
        assert!(dashboard.process_current().await.is_err());
    }
}
