//! `DocumentAnalyzer` implementations backed by an external program.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use insight_core::analyzer::{DocumentAnalyzer, InsightRecord};
use insight_core::config::AnalyzerConfig;
use insight_core::{InsightError, Result};

/// Runs an external extraction program over an upload directory.
///
/// The program is invoked as `<program> <args>... <upload_dir>` and must
/// print a JSON array of insight records on stdout.
///
/// # Example
///
/// ```rust,ignore
/// let analyzer = CommandAnalyzer::new("nlp-pipeline").with_args(vec!["--json".into()]);
/// analyzer.is_available().await?;
/// let records = analyzer.analyze(&upload_dir).await?;
/// ```
pub struct CommandAnalyzer {
    program: String,
    args: Vec<String>,
}

impl CommandAnalyzer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn is_path_like(&self) -> bool {
        self.program.contains('/') || self.program.contains('\\')
    }

    /// Looks the program up on `PATH` with `which` (Unix) or `where` (Windows).
    async fn check_on_path(&self) -> Result<()> {
        #[cfg(unix)]
        let check_cmd = "which";
        #[cfg(windows)]
        let check_cmd = "where";

        let output = Command::new(check_cmd)
            .arg(&self.program)
            .output()
            .await
            .map_err(|e| {
                InsightError::unavailable(format!(
                    "Failed to check availability of '{}': {}",
                    self.program, e
                ))
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(InsightError::unavailable(format!(
                "'{}' not found in PATH",
                self.program
            )))
        }
    }
}

#[async_trait]
impl DocumentAnalyzer for CommandAnalyzer {
    fn name(&self) -> String {
        format!("command:{}", self.program)
    }

    async fn is_available(&self) -> Result<()> {
        if self.is_path_like() {
            if PathBuf::from(&self.program).is_file() {
                Ok(())
            } else {
                Err(InsightError::unavailable(format!(
                    "'{}' does not exist",
                    self.program
                )))
            }
        } else {
            self.check_on_path().await
        }
    }

    async fn analyze(&self, upload_dir: &Path) -> Result<Vec<InsightRecord>> {
        tracing::info!("Running analyzer {} over {}", self.program, upload_dir.display());

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(upload_dir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                tracing::error!("Failed to spawn analyzer {}: {}", self.program, e);
                InsightError::unavailable(format!("Failed to spawn '{}': {}", self.program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!("Analyzer {} failed: {}", self.program, stderr.trim());
            return Err(InsightError::internal(format!(
                "Analyzer '{}' failed with status {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let records: Vec<InsightRecord> = serde_json::from_slice(&output.stdout)?;
        tracing::debug!("Analyzer {} returned {} records", self.program, records.len());
        Ok(records)
    }
}

/// Stand-in used when no analyzer is configured.
#[derive(Debug, Clone, Default)]
pub struct UnavailableAnalyzer {
    reason: Option<String>,
}

impl UnavailableAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
        }
    }

    fn error(&self) -> InsightError {
        InsightError::unavailable(
            self.reason
                .clone()
                .unwrap_or_else(|| "No analyzer configured".to_string()),
        )
    }
}

#[async_trait]
impl DocumentAnalyzer for UnavailableAnalyzer {
    fn name(&self) -> String {
        "unavailable".to_string()
    }

    async fn is_available(&self) -> Result<()> {
        Err(self.error())
    }

    async fn analyze(&self, _upload_dir: &Path) -> Result<Vec<InsightRecord>> {
        Err(self.error())
    }
}

/// Builds the analyzer described by the config section.
pub fn analyzer_from_config(config: &AnalyzerConfig) -> Box<dyn DocumentAnalyzer> {
    match config.command.as_deref().map(str::trim) {
        Some(program) if !program.is_empty() => {
            Box::new(CommandAnalyzer::new(program).with_args(config.args.clone()))
        }
        _ => Box::new(UnavailableAnalyzer::with_reason(
            "NLP pipeline not available: set [analyzer].command in the config file",
        )),
    }
}
