use std::path::PathBuf;

use anyhow::{Result, bail};

use insight_application::{DashboardUseCase, UploadMode};

use super::{read_documents, render};

/// One-shot: upload files into a new session, process it and print the result.
pub async fn run(dashboard: &DashboardUseCase, files: Vec<PathBuf>) -> Result<()> {
    let documents = read_documents(&files).await;
    if documents.is_empty() {
        bail!("No readable files given");
    }

    let upload = dashboard.upload(documents, UploadMode::New).await?;
    render::print_upload(&upload);
    if !upload.report.has_accepted() {
        bail!("No files were accepted");
    }

    let outcome = dashboard.process_current().await?;
    render::print_run(&outcome);
    render::print_overview(&dashboard.overview().await);
    Ok(())
}
