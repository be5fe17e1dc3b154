pub mod analyze;
pub mod config;
pub mod render;
pub mod repl;
pub mod show;

use std::path::PathBuf;

use colored::Colorize;

use insight_core::upload::UploadedDocument;

/// Reads local files into upload payloads, skipping unreadable ones.
pub async fn read_documents(paths: &[PathBuf]) -> Vec<UploadedDocument> {
    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
            eprintln!("{}", format!("Not a file: {}", path.display()).red());
            continue;
        };

        match tokio::fs::read(path).await {
            Ok(bytes) => documents.push(UploadedDocument::from_bytes(name, mime_for(path), &bytes)),
            Err(e) => eprintln!("{}", format!("Cannot read {}: {}", path.display(), e).red()),
        }
    }
    documents
}

fn mime_for(path: &std::path::Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_documents_skips_missing_files() {
        let temp_dir = TempDir::new().unwrap();
        let present = temp_dir.path().join("a.pdf");
        std::fs::write(&present, b"%PDF").unwrap();

        let docs = read_documents(&[present, temp_dir.path().join("missing.pdf")]).await;

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "a.pdf");
        assert!(docs[0].payload.starts_with("data:application/pdf;base64,"));
        assert_eq!(docs[0].decode().unwrap(), b"%PDF");
    }
}
