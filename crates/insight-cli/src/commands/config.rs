use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use insight_infrastructure::ConfigStorage;

pub fn show(path: &Path) -> Result<()> {
    let storage = ConfigStorage::new(path.to_path_buf());
    let config = storage.load_or_default().map_err(|e| e.at(path))?;

    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("{}", "(not created yet, showing defaults)".bright_black());
    }
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

/// Points the analyzer section at a program, keeping every other setting.
pub fn set_analyzer(
    path: &Path,
    command: String,
    args: Vec<String>,
    timeout_secs: Option<u64>,
) -> Result<()> {
    let storage = ConfigStorage::new(path.to_path_buf());
    let updated = storage
        .update(|config| {
            config.analyzer.command = Some(command);
            config.analyzer.args = args;
            if let Some(secs) = timeout_secs {
                config.analyzer.timeout_secs = secs;
            }
        })
        .map_err(|e| e.at(path))
        .with_context(|| format!("Failed to update {}", path.display()))?;

    println!(
        "{}",
        format!(
            "Analyzer set to '{}' in {}",
            updated.analyzer.command.unwrap_or_default(),
            path.display()
        )
        .green()
    );
    Ok(())
}
