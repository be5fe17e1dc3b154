use std::path::PathBuf;

use anyhow::{Result, bail};
use colored::Colorize;

use insight_application::DashboardUseCase;
use insight_core::dataset::{InsightFilter, TableKind};
use insight_infrastructure::DataLoader;

use super::render;

/// Prints the summary (and optionally one table) of the default corpus or
/// of an explicit directory. Insight filters imply `--table insights`.
pub async fn run(
    dashboard: &DashboardUseCase,
    path: Option<PathBuf>,
    table: Option<String>,
    filter: InsightFilter,
) -> Result<()> {
    let kind = resolve_table(table.as_deref(), &filter)?;

    let (dir, dataset) = match path {
        Some(dir) => {
            let dataset = DataLoader::new().load(&dir);
            (dir, dataset)
        }
        None => {
            let dir = dashboard.modes().resolve_data_path().await;
            (dir, dashboard.load_active().await)
        }
    };

    println!("{} {}", "Data:".bold(), dir.display());
    render::print_summary(&dataset.summary());
    match kind {
        Some(TableKind::Insights) if !filter.is_empty() => render::print_explorer(&dataset, &filter),
        Some(kind) => render::print_tables(&dataset, Some(kind)),
        None => {}
    }
    Ok(())
}

fn resolve_table(table: Option<&str>, filter: &InsightFilter) -> Result<Option<TableKind>> {
    let kind = match table {
        Some(name) => match TableKind::parse(name) {
            Some(kind) => Some(kind),
            None => bail!("Unknown table '{}'", name),
        },
        None if !filter.is_empty() => Some(TableKind::Insights),
        None => None,
    };
    if !filter.is_empty() && kind != Some(TableKind::Insights) {
        bail!("--domain, --impact and --timeframe apply to the insights table only");
    }
    Ok(kind)
}
