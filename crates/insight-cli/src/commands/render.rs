//! Terminal rendering of overviews, sessions and tables.

use colored::Colorize;

use insight_application::{Overview, RunOutcome, UploadOutcome};
use insight_core::dataset::{
    DatasetSummary, DerivedDataset, InsightColumn, InsightFilter, TableKind, distinct_values,
};
use insight_core::mode::ViewMode;
use insight_core::session::SessionRecord;

/// Rows printed per table before truncating.
const MAX_ROWS: usize = 10;

pub fn print_summary(summary: &DatasetSummary) {
    println!(
        "  {} {:<6} {} {:<6} {} {:<6} {} {}",
        "Insights:".bright_black(),
        summary.total_insights.to_string().bright_white().bold(),
        "Domains:".bright_black(),
        summary.domains_covered.to_string().bright_white().bold(),
        "Periods:".bright_black(),
        summary.time_periods.to_string().bright_white().bold(),
        "Entities:".bright_black(),
        summary.entities_found.to_string().bright_white().bold(),
    );
}

pub fn print_overview(overview: &Overview) {
    let source = match overview.mode {
        ViewMode::Default => "Default corpus".bright_cyan(),
        ViewMode::Session => "Session data".bright_magenta(),
    };
    println!("{} {}", "Data source:".bold(), source);
    println!("  {}", overview.data_path.display().to_string().bright_black());

    match &overview.session {
        Some(session) => {
            println!(
                "  {} {}  {} {}",
                "Session:".bright_black(),
                session.id.to_string().yellow(),
                "Created:".bright_black(),
                session.created_at.format("%Y-%m-%d %H:%M:%S")
            );
            let status = session.status.to_string();
            if session.status.needs_processing() {
                println!("  {}", status.yellow());
            } else {
                println!("  {}", status.green());
            }
        }
        None if overview.mode == ViewMode::Session => {
            println!("  {}", "No active session".bright_black());
        }
        None => {}
    }

    print_summary(&overview.summary);
}

pub fn print_sessions(sessions: &[SessionRecord], current: Option<&str>) {
    if sessions.is_empty() {
        println!("{}", "No sessions yet. Upload files to create one.".bright_black());
        return;
    }

    for record in sessions {
        let marker = if current == Some(record.id.as_str()) { "*" } else { " " };
        println!(
            "{} {}  {}  {}",
            marker.bright_green(),
            record.id.to_string().yellow(),
            record.created_at.format("%Y-%m-%d %H:%M:%S").to_string().bright_black(),
            record.processing_status()
        );
    }
}

pub fn print_upload(outcome: &UploadOutcome) {
    if outcome.created {
        println!("{}", format!("Created session {}", outcome.session_id).green());
    }
    for name in &outcome.report.accepted {
        println!("  {} {}", "+".green(), name);
    }
    for name in &outcome.report.rejected {
        println!("  {} {} {}", "-".yellow(), name, "(not accepted)".bright_black());
    }
    for failed in &outcome.report.failed {
        println!("  {} {}: {}", "!".red(), failed.name, failed.error);
    }
    println!(
        "{}",
        format!(
            "{} file(s) uploaded to session {}",
            outcome.report.accepted.len(),
            outcome.session_id
        )
        .bright_black()
    );
}

pub fn print_run(outcome: &RunOutcome) {
    println!(
        "{}",
        format!(
            "Processed session {}: {} insights extracted",
            outcome.session_id, outcome.insight_count
        )
        .green()
    );
    if outcome.still_dirty {
        println!(
            "{}",
            "New files arrived during processing; run 'process' again to include them.".yellow()
        );
    }
}

/// Prints one table, or every table when `kind` is `None`.
pub fn print_tables(dataset: &DerivedDataset, kind: Option<TableKind>) {
    let kinds: Vec<TableKind> = match kind {
        Some(kind) => vec![kind],
        None => TableKind::ALL.to_vec(),
    };

    for kind in kinds {
        let rows = table_rows(dataset, kind);
        println!(
            "{} {}",
            format!("[{}]", kind).bright_cyan().bold(),
            format!("{} rows", rows.len()).bright_black()
        );
        print_rows(kind, &rows);
    }
}

/// Prints the insights table narrowed by `filter`. When nothing matches,
/// lists the values each filter accepts.
pub fn print_explorer(dataset: &DerivedDataset, filter: &InsightFilter) {
    let matched = DerivedDataset {
        insights: filter.apply(&dataset.insights),
        ..DerivedDataset::default()
    };
    let rows = table_rows(&matched, TableKind::Insights);
    println!(
        "{} {}",
        format!("[{}]", TableKind::Insights).bright_cyan().bold(),
        format!("{} of {} rows", rows.len(), dataset.insights.len()).bright_black()
    );
    print_rows(TableKind::Insights, &rows);

    if rows.is_empty() && !dataset.insights.is_empty() {
        print_filter_choices(dataset);
    }
}

pub fn print_filter_choices(dataset: &DerivedDataset) {
    for column in InsightColumn::ALL {
        let values = distinct_values(&dataset.insights, column);
        println!(
            "  {} {}",
            format!("{}:", column.as_str()).bright_black(),
            if values.is_empty() {
                "(none)".to_string()
            } else {
                values.join(", ")
            }
        );
    }
}

fn print_rows(kind: TableKind, rows: &[Vec<String>]) {
    if rows.is_empty() {
        println!("  {}", "(empty)".bright_black());
        return;
    }

    println!("  {}", kind.columns().join(" | ").bold());
    for row in rows.iter().take(MAX_ROWS) {
        println!("  {}", row.join(" | "));
    }
    if rows.len() > MAX_ROWS {
        println!("  {}", format!("... {} more", rows.len() - MAX_ROWS).bright_black());
    }
}

fn table_rows(dataset: &DerivedDataset, kind: TableKind) -> Vec<Vec<String>> {
    match kind {
        TableKind::Insights => dataset
            .insights
            .iter()
            .map(|r| {
                vec![
                    r.domain.clone(),
                    r.impact_type.clone(),
                    r.timeframes.clone(),
                    format!("{:.2}", r.ai_similarity),
                    r.sentence_length.to_string(),
                    format!("{:.2}", r.sentiment_score),
                    truncate(&r.sentence, 60),
                ]
            })
            .collect(),
        TableKind::Domain => dataset
            .domain
            .iter()
            .map(|r| {
                vec![
                    r.domain.clone(),
                    r.impact_type.clone(),
                    r.insight_count.to_string(),
                    format!("{:.2}", r.avg_ai_similarity),
                ]
            })
            .collect(),
        TableKind::Temporal => dataset
            .temporal
            .iter()
            .map(|r| {
                vec![
                    r.timeframe.clone(),
                    r.dominant_domain.clone(),
                    format!("{:.2}", r.avg_magnitude),
                    r.insight_count.to_string(),
                    r.dominant_impact.clone(),
                ]
            })
            .collect(),
        TableKind::Pattern => dataset
            .pattern
            .iter()
            .map(|r| {
                vec![
                    r.pattern_type.clone(),
                    format!("{:.2}", r.avg_ai_similarity),
                    r.insight_count.to_string(),
                    r.domains_found.clone(),
                    format!("{:.0}%", r.success_rate * 100.0),
                ]
            })
            .collect(),
        TableKind::Entity => dataset
            .entity
            .iter()
            .map(|r| {
                vec![
                    r.affected_entity.clone(),
                    r.mention_count.to_string(),
                    format!("{:.2}", r.avg_magnitude_when_mentioned),
                ]
            })
            .collect(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
