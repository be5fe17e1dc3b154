//! Interactive dashboard driven from a rustyline prompt.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use insight_application::{DashboardUseCase, UploadMode};
use insight_core::dataset::{InsightFilter, TableKind};
use insight_core::session::SessionId;

use super::{read_documents, render};

const COMMANDS: &[&str] = &[
    "upload", "process", "cancel", "mode", "reset", "clear", "sessions", "status", "show",
    "filters", "help", "quit",
];

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if line.contains(' ') {
            return Ok((0, vec![]));
        }

        let candidates: Vec<Pair> = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let first = line.split_whitespace().next().unwrap_or("");
        if self.commands.iter().any(|cmd| cmd == first) {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.is_empty() || line.contains(' ') {
            return None;
        }

        self.commands
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for CliHelper {}

/// One parsed REPL line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Upload { new: bool, files: Vec<PathBuf> },
    Process,
    Cancel,
    ModeDefault,
    ModeSession(SessionId),
    Reset,
    Clear(Option<SessionId>),
    Sessions,
    Status,
    Show(Option<TableKind>),
    Explore(InsightFilter),
    Filters,
    Help,
    Quit,
}

fn parse(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let head = words.next().unwrap_or("");
    let rest: Vec<&str> = words.collect();

    match (head, rest.as_slice()) {
        ("upload", args) => {
            let new = args.contains(&"--new");
            let files: Vec<PathBuf> = args
                .iter()
                .filter(|a| **a != "--new")
                .map(PathBuf::from)
                .collect();
            if files.is_empty() {
                Err("usage: upload [--new] <file>...".to_string())
            } else {
                Ok(Command::Upload { new, files })
            }
        }
        ("process", []) => Ok(Command::Process),
        ("cancel", []) => Ok(Command::Cancel),
        ("mode", ["default"]) => Ok(Command::ModeDefault),
        ("mode", ["session", id]) => Ok(Command::ModeSession(SessionId::from(*id))),
        ("mode", _) => Err("usage: mode default | mode session <id>".to_string()),
        ("reset", []) => Ok(Command::Reset),
        ("clear", []) => Ok(Command::Clear(None)),
        ("clear", [id]) => Ok(Command::Clear(Some(SessionId::from(*id)))),
        ("sessions", []) => Ok(Command::Sessions),
        ("status", []) => Ok(Command::Status),
        ("show", []) => Ok(Command::Show(None)),
        ("show", [name]) => TableKind::parse(name)
            .map(|kind| Command::Show(Some(kind)))
            .ok_or_else(|| format!("unknown table '{}'", name)),
        ("show", [name, flags @ ..]) if TableKind::parse(name) == Some(TableKind::Insights) => {
            parse_filter(flags).map(Command::Explore)
        }
        ("show", _) => Err("filters apply to the insights table only".to_string()),
        ("filters", []) => Ok(Command::Filters),
        ("help", _) => Ok(Command::Help),
        ("quit", _) | ("exit", _) => Ok(Command::Quit),
        (other, _) => Err(format!("unknown command '{}' (try 'help')", other)),
    }
}

/// Reads `--domain`, `--impact` and `--timeframe`. A value runs up to the
/// next flag, so `--timeframe 2030; 2040` keeps its separator.
fn parse_filter(args: &[&str]) -> Result<InsightFilter, String> {
    let mut filter = InsightFilter::default();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i];
        let end = args[i + 1..]
            .iter()
            .position(|a| a.starts_with("--"))
            .map_or(args.len(), |p| i + 1 + p);
        if end == i + 1 {
            return Err(format!("missing value for {}", flag));
        }
        let value = Some(args[i + 1..end].join(" "));
        match flag {
            "--domain" => filter.domain = value,
            "--impact" => filter.impact_type = value,
            "--timeframe" => filter.timeframe = value,
            other => return Err(format!("unknown filter '{}'", other)),
        }
        i = end;
    }
    Ok(filter)
}

fn print_help() {
    let lines = [
        ("upload [--new] <file>...", "upload files into the current (or a new) session"),
        ("process", "run the analyzer over the current session"),
        ("cancel", "cancel a running analysis"),
        ("mode default", "show the default corpus"),
        ("mode session <id>", "show a session's results"),
        ("reset", "return to the default corpus"),
        ("clear [<id>]", "delete a session (default: the current one)"),
        ("sessions", "list sessions"),
        ("status", "show the data source and headline metrics"),
        ("show [table]", "print tables: insights, domain, temporal, pattern, entity"),
        ("show insights --domain D", "filter sentences (also --impact I, --timeframe T)"),
        ("filters", "list the values each insights filter accepts"),
        ("quit", "exit"),
    ];
    for (usage, text) in lines {
        println!("  {:<28} {}", usage.bright_cyan(), text.bright_black());
    }
}

/// A processing run started from the prompt.
struct RunningJob {
    session_id: SessionId,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl RunningJob {
    /// Processes `session_id` in the background. The session is bound here,
    /// so mode changes made while the run is in flight do not redirect it.
    fn start(dashboard: &Arc<DashboardUseCase>, session_id: SessionId) -> Self {
        let cancel = CancellationToken::new();
        let task_dashboard = Arc::clone(dashboard);
        let task_cancel = cancel.clone();
        let task_id = session_id.clone();
        let handle = tokio::spawn(async move {
            match task_dashboard.runner().run_with_cancel(&task_id, task_cancel).await {
                Ok(outcome) => render::print_run(&outcome),
                Err(e) if e.is_empty_result() => {
                    println!("{}", "No insights extracted from uploaded PDFs".yellow())
                }
                Err(e) => println!("{}", format!("Processing failed: {}", e).red()),
            }
        });
        Self {
            session_id,
            cancel,
            handle,
        }
    }

    fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

/// Runs the REPL until `quit` or EOF.
pub async fn run(dashboard: Arc<DashboardUseCase>) -> Result<()> {
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Chrono-Insight ===".bright_magenta().bold());
    println!(
        "{}",
        format!("Analyzer: {}. Type 'help' for commands, 'quit' to exit.", dashboard.runner().analyzer_name())
            .bright_black()
    );
    render::print_overview(&dashboard.overview().await);
    println!();

    let mut job: Option<RunningJob> = None;

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                let command = match parse(trimmed) {
                    Ok(command) => command,
                    Err(message) => {
                        println!("{}", message.yellow());
                        continue;
                    }
                };

                if command == Command::Quit {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                execute(&dashboard, command, &mut job).await;
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    if let Some(job) = job.take()
        && job.is_active()
    {
        job.cancel.cancel();
        let _ = job.handle.await;
    }
    Ok(())
}

async fn execute(dashboard: &Arc<DashboardUseCase>, command: Command, job: &mut Option<RunningJob>) {
    match command {
        Command::Upload { new, files } => {
            let documents = read_documents(&files).await;
            if documents.is_empty() {
                return;
            }
            let mode = if new { UploadMode::New } else { UploadMode::Append };
            match dashboard.upload(documents, mode).await {
                Ok(outcome) => render::print_upload(&outcome),
                Err(e) => println!("{}", format!("Upload failed: {}", e).red()),
            }
        }
        Command::Process => {
            if let Some(running) = job.as_ref()
                && running.is_active()
            {
                println!(
                    "{}",
                    format!("Session {} is still processing", running.session_id).yellow()
                );
                return;
            }
            let Some(session_id) = dashboard.modes().current().await.active_session_id().cloned() else {
                println!("{}", "No session found. Upload files first.".yellow());
                return;
            };

            println!("{}", format!("Processing session {}...", session_id).bright_black());
            *job = Some(RunningJob::start(dashboard, session_id));
        }
        Command::Cancel => match job.as_ref() {
            Some(running) if running.is_active() => {
                running.cancel.cancel();
                println!("{}", format!("Cancelling run for session {}", running.session_id).yellow());
            }
            _ => println!("{}", "Nothing is running".bright_black()),
        },
        Command::ModeDefault | Command::Reset => {
            dashboard.reset_to_default().await;
            render::print_overview(&dashboard.overview().await);
        }
        Command::ModeSession(id) => {
            dashboard.switch_to_session(&id).await;
            render::print_overview(&dashboard.overview().await);
        }
        Command::Clear(Some(id)) => {
            dashboard.clear_session(&id).await;
            println!("{}", format!("Session {} cleared", id).green());
        }
        Command::Clear(None) => match dashboard.clear_current().await {
            Some(id) => println!("{}", format!("Session {} cleared", id).green()),
            None => println!("{}", "No active session".bright_black()),
        },
        Command::Sessions => {
            let current = dashboard.modes().current().await;
            let current_id = current.active_session_id().map(|id| id.as_str());
            render::print_sessions(&dashboard.sessions().await, current_id);
        }
        Command::Status => render::print_overview(&dashboard.overview().await),
        Command::Show(kind) => render::print_tables(&dashboard.load_active().await, kind),
        Command::Explore(filter) => render::print_explorer(&dashboard.load_active().await, &filter),
        Command::Filters => render::print_filter_choices(&dashboard.load_active().await),
        Command::Help => print_help(),
        Command::Quit => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap;
    use insight_core::config::AppConfig;
    use insight_core::upload::UploadedDocument;
    use tempfile::TempDir;

    #[test]
    fn test_parse_upload() {
        assert_eq!(
            parse("upload --new a.pdf b.pdf").unwrap(),
            Command::Upload {
                new: true,
                files: vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")],
            }
        );
        assert!(parse("upload").is_err());
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse("mode default").unwrap(), Command::ModeDefault);
        assert_eq!(
            parse("mode session ab12cd34").unwrap(),
            Command::ModeSession(SessionId::from("ab12cd34"))
        );
        assert!(parse("mode user").is_err());
    }

    #[test]
    fn test_parse_show_and_clear() {
        assert_eq!(parse("show").unwrap(), Command::Show(None));
        assert_eq!(parse("show temporal").unwrap(), Command::Show(Some(TableKind::Temporal)));
        assert!(parse("show charts").is_err());
        assert_eq!(parse("clear").unwrap(), Command::Clear(None));
        assert_eq!(
            parse("clear ab12cd34").unwrap(),
            Command::Clear(Some(SessionId::from("ab12cd34")))
        );
    }

    #[test]
    fn test_parse_insight_filters() {
        assert_eq!(
            parse("show insights --domain finance --timeframe 2030; 2040").unwrap(),
            Command::Explore(InsightFilter {
                domain: Some("finance".to_string()),
                impact_type: None,
                timeframe: Some("2030; 2040".to_string()),
            })
        );
        assert_eq!(
            parse("show insights --impact displacement").unwrap(),
            Command::Explore(InsightFilter {
                impact_type: Some("displacement".to_string()),
                ..Default::default()
            })
        );
        assert!(parse("show insights --domain").is_err());
        assert!(parse("show insights --sector finance").is_err());
        assert!(parse("show domain --domain finance").is_err());
        assert_eq!(parse("filters").unwrap(), Command::Filters);
    }

    #[test]
    fn test_parse_quit_aliases() {
        assert_eq!(parse("quit").unwrap(), Command::Quit);
        assert_eq!(parse("exit").unwrap(), Command::Quit);
        assert!(parse("frobnicate").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_started_run_keeps_its_session_after_mode_change() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.paths.base_dir = Some(temp_dir.path().to_path_buf());
        config.analyzer.command = Some("sh".to_string());
        config.analyzer.args = vec![
            "-c".to_string(),
            r#"sleep 0.3; echo '[{"domain":"Finance","impact_type":"augmentation","sentence":"Banks adopt AI."}]'"#
                .to_string(),
            "sh".to_string(),
        ];
        let paths = bootstrap::resolve_paths(&config).unwrap();
        let dashboard = bootstrap::build_dashboard(&config, &paths);
        let pdf = |name: &str| vec![UploadedDocument::from_bytes(name, "application/pdf", b"%PDF")];

        let first = dashboard.upload(pdf("a.pdf"), UploadMode::New).await.unwrap().session_id;
        let job = RunningJob::start(&dashboard, first.clone());
        let second = dashboard.upload(pdf("b.pdf"), UploadMode::New).await.unwrap().session_id;
        assert_eq!(
            dashboard.modes().current().await.active_session_id(),
            Some(&second)
        );

        job.handle.await.unwrap();

        let processed = dashboard.store().get_session(&first).await.unwrap();
        assert_eq!(processed.insight_count, 1);
        assert!(!processed.dirty);
        let untouched = dashboard.store().get_session(&second).await.unwrap();
        assert!(untouched.dirty);
        assert!(untouched.last_processed_at.is_none());
    }
}
