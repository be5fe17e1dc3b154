use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use insight_core::dataset::InsightFilter;

mod bootstrap;
mod commands;

#[derive(Parser)]
#[command(name = "insight")]
#[command(about = "Chrono-Insight - upload documents, extract insights, browse the derived tables", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive dashboard (default)
    Repl,
    /// Print the summary of the default corpus or of a directory of tables
    Show {
        /// Directory holding the five table files
        #[arg(long)]
        path: Option<PathBuf>,
        /// Also print one table (insights, domain, temporal, pattern, entity)
        #[arg(long)]
        table: Option<String>,
        /// Only insights from this domain
        #[arg(long)]
        domain: Option<String>,
        /// Only insights of this impact type
        #[arg(long)]
        impact: Option<String>,
        /// Only insights with exactly these timeframes
        #[arg(long)]
        timeframe: Option<String>,
    },
    /// Upload files into a new session, process them and print the result
    Analyze {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Inspect or edit the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective config
    Show,
    /// Set the analyzer program and its leading arguments
    SetAnalyzer {
        command: String,
        #[arg(long)]
        timeout_secs: Option<u64>,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = bootstrap::config_path(cli.config)?;
    let config = bootstrap::load_config(&config_path)?;
    bootstrap::init_tracing(&config.logging.filter);
    tracing::debug!("Using config {}", config_path.display());

    let command = match cli.command.unwrap_or(Commands::Repl) {
        Commands::Config { action } => {
            return match action {
                ConfigAction::Show => commands::config::show(&config_path),
                ConfigAction::SetAnalyzer {
                    command,
                    timeout_secs,
                    args,
                } => commands::config::set_analyzer(&config_path, command, args, timeout_secs),
            };
        }
        other => other,
    };

    let paths = bootstrap::resolve_paths(&config)?;
    let dashboard = bootstrap::build_dashboard(&config, &paths);

    match command {
        Commands::Repl => commands::repl::run(dashboard).await?,
        Commands::Show {
            path,
            table,
            domain,
            impact,
            timeframe,
        } => {
            let filter = InsightFilter {
                domain,
                impact_type: impact,
                timeframe,
            };
            commands::show::run(&dashboard, path, table, filter).await?
        }
        Commands::Analyze { files } => commands::analyze::run(&dashboard, files).await?,
        Commands::Config { .. } => {}
    }

    Ok(())
}
