//! Tally CLI - report tracking in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tally_core::services::ConflictMode;
use tally_core::LogEvent;

mod commands;
mod output;

use commands::{
    add, chart, config, delete, edit, export, import, list, logs, reports, retag, snapshot, status,
    ViewArgs,
};

/// Tally - edit and review counts per project, by month or by report
#[derive(Parser)]
#[command(name = "tally", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a summary of the stored records
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add one record
    Add {
        /// Project name
        project: String,
        /// Edit count
        #[arg(long, default_value = "0")]
        edit: u64,
        /// Review count
        #[arg(long, default_value = "0")]
        review: u64,
        /// Month of the record (YYYY-MM)
        #[arg(long)]
        month: Option<String>,
        /// Report the record belongs to
        #[arg(long)]
        report: Option<String>,
        /// On conflict: merge, overwrite or skip (asks when omitted)
        #[arg(long)]
        mode: Option<ConflictMode>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change fields of one record
    Edit {
        /// Record number (see `tally list`)
        position: usize,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        edit: Option<u64>,
        #[arg(long)]
        review: Option<u64>,
    },

    /// Delete records
    Delete {
        /// Record numbers (see `tally list`)
        positions: Vec<usize>,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List records
    List {
        #[command(flatten)]
        view: ViewArgs,
        /// Only records whose project or report contains this text
        #[arg(long, short)]
        search: Option<String>,
        /// Sort by project, edit, review or date
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import records from a CSV or JSON file
    Import {
        /// Path to the file
        file: PathBuf,
        /// Month for rows without one (YYYY-MM)
        #[arg(long)]
        month: Option<String>,
        /// Report for rows without a month
        #[arg(long)]
        report: Option<String>,
        /// On conflict: merge, overwrite, skip or decide (ask per row)
        #[arg(long, default_value = "merge")]
        mode: import::ImportMode,
        /// Replace existing records without asking (JSON files)
        #[arg(long, short)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export records to CSV or JSON
    Export {
        /// csv or json
        #[arg(long, default_value = "csv")]
        format: String,
        /// Output file (a random transifex-report-*.csv name by default)
        #[arg(long, short)]
        output: Option<PathBuf>,
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Chart totals per project or per month
    Chart {
        #[command(flatten)]
        view: ViewArgs,
        /// Group by project or month
        #[arg(long)]
        by: Option<String>,
        /// bar, stacked, line or pie (default from settings)
        #[arg(long)]
        chart: Option<String>,
        /// Value shown by pie charts: edit or review
        #[arg(long, default_value = "edit")]
        measure: String,
        /// Highlight labels containing this text
        #[arg(long)]
        search: Option<String>,
        /// Output the series as JSON
        #[arg(long)]
        json: bool,
    },

    /// List reports with their totals
    Reports {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move month records into a report
    Assign {
        /// Report name
        report: String,
        /// Record numbers (see `tally list`)
        positions: Vec<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Give records a month
    Redate {
        /// Month (YYYY-MM)
        month: String,
        /// Record numbers (see `tally list`)
        positions: Vec<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage named snapshots
    Snapshot {
        #[command(subcommand)]
        command: snapshot::SnapshotCommands,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    /// Command name for logs
    fn name(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Add { .. } => "add",
            Self::Edit { .. } => "edit",
            Self::Delete { .. } => "delete",
            Self::List { .. } => "list",
            Self::Import { .. } => "import",
            Self::Export { .. } => "export",
            Self::Chart { .. } => "chart",
            Self::Reports { .. } => "reports",
            Self::Assign { .. } => "assign",
            Self::Redate { .. } => "redate",
            Self::Snapshot { .. } => "snapshot",
            Self::Config { .. } => "config",
            Self::Logs { .. } => "logs",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let logger = commands::get_logger();
    let name = cli.command.name();

    commands::log_event(&logger, LogEvent::new("command_executed").with_command(name));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            commands::log_event(
                &logger,
                LogEvent::new("command_failed")
                    .with_command(name)
                    .with_error(e.to_string())
                    .with_error_details(format!("{:?}", e)),
            );
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Status { json } => status::run(json),
        Commands::Add { project, edit, review, month, report, mode, json } => add::run(add::AddArgs {
            project,
            edit,
            review,
            month,
            report,
            mode,
            json,
        }),
        Commands::Edit { position, project, edit, review } => edit::run(position, project, edit, review),
        Commands::Delete { positions, force, json } => delete::run(positions, force, json),
        Commands::List { view, search, sort, desc, json } => list::run(view, search, sort, desc, json),
        Commands::Import { file, month, report, mode, yes, json } => import::run(import::ImportArgs {
            file,
            month,
            report,
            mode,
            yes,
            json,
        }),
        Commands::Export { format, output, view } => export::run(format, output, view),
        Commands::Chart { view, by, chart, measure, search, json } => chart::run(chart::ChartArgs {
            view,
            by,
            chart,
            measure,
            search,
            json,
        }),
        Commands::Reports { json } => reports::run(json),
        Commands::Assign { report, positions, json } => retag::assign(positions, report, json),
        Commands::Redate { month, positions, json } => retag::redate(positions, month, json),
        Commands::Snapshot { command } => snapshot::run(command),
        Commands::Config { command } => config::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_import_flags() {
        let cli = Cli::try_parse_from(["tally", "import", "data.csv", "--report", "Q1", "--mode", "skip"]).unwrap();
        match cli.command {
            Commands::Import { report, mode, .. } => {
                assert_eq!(report.as_deref(), Some("Q1"));
                assert_eq!(mode, import::ImportMode::All(ConflictMode::Skip));
            }
            _ => panic!("expected import"),
        }
    }
}
