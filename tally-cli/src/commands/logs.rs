//! Logs command - inspect, prune and export the event log (logs.jsonl)

use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::{DateTime, Duration, Utc};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use tally_core::services::LogEntry;
use tally_core::{EntryPoint, LoggingService};

use super::{get_data_dir, is_interactive};
use crate::output::create_table;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show the newest events
    Show {
        /// How many events to show
        #[arg(short = 'n', long, default_value = "30")]
        limit: usize,
        /// Only events that carry an error
        #[arg(long)]
        errors: bool,
        /// Print the raw JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Rewrite the log without events older than the given age
    Prune {
        /// Keep events from the last N days
        #[arg(long, default_value = "30")]
        keep_days: u32,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
    /// Copy the log file somewhere else, e.g. to attach to a bug report
    Export { destination: PathBuf },
    /// Where the log lives and how big it is
    Info {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn open_log() -> Result<LoggingService> {
    LoggingService::new(&get_data_dir()?, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
}

fn when(timestamp_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| format!("@{}", timestamp_ms))
}

/// Command and store joined as "import@local"
fn origin(entry: &LogEntry) -> String {
    match (entry.command.as_deref(), entry.store.as_deref()) {
        (Some(command), Some(store)) => format!("{}@{}", command, store),
        (Some(command), None) => command.to_string(),
        (None, Some(store)) => format!("@{}", store),
        (None, None) => String::new(),
    }
}

/// Cutoff in unix ms for keeping `keep_days` worth of events
fn cutoff_ms(now: DateTime<Utc>, keep_days: u32) -> i64 {
    (now - Duration::days(i64::from(keep_days))).timestamp_millis()
}

pub fn run(command: LogsCommands) -> Result<()> {
    let log = open_log()?;

    match command {
        LogsCommands::Show { limit, errors, json } => {
            let entries = if errors { log.get_errors(limit)? } else { log.get_recent(limit)? };

            if json {
                for entry in &entries {
                    println!("{}", serde_json::to_string(entry)?);
                }
                return Ok(());
            }
            if entries.is_empty() {
                println!("{}", "The event log is empty.".dimmed());
                return Ok(());
            }

            let mut table = create_table();
            table.set_header(vec!["When", "Event", "Where", "Version"]);
            // Oldest first so the newest event ends up next to the prompt
            for entry in entries.iter().rev() {
                let event = match &entry.error_message {
                    Some(message) => format!("{}\n{}", entry.event.red(), message.dimmed()),
                    None => entry.event.clone(),
                };
                table.add_row(vec![
                    when(entry.timestamp),
                    event,
                    origin(entry),
                    format!("{} {}", entry.entry_point, entry.app_version),
                ]);
            }
            println!("{}", table);
        }
        LogsCommands::Prune { keep_days, force } => {
            let cutoff = cutoff_ms(Utc::now(), keep_days);
            if !force {
                if !is_interactive() {
                    bail!("Pruning rewrites {}; pass --force to confirm", log.log_path().display());
                }
                let proceed = Confirm::new()
                    .with_prompt(format!("Drop events logged before {}?", when(cutoff)))
                    .default(false)
                    .interact()?;
                if !proceed {
                    println!("{}", "Log left as is".dimmed());
                    return Ok(());
                }
            }

            let dropped = log.delete_before(cutoff)?;
            let kept = log.count()?;
            println!("{} Pruned {} event(s), {} kept", "✓".green(), dropped, kept);
        }
        LogsCommands::Export { destination } => {
            let written = log.export(&destination)?;
            println!("{} Log copied to {}", "✓".green(), written.display());
        }
        LogsCommands::Info { json } => {
            let path = log.log_path().to_path_buf();
            let events = log.count()?;
            let failures = log.get_errors(usize::MAX)?.len();
            let bytes = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            let oldest = log.get_recent(usize::MAX)?.last().map(|e| when(e.timestamp));

            if json {
                let info = serde_json::json!({
                    "path": path,
                    "events": events,
                    "errors": failures,
                    "bytes": bytes,
                    "oldest": oldest,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
                return Ok(());
            }

            println!("{}", path.display().to_string().bold());
            println!("  {} events ({} with errors), {} bytes", events, failures, bytes);
            if let Some(oldest) = oldest {
                println!("  oldest event {}", oldest);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(command: Option<&str>, store: Option<&str>) -> LogEntry {
        LogEntry {
            id: 1,
            timestamp: 0,
            entry_point: "cli".to_string(),
            app_version: "0.1.0".to_string(),
            platform: "linux".to_string(),
            event: "command_executed".to_string(),
            store: store.map(str::to_string),
            command: command.map(str::to_string),
            error_message: None,
            error_details: None,
        }
    }

    #[test]
    fn test_origin() {
        assert_eq!(origin(&entry(Some("import"), Some("local"))), "import@local");
        assert_eq!(origin(&entry(Some("list"), None)), "list");
        assert_eq!(origin(&entry(None, None)), "");
    }

    #[test]
    fn test_cutoff_and_timestamp_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let cutoff = cutoff_ms(now, 30);
        assert_eq!(when(cutoff), "2024-03-01 12:00");
        assert_eq!(cutoff_ms(now, 0), now.timestamp_millis());
    }
}
