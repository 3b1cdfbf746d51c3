//! Export command - write records to CSV or JSON

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use tally_core::services::{export_csv, export_file_name, export_json, filter};
use tally_core::{LogEvent, Record};

use super::{get_context, get_logger, log_event, ViewArgs};

pub fn run(format: String, output: Option<PathBuf>, view: ViewArgs) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context()?;
    let collection = ctx.collection();

    let records: Vec<&Record> = if view.is_set() {
        let mode = view.resolve(ctx.config.default_view_type, collection)?;
        filter(collection, &mode)
    } else {
        collection.iter().collect()
    };

    let (content, default_name) = match format.to_lowercase().as_str() {
        "csv" => (export_csv(records.iter().copied())?, export_file_name()),
        "json" => (
            export_json(records.iter().copied())?,
            export_file_name().replace(".csv", ".json"),
        ),
        other => bail!("Unknown export format '{}': use csv or json", other),
    };

    let path = output.unwrap_or_else(|| PathBuf::from(default_name));
    std::fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    log_event(
        &logger,
        LogEvent::new("export_completed")
            .with_command("export")
            .with_store(ctx.storage.name()),
    );
    println!(
        "{} Exported {} record(s) to {}",
        "✓".green(),
        records.len(),
        path.display()
    );
    Ok(())
}
