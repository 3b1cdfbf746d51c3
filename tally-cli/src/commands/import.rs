//! Import command - CSV or JSON files into the collection
//!
//! CSV rows without a month need a target (a month or a report); JSON files
//! replace the whole collection.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use dialoguer::{Confirm, Input, Select};
use tally_core::domain::{report_names, unique_report_name};
use tally_core::services::{
    apply_batch, apply_review, classify, materialize, read_import_file, review_import,
    suggested_report_name, ApplySummary, ConflictMode, DecodedImport, ImportKind, ImportSource,
    ImportTarget, PendingConflict,
};
use tally_core::{Collection, LogEvent, OperationResult};

use super::{get_context, get_logger, is_interactive, log_event, parse_period};
use crate::output::format_tag;

/// How conflicts with existing records are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// One policy for every conflict
    All(ConflictMode),
    /// Ask for each conflicting row
    Decide,
}

impl FromStr for ImportMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("decide") {
            return Ok(Self::Decide);
        }
        Ok(Self::All(s.parse()?))
    }
}

pub struct ImportArgs {
    pub file: PathBuf,
    pub month: Option<String>,
    pub report: Option<String>,
    pub mode: ImportMode,
    pub yes: bool,
    pub json: bool,
}

pub fn run(args: ImportArgs) -> Result<()> {
    let logger = get_logger();
    let mut ctx = get_context()?;

    let source = read_import_file(&args.file).map_err(|e| {
        log_event(
            &logger,
            LogEvent::new("import_failed")
                .with_command("import")
                .with_error(e.to_string()),
        );
        e
    })?;

    let replaces_all = matches!(source, ImportSource::Json(_));
    let summary = match source {
        ImportSource::Json(records) => {
            if !ctx.collection().is_empty() && !args.yes {
                if !is_interactive() {
                    bail!("A JSON import replaces all {} records; pass --yes to confirm", ctx.collection().len());
                }
                let confirmed = Confirm::new()
                    .with_prompt(format!(
                        "Replace all {} existing records with the contents of this file?",
                        ctx.collection().len()
                    ))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    println!("{}\n", "Cancelled".dimmed());
                    return Ok(());
                }
            }
            let count = records.len();
            ctx.replace(records);
            ApplySummary {
                inserted: count,
                ..ApplySummary::default()
            }
        }
        ImportSource::Csv(decoded) => {
            let file_name = args
                .file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("import.csv")
                .to_string();
            let target = choose_target(&decoded, &args, &file_name, ctx.collection())?;
            let records = materialize(&decoded, &target)?;

            match args.mode {
                ImportMode::All(mode) => apply_batch(ctx.collection_mut(), records, mode),
                ImportMode::Decide => {
                    let review = review_import(ctx.collection(), records);
                    let decisions = decide_conflicts(&review.conflicts)?;
                    apply_review(ctx.collection_mut(), review, &decisions)?
                }
            }
        }
    };

    if summary.changed() || replaces_all {
        ctx.persist()?;
    }
    log_event(
        &logger,
        LogEvent::new("import_completed")
            .with_command("import")
            .with_store(ctx.storage.name()),
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(summary))?);
        return Ok(());
    }

    println!("{} Imported {} row(s)", "✓".green(), summary.total());
    println!(
        "  {} new, {} merged, {} overwritten, {} skipped",
        summary.inserted, summary.merged, summary.overwritten, summary.skipped
    );
    Ok(())
}

/// Pick the import target from flags, or ask for it
fn choose_target(
    decoded: &DecodedImport,
    args: &ImportArgs,
    file_name: &str,
    collection: &Collection,
) -> Result<ImportTarget> {
    let classification = classify(decoded)?;

    match (&args.month, &args.report) {
        (Some(_), Some(_)) => bail!("Use either --month or --report, not both"),
        (Some(month), None) => return Ok(ImportTarget::SinglePeriod(parse_period(month)?)),
        (None, Some(report)) if classification.kind == ImportKind::Mixed => {
            return Ok(ImportTarget::Mixed { report: report.clone() })
        }
        (None, Some(report)) => return Ok(ImportTarget::Report(report.clone())),
        (None, None) => {}
    }

    if classification.kind == ImportKind::Dated {
        return Ok(ImportTarget::OwnDates);
    }
    if !is_interactive() {
        bail!(
            "{} row(s) have no month; pass --month YYYY-MM or --report NAME",
            decoded.rows.iter().filter(|r| r.period.is_none()).count()
        );
    }

    let existing = report_names(collection);
    let suggestion = unique_report_name(
        &suggested_report_name(file_name, classification.kind),
        existing.iter().map(String::as_str),
    )?;

    if classification.kind == ImportKind::Mixed {
        println!(
            "{}",
            "Some rows have a month and some don't. Dated rows keep their month.".yellow()
        );
        let report = ask_report_name(&suggestion)?;
        return Ok(ImportTarget::Mixed { report });
    }

    let choice = Select::new()
        .with_prompt("These rows have no month. Where should they go?")
        .items(&["One month", "A named report"])
        .default(0)
        .interact()?;

    if choice == 0 {
        let month: String = Input::new()
            .with_prompt("Month (YYYY-MM)")
            .validate_with(|input: &String| parse_period(input).map(|_| ()).map_err(|e| e.to_string()))
            .interact_text()?;
        Ok(ImportTarget::SinglePeriod(parse_period(&month)?))
    } else {
        Ok(ImportTarget::Report(ask_report_name(&suggestion)?))
    }
}

fn ask_report_name(suggestion: &str) -> Result<String> {
    let name: String = Input::new()
        .with_prompt("Report name")
        .with_initial_text(suggestion)
        .validate_with(|input: &String| {
            if input.trim().is_empty() {
                Err("report name must not be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    Ok(name.trim().to_string())
}

/// Ask how to resolve each conflict; "... all" answers apply to the rest
fn decide_conflicts(conflicts: &[PendingConflict]) -> Result<Vec<ConflictMode>> {
    if conflicts.is_empty() {
        return Ok(Vec::new());
    }
    if !is_interactive() {
        bail!("--mode decide needs a terminal; use merge, overwrite or skip");
    }

    const CHOICES: [&str; 6] = [
        "Merge (add the values)",
        "Overwrite",
        "Skip",
        "Merge all remaining",
        "Overwrite all remaining",
        "Skip all remaining",
    ];
    const MODES: [ConflictMode; 3] = [ConflictMode::Merge, ConflictMode::Overwrite, ConflictMode::Skip];

    let mut decisions = Vec::with_capacity(conflicts.len());
    for (i, conflict) in conflicts.iter().enumerate() {
        println!(
            "\n{} {} ({})",
            format!("Conflict {}/{}:", i + 1, conflicts.len()).yellow(),
            conflict.incoming.project.bold(),
            format_tag(&conflict.incoming)
        );
        println!(
            "  existing: edit {}, review {}   file row {}: edit {}, review {}",
            conflict.existing.edit_total,
            conflict.existing.review_total,
            conflict.import_index + 1,
            conflict.incoming.edit_total,
            conflict.incoming.review_total
        );

        let choice = Select::new()
            .items(&CHOICES)
            .default(0)
            .interact()
            .context("Import cancelled")?;
        let mode = MODES[choice % MODES.len()];
        if choice >= MODES.len() {
            decisions.resize(conflicts.len(), mode);
            break;
        }
        decisions.push(mode);
    }
    Ok(decisions)
}
