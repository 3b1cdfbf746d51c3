//! Add command - manual entry of one record

use anyhow::{bail, Result};
use colored::Colorize;
use dialoguer::Confirm;
use tally_core::services::{add_manual, add_or_update, Conflict, ConflictMode, ManualDecision, Outcome};
use tally_core::{OperationResult, Record};

use super::{get_context, is_interactive, parse_period};
use crate::output::format_tag;

pub struct AddArgs {
    pub project: String,
    pub edit: u64,
    pub review: u64,
    pub month: Option<String>,
    pub report: Option<String>,
    /// `None` asks on conflict
    pub mode: Option<ConflictMode>,
    pub json: bool,
}

fn ask(conflict: &Conflict, incoming: &Record) -> Option<ManualDecision> {
    let existing = &conflict.existing;
    println!(
        "\n{}",
        format!(
            "'{}' already has an entry for {} (edit {}, review {}).",
            existing.project,
            format_tag(existing),
            existing.edit_total,
            existing.review_total
        )
        .yellow()
    );
    println!(
        "{}",
        format!(
            "Yes replaces it with edit {}, review {}. No adds the new values to it.",
            incoming.edit_total, incoming.review_total
        )
        .dimmed()
    );

    let answer = Confirm::new()
        .with_prompt("Replace the existing values?")
        .default(false)
        .interact_opt()
        .ok()
        .flatten()?;
    Some(if answer {
        ManualDecision::Accept
    } else {
        ManualDecision::Decline
    })
}

pub fn run(args: AddArgs) -> Result<()> {
    let record = match (&args.month, &args.report) {
        (Some(month), None) => Record::dated(args.project.trim(), args.edit, args.review, parse_period(month)?),
        (None, Some(report)) => Record::report(args.project.trim(), args.edit, args.review, report.trim()),
        (Some(_), Some(_)) => bail!("Use either --month or --report, not both"),
        (None, None) => bail!("A record needs --month YYYY-MM or --report NAME"),
    };

    let mut ctx = get_context()?;

    let outcome = match args.mode {
        Some(mode) => {
            record.validate()?;
            Some(add_or_update(ctx.collection_mut(), record, mode))
        }
        None => {
            if !is_interactive() && ctx.collection().find(&record).is_some() {
                bail!("A matching record exists; pass --mode merge, overwrite or skip");
            }
            let incoming = record.clone();
            add_manual(ctx.collection_mut(), record, |conflict| ask(conflict, &incoming))?
        }
    };

    let Some(outcome) = outcome else {
        if args.json {
            println!("{}", serde_json::to_string_pretty(&OperationResult::<Outcome>::fail("cancelled"))?);
        } else {
            println!("{}", "Cancelled, nothing changed".dimmed());
        }
        return Ok(());
    };

    if outcome != Outcome::Skipped {
        ctx.persist()?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(outcome))?);
        return Ok(());
    }

    let message = match outcome {
        Outcome::Inserted => "Record added",
        Outcome::Merged => "Values added to the existing record",
        Outcome::Overwritten => "Existing record replaced",
        Outcome::Skipped => "Existing record kept, nothing changed",
    };
    println!("{} {}", "✓".green(), message);
    Ok(())
}
