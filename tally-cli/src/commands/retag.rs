//! Assign and redate commands - move records between months and reports

use anyhow::{bail, Result};
use colored::Colorize;
use tally_core::services::{assign_to_report, reassign_date, BatchOutcome, BatchSummary};

use super::{get_context, parse_period, to_indices};

fn report(outcome: &BatchOutcome, target: &str, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&BatchSummary::from(outcome))?);
        return Ok(());
    }

    println!("{} Moved {} record(s) to {}", "✓".green(), outcome.affected, target.bold());
    if outcome.ignored > 0 {
        println!(
            "{}",
            format!("{} record number(s) ignored (unknown, repeated or already there)", outcome.ignored).dimmed()
        );
    }
    Ok(())
}

/// Move month records into a named report
pub fn assign(positions: Vec<usize>, report_name: String, json: bool) -> Result<()> {
    if positions.is_empty() {
        bail!("Pass the numbers of the records to move (see `tally list`)");
    }
    let mut ctx = get_context()?;
    let outcome = assign_to_report(ctx.collection_mut(), &to_indices(&positions), &report_name)?;
    if outcome.affected > 0 {
        ctx.persist()?;
    }
    report(&outcome, report_name.trim(), json)
}

/// Give records a month, including records currently in a report
pub fn redate(positions: Vec<usize>, month: String, json: bool) -> Result<()> {
    if positions.is_empty() {
        bail!("Pass the numbers of the records to move (see `tally list`)");
    }
    let period = parse_period(&month)?;
    let mut ctx = get_context()?;
    let outcome = reassign_date(ctx.collection_mut(), &to_indices(&positions), period);
    if outcome.affected > 0 {
        ctx.persist()?;
    }
    report(&outcome, &period.key(), json)
}
