//! Edit command - change fields of one record

use anyhow::{bail, Result};
use colored::Colorize;
use tally_core::services::{edit_record, RecordEdit};

use super::get_context;
use crate::output::record_table;

pub fn run(position: usize, project: Option<String>, edit: Option<u64>, review: Option<u64>) -> Result<()> {
    let mut edits = Vec::new();
    if let Some(project) = project {
        edits.push(RecordEdit::Project(project));
    }
    if let Some(total) = edit {
        edits.push(RecordEdit::EditTotal(total));
    }
    if let Some(total) = review {
        edits.push(RecordEdit::ReviewTotal(total));
    }
    if edits.is_empty() {
        bail!("Nothing to change; pass --project, --edit or --review");
    }

    let Some(index) = position.checked_sub(1) else {
        bail!("Record numbers start at 1");
    };

    let mut ctx = get_context()?;
    for change in edits {
        edit_record(ctx.collection_mut(), index, change)?;
    }
    ctx.persist()?;

    println!("{} Record {} updated", "✓".green(), position);
    if let Some(record) = ctx.collection().get(index) {
        println!("{}", record_table([(index, record)]));
    }
    Ok(())
}
