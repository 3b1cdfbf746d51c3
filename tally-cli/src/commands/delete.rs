//! Delete command - remove records by list position

use anyhow::{bail, Result};
use colored::Colorize;
use dialoguer::Confirm;
use tally_core::services::{batch_delete, delete_one};

use super::{get_context, is_interactive, to_indices};
use crate::output::record_table;

pub fn run(positions: Vec<usize>, force: bool, json: bool) -> Result<()> {
    if positions.is_empty() {
        bail!("Pass the numbers of the records to delete (see `tally list`)");
    }

    let mut ctx = get_context()?;
    let indices = to_indices(&positions);

    let selected: Vec<(usize, _)> = indices
        .iter()
        .filter_map(|&i| ctx.collection().get(i).map(|r| (i, r)))
        .collect();
    if selected.is_empty() {
        bail!("None of the given record numbers exist");
    }

    if !force {
        if !is_interactive() {
            bail!("Refusing to delete without confirmation; pass --force");
        }
        println!("{}", record_table(selected.iter().copied()));
        if !Confirm::new()
            .with_prompt(format!("Delete {} record(s)?", selected.len()))
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    let deletion = match indices.as_slice() {
        [index] => delete_one(ctx.collection_mut(), *index)?,
        _ => batch_delete(ctx.collection_mut(), &indices),
    };
    ctx.persist()?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "deleted": deletion.count(),
                "ignored": deletion.ignored,
            }))?
        );
        return Ok(());
    }

    println!("{} Deleted {} record(s)", "✓".green(), deletion.count());
    if deletion.ignored > 0 {
        println!(
            "{}",
            format!("{} duplicate or unknown number(s) ignored", deletion.ignored).dimmed()
        );
    }
    Ok(())
}
