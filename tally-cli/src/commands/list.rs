//! List command - show records, optionally filtered, searched and sorted

use anyhow::Result;
use colored::Colorize;
use tally_core::services::{filter, search, sort_records, totals, SortDirection, SortField};
use tally_core::Record;

use super::{describe_view, get_context, ViewArgs};
use crate::output::record_table;

pub fn run(view: ViewArgs, term: Option<String>, sort: Option<String>, desc: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let collection = ctx.collection();

    let (heading, mut visible): (String, Vec<&Record>) = if view.is_set() {
        let mode = view.resolve(ctx.config.default_view_type, collection)?;
        (describe_view(&mode), filter(collection, &mode))
    } else {
        ("All records".to_string(), collection.iter().collect())
    };

    if let Some(term) = &term {
        visible = search(visible, term);
    }
    if let Some(field) = &sort {
        let field: SortField = field.parse()?;
        let direction = if desc { SortDirection::Desc } else { SortDirection::Asc };
        sort_records(&mut visible, field, direction);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
        return Ok(());
    }

    if visible.is_empty() {
        println!("No records found.");
        return Ok(());
    }

    println!("{}", heading.bold());
    let rows = visible
        .iter()
        .filter_map(|r| collection.position_of(r).map(|i| (i, *r)));
    println!("{}", record_table(rows));

    let sums = totals(visible.iter().copied());
    println!(
        "{} records, edit total {}, review total {}",
        visible.len(),
        sums.edit.to_string().bold(),
        sums.review.to_string().bold()
    );
    Ok(())
}
