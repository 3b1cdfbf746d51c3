//! Reports command - named reports with their totals

use anyhow::Result;
use colored::Colorize;
use comfy_table::{Cell, CellAlignment};
use serde::Serialize;
use tally_core::domain::report_names;
use tally_core::services::{filter, totals, ViewMode};

use super::get_context;
use crate::output::create_table;

#[derive(Serialize)]
struct ReportRow {
    name: String,
    records: usize,
    edit: u64,
    review: u64,
}

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let collection = ctx.collection();

    let rows: Vec<ReportRow> = report_names(collection)
        .into_iter()
        .map(|name| {
            let records = filter(collection, &ViewMode::Aggregated { report: Some(name.clone()) });
            let sums = totals(records.iter().copied());
            ReportRow {
                name,
                records: records.len(),
                edit: sums.edit,
                review: sums.review,
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No reports yet.");
        println!("{}", "Import a file without months or use `tally assign` to create one.".dimmed());
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["Report", "Records", "Edit", "Review"]);
    for row in &rows {
        table.add_row(vec![
            Cell::new(&row.name),
            Cell::new(row.records).set_alignment(CellAlignment::Right),
            Cell::new(row.edit).set_alignment(CellAlignment::Right),
            Cell::new(row.review).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{}", table);
    Ok(())
}
