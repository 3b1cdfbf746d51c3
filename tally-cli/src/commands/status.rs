//! Status command - dataset summary

use anyhow::Result;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use super::get_context;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let status = ctx.status_service.get_status(ctx.collection())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Report Data Status".bold());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec!["Records", &status.total_records.to_string()]);
    table.add_row(vec!["  by month", &status.dated_records.to_string()]);
    table.add_row(vec!["  in reports", &status.report_records.to_string()]);
    table.add_row(vec!["Projects", &status.total_projects.to_string()]);
    table.add_row(vec!["Edit total", &status.edit_total.to_string()]);
    table.add_row(vec!["Review total", &status.review_total.to_string()]);
    table.add_row(vec!["Snapshots", &status.total_snapshots.to_string()]);
    table.add_row(vec!["Storage", &status.storage]);

    println!("{}", table);
    println!();

    if let (Some(earliest), Some(latest)) = (&status.date_range.earliest, &status.date_range.latest) {
        println!("Months: {} to {}", earliest, latest);
        println!();
    }

    if !status.reports.is_empty() {
        println!("{}", "Reports".bold());
        for name in &status.reports {
            println!("  • {}", name);
        }
    }

    Ok(())
}
