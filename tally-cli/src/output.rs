//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, ContentArrangement, Table};
use tally_core::services::Series;
use tally_core::{Record, Tag};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Period key or report name
pub fn format_tag(record: &Record) -> String {
    match &record.tag {
        Tag::Dated(period) => period.key(),
        Tag::Report(name) => name.clone(),
    }
}

fn number(value: u64) -> Cell {
    Cell::new(value).set_alignment(CellAlignment::Right)
}

/// Records with their 1-based list positions
pub fn record_table<'a>(rows: impl IntoIterator<Item = (usize, &'a Record)>) -> Table {
    let mut table = create_table();
    table.set_header(vec!["#", "Project", "Edit", "Review", "Month / Report"]);
    for (index, record) in rows {
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&record.project),
            number(record.edit_total),
            number(record.review_total),
            Cell::new(format_tag(record)),
        ]);
    }
    table
}

/// One row per series label
pub fn series_table(series: &Series, label_header: &str, highlighted: &[bool]) -> Table {
    let mut table = create_table();
    table.set_header(vec![label_header, "Edit", "Review"]);
    for (i, label) in series.labels.iter().enumerate() {
        let label = if highlighted.get(i).copied().unwrap_or(false) {
            label.bold().underline().to_string()
        } else {
            label.clone()
        };
        table.add_row(vec![Cell::new(label), number(series.edit[i]), number(series.review[i])]);
    }
    table
}

/// Horizontal bar of `width` cells scaled against `max`
pub fn bar(value: u64, max: u64, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let filled = ((value as f64 / max as f64) * width as f64).round() as usize;
    "█".repeat(filled.min(width))
}
