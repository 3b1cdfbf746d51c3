//! Chart command - aggregated series drawn in the terminal

use anyhow::{bail, Result};
use colored::Colorize;
use comfy_table::{Cell, CellAlignment};
use tally_core::config::ChartType;
use tally_core::services::{
    aggregate_by_month, aggregate_by_project, filter, highlight, pie_slices, EnglishMonths, Measure,
    Series, ViewKind,
};
use tally_core::Record;

use super::{describe_view, get_context, ViewArgs};
use crate::output::{bar, create_table, series_table};

const BAR_WIDTH: usize = 30;

pub struct ChartArgs {
    pub view: ViewArgs,
    /// "project" or "month"
    pub by: Option<String>,
    pub chart: Option<String>,
    pub measure: String,
    pub search: Option<String>,
    pub json: bool,
}

fn parse_measure(value: &str) -> Result<Measure> {
    match value.trim().to_lowercase().as_str() {
        "edit" => Ok(Measure::Edit),
        "review" => Ok(Measure::Review),
        other => bail!("Unknown measure '{}': use edit or review", other),
    }
}

pub fn run(args: ChartArgs) -> Result<()> {
    let ctx = get_context()?;
    let collection = ctx.collection();

    let mode = args.view.resolve(ctx.config.default_view_type, collection)?;
    let records: Vec<&Record> = filter(collection, &mode);

    // The monthly view groups by month unless told otherwise
    let kind = match &args.view.view {
        Some(view) => view.parse()?,
        None => ctx.config.default_view_type,
    };
    let by_month = match args.by.as_deref().map(str::to_lowercase).as_deref() {
        Some("month") => true,
        Some("project") => false,
        Some(other) => bail!("Unknown grouping '{}': use project or month", other),
        None => kind == ViewKind::Monthly,
    };

    let series = if by_month {
        aggregate_by_month(records.iter().copied(), &EnglishMonths)
    } else {
        aggregate_by_project(records.iter().copied())
    };

    let chart = match &args.chart {
        Some(chart) => chart.parse()?,
        None => ctx.config.default_chart_type,
    };

    if args.json {
        let body = if chart == ChartType::Pie {
            serde_json::to_value(pie_slices(&series, parse_measure(&args.measure)?))?
        } else {
            serde_json::to_value(&series)?
        };
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!("{}", describe_view(&mode).bold());
    if series.is_empty() {
        println!("Nothing to chart.");
        return Ok(());
    }

    let marks = match &args.search {
        Some(term) => highlight(&series, term),
        None => vec![false; series.len()],
    };
    let label_header = if by_month { "Month" } else { "Project" };

    match chart {
        ChartType::Pie => draw_pie(&series, parse_measure(&args.measure)?, label_header),
        ChartType::Stacked => draw_stacked(&series, label_header, &marks),
        ChartType::Bar | ChartType::Line => {
            println!("{}", series_table(&series, label_header, &marks));
            draw_bars(&series, &marks);
        }
    }
    Ok(())
}

fn draw_bars(series: &Series, marks: &[bool]) {
    let max = series.edit.iter().chain(&series.review).copied().max().unwrap_or(0);
    let width = series.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    println!();
    for (i, label) in series.labels.iter().enumerate() {
        let label = format!("{:<width$}", label, width = width);
        let label = if marks[i] { label.bold().to_string() } else { label };
        println!("{} {} {}", label, bar(series.edit[i], max, BAR_WIDTH).green(), series.edit[i]);
        println!(
            "{} {} {}",
            " ".repeat(width),
            bar(series.review[i], max, BAR_WIDTH).yellow(),
            series.review[i]
        );
    }
    println!("\n{} edit  {} review", "█".green(), "█".yellow());
}

fn draw_stacked(series: &Series, label_header: &str, marks: &[bool]) {
    let max = series
        .edit
        .iter()
        .zip(&series.review)
        .map(|(e, r)| e.saturating_add(*r))
        .max()
        .unwrap_or(0);

    let mut table = create_table();
    table.set_header(vec![label_header, "Edit + Review", "Total"]);
    for (i, label) in series.labels.iter().enumerate() {
        let total = series.edit[i].saturating_add(series.review[i]);
        let edit_part = bar(series.edit[i], max, BAR_WIDTH);
        let review_part = bar(total, max, BAR_WIDTH)
            .chars()
            .skip(edit_part.chars().count())
            .collect::<String>();
        let label = if marks[i] { label.bold().to_string() } else { label.clone() };
        table.add_row(vec![
            Cell::new(label),
            Cell::new(format!("{}{}", edit_part.green(), review_part.yellow())),
            Cell::new(total).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{}", table);
}

fn draw_pie(series: &Series, measure: Measure, label_header: &str) {
    let pie = pie_slices(series, measure);
    let sum = pie.values.iter().fold(0u64, |acc, v| acc.saturating_add(*v));
    if sum == 0 {
        println!("Nothing to chart.");
        return;
    }

    let mut table = create_table();
    table.set_header(vec![label_header, "Value", "Share"]);
    for (label, value) in pie.labels.iter().zip(&pie.values) {
        let share = *value as f64 * 100.0 / sum as f64;
        table.add_row(vec![
            Cell::new(label),
            Cell::new(value).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:>5.1}% {}", share, bar(*value, sum, BAR_WIDTH))),
        ]);
    }
    println!("{}", table);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_measure() {
        assert_eq!(parse_measure("Review").unwrap(), Measure::Review);
        assert!(parse_measure("both").is_err());
    }
}
