//! CLI command implementations

pub mod add;
pub mod chart;
pub mod config;
pub mod delete;
pub mod edit;
pub mod export;
pub mod import;
pub mod list;
pub mod logs;
pub mod reports;
pub mod retag;
pub mod snapshot;
pub mod status;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use tally_core::domain::report_names;
use tally_core::services::filter::{available_periods, full_range};
use tally_core::services::{RangeBounds, ViewKind, ViewMode};
use tally_core::{Collection, EntryPoint, LogEvent, LoggingService, Period, TallyContext};

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TALLY_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".tally"))
        .ok_or_else(|| anyhow!("Could not find home directory; set TALLY_DIR"))
}

/// Get or create the tally context
pub fn get_context() -> Result<TallyContext> {
    let data_dir = get_data_dir()?;

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    TallyContext::new(&data_dir).context("Failed to initialize tally context")
}

/// Whether prompts can be shown
pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stdout)
}

/// Parse `YYYY-MM` (one-based month)
pub fn parse_period(value: &str) -> Result<Period> {
    let Some((year, month)) = value.trim().split_once('-') else {
        bail!("'{}' is not a month; use YYYY-MM", value);
    };
    let year: i32 = year.parse().with_context(|| format!("invalid year in '{}'", value))?;
    let month: u32 = month.parse().with_context(|| format!("invalid month in '{}'", value))?;
    Ok(Period::from_one_based(year, month)?)
}

/// 1-based list positions to collection indices; 0 maps past the end and is ignored
pub fn to_indices(positions: &[usize]) -> Vec<usize> {
    positions
        .iter()
        .map(|&p| p.checked_sub(1).unwrap_or(usize::MAX))
        .collect()
}

/// View selection shared by list, chart and export
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// View type: total, monthly, singleMonthProject, aggregated (default from settings)
    #[arg(long)]
    pub view: Option<String>,
    /// Report to show in the aggregated view
    #[arg(long)]
    pub report: Option<String>,
    /// Month to show in the single-month view (YYYY-MM)
    #[arg(long)]
    pub month: Option<String>,
    /// First month of the range (YYYY-MM)
    #[arg(long)]
    pub from: Option<String>,
    /// Last month of the range (YYYY-MM)
    #[arg(long)]
    pub to: Option<String>,
}

impl ViewArgs {
    /// Whether any view option was given
    pub fn is_set(&self) -> bool {
        self.view.is_some()
            || self.report.is_some()
            || self.month.is_some()
            || self.from.is_some()
            || self.to.is_some()
    }

    /// Resolve to a view mode, filling gaps from the data
    pub fn resolve(&self, default_kind: ViewKind, collection: &Collection) -> Result<ViewMode> {
        let kind = match &self.view {
            Some(view) => view.parse()?,
            None if self.report.is_some() => ViewKind::Aggregated,
            None if self.month.is_some() => ViewKind::SingleMonthProject,
            None if self.from.is_some() || self.to.is_some() => ViewKind::Total,
            None => default_kind,
        };

        let mode = match kind {
            ViewKind::Aggregated => ViewMode::Aggregated {
                report: self
                    .report
                    .clone()
                    .or_else(|| report_names(collection).into_iter().next()),
            },
            ViewKind::SingleMonthProject => {
                let period = match &self.month {
                    Some(month) => parse_period(month)?,
                    None => match available_periods(collection).first() {
                        Some(latest) => *latest,
                        None => bail!("No dated records yet; pass --month YYYY-MM"),
                    },
                };
                ViewMode::SingleMonth(period)
            }
            ViewKind::Total | ViewKind::Monthly => {
                let mut bounds = full_range(collection).unwrap_or_default();
                if let Some(from) = &self.from {
                    let start = parse_period(from)?;
                    bounds.start_year = Some(start.year());
                    bounds.start_month = Some(start.month());
                }
                if let Some(to) = &self.to {
                    let end = parse_period(to)?;
                    bounds.end_year = Some(end.year());
                    bounds.end_month = Some(end.month());
                }
                ViewMode::Range(bounds)
            }
        };
        Ok(mode)
    }
}

/// Describe a view for headings
pub fn describe_view(mode: &ViewMode) -> String {
    match mode {
        ViewMode::Aggregated { report: Some(report) } => format!("Report: {}", report),
        ViewMode::Aggregated { report: None } => "No report selected".to_string(),
        ViewMode::SingleMonth(period) => format!("Month: {}", period),
        ViewMode::Range(RangeBounds {
            start_year: Some(sy),
            start_month: Some(sm),
            end_year: Some(ey),
            end_month: Some(em),
        }) => format!("{}-{:02} to {}-{:02}", sy, sm + 1, ey, em + 1),
        ViewMode::Range(_) => "All months".to_string(),
    }
}
