//! CSV decoder - raw delimited text to normalized import rows
//!
//! Two dialects are understood:
//! - a header naming `project`, `edit`, `review` and optionally `month`, `year`
//!   (any order, any case, quotes ignored)
//! - the headerless legacy summary export, where wide rows (17+ columns with a
//!   numeric column 15) carry `[project, edit, review]` in columns 1, 15 and 16
//!   and narrow rows carry them in columns 0, 1 and 2
//!
//! Decoding is best effort: rows without a project or with unreadable totals
//! are dropped, and rows with an unreadable month/year become undated.

use serde::Serialize;

use crate::domain::result::Result;
use crate::domain::Period;

/// Summary rows at least this wide use the wide column layout
const SUMMARY_WIDE_MIN_COLUMNS: usize = 17;
const SUMMARY_WIDE_COLUMNS: [usize; 3] = [1, 15, 16];
const SUMMARY_NARROW_COLUMNS: [usize; 3] = [0, 1, 2];

/// One accepted row of an import file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRow {
    pub project: String,
    pub edit_total: u64,
    pub review_total: u64,
    /// `None` for rows that need a target period or report
    pub period: Option<Period>,
}

/// Decoded rows plus which kinds of rows were seen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodedImport {
    pub rows: Vec<ImportRow>,
    pub has_dated_rows: bool,
    pub has_undated_rows: bool,
}

impl DecodedImport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    fn push(&mut self, row: ImportRow) {
        if row.period.is_some() {
            self.has_dated_rows = true;
        } else {
            self.has_undated_rows = true;
        }
        self.rows.push(row);
    }
}

/// Column positions found in a header row
#[derive(Debug, Clone, Copy)]
struct HeaderColumns {
    project: usize,
    edit: usize,
    review: usize,
    /// Only set when both month and year are present
    month_year: Option<(usize, usize)>,
}

impl HeaderColumns {
    fn detect(header: &[String]) -> Option<Self> {
        let names: Vec<String> = header
            .iter()
            .map(|h| strip_quotes(h).to_lowercase())
            .collect();
        let find = |name: &str| names.iter().position(|n| n == name);

        let month_year = match (find("month"), find("year")) {
            (Some(month), Some(year)) => Some((month, year)),
            _ => None,
        };

        Some(Self {
            project: find("project")?,
            edit: find("edit")?,
            review: find("review")?,
            month_year,
        })
    }
}

/// Decode CSV text into import rows
///
/// An empty result means the file was not recognized; the caller reports it
/// as an invalid file.
pub fn decode_csv(text: &str) -> Result<DecodedImport> {
    let rows = read_rows(text)?;
    let Some((header, body)) = rows.split_first() else {
        return Ok(DecodedImport::default());
    };

    match HeaderColumns::detect(header) {
        Some(columns) => Ok(decode_with_header(columns, body)),
        None => Ok(decode_summary(body)),
    }
}

/// Split text into rows of trimmed fields, skipping blank lines
fn read_rows(text: &str) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let fields: Vec<String> = record.iter().map(str::to_string).collect();
        if fields.iter().all(|f| f.is_empty()) {
            continue;
        }
        rows.push(fields);
    }
    Ok(rows)
}

fn decode_with_header(columns: HeaderColumns, body: &[Vec<String>]) -> DecodedImport {
    let mut decoded = DecodedImport::default();

    for cols in body {
        let field = |index: usize| cols.get(index).map(String::as_str).unwrap_or("");

        let project = strip_quotes(field(columns.project));
        let (Some(edit_total), Some(review_total)) =
            (parse_count(field(columns.edit)), parse_count(field(columns.review)))
        else {
            continue;
        };
        if project.is_empty() {
            continue;
        }

        let period = columns
            .month_year
            .and_then(|(month, year)| parse_period(field(month), field(year)));

        decoded.push(ImportRow {
            project,
            edit_total,
            review_total,
            period,
        });
    }

    decoded
}

fn decode_summary(body: &[Vec<String>]) -> DecodedImport {
    let mut decoded = DecodedImport::default();

    for row in body {
        let cols: Vec<String> = row.iter().map(|c| strip_quotes(c)).collect();
        if cols.len() < 2 {
            continue;
        }

        let wide = cols.len() >= SUMMARY_WIDE_MIN_COLUMNS
            && parse_leading_int(&cols[SUMMARY_WIDE_COLUMNS[1]]).is_some();
        let [p, e, r] = if wide {
            SUMMARY_WIDE_COLUMNS
        } else {
            SUMMARY_NARROW_COLUMNS
        };
        let field = |index: usize| cols.get(index).map(String::as_str).unwrap_or("");

        let project = field(p).to_string();
        let (Some(edit_total), Some(review_total)) = (parse_count(field(e)), parse_count(field(r)))
        else {
            continue;
        };
        if project.is_empty() {
            continue;
        }

        decoded.push(ImportRow {
            project,
            edit_total,
            review_total,
            period: None,
        });
    }

    decoded
}

/// Trim and drop every double quote left after CSV unquoting
fn strip_quotes(value: &str) -> String {
    value.trim().replace('"', "")
}

/// Month (1-12) and year; anything else means "undated"
fn parse_period(month: &str, year: &str) -> Option<Period> {
    let month = u32::try_from(parse_leading_int(month)?).ok()?;
    let year = i32::try_from(parse_leading_int(year)?).ok()?;
    Period::from_one_based(year, month).ok()
}

/// A non-negative count
fn parse_count(value: &str) -> Option<u64> {
    u64::try_from(parse_leading_int(value)?).ok()
}

/// Integer prefix of a string: optional sign, then at least one digit
///
/// Trailing text is ignored, so `"12abc"` reads as 12 and `"3.7"` as 3.
pub(crate) fn parse_leading_int(value: &str) -> Option<i64> {
    let value = value.trim();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
