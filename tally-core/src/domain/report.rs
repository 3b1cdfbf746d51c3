//! Report registry and label collation
//!
//! The registry is derived from the records; nothing stores it separately.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::domain::record::Record;
use crate::domain::result::{Error, Result};

/// Distinct report names across aggregated records, sorted case-insensitively
pub fn report_names<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names: Vec<String> = records
        .into_iter()
        .filter_map(Record::report_name)
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_string()))
        .map(str::to_string)
        .collect();
    names.sort_by(|a, b| caseless_cmp(a, b));
    names
}

/// Pick a name for a new report that does not collide with `existing`
///
/// Comparison is case-insensitive; collisions get " (2)", " (3)", ... appended
/// to the trimmed request.
pub fn unique_report_name<'a>(
    requested: &str,
    existing: impl IntoIterator<Item = &'a str>,
) -> Result<String> {
    let trimmed = requested.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("report name must not be empty"));
    }

    let taken: HashSet<String> = existing.into_iter().map(str::to_lowercase).collect();
    let mut candidate = trimmed.to_string();
    let mut suffix = 2;
    while taken.contains(&candidate.to_lowercase()) {
        candidate = format!("{trimmed} ({suffix})");
        suffix += 1;
    }
    Ok(candidate)
}

/// Case-insensitive ordering with the exact text as tie-breaker
pub fn caseless_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Case-insensitive ordering that compares digit runs by value ("item 2" < "item 10")
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();
    let mut a_chars = a_lower.chars().peekable();
    let mut b_chars = b_lower.chars().peekable();

    loop {
        match (a_chars.peek().copied(), b_chars.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let left = take_number(&mut a_chars);
                let right = take_number(&mut b_chars);
                let ordering = left
                    .trim_start_matches('0')
                    .len()
                    .cmp(&right.trim_start_matches('0').len())
                    .then_with(|| left.trim_start_matches('0').cmp(right.trim_start_matches('0')));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                a_chars.next();
                b_chars.next();
            }
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        digits.push(c);
        chars.next();
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Period;

    #[test]
    fn test_report_names_are_distinct_and_sorted() {
        let jan = Period::new(2024, 0).unwrap();
        let records = vec![
            Record::report("A", 1, 1, "beta"),
            Record::report("B", 1, 1, "Alpha"),
            Record::dated("C", 1, 1, jan),
            Record::report("D", 1, 1, "beta"),
        ];
        assert_eq!(report_names(&records), vec!["Alpha", "beta"]);
    }

    #[test]
    fn test_unique_report_name_disambiguates_case_insensitively() {
        let existing = ["Q1", "q1 (2)"];
        assert_eq!(unique_report_name("  q1 ", existing).unwrap(), "q1 (3)");
        assert_eq!(unique_report_name("Q2", existing).unwrap(), "Q2");
        assert!(unique_report_name("   ", existing).is_err());
    }

    #[test]
    fn test_natural_cmp() {
        assert_eq!(natural_cmp("item 2", "item 10"), Ordering::Less);
        assert_eq!(natural_cmp("2024-02", "2024-10"), Ordering::Less);
        assert_eq!(natural_cmp("Beta", "alpha"), Ordering::Greater);
    }
}
