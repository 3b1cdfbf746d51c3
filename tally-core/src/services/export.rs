//! Export codecs - CSV and JSON renderings of the collection

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::domain::result::{Error, Result};
use crate::domain::{Record, Tag};

const CSV_HEADER: [&str; 6] = ["Project", "Edit", "Review", "Month", "Year", "ReportName"];
const FILE_NAME_PREFIX: &str = "transifex-report-";
const FILE_NAME_SUFFIX_LEN: usize = 5;

/// Render records as CSV
///
/// Dated rows carry a one-based month and the year with an empty report name;
/// aggregated rows leave month and year empty.
pub fn export_csv<'a>(records: impl IntoIterator<Item = &'a Record>) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for record in records {
        let edit = record.edit_total.to_string();
        let review = record.review_total.to_string();
        let (month, year, report) = match &record.tag {
            Tag::Dated(period) => (
                period.month_number().to_string(),
                period.year().to_string(),
                String::new(),
            ),
            Tag::Report(name) => (String::new(), String::new(), name.clone()),
        };
        writer.write_record([
            record.project.as_str(),
            edit.as_str(),
            review.as_str(),
            month.as_str(),
            year.as_str(),
            report.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::storage(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Render records as the JSON array accepted by JSON import
pub fn export_json<'a>(records: impl IntoIterator<Item = &'a Record>) -> Result<String> {
    let records: Vec<&Record> = records.into_iter().collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// `transifex-report-XXXXX.csv` with a random alphanumeric suffix
pub fn export_file_name() -> String {
    export_file_name_with(&mut rand::thread_rng())
}

pub fn export_file_name_with(rng: &mut impl Rng) -> String {
    let suffix: String = (0..FILE_NAME_SUFFIX_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect();
    format!("{FILE_NAME_PREFIX}{suffix}.csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Period;
    use crate::services::decode::decode_csv;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_export_csv_layout() {
        let records = vec![
            Record::dated("Foo, Inc", 10, 5, Period::new(2024, 2).unwrap()),
            Record::report("Say \"hi\"", 1, 0, "Q1"),
        ];
        let csv = export_csv(&records).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Project,Edit,Review,Month,Year,ReportName");
        assert_eq!(lines[1], "\"Foo, Inc\",10,5,3,2024,");
        assert_eq!(lines[2], "\"Say \"\"hi\"\"\",1,0,,,Q1");
    }

    #[test]
    fn test_exported_dated_rows_import_back() {
        let march = Period::new(2024, 2).unwrap();
        let records = vec![Record::dated("Foo, Inc", 10, 5, march)];
        let decoded = decode_csv(&export_csv(&records).unwrap()).unwrap();

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.rows[0].project, "Foo, Inc");
        assert_eq!(decoded.rows[0].period, Some(march));
    }

    #[test]
    fn test_export_json_is_array() {
        let records = vec![Record::report("A", 1, 2, "Q1")];
        let json = export_json(&records).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["reportName"], "Q1");
    }

    #[test]
    fn test_export_file_name() {
        let mut rng = StdRng::seed_from_u64(7);
        let name = export_file_name_with(&mut rng);
        assert!(name.starts_with("transifex-report-"));
        assert!(name.ends_with(".csv"));
        let suffix = &name["transifex-report-".len()..name.len() - 4];
        assert_eq!(suffix.len(), 5);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
