use std::collections::HashMap;

use crate::error::{ImporterError, Result};

pub type CsvRow = HashMap<String, String>;

pub const REQUIRED_COLUMNS: [&str; 6] = ["Count", "Name", "Edition", "Condition", "Language", "Foil"];
pub const OPTIONAL_COLUMNS: [&str; 5] = [
    "Collector Number",
    "Tags",
    "Alter",
    "Proxy",
    "Purchase Price",
];

/// Reads an export into header-keyed rows.
///
/// The first non-blank line is the header. Rows whose field count differs
/// from the header's are dropped.
pub fn parse_rows(content: &str) -> Result<Vec<CsvRow>> {
    let mut records = reader(content);
    let mut header: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for record in records.records() {
        let record = record?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        match &header {
            None => header = Some(record.iter().map(|f| f.trim().to_string()).collect()),
            Some(columns) if columns.len() == record.len() => rows.push(
                columns
                    .iter()
                    .cloned()
                    .zip(record.iter().map(str::to_string))
                    .collect(),
            ),
            Some(columns) => tracing::debug!(
                expected = columns.len(),
                found = record.len(),
                "Dropping CSV line with mismatched field count"
            ),
        }
    }

    Ok(rows)
}

/// Checks that the header carries every required column.
pub fn validate_header(content: &str) -> Result<()> {
    let mut records = reader(content);
    let header = records
        .records()
        .filter_map(|record| record.ok())
        .find(|record| record.iter().any(|field| !field.trim().is_empty()))
        .ok_or_else(|| ImporterError::ValidationError("CSV file is empty".to_string()))?;

    let columns: Vec<&str> = header.iter().map(str::trim).collect();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|required| !columns.contains(required))
        .collect();

    if !missing.is_empty() {
        return Err(ImporterError::ValidationError(format!(
            "Invalid CSV format, missing required columns: {}",
            missing.join(", ")
        )));
    }
    Ok(())
}

fn reader(content: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.trim_start_matches('\u{feff}').as_bytes())
}
