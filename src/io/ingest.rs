//! Read a delimited price table into a [`SeriesTable`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use crate::core::{Column, SeriesTable};
use crate::error::InputError;

/// The price dataset is tab separated.
pub const DEFAULT_DELIMITER: u8 = b'\t';

/// Header of the date column; matched case-insensitively.
pub const DATE_COLUMN: &str = "Date";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Read the table at `path`.
pub fn read_table<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<SeriesTable, InputError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "reading table");
    read_table_from_reader(File::open(path)?, delimiter)
}

/// Read a table from any reader.
///
/// The date column is the one headed `Date`, or the first column if none
/// is. Every other column is an entity. Empty cells and `NaN`/`NA`/`null`
/// are missing values.
pub fn read_table_from_reader<R: Read>(
    reader: R,
    delimiter: u8,
) -> Result<SeriesTable, InputError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let date_index = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(DATE_COLUMN))
        .unwrap_or(0);

    let entity_indices: Vec<usize> = (0..headers.len()).filter(|&i| i != date_index).collect();
    let mut columns: Vec<Column> = entity_indices
        .iter()
        .map(|&i| Column {
            name: headers[i].to_string(),
            values: Vec::new(),
        })
        .collect();
    let mut dates = Vec::new();

    for (i, record) in reader.records().enumerate() {
        let record = record?;
        // 1-based, counting the header line.
        let row = i + 2;

        let raw_date = record.get(date_index).unwrap_or("");
        let date = parse_date(raw_date).ok_or_else(|| InputError::InvalidDate {
            row,
            value: raw_date.to_string(),
        })?;
        dates.push(date);

        for (column, &field) in columns.iter_mut().zip(&entity_indices) {
            let raw = record.get(field).unwrap_or("");
            let value = parse_value(raw).map_err(|_| InputError::InvalidNumber {
                row,
                column: column.name.clone(),
                value: raw.to_string(),
            })?;
            column.values.push(value);
        }
    }

    debug!(rows = dates.len(), entities = columns.len(), "table read");
    SeriesTable::new(dates, columns)
}

/// Parse a date in one of the accepted formats; `YYYY-MM` means the 1st.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    // Timestamps such as "2024-01-01 00:00:00" keep only the date part.
    let raw = raw.split_whitespace().next().unwrap_or(raw);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d").ok())
}

/// `Ok(None)` for a missing cell, `Err` for text that is not a number.
///
/// Separators are not interpreted: `1,5` and `1,234.5` are both errors.
pub fn parse_value(raw: &str) -> Result<Option<f64>, std::num::ParseFloatError> {
    let raw = raw.trim();
    if raw.is_empty()
        || raw.eq_ignore_ascii_case("nan")
        || raw.eq_ignore_ascii_case("na")
        || raw.eq_ignore_ascii_case("null")
    {
        return Ok(None);
    }
    let value: f64 = raw.parse()?;
    Ok(Some(value).filter(|v| v.is_finite()))
}
