//! Per-field normalization rules applied during Map-and-Write.

use crate::error::RowFieldError;
use crate::types::{CellValue, RawTimestamp};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::collections::BTreeMap;

/// Vendor timestamp layout, e.g. `15/06/2024 08:30:00`
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Text renderings of a missing value produced by upstream numeric coercion.
pub const NULL_MARKERS: &[&str] = &["nan", "NaN", "None", "null", "<NA>"];

/// Day number of 1899-12-30 counted from 0001-01-01 (spreadsheet serial 0).
const SERIAL_EPOCH_DAYS_FROM_CE: i32 = 693_594;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Normalize a card number rendered as text.
///
/// Null markers become `""`; a trailing `.0` left over from float coercion is
/// stripped exactly once.
pub fn normalize_card(raw: &str) -> String {
    if NULL_MARKERS.contains(&raw) {
        return String::new();
    }
    raw.strip_suffix(".0").unwrap_or(raw).to_string()
}

pub fn card_text(cell: &CellValue) -> String {
    normalize_card(&cell.as_text())
}

/// Translate a product/concept cell through the vendor label table.
///
/// Returns `None` for an empty cell. Unknown labels pass through untouched,
/// including their original whitespace and cell type.
pub fn translate_product(cell: &CellValue, table: &BTreeMap<String, String>) -> Option<CellValue> {
    if cell.is_empty() {
        return None;
    }
    let label = cell.as_text();
    match table.get(label.trim()) {
        Some(mapped) => Some(CellValue::Text(mapped.clone())),
        None => Some(cell.clone()),
    }
}

/// Resolve the timestamp field to a single instant.
///
/// `Ok(None)` means the field was empty; an `Err` means it had content that
/// could not be read and the date/time cells should stay unset.
pub fn normalize_timestamp(raw: &RawTimestamp) -> Result<Option<NaiveDateTime>, RowFieldError> {
    match raw {
        RawTimestamp::Missing => Ok(None),
        RawTimestamp::Parsed(dt) => Ok(Some(*dt)),
        RawTimestamp::Text(s) => NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT)
            .map(Some)
            .map_err(|_| RowFieldError::UnparseableTimestamp(s.clone())),
        RawTimestamp::Other(cell) => Err(RowFieldError::UnsupportedTimestamp(cell.as_text())),
    }
}

/// Spreadsheet serial for a pure date (1900 date system).
pub fn date_serial(date: NaiveDate) -> f64 {
    (date.num_days_from_ce() - SERIAL_EPOCH_DAYS_FROM_CE) as f64
}

/// Fraction of a day for a pure time value.
pub fn time_fraction(time: NaiveTime) -> f64 {
    time.num_seconds_from_midnight() as f64 / SECONDS_PER_DAY
}

/// Serial including the time-of-day fraction.
pub fn datetime_serial(dt: NaiveDateTime) -> f64 {
    date_serial(dt.date()) + time_fraction(dt.time())
}
