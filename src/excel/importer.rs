//! Source importer - vendor transaction export → [`SourceTable`]

use crate::config::{Profile, SourceField};
use crate::error::{FuelmapError, FuelmapResult};
use crate::types::{CellValue, SourceRow};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::io::Cursor;

/// Parsed source export: header names plus data rows in sheet order.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub rows: Vec<SourceRow>,
    /// Number of columns in every row
    pub width: usize,
    header_index: HashMap<String, usize>,
}

impl SourceTable {
    pub fn new(headers: Vec<String>, rows: Vec<SourceRow>) -> Self {
        let width = headers.len();
        let mut header_index = HashMap::new();
        for (idx, name) in headers.iter().enumerate() {
            // first occurrence wins for duplicated names
            header_index.entry(name.clone()).or_insert(idx);
        }
        Self {
            headers,
            rows,
            width,
            header_index,
        }
    }

    pub fn column_of(&self, header: &str) -> Option<usize> {
        self.header_index.get(header).copied()
    }

    /// Resolve a mapping source to a 0-based column offset.
    pub fn resolve(&self, field: &SourceField) -> Option<usize> {
        match field {
            SourceField::Offset(o) => Some(*o),
            SourceField::Header(h) => self.column_of(h),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reads the first worksheet of a vendor export.
pub struct SourceImporter<'a> {
    profile: &'a Profile,
}

impl<'a> SourceImporter<'a> {
    pub fn new(profile: &'a Profile) -> Self {
        Self { profile }
    }

    /// Parse the export held in `bytes` (xlsx, xlsm, xls or ods).
    pub fn import(&self, bytes: &[u8]) -> FuelmapResult<SourceTable> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| FuelmapError::SourceRead(format!("Not a readable spreadsheet: {}", e)))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| FuelmapError::SourceRead("Workbook has no worksheet".to_string()))?
            .map_err(|e| FuelmapError::SourceRead(format!("Failed to read worksheet: {}", e)))?;

        self.process_range(&range)
    }

    fn process_range(&self, range: &Range<Data>) -> FuelmapResult<SourceTable> {
        let header_row = self
            .profile
            .header_row
            .checked_sub(1)
            .map(|r| r as u32)
            .ok_or_else(|| FuelmapError::Profile("header_row is 1-based".to_string()))?;
        let (last_row, last_col) = range.end().ok_or_else(|| {
            FuelmapError::SourceRead("Worksheet is empty".to_string())
        })?;

        if last_row < header_row {
            return Err(FuelmapError::SourceRead(format!(
                "Header row {} not found, the sheet has only {} rows",
                self.profile.header_row,
                last_row + 1
            )));
        }

        // Absolute addressing keeps offsets stable when leading columns are blank
        let width = last_col as usize + 1;
        let headers: Vec<String> = (0..width)
            .map(|col| match range.get_value((header_row, col as u32)) {
                Some(Data::String(s)) => s.trim().to_string(),
                Some(Data::Empty) | None => String::new(),
                Some(other) => other.to_string(),
            })
            .collect();

        let missing: Vec<&str> = self
            .profile
            .required_headers
            .iter()
            .filter(|h| !headers.iter().any(|found| found == *h))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(FuelmapError::SourceRead(format!(
                "Row {} is not the expected header, missing column(s): {}",
                self.profile.header_row,
                missing.join(", ")
            )));
        }

        if width < self.profile.min_columns {
            return Err(FuelmapError::SourceSchema {
                found: width,
                required: self.profile.min_columns,
            });
        }

        let mut rows = Vec::new();
        for row in (header_row + 1)..=last_row {
            let cells: Vec<CellValue> = (0..width)
                .map(|col| {
                    range
                        .get_value((row, col as u32))
                        .map(convert_cell)
                        .unwrap_or(CellValue::Empty)
                })
                .collect();
            let source_row = SourceRow::new(row as usize + 1, cells);
            if source_row.is_blank() {
                continue;
            }
            rows.push(source_row);
        }

        Ok(SourceTable::new(headers, rows))
    }
}

/// Convert a calamine cell into the reader-independent [`CellValue`].
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => CellValue::DateTime(value),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    s.parse::<NaiveDateTime>().ok().or_else(|| {
        s.parse::<NaiveDate>()
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
}
