use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::RowFieldError;

//==============================================================================
// Cell values
//==============================================================================

/// A single source cell, decoupled from the spreadsheet reader.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Cell carrying a date/time number format, already decoded
    DateTime(NaiveDateTime),
    /// Spreadsheet error value such as `#N/A`
    Error(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Render the cell as raw text, the way it would read in the sheet.
    ///
    /// Numbers use the shortest round-trip representation, so an integral
    /// card number such as `987654321` never turns into `9.87654321e8`.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::DateTime(dt) => dt.format("%d/%m/%Y %H:%M:%S").to_string(),
            CellValue::Error(e) => e.clone(),
        }
    }
}

//==============================================================================
// Source rows
//==============================================================================

/// Timestamp field as found in the source, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTimestamp {
    Missing,
    Parsed(NaiveDateTime),
    Text(String),
    Other(CellValue),
}

impl From<&CellValue> for RawTimestamp {
    fn from(cell: &CellValue) -> Self {
        match cell {
            CellValue::Empty => RawTimestamp::Missing,
            CellValue::Text(s) if s.trim().is_empty() => RawTimestamp::Missing,
            CellValue::Text(s) => RawTimestamp::Text(s.clone()),
            CellValue::DateTime(dt) => RawTimestamp::Parsed(*dt),
            other => RawTimestamp::Other(other.clone()),
        }
    }
}

/// One transaction record from the vendor export.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    /// 1-based row number in the source sheet
    pub sheet_row: usize,
    pub cells: Vec<CellValue>,
}

impl SourceRow {
    pub fn new(sheet_row: usize, cells: Vec<CellValue>) -> Self {
        Self { sheet_row, cells }
    }

    /// Positional access by 0-based column offset.
    pub fn get(&self, offset: usize) -> Result<&CellValue, RowFieldError> {
        self.cells.get(offset).ok_or(RowFieldError::OutOfRange {
            offset,
            width: self.cells.len(),
        })
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(CellValue::is_empty)
    }
}

//==============================================================================
// Run results
//==============================================================================

/// Progress notification emitted after each source row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowProgress {
    /// 1-based index of the row just processed
    pub index: usize,
    pub total: usize,
}

impl RowProgress {
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            100
        } else {
            self.index * 100 / self.total
        }
    }
}

/// A field that was left unset because of a recoverable error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowWarning {
    pub source_row: usize,
    pub field: String,
    pub error: String,
}

/// Summary of one transformer run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransformReport {
    pub rows_read: usize,
    pub rows_written: usize,
    pub rows_excluded: usize,
    pub warnings: Vec<RowWarning>,
}

/// The finished artifact: workbook bytes plus how it should be served.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub report: TransformReport,
}

impl TransformOutput {
    pub const MIME_TYPE: &'static str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
}
