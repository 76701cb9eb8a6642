//! Destination template - open, reset, write and serialize without losing styles

use crate::core::normalize::datetime_serial;
use crate::error::{FuelmapError, FuelmapResult};
use crate::types::CellValue;
use std::io::Cursor;
use umya_spreadsheet::{Spreadsheet, Worksheet};

/// Number format code for text cells
pub const TEXT_FORMAT: &str = "@";

/// First row below the header
pub const FIRST_DATA_ROW: u32 = 2;

/// In-memory destination workbook. All coordinates are 1-based `(col, row)`.
pub struct Template {
    book: Spreadsheet,
}

impl Template {
    pub fn open(bytes: &[u8]) -> FuelmapResult<Self> {
        let book = umya_spreadsheet::reader::xlsx::read_reader(Cursor::new(bytes), true)
            .map_err(|e| FuelmapError::TemplateRead(format!("Not a valid xlsx workbook: {}", e)))?;
        if book.get_sheet_count() == 0 {
            return Err(FuelmapError::TemplateRead(
                "Workbook has no worksheet".to_string(),
            ));
        }
        Ok(Self { book })
    }

    pub fn sheet(&self) -> &Worksheet {
        self.book.get_active_sheet()
    }

    fn sheet_mut(&mut self) -> &mut Worksheet {
        self.book.get_active_sheet_mut()
    }

    /// Number of stale data rows below the header.
    pub fn data_rows(&self) -> u32 {
        self.sheet().get_highest_row().saturating_sub(1)
    }

    /// Clear every value in rows 2.. of the active sheet.
    ///
    /// Cell styles, number formats, merges and dimensions are left as they
    /// are. Returns the number of cells cleared.
    pub fn reset(&mut self) -> usize {
        let sheet = self.sheet_mut();
        let (max_col, max_row) = sheet.get_highest_column_and_row();
        if max_row < FIRST_DATA_ROW {
            return 0;
        }

        let mut cleared = 0;
        for row in FIRST_DATA_ROW..=max_row {
            for col in 1..=max_col {
                if sheet.get_cell((col, row)).is_none() {
                    continue;
                }
                sheet.get_cell_mut((col, row)).set_blank();
                cleared += 1;
            }
        }
        cleared
    }

    /// Write a source value, keeping its type. Empty values leave the cell unset.
    pub fn write_value(&mut self, col: u32, row: u32, value: &CellValue) {
        match value {
            CellValue::Empty | CellValue::Error(_) => {}
            CellValue::Text(s) => self.write_text(col, row, s),
            CellValue::Number(n) => self.write_number(col, row, *n),
            CellValue::Bool(b) => {
                self.sheet_mut().get_cell_mut((col, row)).set_value_bool(*b);
            }
            CellValue::DateTime(dt) => self.write_number(col, row, datetime_serial(*dt)),
        }
    }

    pub fn write_text(&mut self, col: u32, row: u32, text: &str) {
        self.sheet_mut()
            .get_cell_mut((col, row))
            .set_value_string(text);
    }

    pub fn write_number(&mut self, col: u32, row: u32, number: f64) {
        self.sheet_mut()
            .get_cell_mut((col, row))
            .set_value_number(number);
    }

    pub fn set_number_format(&mut self, col: u32, row: u32, code: &str) {
        self.sheet_mut()
            .get_cell_mut((col, row))
            .get_style_mut()
            .get_number_format_mut()
            .set_format_code(code);
    }

    /// Serialize the workbook into an xlsx byte buffer.
    pub fn to_bytes(&self) -> FuelmapResult<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        umya_spreadsheet::writer::xlsx::write_writer(&self.book, &mut buffer)
            .map_err(|e| FuelmapError::Output(e.to_string()))?;
        Ok(buffer.into_inner())
    }
}
