//! Shared fixtures: vendor exports and templates built in memory.

#![allow(dead_code)]

use chrono::NaiveDate;
use fuelmap::excel::Template;
use rust_xlsxwriter::{Format, Workbook};

/// Vendor export header row (row 3 of the sheet)
pub const HEADERS: [&str; 14] = [
    "Cliente",
    "Matricula",
    "Fecha y hora",
    "Tarjeta",
    "Kilometros",
    "Conductor",
    "Poblacion",
    "Provincia",
    "Estacion",
    "Factura",
    "Concepto",
    "Precio",
    "Litros",
    "Importe",
];

/// A source cell as written into the fixture workbook
#[derive(Debug, Clone)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    /// Serial number carrying a date-time format
    DateTime(f64),
}

/// Text cell; an empty string leaves the cell unwritten
pub fn text(s: &str) -> Cell {
    if s.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(s.to_string())
    }
}

/// Full 14-column transaction row with plausible passthrough values
pub fn tx(vehicle: &str, timestamp: &str, card: &str, concept: &str) -> Vec<Cell> {
    vec![
        text("TRANSPORTES GARCIA SL"),
        text(vehicle),
        text(timestamp),
        text(card),
        Cell::Number(152_340.0),
        text("PEREZ LOPEZ, JUAN"),
        text("ZARAGOZA"),
        text("ZARAGOZA"),
        text("ES CEPSA PLAZA"),
        text("F-2024-0001"),
        text(concept),
        Cell::Number(1.459),
        Cell::Number(120.5),
        Cell::Number(175.81),
    ]
}

/// Export workbook: two title rows, header on row 3, data below.
pub fn source_workbook(headers: &[&str], rows: &[Vec<Cell>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let datetime = Format::new().set_num_format("dd/mm/yyyy hh:mm:ss");

    sheet.write_string(0, 0, "Transacciones CEPSA").unwrap();
    sheet.write_string(1, 0, "Periodo: 01/06/2024 - 30/06/2024").unwrap();
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(2, col as u16, *header).unwrap();
    }

    for (idx, row) in rows.iter().enumerate() {
        let r = 3 + idx as u32;
        for (col, cell) in row.iter().enumerate() {
            let c = col as u16;
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    sheet.write_string(r, c, s.as_str()).unwrap();
                }
                Cell::Number(n) => {
                    sheet.write_number(r, c, *n).unwrap();
                }
                Cell::DateTime(serial) => {
                    sheet.write_number_with_format(r, c, *serial, &datetime).unwrap();
                }
            }
        }
    }

    workbook.save_to_buffer().unwrap()
}

pub fn source(rows: &[Vec<Cell>]) -> Vec<u8> {
    source_workbook(&HEADERS, rows)
}

pub const TEMPLATE_HEADERS: [&str; 12] = [
    "Matricula",
    "Producto",
    "Kilometros",
    "Tarjeta",
    "Precio",
    "Estacion",
    "Litros",
    "Importe",
    "Observaciones",
    "Centro",
    "Fecha",
    "Hora",
];

/// Custom formats (not built in) so they read back verbatim
pub const KM_FORMAT: &str = "#,##0.000";
pub const DATE_FORMAT: &str = "dd/mm/yyyy";
pub const CARD_STALE_FORMAT: &str = "0000000000";

/// Import template with a merged note in the header row and `stale_rows`
/// rows of leftover data carrying number formats.
pub fn template_workbook(stale_rows: u32) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();
    let km = Format::new().set_num_format(KM_FORMAT);
    let date = Format::new().set_num_format(DATE_FORMAT);
    let card = Format::new().set_num_format(CARD_STALE_FORMAT);

    for (col, header) in TEMPLATE_HEADERS.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &bold)
            .unwrap();
        sheet.set_column_width(col as u16, 15).unwrap();
    }
    sheet
        .merge_range(0, 13, 0, 15, "No modificar la cabecera", &bold)
        .unwrap();

    for r in 1..=stale_rows {
        sheet.write_string(r, 0, format!("OLD-{:03}", r)).unwrap();
        sheet.write_string(r, 1, "Gasoleo").unwrap();
        sheet.write_number_with_format(r, 2, 99.0, &km).unwrap();
        sheet.write_number_with_format(r, 3, 123.0, &card).unwrap();
        sheet.write_number(r, 7, 10.0).unwrap();
        sheet.write_number_with_format(r, 10, 45000.0, &date).unwrap();
    }

    workbook.save_to_buffer().unwrap()
}

pub fn open(bytes: &[u8]) -> Template {
    Template::open(bytes).expect("output should be a readable workbook")
}

/// Cell text at 1-based (col, row)
pub fn value(template: &Template, col: u32, row: u32) -> String {
    template.sheet().get_value((col, row))
}

pub fn number(template: &Template, col: u32, row: u32) -> Option<f64> {
    value(template, col, row).parse().ok()
}

pub fn format_code(template: &Template, col: u32, row: u32) -> Option<String> {
    template.sheet().get_cell((col, row)).and_then(|c| {
        c.get_style()
            .get_number_format()
            .map(|f| f.get_format_code().to_string())
    })
}

/// All values of the first `cols` columns of a row
pub fn row_values(template: &Template, row: u32, cols: u32) -> Vec<String> {
    (1..=cols).map(|c| value(template, c, row)).collect()
}

/// Spreadsheet serial for a date-time, for fixture cells
pub fn serial(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
    let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
    let days = (date - epoch).num_days() as f64;
    days + (h * 3600 + min * 60 + s) as f64 / 86_400.0
}
