//! Spreadsheet adapters
//!
//! - Import: vendor export (.xlsx/.xls/.ods) → source rows, via calamine
//! - Template: destination workbook round trip with styles kept, via umya-spreadsheet
//! - Export: blank destination template from a profile, via rust_xlsxwriter

mod exporter;
mod importer;
mod template;

pub use exporter::TemplateExporter;
pub use importer::{SourceImporter, SourceTable};
pub use template::{Template, FIRST_DATA_ROW, TEXT_FORMAT};
