//! Blank template exporter - profile → empty destination template (.xlsx)

use crate::config::{FieldTransform, Profile};
use crate::error::{FuelmapError, FuelmapResult};
use crate::excel::template::TEXT_FORMAT;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

const COLUMN_WIDTH: f64 = 16.0;

/// Builds an empty import template whose layout matches a profile's mapping.
pub struct TemplateExporter<'a> {
    profile: &'a Profile,
}

impl<'a> TemplateExporter<'a> {
    pub fn new(profile: &'a Profile) -> Self {
        Self { profile }
    }

    /// Export the template to an .xlsx file
    pub fn export(&self, output_path: &Path) -> FuelmapResult<()> {
        let bytes = self.to_buffer()?;
        std::fs::write(output_path, bytes)
            .map_err(|e| FuelmapError::Export(format!("Failed to write file: {}", e)))
    }

    pub fn to_buffer(&self) -> FuelmapResult<Vec<u8>> {
        let mut workbook = self.build()?;
        workbook
            .save_to_buffer()
            .map_err(|e| FuelmapError::Export(format!("Failed to save workbook: {}", e)))
    }

    fn build(&self) -> FuelmapResult<Workbook> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        let header_format = Format::new().set_bold();
        let text_format = Format::new().set_num_format(TEXT_FORMAT);
        let date_format = Format::new().set_num_format(&self.profile.date_format);
        let time_format = Format::new().set_num_format(&self.profile.time_format);

        for mapping in &self.profile.columns {
            let col = u16::try_from(mapping.dest - 1).map_err(|_| {
                FuelmapError::Export(format!("Destination column {} is too large", mapping.dest))
            })?;
            let header = mapping
                .header
                .clone()
                .unwrap_or_else(|| format!("Columna {}", mapping.dest));

            worksheet
                .write_string_with_format(0, col, &header, &header_format)
                .map_err(|e| FuelmapError::Export(e.to_string()))?;
            worksheet
                .set_column_width(col, COLUMN_WIDTH)
                .map_err(|e| FuelmapError::Export(e.to_string()))?;

            let column_format = match mapping.transform {
                FieldTransform::Card => Some(&text_format),
                FieldTransform::Date => Some(&date_format),
                FieldTransform::Time => Some(&time_format),
                _ => None,
            };
            if let Some(format) = column_format {
                worksheet
                    .set_column_format(col, format)
                    .map_err(|e| FuelmapError::Export(e.to_string()))?;
            }
        }

        worksheet
            .set_freeze_panes(1, 0)
            .map_err(|e| FuelmapError::Export(e.to_string()))?;

        Ok(workbook)
    }
}
