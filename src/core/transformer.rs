//! Transformer - ingest, reset, map-and-write and serialize one export

use crate::config::{CardFormatPolicy, FieldTransform, Profile, SourceField};
use crate::core::normalize::{
    card_text, date_serial, normalize_timestamp, time_fraction, translate_product,
};
use crate::error::{FuelmapError, FuelmapResult, RowFieldError};
use crate::excel::{SourceImporter, SourceTable, Template, FIRST_DATA_ROW, TEXT_FORMAT};
use crate::types::{
    CellValue, RawTimestamp, RowProgress, RowWarning, SourceRow, TransformOutput,
    TransformReport,
};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// A mapping entry with its source resolved to a column offset.
#[derive(Debug, Clone)]
struct ResolvedColumn {
    offset: usize,
    dest: u32,
    transform: FieldTransform,
    /// Source label used in warnings
    label: String,
}

/// Result of ingesting both artifacts without writing anything.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestSummary {
    pub source_rows: usize,
    pub source_columns: usize,
    pub excluded_rows: usize,
    pub stale_template_rows: u32,
}

/// Fuel-card export → import template transformer
pub struct Transformer<'a> {
    profile: &'a Profile,
}

impl<'a> Transformer<'a> {
    #[must_use]
    pub fn new(profile: &'a Profile) -> Self {
        Self { profile }
    }

    pub fn run(&self, template: &[u8], source: &[u8]) -> FuelmapResult<TransformOutput> {
        self.run_with_progress(template, source, |_| {})
    }

    /// Ingest, reset, map-and-write, serialize.
    ///
    /// `on_progress` is called once per source row, after the row has been
    /// either written or excluded. Structural errors are returned before any
    /// row is processed.
    pub fn run_with_progress<F>(
        &self,
        template: &[u8],
        source: &[u8],
        mut on_progress: F,
    ) -> FuelmapResult<TransformOutput>
    where
        F: FnMut(RowProgress),
    {
        self.profile.validate()?;
        let table = SourceImporter::new(self.profile).import(source)?;
        let mut destination = Template::open(template)?;
        let plan = self.resolve_columns(&table)?;
        let vehicle = vehicle_offset(&plan)?;
        debug!(
            rows = table.len(),
            columns = table.width,
            "source ingested"
        );

        let cleared = destination.reset();
        debug!(cleared, "template data region cleared");

        let report =
            self.map_and_write(&table, &plan, vehicle, &mut destination, &mut on_progress);
        info!(
            read = report.rows_read,
            written = report.rows_written,
            excluded = report.rows_excluded,
            warnings = report.warnings.len(),
            "transform complete"
        );

        let bytes = destination.to_bytes()?;
        Ok(TransformOutput {
            bytes,
            file_name: output_file_name(&self.profile.output_prefix, Local::now().date_naive()),
            report,
        })
    }

    /// Run the Ingest phase only and describe what a transform would do.
    pub fn check(&self, template: &[u8], source: &[u8]) -> FuelmapResult<IngestSummary> {
        self.profile.validate()?;
        let table = SourceImporter::new(self.profile).import(source)?;
        let destination = Template::open(template)?;
        let plan = self.resolve_columns(&table)?;
        let vehicle = vehicle_offset(&plan)?;

        let excluded_rows = table
            .rows
            .iter()
            .filter(|row| self.is_excluded(row, vehicle))
            .count();

        Ok(IngestSummary {
            source_rows: table.len(),
            source_columns: table.width,
            excluded_rows,
            stale_template_rows: destination.data_rows(),
        })
    }

    fn resolve_columns(&self, table: &SourceTable) -> FuelmapResult<Vec<ResolvedColumn>> {
        self.profile
            .columns
            .iter()
            .map(|mapping| {
                let offset = table.resolve(&mapping.source).ok_or_else(|| {
                    FuelmapError::SourceRead(format!("Column {} not found", mapping.source))
                })?;
                let label = match &mapping.source {
                    SourceField::Header(h) => h.clone(),
                    SourceField::Offset(_) => table
                        .headers
                        .get(offset)
                        .filter(|h| !h.is_empty())
                        .cloned()
                        .unwrap_or_else(|| mapping.source.to_string()),
                };
                Ok(ResolvedColumn {
                    offset,
                    dest: mapping.dest,
                    transform: mapping.transform,
                    label,
                })
            })
            .collect()
    }

    fn is_excluded(&self, row: &SourceRow, vehicle_offset: usize) -> bool {
        row.get(vehicle_offset)
            .map(|cell| self.profile.is_excluded(&cell.as_text()))
            .unwrap_or(false)
    }

    fn map_and_write(
        &self,
        table: &SourceTable,
        plan: &[ResolvedColumn],
        vehicle: usize,
        destination: &mut Template,
        on_progress: &mut dyn FnMut(RowProgress),
    ) -> TransformReport {
        let total = table.len();
        let mut report = TransformReport {
            rows_read: total,
            ..TransformReport::default()
        };

        let mut cursor = FIRST_DATA_ROW;
        for (index, row) in table.rows.iter().enumerate() {
            if self.is_excluded(row, vehicle) {
                debug!(sheet_row = row.sheet_row, "row excluded");
                report.rows_excluded += 1;
            } else {
                self.write_row(row, cursor, plan, destination, &mut report.warnings);
                cursor += 1;
                report.rows_written += 1;
            }
            on_progress(RowProgress {
                index: index + 1,
                total,
            });
        }
        report
    }

    fn write_row(
        &self,
        row: &SourceRow,
        dest_row: u32,
        plan: &[ResolvedColumn],
        destination: &mut Template,
        warnings: &mut Vec<RowWarning>,
    ) {
        // one parse per timestamp column, shared by the date and time cells
        let mut timestamps: HashMap<usize, Option<NaiveDateTime>> = HashMap::new();

        for column in plan {
            let cell = match row.get(column.offset) {
                Ok(CellValue::Error(e)) => {
                    warnings.push(field_warning(row, column, RowFieldError::CellError(e.clone())));
                    continue;
                }
                Ok(cell) => cell,
                Err(e) => {
                    warnings.push(field_warning(row, column, e));
                    continue;
                }
            };

            match column.transform {
                FieldTransform::Vehicle => {
                    let vehicle = cell.as_text();
                    let vehicle = vehicle.trim();
                    if !vehicle.is_empty() {
                        destination.write_text(column.dest, dest_row, vehicle);
                    }
                }
                FieldTransform::Product => {
                    if let Some(product) =
                        translate_product(cell, &self.profile.product_translations)
                    {
                        destination.write_value(column.dest, dest_row, &product);
                    }
                }
                FieldTransform::Card => {
                    destination.write_text(column.dest, dest_row, &card_text(cell));
                    if self.profile.card_format == CardFormatPolicy::ForceText {
                        destination.set_number_format(column.dest, dest_row, TEXT_FORMAT);
                    }
                }
                FieldTransform::Date | FieldTransform::Time => {
                    let instant = *timestamps.entry(column.offset).or_insert_with(|| {
                        normalize_timestamp(&RawTimestamp::from(cell)).unwrap_or_else(|e| {
                            warnings.push(field_warning(row, column, e));
                            None
                        })
                    });
                    let Some(instant) = instant else {
                        continue;
                    };
                    let (value, format) = if column.transform == FieldTransform::Date {
                        (date_serial(instant.date()), &self.profile.date_format)
                    } else {
                        (time_fraction(instant.time()), &self.profile.time_format)
                    };
                    destination.write_number(column.dest, dest_row, value);
                    if !format.is_empty() {
                        destination.set_number_format(column.dest, dest_row, format);
                    }
                }
                FieldTransform::Passthrough => {
                    destination.write_value(column.dest, dest_row, cell);
                }
            }
        }
    }
}

fn vehicle_offset(plan: &[ResolvedColumn]) -> FuelmapResult<usize> {
    plan.iter()
        .find(|c| c.transform == FieldTransform::Vehicle)
        .map(|c| c.offset)
        .ok_or_else(|| FuelmapError::Profile("no 'vehicle' column in mapping".to_string()))
}

fn field_warning(row: &SourceRow, column: &ResolvedColumn, error: RowFieldError) -> RowWarning {
    warn!(
        sheet_row = row.sheet_row,
        field = %column.label,
        %error,
        "field left unset"
    );
    RowWarning {
        source_row: row.sheet_row,
        field: column.label.clone(),
        error: error.to_string(),
    }
}

/// Date-stamped download name, e.g. `ImportadorGenerico_RELLENO_20240615.xlsx`
pub fn output_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.xlsx", prefix, date.format("%Y%m%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Profile;
    use crate::excel::TemplateExporter;

    fn row(cells: Vec<CellValue>) -> SourceRow {
        SourceRow::new(4, cells)
    }

    fn plan_for(profile: &Profile, headers: &[&str]) -> Vec<ResolvedColumn> {
        let mut names: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        names.resize(profile.min_columns, String::new());
        let table = SourceTable::new(names, Vec::new());
        Transformer::new(profile).resolve_columns(&table).unwrap()
    }

    #[test]
    fn test_output_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(
            output_file_name("ImportadorGenerico_RELLENO", date),
            "ImportadorGenerico_RELLENO_20240615.xlsx"
        );
    }

    #[test]
    fn test_resolve_columns_uses_header_positions() {
        let profile = Profile::default();
        let plan = plan_for(&profile, &["Fecha y hora", "Matricula", "", "Tarjeta"]);

        let vehicle = plan.iter().find(|c| c.dest == 1).unwrap();
        assert_eq!(vehicle.offset, 1);
        let card = plan.iter().find(|c| c.dest == 4).unwrap();
        assert_eq!(card.offset, 3);
        let date = plan.iter().find(|c| c.dest == 11).unwrap();
        assert_eq!(date.offset, 0);
        let product = plan.iter().find(|c| c.dest == 2).unwrap();
        assert_eq!(product.offset, 10);
        assert_eq!(product.label, "column 10");
    }

    #[test]
    fn test_resolve_columns_missing_header_is_source_error() {
        let profile = Profile::default();
        let table = SourceTable::new(vec!["Matricula".to_string()], Vec::new());
        let err = Transformer::new(&profile).resolve_columns(&table).unwrap_err();
        assert!(matches!(err, FuelmapError::SourceRead(_)));
    }

    #[test]
    fn test_vehicle_offset_required() {
        let plan = vec![ResolvedColumn {
            offset: 0,
            dest: 1,
            transform: FieldTransform::Passthrough,
            label: "x".to_string(),
        }];
        assert!(vehicle_offset(&plan).is_err());
    }

    #[test]
    fn test_exclusion_reads_vehicle_cell() {
        let profile = Profile::default();
        let transformer = Transformer::new(&profile);
        let excluded = row(vec![CellValue::Text(" TJT-001".to_string())]);
        let kept = row(vec![CellValue::Text("ABC-123".to_string())]);
        assert!(transformer.is_excluded(&excluded, 0));
        assert!(!transformer.is_excluded(&kept, 0));
        // an out-of-range vehicle column never excludes
        assert!(!transformer.is_excluded(&kept, 5));
    }

    #[test]
    fn test_error_cell_leaves_field_unset_with_warning() {
        let profile = Profile::default();
        let transformer = Transformer::new(&profile);
        let plan = plan_for(&profile, &["Cliente", "Matricula", "Fecha y hora", "Tarjeta"]);
        let blank = TemplateExporter::new(&profile).to_buffer().unwrap();
        let mut destination = Template::open(&blank).unwrap();

        let mut cells = vec![CellValue::Empty; profile.min_columns];
        cells[1] = CellValue::Text("AAA-001".to_string());
        cells[4] = CellValue::Error("#N/A".to_string());
        cells[13] = CellValue::Number(175.81);
        let mut warnings = Vec::new();
        transformer.write_row(&row(cells), 2, &plan, &mut destination, &mut warnings);

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].source_row, 4);
        assert_eq!(warnings[0].field, "column 4");
        assert!(warnings[0].error.contains("#N/A"));
        // kilometres stay empty, the rest of the row is written
        assert_eq!(destination.sheet().get_value((3, 2)), "");
        assert_eq!(destination.sheet().get_value((1, 2)), "AAA-001");
        assert_eq!(destination.sheet().get_value((8, 2)), "175.81");
    }

    #[test]
    fn test_invalid_profile_rejected_before_ingest() {
        let profile = Profile {
            header_row: 0,
            ..Profile::default()
        };
        let transformer = Transformer::new(&profile);

        let err = transformer.run(b"template", b"data").err().unwrap();
        assert!(matches!(err, FuelmapError::Profile(_)));
        let err = transformer.check(b"template", b"data").unwrap_err();
        assert!(matches!(err, FuelmapError::Profile(_)));
    }
}
