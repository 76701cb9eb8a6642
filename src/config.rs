//! Deployment profile
//!
//! Everything that differs between deployments (excluded vehicles, product
//! translations, the column mapping and the template number formats) lives in
//! a [`Profile`]. The built-in default reproduces the production layout; a
//! YAML file can override any subset of it.

use crate::error::{FuelmapError, FuelmapResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::path::Path;

/// Where a mapped value comes from in the source row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceField {
    /// 0-based column offset
    Offset(usize),
    /// Required header name, resolved to an offset at ingest
    Header(String),
}

impl fmt::Display for SourceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceField::Offset(o) => write!(f, "column {}", o),
            SourceField::Header(h) => write!(f, "'{}'", h),
        }
    }
}

/// How a source value is turned into a destination value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldTransform {
    /// Trimmed vehicle identifier; also drives the exclusion filter
    Vehicle,
    /// Translated through the product table
    Product,
    /// Card number normalization, written as text
    Card,
    /// Date part of the timestamp
    Date,
    /// Time part of the timestamp
    Time,
    #[default]
    Passthrough,
}

/// Number format policy for the card column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CardFormatPolicy {
    /// Always set the cell format to text (`@`)
    #[default]
    ForceText,
    /// Trust the template's own format
    KeepTemplate,
}

/// One entry of the source → destination column table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub source: SourceField,
    /// 1-based destination column
    pub dest: u32,
    #[serde(default)]
    pub transform: FieldTransform,
    /// Header text used when generating a blank template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
}

impl ColumnMapping {
    fn new(source: SourceField, dest: u32, transform: FieldTransform, header: &str) -> Self {
        Self {
            source,
            dest,
            transform,
            header: Some(header.to_string()),
        }
    }
}

pub const VEHICLE_HEADER: &str = "Matricula";
pub const TIMESTAMP_HEADER: &str = "Fecha y hora";
pub const CARD_HEADER: &str = "Tarjeta";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    /// 1-based row holding the column names in the source export
    pub header_row: usize,
    /// Minimum number of source columns the mapping may address
    pub min_columns: usize,
    pub required_headers: Vec<String>,
    pub excluded_vehicles: BTreeSet<String>,
    pub product_translations: BTreeMap<String, String>,
    pub card_format: CardFormatPolicy,
    pub date_format: String,
    pub time_format: String,
    pub output_prefix: String,
    pub columns: Vec<ColumnMapping>,
}

impl Default for Profile {
    fn default() -> Self {
        let excluded_vehicles = (1..=7).map(|n| format!("TJT-{:03}", n)).collect();

        let product_translations = [
            ("DIESEL STAR", "Gasoleo"),
            ("ECOBLUE", "AdBlue"),
            ("SIN PLOMO", "Gasoil B"),
            ("AUTOPISTAS DE PEAJE", "Peaje"),
            ("GEST. SERV. AUTOP. ESPAÑA", "Otros"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let header = |h: &str| SourceField::Header(h.to_string());
        let columns = vec![
            ColumnMapping::new(header(VEHICLE_HEADER), 1, FieldTransform::Vehicle, "Matricula"),
            ColumnMapping::new(SourceField::Offset(10), 2, FieldTransform::Product, "Producto"),
            ColumnMapping::new(SourceField::Offset(4), 3, FieldTransform::Passthrough, "Kilometros"),
            ColumnMapping::new(header(CARD_HEADER), 4, FieldTransform::Card, "Tarjeta"),
            ColumnMapping::new(SourceField::Offset(11), 5, FieldTransform::Passthrough, "Precio"),
            ColumnMapping::new(SourceField::Offset(8), 6, FieldTransform::Passthrough, "Estacion"),
            ColumnMapping::new(SourceField::Offset(12), 7, FieldTransform::Passthrough, "Litros"),
            ColumnMapping::new(SourceField::Offset(13), 8, FieldTransform::Passthrough, "Importe"),
            ColumnMapping::new(header(TIMESTAMP_HEADER), 11, FieldTransform::Date, "Fecha"),
            ColumnMapping::new(header(TIMESTAMP_HEADER), 12, FieldTransform::Time, "Hora"),
        ];

        Self {
            name: "cepsa".to_string(),
            header_row: 3,
            min_columns: 14,
            required_headers: vec![
                VEHICLE_HEADER.to_string(),
                TIMESTAMP_HEADER.to_string(),
                CARD_HEADER.to_string(),
            ],
            excluded_vehicles,
            product_translations,
            card_format: CardFormatPolicy::ForceText,
            date_format: "dd/mm/yyyy".to_string(),
            time_format: "hh:mm:ss".to_string(),
            output_prefix: "ImportadorGenerico_RELLENO".to_string(),
            columns,
        }
    }
}

impl Profile {
    /// Load and validate a profile from a YAML file.
    pub fn load(path: &Path) -> FuelmapResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FuelmapError::Profile(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load the profile at `path`, or the built-in default when none is given.
    pub fn load_or_default(path: Option<&Path>) -> FuelmapResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml_str(content: &str) -> FuelmapResult<Self> {
        let profile: Profile = serde_yaml::from_str(content)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn to_yaml_string(&self) -> FuelmapResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check the column table against the declared source layout.
    pub fn validate(&self) -> FuelmapResult<()> {
        if self.header_row == 0 {
            return Err(FuelmapError::Profile(
                "header_row is 1-based and must be at least 1".to_string(),
            ));
        }
        if self.columns.is_empty() {
            return Err(FuelmapError::Profile("column mapping is empty".to_string()));
        }

        let vehicle_columns = self
            .columns
            .iter()
            .filter(|c| c.transform == FieldTransform::Vehicle)
            .count();
        if vehicle_columns != 1 {
            return Err(FuelmapError::Profile(format!(
                "exactly one 'vehicle' column is required, found {}",
                vehicle_columns
            )));
        }

        let mut seen = HashSet::new();
        for mapping in &self.columns {
            if mapping.dest == 0 {
                return Err(FuelmapError::Profile(format!(
                    "destination column for {} must be 1-based",
                    mapping.source
                )));
            }
            if !seen.insert(mapping.dest) {
                return Err(FuelmapError::Profile(format!(
                    "destination column {} is mapped more than once",
                    mapping.dest
                )));
            }
            match &mapping.source {
                SourceField::Offset(o) if *o >= self.min_columns => {
                    return Err(FuelmapError::Profile(format!(
                        "source offset {} exceeds min_columns ({})",
                        o, self.min_columns
                    )));
                }
                SourceField::Header(h) if !self.required_headers.contains(h) => {
                    return Err(FuelmapError::Profile(format!(
                        "source header '{}' is not listed in required_headers",
                        h
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Trim-then-match against the exclusion set (case-sensitive).
    pub fn is_excluded(&self, vehicle: &str) -> bool {
        self.excluded_vehicles.contains(vehicle.trim())
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_is_valid() {
        let profile = Profile::default();
        assert!(profile.validate().is_ok());
        assert_eq!(profile.header_row, 3);
        assert_eq!(profile.min_columns, 14);
        assert_eq!(profile.excluded_vehicles.len(), 7);
        assert_eq!(profile.columns.iter().map(|c| c.dest).max(), Some(12));
    }

    #[test]
    fn test_exclusion_trims_and_is_case_sensitive() {
        let profile = Profile::default();
        assert!(profile.is_excluded(" TJT-001"));
        assert!(profile.is_excluded("TJT-007  "));
        assert!(!profile.is_excluded("tjt-001"));
        assert!(!profile.is_excluded("TJT-008"));
    }

    #[test]
    fn test_partial_yaml_overrides_defaults() {
        let yaml = r#"
name: variant
card_format: keep_template
excluded_vehicles: ["INT-1"]
"#;
        let profile = Profile::from_yaml_str(yaml).unwrap();
        assert_eq!(profile.name, "variant");
        assert_eq!(profile.card_format, CardFormatPolicy::KeepTemplate);
        assert!(profile.is_excluded("INT-1"));
        assert!(!profile.is_excluded("TJT-001"));
        // untouched settings keep their defaults
        assert_eq!(profile.columns, Profile::default().columns);
    }

    #[test]
    fn test_yaml_columns_accept_offsets_and_headers() {
        let yaml = r#"
columns:
  - { source: Matricula, dest: 1, transform: vehicle }
  - { source: 6, dest: 2 }
"#;
        let profile = Profile::from_yaml_str(yaml).unwrap();
        assert_eq!(
            profile.columns[0].source,
            SourceField::Header("Matricula".to_string())
        );
        assert_eq!(profile.columns[1].source, SourceField::Offset(6));
        assert_eq!(profile.columns[1].transform, FieldTransform::Passthrough);
    }

    #[test]
    fn test_offset_beyond_min_columns_rejected() {
        let mut profile = Profile::default();
        profile.columns.push(ColumnMapping {
            source: SourceField::Offset(14),
            dest: 20,
            transform: FieldTransform::Passthrough,
            header: None,
        });
        let err = profile.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds min_columns"));
    }

    #[test]
    fn test_duplicate_destination_rejected() {
        let mut profile = Profile::default();
        profile.columns[2].dest = 1;
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_unknown_header_source_rejected() {
        let mut profile = Profile::default();
        profile.columns[2].source = SourceField::Header("Kilometraje".to_string());
        let err = profile.validate().unwrap_err();
        assert!(err.to_string().contains("required_headers"));
    }

    #[test]
    fn test_missing_vehicle_column_rejected() {
        let mut profile = Profile::default();
        profile.columns.remove(0);
        assert!(profile.validate().is_err());
    }
}
