//! Fuelmap - fuel-card transaction export → import template converter
//!
//! Reads a vendor transaction export whose column header sits on row 3,
//! filters out internal vehicles, normalizes card numbers and timestamps,
//! translates product labels and writes the result into a pre-formatted
//! import template without disturbing its styles.
//!
//! # Phases
//!
//! 1. Ingest - parse the export, check headers and column count, open the template
//! 2. Reset - clear stale values below the template header
//! 3. Map-and-Write - one destination row per non-excluded source row
//! 4. Serialize - workbook bytes plus a date-stamped file name
//!
//! # Example
//!
//! ```no_run
//! use fuelmap::config::Profile;
//! use fuelmap::core::Transformer;
//!
//! let profile = Profile::default();
//! let template = std::fs::read("ImportadorGenerico.xlsx")?;
//! let data = std::fs::read("transacciones-cepsa.xlsx")?;
//!
//! let output = Transformer::new(&profile).run_with_progress(&template, &data, |p| {
//!     println!("row {} of {}", p.index, p.total);
//! })?;
//!
//! std::fs::write(&output.file_name, &output.bytes)?;
//! println!("written: {}", output.report.rows_written);
//! # Ok::<(), fuelmap::error::FuelmapError>(())
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod types;

// Re-export commonly used types
pub use config::Profile;
pub use error::{FuelmapError, FuelmapResult, RowFieldError};
pub use types::{CellValue, RowProgress, TransformOutput, TransformReport};
