//! Transformation engine: ingest, reset, map-and-write, serialize

pub mod normalize;
pub mod transformer;

pub use transformer::{output_file_name, IngestSummary, Transformer};
