//! Fuelmap API Server module
//!
//! HTTP surface for the upload-process-download workflow.
//! Run with `fuelmap-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server};
