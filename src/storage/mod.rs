//! Flat-file record store for the collection endpoint.
//!
//! # Layout
//! ```text
//! <dir>/performance_metrics.json   pretty JSON array, one document per record
//! <dir>/performance_metrics.csv    one row per record, joined on `id`
//! ```
//!
//! # Design Decisions
//! - Documents are stored as received; no schema is imposed on ingest
//! - Appends are serialized behind an async mutex
//! - A corrupt JSON file is reported, never silently replaced

pub mod csv;
pub mod file;

use thiserror::Error;

pub use csv::{csv_row, CSV_HEADER};
pub use file::{FileStore, CSV_FILE, JSON_FILE};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
