//! Error types for the data-loader crate.
//!
//! Rust error handling concepts demonstrated:
//! - thiserror for defining custom error types
//! - Enum variants for different error cases
//! - Error messages with context
//! - Automatic `Display` and `Error` trait implementations

use thiserror::Error;

/// Errors that can occur during review ingestion and loading.
///
/// The first three variants are file-level and terminal for the read. The
/// last two are per-row: the loader records them, skips the row, and keeps
/// going, so a batch with bad rows still yields a usable partial result.
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Row could not be decoded by the CSV reader
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The file's first row does not restate the expected column names
    #[error("header mismatch: expected columns {expected:?}, found {found:?}")]
    HeaderMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// A rating or average field did not parse as a number
    #[error("malformed {field} value {value:?}, row skipped")]
    MalformedInput { field: String, value: String },

    /// A repeated id restated a different name or average
    #[error(
        "{entity} data mismatch for id {id}: first {stored_name:?} avg {stored_avg}, \
         now {name:?} avg {avg}, row skipped"
    )]
    DataInconsistency {
        entity: String,
        id: String,
        stored_name: String,
        stored_avg: f64,
        name: String,
        avg: f64,
    },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
