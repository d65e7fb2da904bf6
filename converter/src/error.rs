//! Error types for the conversion pipeline.
//!
//! - [`CsvError`] - decoding and CSV parsing errors
//! - [`OutputError`] - JSON serialization and write errors
//! - [`FlattenError`] - JSON to CSV errors
//! - [`ConvertError`] - top-level errors carrying the offending path
//!
//! Every lower-level error converts into [`ConvertError`] via `From`,
//! so `?` works across layers.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// CSV Input Errors
// =============================================================================

/// Errors while decoding or parsing CSV input.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Input is not valid UTF-8.
    #[error("Invalid UTF-8 input at byte {offset}")]
    InvalidUtf8 { offset: usize },

    /// Input contains sequences that are malformed in the chosen encoding.
    #[error("Input is not valid {0}")]
    Malformed(String),

    /// Encoding label not recognised.
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    /// Delimiter is not a single ASCII character.
    #[error("Invalid delimiter '{0}': must be a single ASCII character")]
    InvalidDelimiter(String),

    /// Rest key for collected extras is also a header name.
    #[error("Rest key '{0}' collides with a column of the same name")]
    RestKeyCollision(String),

    /// Malformed CSV.
    #[error("Line {line}: {message}")]
    Parse { line: u64, message: String },

    /// Row width differs from the header under the strict policy.
    #[error("Line {line}: expected {expected} fields, found {found}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        CsvError::Parse {
            line,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// JSON Output Errors
// =============================================================================

/// Errors while serializing or writing the JSON document.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Flatten Errors
// =============================================================================

/// Errors while flattening a JSON array back into CSV.
#[derive(Debug, Error)]
pub enum FlattenError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Top-level JSON value is not an array.
    #[error("Expected a JSON array of objects")]
    NotAnArray,

    /// Array element at this index is not an object.
    #[error("Element {0} is not a JSON object")]
    NotAnObject(usize),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Top-level Errors
// =============================================================================

/// Top-level error returned by [`crate::convert`] and [`crate::flatten`] entry points.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Input could not be opened or read.
    #[error("Cannot read '{}': {source}", .path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Output could not be created or written.
    #[error("Cannot write '{}': {source}", .path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: OutputError,
    },

    #[error("Flatten error: {0}")]
    Flatten(#[from] FlattenError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV input operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for top-level operations.
pub type ConvertResult<T> = Result<T, ConvertError>;
