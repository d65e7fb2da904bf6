//! # fplconv - player CSV to JSON conversion
//!
//! Turns the simulator's cleaned player CSV into the JSON array the
//! frontend loads. Every data row becomes one object whose keys follow the
//! header order and whose values stay strings.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Decode    │────▶│   Parser    │────▶│ JSON Writer │
//! │  (players)  │     │  (UTF-8)    │     │  (records)  │     │  (indent 2) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fplconv::{convert_file, ConvertOptions};
//!
//! let report = convert_file(&ConvertOptions::default()).unwrap();
//! println!("Converted {} players", report.row_count);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Options and defaults
//! - [`parser`] - Decoding and CSV parsing
//! - [`writer`] - JSON rendering
//! - [`convert`] - File to file conversion
//! - [`flatten`] - JSON back to CSV

// Core modules
pub mod config;
pub mod error;

// Input
pub mod parser;

// Output
pub mod writer;

// Pipelines
pub mod convert;
pub mod flatten;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{ConvertError, ConvertResult, CsvError, CsvResult, FlattenError, OutputError};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{
    format_delimiter, ConvertOptions, DelimiterChoice, InputEncoding, JsonStyle, ParseOptions,
    RaggedPolicy, DEFAULT_INPUT, DEFAULT_OUTPUT, DEFAULT_REST_KEY,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode_input, detect_delimiter, detect_encoding, parse_records, Decoded, ParsedCsv, RowRecord,
};

// =============================================================================
// Re-exports - Writing
// =============================================================================

pub use writer::{to_json_string, write_json, AsciiFormatter};

// =============================================================================
// Re-exports - Pipelines
// =============================================================================

pub use convert::{convert_file, convert_to_writer, inspect_file, ConversionReport};
pub use flatten::{flatten_file, flatten_json};
