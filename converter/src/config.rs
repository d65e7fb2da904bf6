//! Conversion options and their defaults.
//!
//! The CLI builds these from arguments and environment variables; library
//! callers can start from [`ConvertOptions::default`], which points at the
//! simulator's data layout.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::CsvError;

/// Default CSV input, relative to the working directory.
pub const DEFAULT_INPUT: &str = "data/2024-25/cleaned_players.csv";

/// Default JSON output, relative to the working directory.
pub const DEFAULT_OUTPUT: &str = "public/cleaned_players.json";

/// Default key for extra cells under [`RaggedPolicy::Collect`].
pub const DEFAULT_REST_KEY: &str = "_extra";

/// Candidates tried by delimiter auto-detection.
pub const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

// =============================================================================
// Encoding
// =============================================================================

/// How input bytes are turned into text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputEncoding {
    /// Strict UTF-8.
    #[default]
    Utf8,
    /// Detect with chardet.
    Auto,
    /// Any WHATWG encoding label understood by encoding_rs.
    Label(String),
}

impl FromStr for InputEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" => Err("encoding must not be empty".to_string()),
            "utf-8" | "utf8" => Ok(InputEncoding::Utf8),
            "auto" => Ok(InputEncoding::Auto),
            other => Ok(InputEncoding::Label(other.to_string())),
        }
    }
}

impl fmt::Display for InputEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputEncoding::Utf8 => write!(f, "utf-8"),
            InputEncoding::Auto => write!(f, "auto"),
            InputEncoding::Label(label) => write!(f, "{}", label),
        }
    }
}

// =============================================================================
// Delimiter
// =============================================================================

/// Field delimiter selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterChoice {
    Fixed(u8),
    /// Pick the most frequent candidate in the header line.
    Auto,
}

impl Default for DelimiterChoice {
    fn default() -> Self {
        DelimiterChoice::Fixed(b',')
    }
}

impl DelimiterChoice {
    /// Parse a user-supplied delimiter such as `,`, `tab`, `\t` or `auto`.
    pub fn parse(s: &str) -> Result<Self, CsvError> {
        match s {
            "auto" => Ok(DelimiterChoice::Auto),
            "tab" | "\\t" | "\t" => Ok(DelimiterChoice::Fixed(b'\t')),
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii() => Ok(DelimiterChoice::Fixed(c as u8)),
                    _ => Err(CsvError::InvalidDelimiter(s.to_string())),
                }
            }
        }
    }
}

impl FromStr for DelimiterChoice {
    type Err = CsvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DelimiterChoice::parse(s)
    }
}

/// Printable form of a delimiter byte (`\t` for tab).
pub fn format_delimiter(d: u8) -> String {
    match d {
        b'\t' => "\\t".to_string(),
        c => (c as char).to_string(),
    }
}

// =============================================================================
// Ragged Rows
// =============================================================================

/// What to do with data rows whose width differs from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RaggedPolicy {
    /// Missing cells become null, extra cells are dropped.
    #[default]
    Pad,
    /// Like `Pad`, but extra cells are kept as an array under the rest key.
    Collect,
    /// Reject the row.
    Strict,
}

// =============================================================================
// Parse / Output / Convert Options
// =============================================================================

/// Options for [`crate::parser::parse_records`].
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub delimiter: DelimiterChoice,
    pub ragged: RaggedPolicy,
    pub rest_key: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: DelimiterChoice::default(),
            ragged: RaggedPolicy::default(),
            rest_key: DEFAULT_REST_KEY.to_string(),
        }
    }
}

/// JSON rendering options for [`crate::writer::write_json`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonStyle {
    /// Spaces per nesting level; `None` renders compact JSON.
    pub indent: Option<usize>,
    /// Escape non-ASCII characters as `\uXXXX`.
    pub ascii: bool,
    pub trailing_newline: bool,
}

impl Default for JsonStyle {
    fn default() -> Self {
        Self {
            indent: Some(2),
            ascii: false,
            trailing_newline: false,
        }
    }
}

/// Everything a single conversion needs.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub encoding: InputEncoding,
    pub parse: ParseOptions,
    pub style: JsonStyle,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            encoding: InputEncoding::default(),
            parse: ParseOptions::default(),
            style: JsonStyle::default(),
        }
    }
}

impl ConvertOptions {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ..Self::default()
        }
    }
}
