//! CSV to ordered JSON records.
//!
//! Each data row becomes a [`RowRecord`] keyed by the header, in header
//! order. Cell values are always JSON strings; the only non-string values
//! come from ragged rows (`null` for missing cells, an array for collected
//! extras).

pub mod encoding;

use csv::StringRecord;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::{DelimiterChoice, ParseOptions, RaggedPolicy, DELIMITER_CANDIDATES};
use crate::error::{CsvError, CsvResult};

pub use encoding::{decode_input, detect_encoding, Decoded};

/// One data row: header name to cell value, in header order.
pub type RowRecord = Map<String, Value>;

/// Parsed CSV with metadata
#[derive(Debug, Clone, Default)]
pub struct ParsedCsv {
    /// Column headers, in file order
    pub headers: Vec<String>,
    /// One record per non-blank data row
    pub records: Vec<RowRecord>,
    /// Delimiter actually used
    pub delimiter: u8,
    /// Data rows whose width differed from the header
    pub ragged_rows: usize,
}

/// Detect the delimiter by counting candidates in the first non-blank line.
///
/// Falls back to `,` when no candidate occurs.
pub fn detect_delimiter(content: &str) -> u8 {
    let first_line = content
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");

    let mut best_sep = b',';
    let mut best_count = 0;

    for &sep in &DELIMITER_CANDIDATES {
        let count = first_line.bytes().filter(|&b| b == sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text into ordered records.
///
/// The first record is the header. Blank lines are skipped. An input with
/// no header at all yields no headers and no records.
///
/// # Example
/// ```
/// use fplconv::{parse_records, ParseOptions};
///
/// let parsed = parse_records("name,goals\nSalah,19", &ParseOptions::default()).unwrap();
/// assert_eq!(parsed.records.len(), 1);
/// assert_eq!(parsed.records[0]["goals"], "19");
/// ```
pub fn parse_records(content: &str, options: &ParseOptions) -> CsvResult<ParsedCsv> {
    let delimiter = match options.delimiter {
        DelimiterChoice::Fixed(d) => d,
        DelimiterChoice::Auto => detect_delimiter(content),
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());
    let mut rows = reader.records();

    let headers: Vec<String> = match rows.next() {
        Some(header) => header?.iter().map(str::to_string).collect(),
        None => {
            debug!("input has no header line");
            return Ok(ParsedCsv {
                delimiter,
                ..ParsedCsv::default()
            });
        }
    };
    warn_duplicate_headers(&headers);
    if options.ragged == RaggedPolicy::Collect && headers.contains(&options.rest_key) {
        return Err(CsvError::RestKeyCollision(options.rest_key.clone()));
    }

    let mut records = Vec::new();
    let mut ragged_rows = 0;

    for result in rows {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        if row.len() != headers.len() {
            if options.ragged == RaggedPolicy::Strict {
                return Err(CsvError::RaggedRow {
                    line,
                    expected: headers.len(),
                    found: row.len(),
                });
            }
            warn!(
                line,
                expected = headers.len(),
                found = row.len(),
                "ragged row"
            );
            ragged_rows += 1;
        }

        records.push(build_record(&headers, &row, options));
    }

    debug!(
        columns = headers.len(),
        rows = records.len(),
        ragged_rows,
        "parsed csv"
    );

    Ok(ParsedCsv {
        headers,
        records,
        delimiter,
        ragged_rows,
    })
}

fn build_record(headers: &[String], row: &StringRecord, options: &ParseOptions) -> RowRecord {
    let mut record = Map::with_capacity(headers.len());

    // Duplicate headers keep their first position and take the last value.
    for (i, header) in headers.iter().enumerate() {
        let value = row
            .get(i)
            .map(|cell| Value::String(cell.to_string()))
            .unwrap_or(Value::Null);
        record.insert(header.clone(), value);
    }

    if options.ragged == RaggedPolicy::Collect && row.len() > headers.len() {
        let extra = row
            .iter()
            .skip(headers.len())
            .map(|cell| Value::String(cell.to_string()))
            .collect();
        record.insert(options.rest_key.clone(), Value::Array(extra));
    }

    record
}

fn warn_duplicate_headers(headers: &[String]) {
    for (i, header) in headers.iter().enumerate() {
        if headers[..i].contains(header) {
            warn!(column = %header, "duplicate header, later values overwrite earlier ones");
        }
    }
}
