//! CSV file to JSON file conversion.
//!
//! The input is read, decoded and fully parsed before the output is
//! opened, so a bad or missing input never touches the destination.

use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::ConvertOptions;
use crate::error::{ConvertError, ConvertResult, OutputError};
use crate::parser::{decode_input, parse_records, ParsedCsv};
use crate::writer::write_json;

/// Summary of a conversion (or inspection) run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionReport {
    pub input: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
    pub ragged_rows: usize,
}

impl ConversionReport {
    fn new(input: &Path, encoding: String, parsed: &ParsedCsv) -> Self {
        Self {
            input: input.to_path_buf(),
            output: None,
            encoding,
            delimiter: parsed.delimiter as char,
            headers: parsed.headers.clone(),
            row_count: parsed.records.len(),
            ragged_rows: parsed.ragged_rows,
        }
    }
}

/// Read, decode and parse the configured input.
fn load(options: &ConvertOptions) -> ConvertResult<(ParsedCsv, String)> {
    debug!(path = %options.input.display(), "reading input");
    let bytes = fs::read(&options.input).map_err(|source| ConvertError::ReadInput {
        path: options.input.clone(),
        source,
    })?;

    let decoded = decode_input(&bytes, &options.encoding)?;
    let parsed = parse_records(&decoded.text, &options.parse)?;
    Ok((parsed, decoded.encoding))
}

/// Parse the input and report on it without writing anything.
pub fn inspect_file(options: &ConvertOptions) -> ConvertResult<ConversionReport> {
    let (parsed, encoding) = load(options)?;
    Ok(ConversionReport::new(&options.input, encoding, &parsed))
}

/// Convert the input and write the JSON document to `writer`.
///
/// `options.output` is ignored; the report's `output` is left empty.
pub fn convert_to_writer<W: Write>(
    options: &ConvertOptions,
    writer: W,
) -> ConvertResult<ConversionReport> {
    let (parsed, encoding) = load(options)?;
    write_json(&parsed.records, writer, &options.style).map_err(|source| {
        ConvertError::WriteOutput {
            path: PathBuf::from("-"),
            source,
        }
    })?;
    Ok(ConversionReport::new(&options.input, encoding, &parsed))
}

/// Convert `options.input` into `options.output`, creating or truncating it.
///
/// # Example
/// ```no_run
/// use fplconv::{convert_file, ConvertOptions};
///
/// let report = convert_file(&ConvertOptions::new("players.csv", "players.json")).unwrap();
/// println!("{} rows", report.row_count);
/// ```
pub fn convert_file(options: &ConvertOptions) -> ConvertResult<ConversionReport> {
    let (parsed, encoding) = load(options)?;

    let write_err = |source: OutputError| ConvertError::WriteOutput {
        path: options.output.clone(),
        source,
    };
    let file = File::create(&options.output).map_err(|e| write_err(e.into()))?;
    write_json(&parsed.records, BufWriter::new(file), &options.style).map_err(write_err)?;

    info!(
        input = %options.input.display(),
        output = %options.output.display(),
        rows = parsed.records.len(),
        "conversion complete"
    );

    let mut report = ConversionReport::new(&options.input, encoding, &parsed);
    report.output = Some(options.output.clone());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JsonStyle, RaggedPolicy};
    use crate::error::CsvError;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn setup(csv: &str) -> (TempDir, ConvertOptions) {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("players.csv");
        fs::write(&input, csv).unwrap();
        let output = dir.path().join("players.json");
        (dir, ConvertOptions::new(input, output))
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_convert_file() {
        let (_dir, options) = setup("first_name,second_name,team\nBukayo,Saka,ARS\nCole,Palmer,CHE\n");
        let report = convert_file(&options).unwrap();

        assert_eq!(report.row_count, 2);
        assert_eq!(report.headers, vec!["first_name", "second_name", "team"]);
        assert_eq!(report.encoding, "utf-8");
        assert_eq!(report.delimiter, ',');
        assert_eq!(report.output.as_deref(), Some(options.output.as_path()));

        assert_eq!(
            read_json(&options.output),
            json!([
                {"first_name": "Bukayo", "second_name": "Saka", "team": "ARS"},
                {"first_name": "Cole", "second_name": "Palmer", "team": "CHE"}
            ])
        );
    }

    #[test]
    fn test_row_count_and_keys() {
        let (_dir, options) = setup("a,b,c\n1,2,3\n4,5,6\n7,8,9\n10,11,12\n");
        convert_file(&options).unwrap();

        let value = read_json(&options.output);
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 4);
        for row in rows {
            let keys: Vec<&str> = row.as_object().unwrap().keys().map(String::as_str).collect();
            assert_eq!(keys, vec!["a", "b", "c"]);
        }
    }

    #[test]
    fn test_header_only_writes_empty_array() {
        let (_dir, options) = setup("a,b,c\n");
        convert_file(&options).unwrap();
        assert_eq!(fs::read_to_string(&options.output).unwrap(), "[]");
    }

    #[test]
    fn test_single_cell() {
        let (_dir, options) = setup("name\nAlice\n");
        convert_file(&options).unwrap();
        assert_eq!(
            fs::read_to_string(&options.output).unwrap(),
            "[\n  {\n    \"name\": \"Alice\"\n  }\n]"
        );
    }

    #[test]
    fn test_numeric_cell_stays_string() {
        let (_dir, options) = setup("id\n42\n");
        convert_file(&options).unwrap();
        assert_eq!(read_json(&options.output), json!([{"id": "42"}]));
    }

    #[test]
    fn test_idempotent() {
        let (_dir, options) = setup("name,price\nHaaland,15.0\n\"Son, H\",9.5\n");
        convert_file(&options).unwrap();
        let first = fs::read(&options.output).unwrap();
        convert_file(&options).unwrap();
        let second = fs::read(&options.output).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_overwrites_existing_output() {
        let (_dir, options) = setup("a\n1\n");
        fs::write(&options.output, "stale content that is longer than the result").unwrap();
        convert_file(&options).unwrap();
        assert_eq!(read_json(&options.output), json!([{"a": "1"}]));
    }

    #[test]
    fn test_missing_input_leaves_output_untouched() {
        let dir = TempDir::new().unwrap();
        let options = ConvertOptions::new(dir.path().join("missing.csv"), dir.path().join("out.json"));

        let err = convert_file(&options).unwrap_err();
        assert!(matches!(err, ConvertError::ReadInput { .. }));
        assert!(!options.output.exists());

        fs::write(&options.output, "previous").unwrap();
        assert!(convert_file(&options).is_err());
        assert_eq!(fs::read_to_string(&options.output).unwrap(), "previous");
    }

    #[test]
    fn test_bad_input_leaves_output_untouched() {
        let (_dir, options) = setup("a\n1\n");
        fs::write(&options.input, b"a\n\xFF\n").unwrap();
        fs::write(&options.output, "previous").unwrap();

        let err = convert_file(&options).unwrap_err();
        assert!(matches!(err, ConvertError::Csv(CsvError::InvalidUtf8 { .. })));
        assert_eq!(fs::read_to_string(&options.output).unwrap(), "previous");
    }

    #[test]
    fn test_strict_ragged_fails() {
        let (_dir, mut options) = setup("a,b\n1\n");
        options.parse.ragged = RaggedPolicy::Strict;
        let err = convert_file(&options).unwrap_err();
        assert!(matches!(err, ConvertError::Csv(CsvError::RaggedRow { .. })));
        assert!(!options.output.exists());
    }

    #[test]
    fn test_missing_output_directory() {
        let (dir, mut options) = setup("a\n1\n");
        options.output = dir.path().join("no_such_dir").join("out.json");
        let err = convert_file(&options).unwrap_err();
        match err {
            ConvertError::WriteOutput { path, .. } => assert_eq!(path, options.output),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_convert_to_writer() {
        let (_dir, mut options) = setup("name\nRice\n");
        options.style = JsonStyle {
            indent: None,
            ..JsonStyle::default()
        };
        let mut out = Vec::new();
        let report = convert_to_writer(&options, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), r#"[{"name":"Rice"}]"#);
        assert!(report.output.is_none());
        assert!(!options.output.exists());
    }

    #[test]
    fn test_inspect_report_json() {
        let (_dir, mut options) = setup("a;b\n1;2\n");
        options.parse.delimiter = crate::config::DelimiterChoice::Auto;

        let report = inspect_file(&options).unwrap();
        assert_eq!(report.delimiter, ';');
        assert_eq!(report.row_count, 1);
        assert!(!options.output.exists());

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["rowCount"], 1);
        assert_eq!(value["raggedRows"], 0);
        assert_eq!(value["headers"], json!(["a", "b"]));
        assert!(value.get("output").is_none());
    }
}
