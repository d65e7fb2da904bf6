//! JSON array of objects back to CSV.
//!
//! Used to check that a conversion is structurally reversible. The header
//! is the union of object keys in first-appearance order.

use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::error::{ConvertError, ConvertResult, FlattenError, OutputError};

/// Flatten `json` (an array of objects) into CSV written to `writer`.
///
/// Returns the number of data rows written. Nothing is written when no
/// object has any key, so `[]` and `[{}, {}]` both produce 0 rows.
pub fn flatten_json<W: Write>(json: &str, writer: W, delimiter: u8) -> Result<usize, FlattenError> {
    let objects = parse_objects(json)?;
    write_csv(&objects, writer, delimiter)
}

/// Flatten the JSON file at `input` into CSV at `output`, or stdout when
/// `output` is `None`.
///
/// The JSON is parsed and checked before the output is opened, so invalid
/// input leaves an existing destination untouched.
pub fn flatten_file(input: &Path, output: Option<&Path>, delimiter: u8) -> ConvertResult<usize> {
    let json = fs::read_to_string(input).map_err(|source| ConvertError::ReadInput {
        path: input.to_path_buf(),
        source,
    })?;
    let objects = parse_objects(&json)?;

    let rows = match output {
        Some(path) => {
            let file = File::create(path).map_err(|e| ConvertError::WriteOutput {
                path: path.to_path_buf(),
                source: OutputError::Io(e),
            })?;
            write_csv(&objects, BufWriter::new(file), delimiter)?
        }
        None => write_csv(&objects, io::stdout().lock(), delimiter)?,
    };

    let target = output
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string());
    debug!(input = %input.display(), output = %target, rows, "flatten complete");
    Ok(rows)
}

fn parse_objects(json: &str) -> Result<Vec<Map<String, Value>>, FlattenError> {
    let value: Value = serde_json::from_str(json)?;
    let items = match value {
        Value::Array(items) => items,
        _ => return Err(FlattenError::NotAnArray),
    };

    let mut objects = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(map) => objects.push(map),
            _ => return Err(FlattenError::NotAnObject(index)),
        }
    }
    Ok(objects)
}

fn write_csv<W: Write>(
    objects: &[Map<String, Value>],
    writer: W,
    delimiter: u8,
) -> Result<usize, FlattenError> {
    let headers = collect_headers(objects);
    if headers.is_empty() {
        debug!(objects = objects.len(), "no columns to write");
        return Ok(0);
    }

    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    csv_writer.write_record(&headers)?;
    for object in objects {
        csv_writer.write_record(headers.iter().map(|h| cell_text(object.get(h.as_str()))))?;
    }
    csv_writer.flush()?;

    Ok(objects.len())
}

fn collect_headers(objects: &[Map<String, Value>]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for object in objects {
        for key in object.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    headers
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JsonStyle, ParseOptions};
    use crate::parser::parse_records;
    use crate::writer::to_json_string;

    fn flatten(json: &str) -> String {
        let mut out = Vec::new();
        flatten_json(json, &mut out, b',').unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_flatten_simple() {
        let csv = flatten(r#"[{"name": "Salah", "team": "LIV"}, {"name": "Saka", "team": "ARS"}]"#);
        assert_eq!(csv, "name,team\nSalah,LIV\nSaka,ARS\n");
    }

    #[test]
    fn test_round_trip() {
        let original = "web_name,team,now_cost,note\nSalah,LIV,13.0,\"captain, obviously\"\nRaya,ARS,5.5,\"\"\"safe\"\" pick\"\nGvardiol,MCI,6.0,\n";
        let parsed = parse_records(original, &ParseOptions::default()).unwrap();
        let json = to_json_string(&parsed.records, &JsonStyle::default()).unwrap();

        let csv = flatten(&json);
        let reparsed = parse_records(&csv, &ParseOptions::default()).unwrap();

        assert_eq!(reparsed.headers, parsed.headers);
        assert_eq!(reparsed.records, parsed.records);
        assert_eq!(csv, original);
    }

    #[test]
    fn test_header_is_key_union() {
        let csv = flatten(r#"[{"a": "1"}, {"b": "2", "a": "3"}]"#);
        assert_eq!(csv, "a,b\n1,\n3,2\n");
    }

    #[test]
    fn test_non_string_cells() {
        let csv = flatten(r#"[{"n": 42, "ok": true, "x": null, "list": ["p", "q"]}]"#);
        assert_eq!(csv, "n,ok,x,list\n42,true,,\"[\"\"p\"\",\"\"q\"\"]\"\n");
    }

    #[test]
    fn test_empty_array_writes_nothing() {
        let mut out = Vec::new();
        assert_eq!(flatten_json("[]", &mut out, b',').unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_keyless_objects_write_nothing() {
        let mut out = Vec::new();
        assert_eq!(flatten_json("[{}, {}]", &mut out, b',').unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_semicolon_delimiter() {
        let mut out = Vec::new();
        flatten_json(r#"[{"a": "1,5", "b": "2"}]"#, &mut out, b';').unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a;b\n1,5;2\n");
    }

    #[test]
    fn test_rejects_non_array() {
        let err = flatten_json(r#"{"a": "1"}"#, Vec::new(), b',').unwrap_err();
        assert!(matches!(err, FlattenError::NotAnArray));
    }

    #[test]
    fn test_rejects_non_object_element() {
        let err = flatten_json(r#"[{"a": "1"}, "oops"]"#, Vec::new(), b',').unwrap_err();
        assert!(matches!(err, FlattenError::NotAnObject(1)));
    }

    #[test]
    fn test_rejects_invalid_json() {
        let err = flatten_json("[{", Vec::new(), b',').unwrap_err();
        assert!(matches!(err, FlattenError::Json(_)));
    }

    #[test]
    fn test_flatten_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("players.json");
        let output = dir.path().join("players.csv");
        fs::write(&input, r#"[{"name": "Isak"}]"#).unwrap();

        let rows = flatten_file(&input, Some(output.as_path()), b',').unwrap();
        assert_eq!(rows, 1);
        assert_eq!(fs::read_to_string(&output).unwrap(), "name\nIsak\n");
    }

    #[test]
    fn test_bad_json_leaves_output_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("players.csv");
        fs::write(&output, "previous").unwrap();

        let cases = [
            ("broken.json", "[{"),
            ("object.json", r#"{"a": "1"}"#),
            ("mixed.json", r#"[{"a": "1"}, 2]"#),
        ];
        for (name, json) in cases {
            let input = dir.path().join(name);
            fs::write(&input, json).unwrap();

            let err = flatten_file(&input, Some(output.as_path()), b',').unwrap_err();
            assert!(matches!(err, ConvertError::Flatten(_)));
            assert_eq!(fs::read_to_string(&output).unwrap(), "previous");
        }
    }

    #[test]
    fn test_missing_json_input() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("players.csv");

        let input = dir.path().join("missing.json");
        let err = flatten_file(&input, Some(output.as_path()), b',').unwrap_err();
        assert!(matches!(err, ConvertError::ReadInput { .. }));
        assert!(!output.exists());
    }
}
