//! JSON rendering of record sequences.
//!
//! The default style reproduces a 2-space indented document with `": "`
//! between keys and values and no trailing newline, so `[]` is written for
//! an empty sequence.

pub mod ascii;

use serde::Serialize;
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use serde_json::Serializer;
use std::io::Write;

use crate::config::JsonStyle;
use crate::error::OutputError;
use crate::parser::RowRecord;

pub use ascii::AsciiFormatter;

/// Serialize `records` as a JSON array into `writer`.
///
/// The writer is flushed before returning so buffered write errors surface
/// here rather than on drop.
pub fn write_json<W: Write>(
    records: &[RowRecord],
    mut writer: W,
    style: &JsonStyle,
) -> Result<(), OutputError> {
    match style.indent {
        Some(width) => {
            let indent = vec![b' '; width];
            let pretty = PrettyFormatter::with_indent(&indent);
            if style.ascii {
                serialize_with(records, &mut writer, AsciiFormatter::new(pretty))?;
            } else {
                serialize_with(records, &mut writer, pretty)?;
            }
        }
        None => {
            if style.ascii {
                serialize_with(records, &mut writer, AsciiFormatter::new(CompactFormatter))?;
            } else {
                serialize_with(records, &mut writer, CompactFormatter)?;
            }
        }
    }

    if style.trailing_newline {
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Render `records` to a string.
pub fn to_json_string(records: &[RowRecord], style: &JsonStyle) -> Result<String, OutputError> {
    let mut out = Vec::new();
    write_json(records, &mut out, style)?;
    // Every formatter here emits UTF-8.
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn serialize_with<W: Write, F: Formatter>(
    records: &[RowRecord],
    writer: W,
    formatter: F,
) -> Result<(), serde_json::Error> {
    let mut ser = Serializer::with_formatter(writer, formatter);
    records.serialize(&mut ser)
}
