//! Byte-to-text decoding with optional charset detection.

use encoding_rs::Encoding;
use tracing::debug;

use crate::config::InputEncoding;
use crate::error::{CsvError, CsvResult};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decoded input text plus the name of the encoding actually used.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub text: String,
    pub encoding: String,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode input bytes according to `encoding`.
///
/// UTF-8 is strict: invalid sequences are an error rather than being
/// replaced. A leading byte order mark is dropped in every mode.
pub fn decode_input(bytes: &[u8], encoding: &InputEncoding) -> CsvResult<Decoded> {
    match encoding {
        InputEncoding::Utf8 => decode_utf8(bytes),
        InputEncoding::Auto => {
            let detected = detect_encoding(bytes);
            debug!(encoding = %detected, "detected input encoding");
            match Encoding::for_label(detected.as_bytes()) {
                Some(enc) if enc == encoding_rs::UTF_8 => decode_utf8(bytes),
                Some(enc) => decode_with(bytes, enc),
                None => {
                    debug!(encoding = %detected, "no decoder for detected encoding, using utf-8");
                    decode_utf8(bytes)
                }
            }
        }
        InputEncoding::Label(label) => {
            let enc = Encoding::for_label(label.as_bytes())
                .ok_or_else(|| CsvError::UnknownEncoding(label.clone()))?;
            if enc == encoding_rs::UTF_8 {
                decode_utf8(bytes)
            } else {
                decode_with(bytes, enc)
            }
        }
    }
}

fn decode_utf8(bytes: &[u8]) -> CsvResult<Decoded> {
    let (body, skipped) = match bytes.strip_prefix(UTF8_BOM) {
        Some(rest) => (rest, UTF8_BOM.len()),
        None => (bytes, 0),
    };
    let text = std::str::from_utf8(body).map_err(|e| CsvError::InvalidUtf8 {
        offset: skipped + e.valid_up_to(),
    })?;
    Ok(Decoded {
        text: text.to_string(),
        encoding: "utf-8".to_string(),
    })
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> CsvResult<Decoded> {
    // A BOM overrides the requested encoding, as in browsers.
    let (enc, body) = match Encoding::for_bom(bytes) {
        Some((bom_enc, len)) => (bom_enc, &bytes[len..]),
        None => (enc, bytes),
    };
    let text = enc
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| CsvError::Malformed(enc.name().to_string()))?;
    Ok(Decoded {
        text: text.into_owned(),
        encoding: enc.name().to_lowercase(),
    })
}
