//! Recovery of the stack count from an auction's `item_bytes` blob.
//!
//! The blob is base64 text wrapping a gzip-compressed NBT compound. Rather than
//! parsing NBT, the decompressed bytes are rendered as an escaped byte literal
//! (`b'\n\x00\x00\t...'`) and the count is read from the two hex digits that
//! follow the first `Count\x` marker.
//!
//! This only works when the count byte is rendered as a `\xNN` escape. Counts
//! that happen to be printable ASCII (32..=126) or one of `\t`, `\n`, `\r` are
//! not recovered. Kept for compatibility with existing consumers of
//! `count_section`; do not build new behavior on top of it.

use std::io::Read;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::read::GzDecoder;
use thiserror::Error;

const COUNT_MARKER: &str = "Count\\x";

#[derive(Debug, Error)]
pub enum ItemBytesError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid gzip stream: {0}")]
    Gzip(#[from] std::io::Error),
}

/// Decodes and decompresses `item_bytes`, returning the escaped literal form.
pub fn decode_item_bytes(encoded: &str) -> Result<String, ItemBytesError> {
    let compressed = STANDARD.decode(encoded.trim())?;

    let mut decompressed = Vec::new();
    GzDecoder::new(compressed.as_slice()).read_to_end(&mut decompressed)?;

    Ok(escape_bytes(&decompressed))
}

/// Reads the count following the first `Count\x` marker, if any.
#[must_use]
pub fn extract_count(escaped: &str) -> Option<u32> {
    let start = escaped.find(COUNT_MARKER)? + COUNT_MARKER.len();
    let digits = escaped.get(start..start + 2)?;
    u32::from_str_radix(digits, 16).ok()
}

/// Convenience wrapper used by the search pipeline. Decode failures are
/// logged at debug level and yield `None`.
#[must_use]
pub fn item_count(encoded: &str) -> Option<u32> {
    match decode_item_bytes(encoded) {
        Ok(escaped) => extract_count(&escaped),
        Err(e) => {
            tracing::debug!(error = %e, "Could not decode item bytes");
            None
        }
    }
}

/// Renders bytes as a `b'...'` literal: printable ASCII verbatim, `\t` `\n`
/// `\r` and the delimiter escaped, everything else as lower-case `\xNN`.
fn escape_bytes(bytes: &[u8]) -> String {
    let quote = if bytes.contains(&b'\'') && !bytes.contains(&b'"') {
        b'"'
    } else {
        b'\''
    };

    let mut out = String::with_capacity(bytes.len() * 2 + 3);
    out.push('b');
    out.push(quote as char);

    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            _ if b == quote => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{b:02x}")),
        }
    }

    out.push(quote as char);
    out
}
