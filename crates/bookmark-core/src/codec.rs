//! Reversible encoding of file paths into flat document keys.
//!
//! A file key is the path percent-encoded the way URI components are
//! (everything but `A-Z a-z 0-9 - _ ! ~ * ' ( )` is escaped as UTF-8
//! bytes), with `.` escaped as well so a key never contains the key path
//! separator.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed percent escape at byte {offset}")]
    InvalidEscape { offset: usize },
    #[error("decoded bytes are not valid UTF-8")]
    InvalidUtf8,
}

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

fn is_unescaped(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')')
}

/// Encode an absolute file path into a file key.
pub fn encode(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for &b in path.as_bytes() {
        if is_unescaped(b) {
            out.push(char::from(b));
        } else {
            out.push('%');
            out.push(char::from(HEX_UPPER[usize::from(b >> 4)]));
            out.push(char::from(HEX_UPPER[usize::from(b & 0x0f)]));
        }
    }
    out
}

/// Decode a file key back into the path it was built from.
///
/// `%2E` needs no special handling: it decodes to `.` like any escape.
pub fn decode(key: &str) -> Result<String, DecodeError> {
    let bytes = key.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let hi = bytes.get(i + 1).copied().and_then(hex_value);
        let lo = bytes.get(i + 2).copied().and_then(hex_value);
        match (hi, lo) {
            (Some(hi), Some(lo)) => out.push((hi << 4) | lo),
            _ => return Err(DecodeError::InvalidEscape { offset: i }),
        }
        i += 3;
    }
    String::from_utf8(out).map_err(|_| DecodeError::InvalidUtf8)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
