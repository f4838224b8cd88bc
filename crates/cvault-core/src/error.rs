//! # Validation Errors
//!
//! Construction-time failures for the domain newtypes. Each variant carries
//! the rejected input so a caller can report it without guesswork.

use thiserror::Error;

/// Validation errors for domain primitive newtypes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Address is not `0x` followed by 40 hex characters.
    #[error("invalid address: \"{0}\" (expected 0x followed by 40 hex characters)")]
    InvalidAddress(String),

    /// Document hash is not `0x` followed by 64 hex characters.
    #[error("invalid document hash: \"{0}\" (expected 0x followed by 64 hex characters)")]
    InvalidDocHash(String),

    /// Credential id is not a positive decimal integer.
    #[error("invalid credential id: \"{0}\" (expected a positive integer)")]
    InvalidCredentialId(String),

    /// Timestamp string is not valid UTC RFC 3339.
    #[error("invalid timestamp: \"{value}\" ({reason})")]
    InvalidTimestamp {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Decode a `0x`-prefixed hex string into exactly `N` bytes.
///
/// Accepts upper- and lower-case digits. Returns `None` on a missing prefix,
/// wrong length, or a non-hex character.
pub(crate) fn decode_prefixed_hex<const N: usize>(s: &str) -> Option<[u8; N]> {
    let hex = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    if hex.len() != N * 2 {
        return None;
    }
    let mut out = [0u8; N];
    for (i, pair) in hex.as_bytes().chunks_exact(2).enumerate() {
        let hi = hex_value(pair[0])?;
        let lo = hex_value(pair[1])?;
        out[i] = (hi << 4) | lo;
    }
    Some(out)
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Render bytes as `0x` followed by lowercase hex.
pub(crate) fn encode_prefixed_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(2 + bytes.len() * 2);
    s.push_str("0x");
    for b in bytes {
        s.push_str(&format!("{b:02x}"));
    }
    s
}
