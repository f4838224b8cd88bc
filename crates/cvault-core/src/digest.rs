//! # Document Digest
//!
//! `DocHash` is the 32-byte fingerprint of a credential document. The vault
//! never computes it; the client hashes the document and submits the digest.
//!
//! ## Security Invariant
//!
//! Digest equality for verification goes through [`DocHash::ct_eq`], which
//! compares every byte regardless of where the first difference lies. The
//! derived `PartialEq` is kept for map keys and tests only.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use subtle::ConstantTimeEq;

use crate::error::{decode_prefixed_hex, encode_prefixed_hex, ValidationError};

/// Length of a document digest in bytes.
pub const DOC_HASH_LEN: usize = 32;

/// A 32-byte document fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocHash([u8; DOC_HASH_LEN]);

impl DocHash {
    /// The all-zero digest. Rejected at registration.
    pub const ZERO: Self = Self([0u8; DOC_HASH_LEN]);

    /// Create a digest from raw bytes.
    pub const fn from_bytes(bytes: [u8; DOC_HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a digest from `0x` followed by 64 hex characters.
    ///
    /// Case-insensitive, so a digest rendered by any client compares equal
    /// to the stored one.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDocHash`] on a missing prefix,
    /// wrong length, or non-hex character.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        decode_prefixed_hex::<DOC_HASH_LEN>(s.trim())
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidDocHash(s.to_string()))
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8; DOC_HASH_LEN] {
        &self.0
    }

    /// Whether every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.ct_eq(&Self::ZERO)
    }

    /// Constant-time equality over all 32 bytes.
    pub fn ct_eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }

    /// Render as `0x` + lowercase hex.
    pub fn to_hex(&self) -> String {
        encode_prefixed_hex(&self.0)
    }
}

impl FromStr for DocHash {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for DocHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for DocHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for DocHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH_A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

    #[test]
    fn test_parse_and_display() {
        let h = DocHash::parse(HASH_A).unwrap();
        assert_eq!(h.as_bytes(), &[0xaa; 32]);
        assert_eq!(h.to_string(), HASH_A);
    }

    #[test]
    fn test_parse_uppercase_matches_lowercase() {
        let upper = DocHash::parse(&HASH_A.to_uppercase().replacen("0X", "0x", 1)).unwrap();
        assert!(upper.ct_eq(&DocHash::parse(HASH_A).unwrap()));
    }

    #[test]
    fn test_parse_rejects_address_length() {
        assert!(matches!(
            DocHash::parse("0x70997970c51812dc3a010c7d01b50e0d17dc79c8"),
            Err(ValidationError::InvalidDocHash(_))
        ));
    }

    #[test]
    fn test_zero_detection() {
        assert!(DocHash::ZERO.is_zero());
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        assert!(!DocHash::from_bytes(bytes).is_zero());
    }

    #[test]
    fn test_ct_eq_detects_last_byte_difference() {
        let a = DocHash::from_bytes([7u8; 32]);
        let mut bytes = [7u8; 32];
        bytes[31] = 8;
        let b = DocHash::from_bytes(bytes);
        assert!(a.ct_eq(&a));
        assert!(!a.ct_eq(&b));
    }

    #[test]
    fn test_serde_roundtrip() {
        let h = DocHash::parse(HASH_A).unwrap();
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{HASH_A}\""));
        let parsed: DocHash = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, h);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// `ct_eq` agrees with byte equality for arbitrary digests.
        #[test]
        fn ct_eq_matches_byte_equality(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
            let (ha, hb) = (DocHash::from_bytes(a), DocHash::from_bytes(b));
            prop_assert_eq!(ha.ct_eq(&hb), a == b);
        }

        /// Only the all-zero digest reports `is_zero`.
        #[test]
        fn is_zero_only_for_zero(bytes in any::<[u8; 32]>()) {
            prop_assert_eq!(DocHash::from_bytes(bytes).is_zero(), bytes == [0u8; 32]);
        }
    }
}
