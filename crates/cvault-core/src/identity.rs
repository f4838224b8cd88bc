//! # Identity Newtypes
//!
//! Domain-primitive newtypes for the parties and records of the vault.
//! Each is a distinct type: an [`Address`] cannot be passed where a
//! [`CredentialId`] or a digest is expected.
//!
//! ## Validation
//!
//! [`Address`] parses from `0x` + 40 hex characters and always renders as
//! lowercase hex. [`CredentialId`] wraps the sequential `u64` issued by the
//! ledger; `0` is the invalid sentinel and is never issued.
//! [`EncryptedPayload`] is opaque; emptiness is checked by the ledger at
//! registration, not here.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{decode_prefixed_hex, encode_prefixed_hex, ValidationError};

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// Length of an identity address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// An already-authenticated identity: credential owner or verifier.
///
/// The ledger trusts the address it is given; authentication belongs to the
/// identity source in front of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Self = Self([0u8; ADDRESS_LEN]);

    /// Create an address from raw bytes.
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse an address from `0x` followed by 40 hex characters.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAddress`] on a missing prefix,
    /// wrong length, or non-hex character.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        decode_prefixed_hex::<ADDRESS_LEN>(s.trim())
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidAddress(s.to_string()))
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Render as `0x` + lowercase hex.
    pub fn to_hex(&self) -> String {
        encode_prefixed_hex(&self.0)
    }
}

impl FromStr for Address {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// CredentialId
// ---------------------------------------------------------------------------

/// Sequential credential identifier.
///
/// Issued in strictly increasing order starting at [`CredentialId::FIRST`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialId(u64);

impl CredentialId {
    /// The invalid sentinel. Never issued.
    pub const SENTINEL: Self = Self(0);

    /// The first id the ledger issues.
    pub const FIRST: Self = Self(1);

    /// Wrap a raw id value. Lookups of unknown values fail at the ledger.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Access the raw value.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Whether this is the invalid sentinel.
    pub const fn is_sentinel(&self) -> bool {
        self.0 == 0
    }

    /// The id following this one, or `None` on overflow.
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl FromStr for CredentialId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u64>() {
            Ok(n) if n > 0 => Ok(Self(n)),
            _ => Err(ValidationError::InvalidCredentialId(s.to_string())),
        }
    }
}

impl std::fmt::Display for CredentialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// EncryptedPayload
// ---------------------------------------------------------------------------

/// Opaque payload stored alongside a credential, typically a ciphertext or
/// a handle to one. The ledger never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedPayload(String);

impl EncryptedPayload {
    /// Wrap a payload value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the payload text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for EncryptedPayload {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EncryptedPayload {
    fn from(value: String) -> Self {
        Self(value)
    }
}
