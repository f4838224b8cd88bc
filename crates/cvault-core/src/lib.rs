//! # cvault-core — Foundational Types for the Credential Vault
//!
//! Leaf crate of the workspace. Defines the domain primitives every other
//! crate builds on; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `Address`, `CredentialId`,
//!    `DocHash`, `EncryptedPayload` are distinct types. An owner identity
//!    cannot be passed where a digest is expected, and neither is a bare string.
//!
//! 2. **Zero is a sentinel, not a value.** `CredentialId(0)` is never issued
//!    and `DocHash::ZERO` is never registered.
//!
//! 3. **UTC-only timestamps.** `Timestamp` is UTC with seconds precision.
//!    Time enters the ledger only through the [`Clock`] trait so ledger logic
//!    stays deterministic under test.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

pub use digest::DocHash;
pub use error::ValidationError;
pub use identity::{Address, CredentialId, EncryptedPayload};
pub use temporal::{Clock, ManualClock, SystemClock, Timestamp};
