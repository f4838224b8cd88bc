//! # cvault-ledger — Credential Ownership Ledger
//!
//! The state machine of the credential vault. An owner registers a
//! document fingerprint, may revoke it, and grants or withdraws per-verifier
//! permission to check it. An authorized verifier submits a candidate
//! fingerprint and the outcome is recorded.
//!
//! ## Components
//!
//! - **OwnershipGuard** (`guard.rs`): the single owner-check predicate and
//!   the canonical `Unauthorized` failure it produces.
//! - **CredentialStore** (`store.rs`): register, get, revoke, list by owner.
//!   Owns id allocation.
//! - **AuthorizationRegistry** (`authorization.rs`): per-(credential, verifier)
//!   grants, settable only by the owner of an active credential.
//! - **VerificationLedger** (`verification.rs`): authorized fingerprint
//!   comparison and the last recorded outcome per verifier.
//! - **CredentialVault** (`vault.rs`): the commit boundary. Holds storage
//!   behind a write lock so each mutation validates, applies, and notifies
//!   as one unit, in a single total order.
//!
//! ## Credential Lifecycle
//!
//! ```text
//! register ──▶ ACTIVE ──revoke──▶ REVOKED (terminal)
//! ```
//!
//! Credentials are never deleted. Revocation is a flag, so the record and
//! its verification history stay auditable.
//!
//! ## Collaborators
//!
//! Caller identity, time, and event delivery are injected: callers pass an
//! authenticated [`Address`](cvault_core::Address), the vault reads a
//! [`Clock`](cvault_core::Clock), and events go to a [`NotificationSink`].
//! Storage is a [`LedgerStorage`] implementation, in memory by default.

pub mod authorization;
pub mod config;
pub mod credential;
pub mod error;
pub mod event;
pub mod guard;
pub mod storage;
pub mod store;
pub mod vault;
pub mod verification;

pub use authorization::AuthorizationRegistry;
pub use config::{ConfigError, VaultConfig, VerifyPolicy};
pub use credential::{Credential, CredentialState};
pub use error::{ErrorKind, LedgerError, Operation};
pub use event::{Committed, LedgerEvent, MemorySink, NotificationSink, TracingSink};
pub use guard::OwnershipGuard;
pub use storage::{
    GrantEntry, InMemoryStorage, LedgerSnapshot, LedgerStorage, RecordEntry, SnapshotError,
};
pub use store::CredentialStore;
pub use vault::CredentialVault;
pub use verification::{VerificationLedger, VerificationRecord};
