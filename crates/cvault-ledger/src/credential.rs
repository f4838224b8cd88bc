//! # Credential Record and Lifecycle State
//!
//! A credential binds an owner to a document fingerprint and an opaque
//! payload. Everything except the revocation flag is fixed at creation.
//!
//! ## States
//!
//! ```text
//! ACTIVE ──▶ REVOKED (terminal)
//! ```
//!
//! There is no transfer, no reinstatement, and no deletion.

use serde::{Deserialize, Serialize};

use cvault_core::{Address, CredentialId, DocHash, EncryptedPayload, Timestamp};

// ─── Credential State ────────────────────────────────────────────────

/// The lifecycle state of a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialState {
    /// Registered and usable.
    Active,
    /// Permanently withdrawn by the owner (terminal).
    Revoked,
}

impl CredentialState {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Revoked)
    }
}

impl std::fmt::Display for CredentialState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Active => "ACTIVE",
            Self::Revoked => "REVOKED",
        };
        f.write_str(s)
    }
}

// ─── Credential ──────────────────────────────────────────────────────

/// A registered credential.
///
/// Fields are private: callers read through accessors and only the ledger
/// can flip the revocation flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    id: CredentialId,
    owner: Address,
    doc_hash: DocHash,
    encrypted_payload: EncryptedPayload,
    created_at: Timestamp,
    revoked: bool,
}

impl Credential {
    /// A fresh, active credential.
    pub(crate) fn new(
        id: CredentialId,
        owner: Address,
        doc_hash: DocHash,
        encrypted_payload: EncryptedPayload,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            owner,
            doc_hash,
            encrypted_payload,
            created_at,
            revoked: false,
        }
    }

    /// Ledger-assigned id, unique and never reused.
    pub fn id(&self) -> CredentialId {
        self.id
    }

    /// The registering identity. Ownership never changes.
    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Fingerprint of the credential document, fixed at registration.
    pub fn doc_hash(&self) -> &DocHash {
        &self.doc_hash
    }

    /// Opaque ciphertext supplied by the owner. Never inspected.
    pub fn encrypted_payload(&self) -> &EncryptedPayload {
        &self.encrypted_payload
    }

    /// Ledger time at registration.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Whether the owner has revoked the credential.
    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    /// Current lifecycle state, derived from the revocation flag.
    pub fn state(&self) -> CredentialState {
        if self.revoked {
            CredentialState::Revoked
        } else {
            CredentialState::Active
        }
    }

    /// Whether the credential is usable.
    pub fn is_active(&self) -> bool {
        !self.revoked
    }

    /// ACTIVE → REVOKED. Callers check the current state first; calling this
    /// on a revoked credential leaves it revoked.
    pub(crate) fn mark_revoked(&mut self) {
        self.revoked = true;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
