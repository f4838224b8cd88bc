//! # Ledger Errors
//!
//! Every ledger failure is synchronous and leaves state untouched. Variants
//! carry the operation that failed and the credential id where one applies,
//! so a caller can report the rejection without re-deriving context.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cvault_core::{Address, CredentialId};

/// The ledger operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Credential registration.
    Register,
    /// Credential lookup.
    Get,
    /// Credential revocation.
    Revoke,
    /// Verifier grant update.
    SetAuthorization,
    /// Fingerprint verification.
    Verify,
}

impl Operation {
    /// Returns the operation name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Get => "get",
            Self::Revoke => "revoke",
            Self::SetAuthorization => "set_authorization",
            Self::Verify => "verify",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Unauthorized,
    AlreadyRevoked,
    Inactive,
    IdSpaceExhausted,
}

/// Errors returned by ledger operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Malformed registration input: zero digest, empty or oversized payload.
    #[error("{op}: invalid input: {reason}")]
    InvalidInput {
        /// The rejected operation.
        op: Operation,
        /// What was wrong with the input.
        reason: String,
    },

    /// The credential id was never issued.
    #[error("{op}: credential {id} not found")]
    NotFound {
        /// The rejected operation.
        op: Operation,
        /// The unknown id.
        id: CredentialId,
    },

    /// The caller is not the owner, or the verifier holds no grant.
    #[error("{op}: {caller} is not authorized for credential {id}")]
    Unauthorized {
        /// The rejected operation.
        op: Operation,
        /// The credential concerned.
        id: CredentialId,
        /// The identity that was refused.
        caller: Address,
    },

    /// Revocation of an already revoked credential.
    #[error("revoke: credential {id} is already revoked")]
    AlreadyRevoked {
        /// The credential concerned.
        id: CredentialId,
    },

    /// The operation requires an active credential.
    #[error("{op}: credential {id} is revoked")]
    Inactive {
        /// The rejected operation.
        op: Operation,
        /// The credential concerned.
        id: CredentialId,
    },

    /// The id counter cannot advance.
    #[error("register: credential id space exhausted")]
    IdSpaceExhausted,
}

impl LedgerError {
    /// Classification for matching without destructuring.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::AlreadyRevoked { .. } => ErrorKind::AlreadyRevoked,
            Self::Inactive { .. } => ErrorKind::Inactive,
            Self::IdSpaceExhausted => ErrorKind::IdSpaceExhausted,
        }
    }

    /// The operation that failed.
    pub fn operation(&self) -> Operation {
        match self {
            Self::InvalidInput { op, .. }
            | Self::NotFound { op, .. }
            | Self::Unauthorized { op, .. }
            | Self::Inactive { op, .. } => *op,
            Self::AlreadyRevoked { .. } => Operation::Revoke,
            Self::IdSpaceExhausted => Operation::Register,
        }
    }

    /// The credential id the failure concerns, if any.
    pub fn credential_id(&self) -> Option<CredentialId> {
        match self {
            Self::NotFound { id, .. }
            | Self::Unauthorized { id, .. }
            | Self::AlreadyRevoked { id }
            | Self::Inactive { id, .. } => Some(*id),
            Self::InvalidInput { .. } | Self::IdSpaceExhausted => None,
        }
    }
}
