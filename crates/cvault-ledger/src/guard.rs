//! # Ownership Guard
//!
//! The one place the owner-check policy lives. Every owner-restricted
//! operation calls [`OwnershipGuard::require_owner`], so "not the owner"
//! always surfaces as the same `Unauthorized` failure.

use cvault_core::Address;

use crate::credential::Credential;
use crate::error::{LedgerError, Operation};

/// Owner-check predicate for owner-restricted operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnershipGuard;

impl OwnershipGuard {
    /// Whether `identity` owns `credential`.
    pub fn is_owner(credential: &Credential, identity: &Address) -> bool {
        credential.owner() == identity
    }

    /// Fail with `Unauthorized` unless `caller` owns `credential`.
    pub fn require_owner(
        credential: &Credential,
        caller: &Address,
        op: Operation,
    ) -> Result<(), LedgerError> {
        if Self::is_owner(credential, caller) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized {
                op,
                id: credential.id(),
                caller: *caller,
            })
        }
    }
}
