//! # Authorization Registry
//!
//! Per-(credential, verifier) permission to check a credential's
//! fingerprint. Grants are scoped to one credential id and never spill over
//! to the owner's other credentials. A pair that was never set reads as
//! not authorized.
//!
//! Unlike revocation, setting a grant is idempotent: writing the current
//! value again succeeds and emits another event.

use cvault_core::{Address, CredentialId};

use crate::credential::Credential;
use crate::error::{LedgerError, Operation};
use crate::event::{Committed, LedgerEvent};
use crate::guard::OwnershipGuard;
use crate::storage::LedgerStorage;
use crate::store::resolve;

/// Owner-managed verifier grants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthorizationRegistry;

impl AuthorizationRegistry {
    pub fn new() -> Self {
        Self
    }

    /// Grant or withdraw `verifier`'s permission on credential `id`.
    ///
    /// # Errors
    ///
    /// `NotFound`, then `Unauthorized` if `caller` is not the owner, then
    /// `Inactive` if the credential is revoked.
    pub fn set_authorization<S: LedgerStorage + ?Sized>(
        &self,
        storage: &mut S,
        id: CredentialId,
        verifier: Address,
        granted: bool,
        caller: &Address,
    ) -> Result<Committed<()>, LedgerError> {
        let credential = resolve(storage, id, Operation::SetAuthorization)?;
        OwnershipGuard::require_owner(&credential, caller, Operation::SetAuthorization)?;
        if credential.is_revoked() {
            return Err(LedgerError::Inactive {
                op: Operation::SetAuthorization,
                id,
            });
        }

        storage.put_grant(id, verifier, granted);

        Ok(Committed::new(
            (),
            LedgerEvent::VerifierAuthorizationUpdated {
                id,
                verifier,
                granted,
            },
        ))
    }

    /// Whether `verifier` currently holds a grant on `id`. False for pairs
    /// never set and for unknown ids.
    pub fn is_authorized<S: LedgerStorage + ?Sized>(
        &self,
        storage: &S,
        id: CredentialId,
        verifier: &Address,
    ) -> bool {
        storage.grant(id, verifier).unwrap_or(false)
    }

    /// `owner`'s credentials, in registration order, on which `verifier`
    /// currently holds a grant.
    ///
    /// Revoked credentials are included when the grant predates revocation,
    /// so the verifier can see that a document it was shown has been
    /// withdrawn.
    pub fn authorized_credentials<S: LedgerStorage + ?Sized>(
        &self,
        storage: &S,
        owner: &Address,
        verifier: &Address,
    ) -> Vec<Credential> {
        storage
            .owner_ids(owner)
            .into_iter()
            .filter(|id| self.is_authorized(storage, *id, verifier))
            .filter_map(|id| storage.credential(id))
            .collect()
    }
}
