//! # Credential Store
//!
//! Registration, lookup, revocation, and the per-owner listing. The store
//! is stateless apart from its payload limit; records live in the
//! [`LedgerStorage`] passed to each call.
//!
//! Every mutation validates completely before its first write, so a
//! rejected call leaves storage exactly as it found it.

use cvault_core::{Address, CredentialId, DocHash, EncryptedPayload, Timestamp};

use crate::credential::Credential;
use crate::error::{LedgerError, Operation};
use crate::event::{Committed, LedgerEvent};
use crate::guard::OwnershipGuard;
use crate::storage::LedgerStorage;

/// Owner of credential records and id allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialStore {
    max_payload_bytes: usize,
}

impl CredentialStore {
    /// A store that accepts payloads up to `max_payload_bytes`.
    pub fn new(max_payload_bytes: usize) -> Self {
        Self { max_payload_bytes }
    }

    pub fn max_payload_bytes(&self) -> usize {
        self.max_payload_bytes
    }

    /// Register a new active credential and return its id.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `doc_hash` is all zeros, or `payload` is empty or
    ///   larger than the configured limit.
    /// - `IdSpaceExhausted` if no further id can be issued.
    pub fn register<S: LedgerStorage + ?Sized>(
        &self,
        storage: &mut S,
        now: Timestamp,
        owner: Address,
        doc_hash: DocHash,
        payload: EncryptedPayload,
    ) -> Result<Committed<CredentialId>, LedgerError> {
        if doc_hash.is_zero() {
            return Err(invalid_input("document hash must not be all zeros"));
        }
        if payload.is_empty() {
            return Err(invalid_input("payload must not be empty"));
        }
        if payload.len() > self.max_payload_bytes {
            return Err(invalid_input(format!(
                "payload is {} bytes, limit is {}",
                payload.len(),
                self.max_payload_bytes
            )));
        }

        let id = storage.issue_id().ok_or(LedgerError::IdSpaceExhausted)?;
        storage.put_credential(Credential::new(id, owner, doc_hash, payload, now));
        storage.push_owner_id(owner, id);

        Ok(Committed::new(
            id,
            LedgerEvent::CredentialRegistered {
                id,
                owner,
                doc_hash,
            },
        ))
    }

    /// Look up a credential.
    ///
    /// # Errors
    ///
    /// `NotFound` if `id` was never issued, including the sentinel `0`.
    pub fn get<S: LedgerStorage + ?Sized>(
        &self,
        storage: &S,
        id: CredentialId,
    ) -> Result<Credential, LedgerError> {
        resolve(storage, id, Operation::Get)
    }

    /// Revoke a credential on behalf of `caller`.
    ///
    /// Ownership is checked before revocation state, so a non-owner is told
    /// `Unauthorized` whether or not the credential is already revoked.
    ///
    /// # Errors
    ///
    /// `NotFound`, then `Unauthorized`, then `AlreadyRevoked`.
    pub fn revoke<S: LedgerStorage + ?Sized>(
        &self,
        storage: &mut S,
        id: CredentialId,
        caller: &Address,
    ) -> Result<Committed<()>, LedgerError> {
        let mut credential = resolve(storage, id, Operation::Revoke)?;
        OwnershipGuard::require_owner(&credential, caller, Operation::Revoke)?;
        if credential.is_revoked() {
            return Err(LedgerError::AlreadyRevoked { id });
        }

        credential.mark_revoked();
        storage.put_credential(credential);

        Ok(Committed::new((), LedgerEvent::CredentialRevoked { id }))
    }

    /// The owner's credential ids in registration order. Never fails.
    pub fn list_by_owner<S: LedgerStorage + ?Sized>(
        &self,
        storage: &S,
        owner: &Address,
    ) -> Vec<CredentialId> {
        storage.owner_ids(owner)
    }
}

/// Fetch a credential for `op`, mapping absence to `NotFound`.
pub(crate) fn resolve<S: LedgerStorage + ?Sized>(
    storage: &S,
    id: CredentialId,
    op: Operation,
) -> Result<Credential, LedgerError> {
    if id.is_sentinel() {
        return Err(LedgerError::NotFound { op, id });
    }
    storage
        .credential(id)
        .ok_or(LedgerError::NotFound { op, id })
}

fn invalid_input(reason: impl Into<String>) -> LedgerError {
    LedgerError::InvalidInput {
        op: Operation::Register,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::storage::InMemoryStorage;

    const OWNER: Address = Address::from_bytes([0x01; 20]);
    const OTHER: Address = Address::from_bytes([0x02; 20]);
    const H1: DocHash = DocHash::from_bytes([0xaa; 32]);

    fn ts() -> Timestamp {
        Timestamp::parse("2026-01-15T12:00:00Z").unwrap()
    }

    fn store() -> CredentialStore {
        CredentialStore::new(64)
    }

    fn register(storage: &mut InMemoryStorage, owner: Address) -> CredentialId {
        store()
            .register(storage, ts(), owner, H1, EncryptedPayload::from("p1"))
            .unwrap()
            .value
    }

    // ── register ─────────────────────────────────────────────────────

    #[test]
    fn test_register_assigns_sequential_ids_from_one() {
        let mut storage = InMemoryStorage::new();
        assert_eq!(register(&mut storage, OWNER), CredentialId::new(1));
        assert_eq!(register(&mut storage, OTHER), CredentialId::new(2));
        assert_eq!(register(&mut storage, OWNER), CredentialId::new(3));
    }

    #[test]
    fn test_register_stores_active_credential() {
        let mut storage = InMemoryStorage::new();
        let id = register(&mut storage, OWNER);
        let cred = store().get(&storage, id).unwrap();
        assert_eq!(cred.owner(), &OWNER);
        assert_eq!(cred.doc_hash(), &H1);
        assert_eq!(cred.encrypted_payload().as_str(), "p1");
        assert_eq!(cred.created_at(), ts());
        assert!(!cred.is_revoked());
    }

    #[test]
    fn test_register_emits_registered_event() {
        let mut storage = InMemoryStorage::new();
        let committed = store()
            .register(&mut storage, ts(), OWNER, H1, EncryptedPayload::from("p1"))
            .unwrap();
        assert_eq!(
            committed.event,
            LedgerEvent::CredentialRegistered {
                id: CredentialId::FIRST,
                owner: OWNER,
                doc_hash: H1,
            }
        );
    }

    #[test]
    fn test_register_rejects_zero_hash_without_consuming_id() {
        let mut storage = InMemoryStorage::new();
        let err = store()
            .register(&mut storage, ts(), OWNER, DocHash::ZERO, EncryptedPayload::from("p"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(storage.last_issued_id(), CredentialId::SENTINEL);
        assert!(storage.owner_ids(&OWNER).is_empty());
        assert_eq!(register(&mut storage, OWNER), CredentialId::FIRST);
    }

    #[test]
    fn test_register_rejects_empty_payload() {
        let mut storage = InMemoryStorage::new();
        let err = store()
            .register(&mut storage, ts(), OWNER, H1, EncryptedPayload::from(""))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_register_rejects_oversized_payload() {
        assert_eq!(store().max_payload_bytes(), 64);
        let mut storage = InMemoryStorage::new();
        let err = store()
            .register(&mut storage, ts(), OWNER, H1, EncryptedPayload::new("x".repeat(65)))
            .unwrap_err();
        assert!(err.to_string().contains("limit is 64"));
        assert!(store()
            .register(&mut storage, ts(), OWNER, H1, EncryptedPayload::new("x".repeat(64)))
            .is_ok());
    }

    // ── get ──────────────────────────────────────────────────────────

    #[test]
    fn test_get_unknown_and_sentinel_are_not_found() {
        let mut storage = InMemoryStorage::new();
        register(&mut storage, OWNER);
        for raw in [0, 2, 99] {
            let err = store().get(&storage, CredentialId::new(raw)).unwrap_err();
            assert_eq!(
                err,
                LedgerError::NotFound {
                    op: Operation::Get,
                    id: CredentialId::new(raw)
                }
            );
        }
    }

    // ── revoke ───────────────────────────────────────────────────────

    #[test]
    fn test_revoke_by_owner() {
        let mut storage = InMemoryStorage::new();
        let id = register(&mut storage, OWNER);
        let committed = store().revoke(&mut storage, id, &OWNER).unwrap();
        assert_eq!(committed.event, LedgerEvent::CredentialRevoked { id });
        assert!(store().get(&storage, id).unwrap().is_revoked());
    }

    #[test]
    fn test_revoke_twice_fails_already_revoked() {
        let mut storage = InMemoryStorage::new();
        let id = register(&mut storage, OWNER);
        store().revoke(&mut storage, id, &OWNER).unwrap();
        let err = store().revoke(&mut storage, id, &OWNER).unwrap_err();
        assert_eq!(err, LedgerError::AlreadyRevoked { id });
        assert!(store().get(&storage, id).unwrap().is_revoked());
    }

    #[test]
    fn test_revoke_by_non_owner_is_unauthorized_in_any_state() {
        let mut storage = InMemoryStorage::new();
        let id = register(&mut storage, OWNER);

        let err = store().revoke(&mut storage, id, &OTHER).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(!store().get(&storage, id).unwrap().is_revoked());

        store().revoke(&mut storage, id, &OWNER).unwrap();
        let err = store().revoke(&mut storage, id, &OTHER).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn test_revoke_unknown_is_not_found() {
        let mut storage = InMemoryStorage::new();
        let err = store()
            .revoke(&mut storage, CredentialId::new(5), &OWNER)
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::NotFound {
                op: Operation::Revoke,
                id: CredentialId::new(5)
            }
        );
    }

    // ── list_by_owner ────────────────────────────────────────────────

    #[test]
    fn test_list_by_owner_in_registration_order() {
        let mut storage = InMemoryStorage::new();
        register(&mut storage, OWNER);
        register(&mut storage, OTHER);
        register(&mut storage, OWNER);
        assert_eq!(
            store().list_by_owner(&storage, &OWNER),
            vec![CredentialId::new(1), CredentialId::new(3)]
        );
        assert_eq!(
            store().list_by_owner(&storage, &OTHER),
            vec![CredentialId::new(2)]
        );
    }

    #[test]
    fn test_list_by_owner_empty_for_stranger() {
        let storage = InMemoryStorage::new();
        assert!(store().list_by_owner(&storage, &Address::ZERO).is_empty());
    }

    #[test]
    fn test_revoked_credentials_stay_listed() {
        let mut storage = InMemoryStorage::new();
        let id = register(&mut storage, OWNER);
        store().revoke(&mut storage, id, &OWNER).unwrap();
        assert_eq!(store().list_by_owner(&storage, &OWNER), vec![id]);
    }
}
