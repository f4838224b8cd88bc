//! # Verification Ledger
//!
//! An authorized verifier submits the fingerprint of the document it was
//! shown; the ledger compares it with the registered fingerprint and keeps
//! the latest outcome per (credential, verifier). Earlier outcomes are
//! overwritten, not retained.
//!
//! The comparison runs in constant time over all 32 bytes.

use serde::{Deserialize, Serialize};

use cvault_core::{Address, CredentialId, DocHash, Timestamp};

use crate::authorization::AuthorizationRegistry;
use crate::config::VerifyPolicy;
use crate::error::{LedgerError, Operation};
use crate::event::{Committed, LedgerEvent};
use crate::storage::LedgerStorage;
use crate::store::resolve;

/// Outcome of the most recent verification by one verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// Whether the submitted digest equalled the registered one.
    pub matched: bool,
    /// The digest the verifier submitted.
    pub compared_hash: DocHash,
    /// When the comparison was recorded.
    pub verified_at: Timestamp,
}

/// Records verifier-submitted fingerprint comparisons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerificationLedger {
    policy: VerifyPolicy,
}

impl VerificationLedger {
    pub fn new(policy: VerifyPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> VerifyPolicy {
        self.policy
    }

    /// Compare `submitted` with the registered digest of `id` and record the
    /// outcome for `verifier`. Returns whether they matched.
    ///
    /// A mismatch is a successful call with `false`, not an error.
    ///
    /// # Errors
    ///
    /// `NotFound`, then `Unauthorized` if `verifier` holds no grant, then
    /// `Inactive` if the credential is revoked and the policy rejects
    /// revoked credentials.
    pub fn verify<S: LedgerStorage + ?Sized>(
        &self,
        storage: &mut S,
        now: Timestamp,
        id: CredentialId,
        verifier: Address,
        submitted: DocHash,
    ) -> Result<Committed<bool>, LedgerError> {
        let credential = resolve(storage, id, Operation::Verify)?;
        if !AuthorizationRegistry.is_authorized(storage, id, &verifier) {
            return Err(LedgerError::Unauthorized {
                op: Operation::Verify,
                id,
                caller: verifier,
            });
        }
        if credential.is_revoked() && self.policy == VerifyPolicy::RejectRevoked {
            return Err(LedgerError::Inactive {
                op: Operation::Verify,
                id,
            });
        }

        let matched = credential.doc_hash().ct_eq(&submitted);
        storage.put_record(
            id,
            verifier,
            VerificationRecord {
                matched,
                compared_hash: submitted,
                verified_at: now,
            },
        );

        Ok(Committed::new(
            matched,
            LedgerEvent::VerificationRecorded {
                id,
                verifier,
                matched,
            },
        ))
    }

    /// The latest outcome for the pair; `None` if it never verified.
    pub fn get_record<S: LedgerStorage + ?Sized>(
        &self,
        storage: &S,
        id: CredentialId,
        verifier: &Address,
    ) -> Option<VerificationRecord> {
        storage.record(id, verifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::storage::InMemoryStorage;
    use crate::store::CredentialStore;
    use cvault_core::EncryptedPayload;

    const OWNER: Address = Address::from_bytes([0x01; 20]);
    const VERIFIER: Address = Address::from_bytes([0x0b; 20]);
    const REGISTERED: DocHash = DocHash::from_bytes([0xaa; 32]);
    const OTHER_HASH: DocHash = DocHash::from_bytes([0xbb; 32]);

    fn t(secs: i64) -> Timestamp {
        Timestamp::from_epoch_secs(1_768_478_400 + secs).unwrap()
    }

    fn setup(granted: bool) -> (InMemoryStorage, CredentialId) {
        let mut storage = InMemoryStorage::new();
        let id = CredentialStore::new(1024)
            .register(&mut storage, t(0), OWNER, REGISTERED, EncryptedPayload::from("p"))
            .unwrap()
            .value;
        if granted {
            AuthorizationRegistry
                .set_authorization(&mut storage, id, VERIFIER, true, &OWNER)
                .unwrap();
        }
        (storage, id)
    }

    #[test]
    fn test_matching_digest_records_true() {
        let (mut storage, id) = setup(true);
        let ledger = VerificationLedger::default();
        let committed = ledger
            .verify(&mut storage, t(10), id, VERIFIER, REGISTERED)
            .unwrap();
        assert!(committed.value);
        assert_eq!(
            committed.event,
            LedgerEvent::VerificationRecorded {
                id,
                verifier: VERIFIER,
                matched: true,
            }
        );
        assert_eq!(
            ledger.get_record(&storage, id, &VERIFIER),
            Some(VerificationRecord {
                matched: true,
                compared_hash: REGISTERED,
                verified_at: t(10),
            })
        );
    }

    #[test]
    fn test_mismatch_is_recorded_not_an_error() {
        let (mut storage, id) = setup(true);
        let ledger = VerificationLedger::default();
        let committed = ledger
            .verify(&mut storage, t(10), id, VERIFIER, OTHER_HASH)
            .unwrap();
        assert!(!committed.value);
        let record = ledger.get_record(&storage, id, &VERIFIER).unwrap();
        assert!(!record.matched);
        assert_eq!(record.compared_hash, OTHER_HASH);
    }

    #[test]
    fn test_latest_verification_overwrites() {
        let (mut storage, id) = setup(true);
        let ledger = VerificationLedger::default();
        ledger
            .verify(&mut storage, t(10), id, VERIFIER, OTHER_HASH)
            .unwrap();
        ledger
            .verify(&mut storage, t(20), id, VERIFIER, REGISTERED)
            .unwrap();
        let record = ledger.get_record(&storage, id, &VERIFIER).unwrap();
        assert!(record.matched);
        assert_eq!(record.verified_at, t(20));
    }

    #[test]
    fn test_unauthorized_verifier_leaves_no_record() {
        let (mut storage, id) = setup(false);
        let ledger = VerificationLedger::default();
        let err = ledger
            .verify(&mut storage, t(10), id, VERIFIER, REGISTERED)
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::Unauthorized {
                op: Operation::Verify,
                id,
                caller: VERIFIER,
            }
        );
        assert_eq!(ledger.get_record(&storage, id, &VERIFIER), None);
    }

    #[test]
    fn test_withdrawn_grant_blocks_verify() {
        let (mut storage, id) = setup(true);
        AuthorizationRegistry
            .set_authorization(&mut storage, id, VERIFIER, false, &OWNER)
            .unwrap();
        let err = VerificationLedger::default()
            .verify(&mut storage, t(10), id, VERIFIER, REGISTERED)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn test_unknown_credential_is_not_found() {
        let (mut storage, _) = setup(true);
        let err = VerificationLedger::default()
            .verify(&mut storage, t(10), CredentialId::new(7), VERIFIER, REGISTERED)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.operation(), Operation::Verify);
    }

    #[test]
    fn test_revoked_credential_rejected_by_default() {
        let (mut storage, id) = setup(true);
        CredentialStore::new(1024)
            .revoke(&mut storage, id, &OWNER)
            .unwrap();
        let ledger = VerificationLedger::default();
        assert_eq!(ledger.policy(), VerifyPolicy::RejectRevoked);
        let err = ledger
            .verify(&mut storage, t(10), id, VERIFIER, REGISTERED)
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::Inactive {
                op: Operation::Verify,
                id
            }
        );
        assert_eq!(ledger.get_record(&storage, id, &VERIFIER), None);
    }

    #[test]
    fn test_revoked_credential_verifiable_when_allowed() {
        let (mut storage, id) = setup(true);
        CredentialStore::new(1024)
            .revoke(&mut storage, id, &OWNER)
            .unwrap();
        let ledger = VerificationLedger::new(VerifyPolicy::AllowRevoked);
        assert_eq!(ledger.policy(), VerifyPolicy::AllowRevoked);
        assert!(ledger
            .verify(&mut storage, t(10), id, VERIFIER, REGISTERED)
            .unwrap()
            .value);
        assert!(ledger.get_record(&storage, id, &VERIFIER).is_some());
    }

    #[test]
    fn test_authorization_checked_before_revocation() {
        let (mut storage, id) = setup(false);
        CredentialStore::new(1024)
            .revoke(&mut storage, id, &OWNER)
            .unwrap();
        let err = VerificationLedger::default()
            .verify(&mut storage, t(10), id, VERIFIER, REGISTERED)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }
}
