//! # Credential Vault
//!
//! The public face of the ledger and its commit boundary. The vault owns the
//! storage behind a `parking_lot::RwLock`, the clock, the notification sink,
//! and the configured components.
//!
//! ## Commit Sequence
//!
//! Every mutation takes the write lock once and, while holding it, reads the
//! clock, runs the component (validate, then apply), and publishes the
//! resulting event. Mutations are therefore linearizable and the sink sees
//! events in exactly the order their changes were applied. A rejected
//! mutation changes nothing and publishes nothing.
//!
//! Reads take the read lock and bypass the guards.

use parking_lot::RwLock;
use tracing::{debug, warn};

use cvault_core::{Address, Clock, CredentialId, DocHash, EncryptedPayload, SystemClock, Timestamp};

use crate::authorization::AuthorizationRegistry;
use crate::config::VaultConfig;
use crate::credential::Credential;
use crate::error::{LedgerError, Operation};
use crate::event::{Committed, NotificationSink, TracingSink};
use crate::storage::{InMemoryStorage, LedgerSnapshot, LedgerStorage, SnapshotError};
use crate::store::CredentialStore;
use crate::verification::{VerificationLedger, VerificationRecord};

/// Thread-safe credential ledger. Share it across threads with `Arc`.
#[derive(Debug)]
pub struct CredentialVault<S = InMemoryStorage, C = SystemClock, N = TracingSink> {
    storage: RwLock<S>,
    clock: C,
    sink: N,
    config: VaultConfig,
    store: CredentialStore,
    registry: AuthorizationRegistry,
    ledger: VerificationLedger,
}

impl CredentialVault {
    /// Empty in-memory vault on the system clock, logging events via tracing.
    pub fn in_memory(config: VaultConfig) -> Self {
        Self::new(InMemoryStorage::new(), SystemClock, TracingSink, config)
    }
}

impl<S, C, N> CredentialVault<S, C, N>
where
    S: LedgerStorage,
    C: Clock,
    N: NotificationSink,
{
    pub fn new(storage: S, clock: C, sink: N, config: VaultConfig) -> Self {
        Self {
            storage: RwLock::new(storage),
            clock,
            sink,
            store: CredentialStore::new(config.max_payload_bytes),
            registry: AuthorizationRegistry::new(),
            ledger: VerificationLedger::new(config.verify_policy),
            config,
        }
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn sink(&self) -> &N {
        &self.sink
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Consume the vault and return its storage.
    pub fn into_storage(self) -> S {
        self.storage.into_inner()
    }

    // ─── Mutations ──────────────────────────────────────────────────

    /// Register a credential owned by `owner`. Emits `CredentialRegistered`.
    pub fn register(
        &self,
        owner: Address,
        doc_hash: DocHash,
        payload: impl Into<EncryptedPayload>,
    ) -> Result<CredentialId, LedgerError> {
        let payload = payload.into();
        self.commit(Operation::Register, |storage, now| {
            self.store.register(storage, now, owner, doc_hash, payload)
        })
    }

    /// Revoke credential `id`. Only its owner may do so, and only once.
    /// Emits `CredentialRevoked`.
    pub fn revoke(&self, id: CredentialId, caller: &Address) -> Result<(), LedgerError> {
        self.commit(Operation::Revoke, |storage, _| {
            self.store.revoke(storage, id, caller)
        })
    }

    /// Grant or withdraw `verifier`'s permission on `id`. Owner only, active
    /// credentials only. Emits `VerifierAuthorizationUpdated`.
    pub fn set_authorization(
        &self,
        id: CredentialId,
        verifier: Address,
        granted: bool,
        caller: &Address,
    ) -> Result<(), LedgerError> {
        self.commit(Operation::SetAuthorization, |storage, _| {
            self.registry
                .set_authorization(storage, id, verifier, granted, caller)
        })
    }

    /// Compare `submitted` with the registered digest on behalf of an
    /// authorized `verifier` and record the outcome. Emits
    /// `VerificationRecorded`.
    pub fn verify(
        &self,
        id: CredentialId,
        verifier: &Address,
        submitted: DocHash,
    ) -> Result<bool, LedgerError> {
        self.commit(Operation::Verify, |storage, now| {
            self.ledger.verify(storage, now, id, *verifier, submitted)
        })
    }

    // ─── Reads ──────────────────────────────────────────────────────

    pub fn get(&self, id: CredentialId) -> Result<Credential, LedgerError> {
        self.store.get(&*self.storage.read(), id)
    }

    pub fn list_by_owner(&self, owner: &Address) -> Vec<CredentialId> {
        self.store.list_by_owner(&*self.storage.read(), owner)
    }

    pub fn is_authorized(&self, id: CredentialId, verifier: &Address) -> bool {
        self.registry
            .is_authorized(&*self.storage.read(), id, verifier)
    }

    pub fn get_record(&self, id: CredentialId, verifier: &Address) -> Option<VerificationRecord> {
        self.ledger.get_record(&*self.storage.read(), id, verifier)
    }

    /// `owner`'s credentials that `verifier` is currently authorized to check.
    pub fn authorized_credentials(&self, owner: &Address, verifier: &Address) -> Vec<Credential> {
        self.registry
            .authorized_credentials(&*self.storage.read(), owner, verifier)
    }

    /// Run one mutation as a single critical section.
    fn commit<T>(
        &self,
        op: Operation,
        apply: impl FnOnce(&mut S, Timestamp) -> Result<Committed<T>, LedgerError>,
    ) -> Result<T, LedgerError> {
        let mut storage = self.storage.write();
        let now = self.clock.now();
        match apply(&mut *storage, now) {
            Ok(Committed { value, event }) => {
                self.sink.publish(&event);
                debug!(
                    op = %op,
                    credential_id = %event.credential_id(),
                    event = event.kind(),
                    "ledger mutation committed"
                );
                Ok(value)
            }
            Err(err) => {
                match err.credential_id() {
                    Some(id) => warn!(
                        op = %op,
                        kind = ?err.kind(),
                        credential_id = %id,
                        error = %err,
                        "ledger mutation rejected"
                    ),
                    None => warn!(
                        op = %op,
                        kind = ?err.kind(),
                        error = %err,
                        "ledger mutation rejected"
                    ),
                }
                Err(err)
            }
        }
    }
}

impl<C, N> CredentialVault<InMemoryStorage, C, N>
where
    C: Clock,
    N: NotificationSink,
{
    /// Restore a vault from a persisted snapshot.
    pub fn from_snapshot(
        snapshot: LedgerSnapshot,
        clock: C,
        sink: N,
        config: VaultConfig,
    ) -> Result<Self, SnapshotError> {
        let storage = InMemoryStorage::from_snapshot(snapshot)?;
        Ok(Self::new(storage, clock, sink, config))
    }

    /// Serializable image of the current state, taken under the read lock.
    pub fn snapshot(&self) -> LedgerSnapshot {
        self.storage.read().snapshot()
    }
}
