//! # Ledger Storage
//!
//! [`LedgerStorage`] is the interface over the state the ledger owns:
//! credential records and the id counter, the owner index, authorization
//! grants, and verification records. The components read and write through
//! it; nothing outside the crate gets a mutable handle, because the vault
//! keeps its storage behind its own lock.
//!
//! [`InMemoryStorage`] is the provided backend. [`LedgerSnapshot`] is its
//! serializable image, used to persist a ledger between process runs.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cvault_core::{Address, CredentialId};

use crate::credential::Credential;
use crate::verification::VerificationRecord;

/// Backing state for a ledger instance.
///
/// Implementations store what they are given. Validation, ordering, and
/// the no-partial-write rule are enforced by the components that call them.
pub trait LedgerStorage: Send + Sync {
    /// The most recently issued id, or the sentinel if none.
    fn last_issued_id(&self) -> CredentialId;

    /// Advance the counter and return the new id. Returns `None`, leaving
    /// the counter unchanged, if it cannot advance.
    fn issue_id(&mut self) -> Option<CredentialId>;

    fn credential(&self, id: CredentialId) -> Option<Credential>;

    /// Insert or replace the record stored under `credential.id()`.
    fn put_credential(&mut self, credential: Credential);

    /// The owner's ids in registration order; empty if none.
    fn owner_ids(&self, owner: &Address) -> Vec<CredentialId>;

    fn push_owner_id(&mut self, owner: Address, id: CredentialId);

    /// The explicit grant for the pair, if one was ever set.
    fn grant(&self, id: CredentialId, verifier: &Address) -> Option<bool>;

    fn put_grant(&mut self, id: CredentialId, verifier: Address, granted: bool);

    fn record(&self, id: CredentialId, verifier: &Address) -> Option<VerificationRecord>;

    /// Insert or overwrite the record for the pair.
    fn put_record(&mut self, id: CredentialId, verifier: Address, record: VerificationRecord);
}

// ─── In-Memory Backend ───────────────────────────────────────────────

/// Map-backed storage held entirely in process memory.
#[derive(Debug, Clone)]
pub struct InMemoryStorage {
    last_issued: CredentialId,
    credentials: BTreeMap<CredentialId, Credential>,
    owner_index: HashMap<Address, Vec<CredentialId>>,
    grants: HashMap<(CredentialId, Address), bool>,
    records: HashMap<(CredentialId, Address), VerificationRecord>,
}

impl InMemoryStorage {
    /// Empty storage; the first issued id will be 1.
    pub fn new() -> Self {
        Self {
            last_issued: CredentialId::SENTINEL,
            credentials: BTreeMap::new(),
            owner_index: HashMap::new(),
            grants: HashMap::new(),
            records: HashMap::new(),
        }
    }

    /// Number of credentials held.
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Capture the full state as a serializable snapshot.
    ///
    /// Entries are sorted so equal states produce equal snapshots.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let mut grants: Vec<GrantEntry> = self
            .grants
            .iter()
            .map(|(&(credential_id, verifier), &granted)| GrantEntry {
                credential_id,
                verifier,
                granted,
            })
            .collect();
        grants.sort_by_key(|g| (g.credential_id, g.verifier));

        let mut records: Vec<RecordEntry> = self
            .records
            .iter()
            .map(|(&(credential_id, verifier), record)| RecordEntry {
                credential_id,
                verifier,
                record: record.clone(),
            })
            .collect();
        records.sort_by_key(|r| (r.credential_id, r.verifier));

        LedgerSnapshot {
            last_issued_id: self.last_issued,
            credentials: self.credentials.values().cloned().collect(),
            grants,
            records,
        }
    }

    /// Rebuild storage from a snapshot.
    ///
    /// The owner index is derived from credential order, which is
    /// registration order.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the snapshot could not have been produced
    /// by a ledger: ids out of order or beyond the counter, a zero digest or
    /// empty payload, or a grant or record for an unknown credential.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self, SnapshotError> {
        let mut storage = Self::new();
        storage.last_issued = snapshot.last_issued_id;

        let mut previous = CredentialId::SENTINEL;
        for credential in snapshot.credentials {
            let id = credential.id();
            if id <= previous {
                return Err(SnapshotError::OutOfOrder { id, previous });
            }
            if id > snapshot.last_issued_id {
                return Err(SnapshotError::BeyondCounter {
                    id,
                    last_issued: snapshot.last_issued_id,
                });
            }
            if credential.doc_hash().is_zero() {
                return Err(SnapshotError::ZeroDocHash { id });
            }
            if credential.encrypted_payload().is_empty() {
                return Err(SnapshotError::EmptyPayload { id });
            }
            previous = id;
            storage.push_owner_id(*credential.owner(), id);
            storage.put_credential(credential);
        }

        for entry in snapshot.grants {
            if !storage.credentials.contains_key(&entry.credential_id) {
                return Err(SnapshotError::UnknownCredential {
                    id: entry.credential_id,
                });
            }
            storage.put_grant(entry.credential_id, entry.verifier, entry.granted);
        }

        for entry in snapshot.records {
            if !storage.credentials.contains_key(&entry.credential_id) {
                return Err(SnapshotError::UnknownCredential {
                    id: entry.credential_id,
                });
            }
            storage.put_record(entry.credential_id, entry.verifier, entry.record);
        }

        Ok(storage)
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStorage for InMemoryStorage {
    fn last_issued_id(&self) -> CredentialId {
        self.last_issued
    }

    fn issue_id(&mut self) -> Option<CredentialId> {
        let next = self.last_issued.next()?;
        self.last_issued = next;
        Some(next)
    }

    fn credential(&self, id: CredentialId) -> Option<Credential> {
        self.credentials.get(&id).cloned()
    }

    fn put_credential(&mut self, credential: Credential) {
        self.credentials.insert(credential.id(), credential);
    }

    fn owner_ids(&self, owner: &Address) -> Vec<CredentialId> {
        self.owner_index.get(owner).cloned().unwrap_or_default()
    }

    fn push_owner_id(&mut self, owner: Address, id: CredentialId) {
        self.owner_index.entry(owner).or_default().push(id);
    }

    fn grant(&self, id: CredentialId, verifier: &Address) -> Option<bool> {
        self.grants.get(&(id, *verifier)).copied()
    }

    fn put_grant(&mut self, id: CredentialId, verifier: Address, granted: bool) {
        self.grants.insert((id, verifier), granted);
    }

    fn record(&self, id: CredentialId, verifier: &Address) -> Option<VerificationRecord> {
        self.records.get(&(id, *verifier)).cloned()
    }

    fn put_record(&mut self, id: CredentialId, verifier: Address, record: VerificationRecord) {
        self.records.insert((id, verifier), record);
    }
}

// ─── Snapshot ────────────────────────────────────────────────────────

/// Serializable image of an [`InMemoryStorage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Counter value; the next registration receives the following id.
    pub last_issued_id: CredentialId,
    /// All credentials, ascending by id.
    pub credentials: Vec<Credential>,
    /// Every explicitly set grant, including withdrawn ones.
    pub grants: Vec<GrantEntry>,
    /// Latest verification record per (credential, verifier).
    pub records: Vec<RecordEntry>,
}

impl LedgerSnapshot {
    /// Snapshot of a ledger with no credentials.
    pub fn empty() -> Self {
        InMemoryStorage::new().snapshot()
    }
}

/// One authorization grant in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantEntry {
    pub credential_id: CredentialId,
    pub verifier: Address,
    pub granted: bool,
}

/// One verification record in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub credential_id: CredentialId,
    pub verifier: Address,
    pub record: VerificationRecord,
}

/// A snapshot that no ledger could have produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("credential {id} appears after credential {previous}; ids must be strictly increasing")]
    OutOfOrder {
        id: CredentialId,
        previous: CredentialId,
    },

    #[error("credential {id} exceeds the last issued id {last_issued}")]
    BeyondCounter {
        id: CredentialId,
        last_issued: CredentialId,
    },

    #[error("credential {id} has an all-zero document hash")]
    ZeroDocHash { id: CredentialId },

    #[error("credential {id} has an empty payload")]
    EmptyPayload { id: CredentialId },

    #[error("entry references unknown credential {id}")]
    UnknownCredential { id: CredentialId },
}
