//! # Ledger Events and Notification Sinks
//!
//! Each accepted mutation produces exactly one [`LedgerEvent`]. Components
//! return it alongside their result as a [`Committed`] value; the vault
//! publishes it to the [`NotificationSink`] after the state change is applied
//! and before the write lock is released, so the sink observes events in
//! commit order. Rejected operations publish nothing.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use cvault_core::{Address, CredentialId, DocHash};

/// A notification describing one committed ledger mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A credential was registered.
    CredentialRegistered {
        id: CredentialId,
        owner: Address,
        doc_hash: DocHash,
    },
    /// A credential was revoked.
    CredentialRevoked { id: CredentialId },
    /// An owner set a verifier grant.
    VerifierAuthorizationUpdated {
        id: CredentialId,
        verifier: Address,
        granted: bool,
    },
    /// A verifier's comparison was recorded.
    VerificationRecorded {
        id: CredentialId,
        verifier: Address,
        matched: bool,
    },
}

impl LedgerEvent {
    /// The credential the event concerns.
    pub fn credential_id(&self) -> CredentialId {
        match self {
            Self::CredentialRegistered { id, .. }
            | Self::CredentialRevoked { id }
            | Self::VerifierAuthorizationUpdated { id, .. }
            | Self::VerificationRecorded { id, .. } => *id,
        }
    }

    /// Event name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CredentialRegistered { .. } => "CredentialRegistered",
            Self::CredentialRevoked { .. } => "CredentialRevoked",
            Self::VerifierAuthorizationUpdated { .. } => "VerifierAuthorizationUpdated",
            Self::VerificationRecorded { .. } => "VerificationRecorded",
        }
    }
}

impl std::fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CredentialRegistered { id, owner, doc_hash } => {
                write!(f, "CredentialRegistered(id={id}, owner={owner}, doc_hash={doc_hash})")
            }
            Self::CredentialRevoked { id } => write!(f, "CredentialRevoked(id={id})"),
            Self::VerifierAuthorizationUpdated {
                id,
                verifier,
                granted,
            } => write!(
                f,
                "VerifierAuthorizationUpdated(id={id}, verifier={verifier}, granted={granted})"
            ),
            Self::VerificationRecorded {
                id,
                verifier,
                matched,
            } => write!(
                f,
                "VerificationRecorded(id={id}, verifier={verifier}, matched={matched})"
            ),
        }
    }
}

/// The result of an accepted mutation, paired with the event to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed<T> {
    /// Value returned to the caller.
    pub value: T,
    /// Notification for the applied change.
    pub event: LedgerEvent,
}

impl<T> Committed<T> {
    pub fn new(value: T, event: LedgerEvent) -> Self {
        Self { value, event }
    }
}

// ─── Sinks ───────────────────────────────────────────────────────────

/// Receiver of ledger events, called synchronously in commit order.
///
/// Implementations must not call back into the vault that publishes to them.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, event: &LedgerEvent);
}

impl<N: NotificationSink + ?Sized> NotificationSink for Arc<N> {
    fn publish(&self, event: &LedgerEvent) {
        (**self).publish(event)
    }
}

/// Buffers every published event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<LedgerEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all buffered events, oldest first.
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events.lock().clone()
    }

    /// Remove and return all buffered events, oldest first.
    pub fn drain(&self) -> Vec<LedgerEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NotificationSink for MemorySink {
    fn publish(&self, event: &LedgerEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Emits one structured `tracing` event per ledger event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn publish(&self, event: &LedgerEvent) {
        match event {
            LedgerEvent::CredentialRegistered { id, owner, doc_hash } => tracing::info!(
                event = event.kind(),
                credential_id = %id,
                owner = %owner,
                doc_hash = %doc_hash,
                "credential registered"
            ),
            LedgerEvent::CredentialRevoked { id } => tracing::info!(
                event = event.kind(),
                credential_id = %id,
                "credential revoked"
            ),
            LedgerEvent::VerifierAuthorizationUpdated {
                id,
                verifier,
                granted,
            } => tracing::info!(
                event = event.kind(),
                credential_id = %id,
                verifier = %verifier,
                granted,
                "verifier authorization updated"
            ),
            LedgerEvent::VerificationRecorded {
                id,
                verifier,
                matched,
            } => tracing::info!(
                event = event.kind(),
                credential_id = %id,
                verifier = %verifier,
                matched,
                "verification recorded"
            ),
        }
    }
}
