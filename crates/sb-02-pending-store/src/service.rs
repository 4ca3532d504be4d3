//! # Pending Request Store
//!
//! Typed access to the two durable values the bridge keeps:
//!
//! - the single `PendingRecord` describing the outstanding deferred request
//! - the raw inbound link stashed when the process is (re)created with one

use shared_types::PendingRecord;
use tracing::{debug, warn};

use crate::domain::errors::KVStoreError;
use crate::domain::keys;
use crate::ports::outbound::{BatchOperation, KeyValueStore};

/// Durable pending-record slot plus inbound link stash.
#[derive(Debug)]
pub struct PendingRequestStore<S> {
    store: S,
}

impl<S: KeyValueStore> PendingRequestStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Read the pending record.
    ///
    /// # Errors
    ///
    /// `CorruptionError` if the stored value is not a valid record.
    pub fn load(&self) -> Result<Option<PendingRecord>, KVStoreError> {
        let Some(bytes) = self.store.get(keys::PENDING_RECORD)? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| KVStoreError::corrupt(format!("pending record: {e}")))
    }

    /// Replace the pending record. Durable on return.
    pub fn save(&mut self, record: &PendingRecord) -> Result<(), KVStoreError> {
        let bytes = serde_json::to_vec(record)
            .map_err(|e| KVStoreError::corrupt(format!("pending record: {e}")))?;
        self.store.put(keys::PENDING_RECORD, &bytes)?;
        debug!(kind = %record.kind, "Pending record saved");
        Ok(())
    }

    /// Remove the pending record, if any.
    pub fn clear(&mut self) -> Result<(), KVStoreError> {
        self.store.delete(keys::PENDING_RECORD)
    }

    /// Whether a pending record exists.
    pub fn has_pending(&self) -> Result<bool, KVStoreError> {
        self.store.exists(keys::PENDING_RECORD)
    }

    /// Stash an inbound address until the correlator is ready for it.
    pub fn stash_inbound(&mut self, address: &str) -> Result<(), KVStoreError> {
        self.store.put(keys::INBOUND_LINK, address.as_bytes())
    }

    /// The stashed inbound address, without removing it.
    pub fn peek_inbound(&self) -> Result<Option<String>, KVStoreError> {
        match self.store.get(keys::INBOUND_LINK)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| KVStoreError::corrupt("inbound link is not UTF-8")),
            None => Ok(None),
        }
    }

    /// Remove and return the stashed inbound address.
    ///
    /// A stash that is not valid UTF-8 is discarded and reported as absent.
    pub fn take_inbound(&mut self) -> Result<Option<String>, KVStoreError> {
        let stashed = match self.peek_inbound() {
            Ok(stashed) => stashed,
            Err(KVStoreError::CorruptionError { message }) => {
                warn!(%message, "Discarding unreadable inbound stash");
                None
            }
            Err(e) => return Err(e),
        };
        self.store.delete(keys::INBOUND_LINK)?;
        Ok(stashed)
    }

    /// Drop the pending record and any stashed link in one write: either both
    /// are gone afterwards or neither is.
    pub fn reset(&mut self) -> Result<(), KVStoreError> {
        self.store.atomic_batch_write(vec![
            BatchOperation::delete(keys::PENDING_RECORD),
            BatchOperation::delete(keys::INBOUND_LINK),
        ])
    }
}
