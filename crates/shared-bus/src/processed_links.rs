//! # Processed Link Cache
//!
//! Remembers which inbound reply addresses were already routed, so a link
//! re-delivered during host lifecycle transitions is not resolved twice.
//!
//! ## Design
//!
//! - Addresses are keyed by their SHA-256 digest, never stored verbatim
//!   (replies may carry decrypted content).
//! - Entries never expire on their own. The correlator clears the cache
//!   whenever a new deferred request is issued, since a fresh request may
//!   legitimately produce an identical reply.

use std::collections::HashSet;

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors from processed-link bookkeeping.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProcessedLinkError {
    /// The address was already routed.
    #[error("Inbound link already processed")]
    AlreadyProcessed,
}

/// Digest identifying one inbound address.
pub type LinkDigest = [u8; 32];

/// Hash an inbound address into its cache key.
#[must_use]
pub fn link_digest(address: &str) -> LinkDigest {
    let digest = Sha256::digest(address.as_bytes());
    let mut key = [0u8; 32];
    key.copy_from_slice(&digest);
    key
}

/// Set of processed inbound addresses, kept until `clear`.
#[derive(Debug, Default)]
pub struct ProcessedLinkCache {
    seen: HashSet<LinkDigest>,
}

impl ProcessedLinkCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `address` as processed.
    ///
    /// # Errors
    ///
    /// `ProcessedLinkError::AlreadyProcessed` if it was recorded since the
    /// last `clear`.
    pub fn check_and_mark(&mut self, address: &str) -> Result<(), ProcessedLinkError> {
        if self.seen.insert(link_digest(address)) {
            Ok(())
        } else {
            Err(ProcessedLinkError::AlreadyProcessed)
        }
    }

    /// Check without recording.
    #[must_use]
    pub fn contains(&self, address: &str) -> bool {
        self.seen.contains(&link_digest(address))
    }

    /// Forget every processed address.
    pub fn clear(&mut self) {
        self.seen.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
