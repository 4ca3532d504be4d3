//! # Error Types
//!
//! Error taxonomy shared across the bridge crates.
//!
//! Delivery outcomes travel as `DelegatedResponse`; these errors are only
//! returned by calls that fail before anything is in flight, or by the
//! infrastructure underneath.

use thiserror::Error;

/// Errors surfaced by bridge operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BridgeError {
    /// The user or signer declined. Never retried automatically.
    #[error("Request rejected by the signer")]
    Rejected,

    /// The signer is absent or its endpoint cannot be reached.
    ///
    /// Callers may offer the install / open-store path.
    #[error("Signer unreachable: {reason}")]
    Unreachable { reason: String },

    /// An inbound link was present but could not be parsed.
    #[error("Malformed reply: {reason}")]
    MalformedReply { reason: String },

    /// The channel returned nothing.
    #[error("No response from signer")]
    NoResponse,

    /// A reply for a link that was already handled. Silently ignored upstream.
    #[error("Duplicate reply suppressed")]
    DuplicateSuppressed,

    /// A newer deferred request replaced this one.
    #[error("Request superseded by a newer request")]
    Superseded,

    /// The signer reported a failure of its own.
    #[error("Signer failed: {reason}")]
    Failed { reason: String },

    /// A caller supplied an unusable argument.
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// The pending request store failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl BridgeError {
    /// Whether the caller should be offered the install / open-store path.
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        matches!(self, BridgeError::Unreachable { .. })
    }
}
