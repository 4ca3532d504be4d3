//! # Codec Errors
//!
//! Every malformed reply maps to one of these; nothing in the codec panics on
//! input reachable from the remote signer.

use shared_types::BridgeError;
use thiserror::Error;

/// Reasons an inbound reply address yields no classified response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// No `scheme:` prefix at all.
    #[error("Address has no scheme")]
    MissingScheme,

    /// The address is addressed to some other handler.
    #[error("Unexpected scheme: expected {expected}, found {found}")]
    UnexpectedScheme { expected: String, found: String },

    /// The fallback path carried the marker but nothing after it.
    #[error("Empty payload after result marker")]
    EmptyPayload,

    /// No recognised field was present.
    #[error("No valid response in reply")]
    NoValidResponse,
}

impl From<ParseError> for BridgeError {
    fn from(err: ParseError) -> Self {
        BridgeError::MalformedReply {
            reason: err.to_string(),
        }
    }
}
