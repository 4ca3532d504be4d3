use serde::Serialize;
use shared_bus::DeliveryPath;
use shared_types::{BridgeError, DelegatedResponse};

/// What `resolve` did with an inbound reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Routed to exactly one consumer.
    Delivered {
        path: DeliveryPath,
        response: DelegatedResponse,
    },
    /// The link (or an identical address) was already routed.
    DuplicateSuppressed,
    /// Not a reply for this bridge: a foreign-scheme link, or result-code
    /// extras with nothing awaiting them. State is untouched.
    Ignored,
}

impl ResolveOutcome {
    /// The routed response, if one was delivered.
    #[must_use]
    pub fn response(&self) -> Option<&DelegatedResponse> {
        match self {
            ResolveOutcome::Delivered { response, .. } => Some(response),
            _ => None,
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<DeliveryPath> {
        match self {
            ResolveOutcome::Delivered { path, .. } => Some(*path),
            _ => None,
        }
    }

    /// The delivered payload, or why there is none.
    ///
    /// # Errors
    ///
    /// `DuplicateSuppressed` for a suppressed link, `NoResponse` when nothing
    /// was routed, otherwise the mapping of the delivered response.
    pub fn into_result(self) -> Result<String, BridgeError> {
        match self {
            ResolveOutcome::Delivered { response, .. } => response.into_result(),
            ResolveOutcome::DuplicateSuppressed => Err(BridgeError::DuplicateSuppressed),
            ResolveOutcome::Ignored => Err(BridgeError::NoResponse),
        }
    }
}

/// Serializable snapshot of the outstanding deferred request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingStatus {
    pub kind: shared_types::OperationKind,
    pub raw_address: String,
    pub created_at: shared_types::Timestamp,
    /// Whether a caller in this process holds a completion handle.
    pub handle_attached: bool,
    /// Whether a response is buffered for the next subscriber.
    pub response_buffered: bool,
    /// The request is over but its record could not be cleared yet.
    pub stale: bool,
}
