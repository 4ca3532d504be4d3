use shared_types::BridgeError;
use thiserror::Error;

/// Failures reaching or reading a query endpoint.
///
/// None of these reach the caller as errors; the channel reports them as
/// `Failed("no response")`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EndpointError {
    /// Nothing answers on the endpoint (signer not installed).
    #[error("Query endpoint not installed: {endpoint}")]
    NotInstalled { endpoint: String },

    /// The endpoint exists but the call failed.
    #[error("Query endpoint unavailable: {reason}")]
    Unavailable { reason: String },

    /// The endpoint answered with something that is not a row.
    #[error("Malformed query row: {reason}")]
    MalformedRow { reason: String },
}

impl From<EndpointError> for BridgeError {
    fn from(err: EndpointError) -> Self {
        match err {
            EndpointError::NotInstalled { .. } | EndpointError::Unavailable { .. } => {
                BridgeError::Unreachable {
                    reason: err.to_string(),
                }
            }
            EndpointError::MalformedRow { reason } => BridgeError::MalformedReply { reason },
        }
    }
}
