use shared_types::BridgeError;
use thiserror::Error;

/// Failures handing a request to the signer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LaunchError {
    /// No application answers to the target identifier.
    #[error("Signer not installed: {target}")]
    NotInstalled { target: String },

    /// The launch itself failed.
    #[error("Launch failed: {reason}")]
    Failed { reason: String },
}

impl From<LaunchError> for BridgeError {
    fn from(err: LaunchError) -> Self {
        BridgeError::Unreachable {
            reason: err.to_string(),
        }
    }
}
