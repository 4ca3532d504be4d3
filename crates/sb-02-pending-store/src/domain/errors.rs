use shared_types::BridgeError;
use thiserror::Error;

/// Errors from the key-value layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },

    /// Data on disk (or a stored value) could not be decoded.
    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },
}

impl KVStoreError {
    pub(crate) fn io(err: std::io::Error) -> Self {
        KVStoreError::IOError {
            message: err.to_string(),
        }
    }

    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        KVStoreError::CorruptionError {
            message: message.into(),
        }
    }
}

impl From<KVStoreError> for BridgeError {
    fn from(err: KVStoreError) -> Self {
        BridgeError::Storage(err.to_string())
    }
}
