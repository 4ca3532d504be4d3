//! # Outbound Ports
//!
//! Storage abstraction the pending store is written against.

use crate::domain::errors::KVStoreError;

/// Abstract key-value store.
///
/// A successful `put`, `delete` or `atomic_batch_write` must be durable when it
/// returns: callers launch external work right after writing.
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError>;

    /// Apply all operations or none.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError>;
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete a key.
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        (**self).get(key)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        (**self).put(key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        (**self).delete(key)
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        (**self).atomic_batch_write(operations)
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        (**self).exists(key)
    }
}
