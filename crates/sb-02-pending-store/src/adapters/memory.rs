use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore};

/// In-memory key-value store for unit tests.
///
/// `fail_writes` makes every mutation return an I/O error. It can be flipped
/// through a shared reference, so a store already owned by a correlator can
/// start failing mid-flow.
#[derive(Debug, Default)]
pub struct InMemoryKVStore {
    data: HashMap<Vec<u8>, Vec<u8>>,
    fail_writes: AtomicBool,
}

impl InMemoryKVStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), KVStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(KVStoreError::IOError {
                message: "writes disabled".to_string(),
            });
        }
        Ok(())
    }
}

impl KeyValueStore for InMemoryKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.check_writable()?;
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.check_writable()?;
        self.data.remove(key);
        Ok(())
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        self.check_writable()?;
        super::apply_batch(&mut self.data, operations);
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.contains_key(key))
    }
}
