//! Storage adapters.

pub mod file;
pub mod memory;

pub use file::FileBackedKVStore;
pub use memory::InMemoryKVStore;

use std::collections::HashMap;

use crate::ports::outbound::BatchOperation;

pub(crate) fn apply_batch(data: &mut HashMap<Vec<u8>, Vec<u8>>, operations: Vec<BatchOperation>) {
    for op in operations {
        match op {
            BatchOperation::Put { key, value } => {
                data.insert(key, value);
            }
            BatchOperation::Delete { key } => {
                data.remove(&key);
            }
        }
    }
}
