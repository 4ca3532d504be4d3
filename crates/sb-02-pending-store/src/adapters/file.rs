//! # File-Backed Store
//!
//! The file is the source of truth: every operation re-reads it, so separate
//! processes (a waiting caller and a freshly launched link handler) see each
//! other's writes. A sidecar `.lock` file serialises access through `fs2`.
//!
//! On-disk format, repeated until EOF:
//!
//! ```text
//! [key_len: u32 LE][key][value_len: u32 LE][value]
//! ```
//!
//! Writes go to a temp file which is fsynced and renamed over the original;
//! the parent directory is then fsynced so the rename itself survives a crash.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, info};

use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore};

type Entries = HashMap<Vec<u8>, Vec<u8>>;

/// Durable key-value store kept in a single file.
#[derive(Debug)]
pub struct FileBackedKVStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileBackedKVStore {
    /// Open (or prepare to create) the store at `path`.
    ///
    /// # Errors
    ///
    /// I/O errors creating the parent directory, or `CorruptionError` if an
    /// existing file cannot be decoded.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KVStoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(KVStoreError::io)?;
            }
        }

        let store = Self {
            lock_path: path.with_extension("lock"),
            path,
        };

        let entries = store.with_lock(false, |s| s.load())?;
        info!(
            path = %store.path.display(),
            keys = entries.len(),
            "Opened pending store"
        );
        Ok(store)
    }

    /// Location of the data file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_lock<T>(
        &self,
        exclusive: bool,
        f: impl FnOnce(&Self) -> Result<T, KVStoreError>,
    ) -> Result<T, KVStoreError> {
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(KVStoreError::io)?;
        if exclusive {
            FileExt::lock_exclusive(&lock).map_err(KVStoreError::io)?;
        } else {
            FileExt::lock_shared(&lock).map_err(KVStoreError::io)?;
        }

        let result = f(self);
        // Closing the handle releases the lock even if unlock fails.
        let _ = FileExt::unlock(&lock);
        result
    }

    fn load(&self) -> Result<Entries, KVStoreError> {
        let mut bytes = Vec::new();
        match File::open(&self.path) {
            Ok(mut file) => {
                file.read_to_end(&mut bytes).map_err(KVStoreError::io)?;
            }
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(KVStoreError::io(e)),
        }
        decode_entries(&bytes)
    }

    fn save(&self, entries: &Entries) -> Result<(), KVStoreError> {
        let bytes = encode_entries(entries)?;

        let temp_path = self.path.with_extension("tmp");
        let mut file = File::create(&temp_path).map_err(KVStoreError::io)?;
        file.write_all(&bytes).map_err(KVStoreError::io)?;
        file.sync_all().map_err(KVStoreError::io)?;
        std::fs::rename(&temp_path, &self.path).map_err(KVStoreError::io)?;
        self.sync_parent()?;

        debug!(path = %self.path.display(), keys = entries.len(), "Persisted pending store");
        Ok(())
    }

    /// Flush the directory entry written by the rename.
    #[cfg(unix)]
    fn sync_parent(&self) -> Result<(), KVStoreError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        File::open(parent)
            .and_then(|dir| dir.sync_all())
            .map_err(KVStoreError::io)
    }

    /// Directory handles cannot be fsynced here; the rename is already
    /// durable once it returns.
    #[cfg(not(unix))]
    fn sync_parent(&self) -> Result<(), KVStoreError> {
        Ok(())
    }

    fn mutate(&self, f: impl FnOnce(&mut Entries)) -> Result<(), KVStoreError> {
        self.with_lock(true, |s| {
            let mut entries = s.load()?;
            f(&mut entries);
            s.save(&entries)
        })
    }
}

fn read_u32(bytes: &[u8], cursor: &mut usize) -> Result<usize, KVStoreError> {
    let end = *cursor + 4;
    let raw: [u8; 4] = bytes
        .get(*cursor..end)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| KVStoreError::corrupt("truncated length prefix"))?;
    *cursor = end;
    Ok(u32::from_le_bytes(raw) as usize)
}

fn read_chunk(bytes: &[u8], cursor: &mut usize) -> Result<Vec<u8>, KVStoreError> {
    let len = read_u32(bytes, cursor)?;
    let end = cursor
        .checked_add(len)
        .filter(|end| *end <= bytes.len())
        .ok_or_else(|| KVStoreError::corrupt("truncated entry"))?;
    let chunk = bytes[*cursor..end].to_vec();
    *cursor = end;
    Ok(chunk)
}

fn decode_entries(bytes: &[u8]) -> Result<Entries, KVStoreError> {
    let mut entries = Entries::new();
    let mut cursor = 0;
    while cursor < bytes.len() {
        let key = read_chunk(bytes, &mut cursor)?;
        let value = read_chunk(bytes, &mut cursor)?;
        entries.insert(key, value);
    }
    Ok(entries)
}

fn encode_entries(entries: &Entries) -> Result<Vec<u8>, KVStoreError> {
    let mut bytes = Vec::new();
    for (key, value) in entries {
        for chunk in [key, value] {
            let len = u32::try_from(chunk.len())
                .map_err(|_| KVStoreError::corrupt("entry exceeds u32 length"))?;
            bytes.extend_from_slice(&len.to_le_bytes());
            bytes.extend_from_slice(chunk);
        }
    }
    Ok(bytes)
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.with_lock(false, |s| Ok(s.load()?.remove(key)))
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.mutate(|entries| {
            entries.insert(key.to_vec(), value.to_vec());
        })
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.mutate(|entries| {
            entries.remove(key);
        })
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        self.mutate(|entries| super::apply_batch(entries, operations))
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        self.with_lock(false, |s| Ok(s.load()?.contains_key(key)))
    }
}
