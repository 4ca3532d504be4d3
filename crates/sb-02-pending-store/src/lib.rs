//! # Pending Request Store (sb-02)
//!
//! Durable state that outlives the calling process: the single outstanding
//! `PendingRecord` and a stashed inbound link.
//!
//! ## Durability
//!
//! A record must be on disk before the external signer is launched, so every
//! write through `FileBackedKVStore` is fsynced and atomically renamed before
//! returning.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Errors and key layout
//! - `ports/` - `KeyValueStore` outbound port
//! - `adapters/` - In-memory and file-backed stores
//! - `service.rs` - `PendingRequestStore`

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{FileBackedKVStore, InMemoryKVStore};
pub use domain::errors::KVStoreError;
pub use ports::outbound::{BatchOperation, KeyValueStore};
pub use service::PendingRequestStore;
