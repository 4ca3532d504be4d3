//! # Key Layout
//!
//! Everything lives under one namespace so the store file can be shared with
//! other state without collisions.
//!
//! | Key | Value |
//! |-----|-------|
//! | `signer_bridge:pending` | `PendingRecord` as JSON |
//! | `signer_bridge:inbound` | raw inbound address (UTF-8) |

/// Namespace prefix for every key written by the bridge.
pub const NAMESPACE: &str = "signer_bridge";

/// Key of the single pending record.
pub const PENDING_RECORD: &[u8] = b"signer_bridge:pending";

/// Key of the stashed inbound link.
pub const INBOUND_LINK: &[u8] = b"signer_bridge:inbound";
