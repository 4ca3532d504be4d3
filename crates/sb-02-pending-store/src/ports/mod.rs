//! Ports for the pending store.

pub mod outbound;
