//! # Signer Runtime
//!
//! Host process for the signer bridge.
//!
//! ## Lifecycle
//!
//! A deferred request outlives the process that issued it:
//!
//! ```text
//! signer-runtime request sign-event ...   → pending record saved, signer launched, exit
//!          (signer answers with signerbridge://result?...)
//! signer-runtime handle-link <address>    → pending record recovered, reply routed, printed
//! ```
//!
//! `handle-link --stash` keeps the address for a later `resume`, for hosts
//! that receive links before they are ready to route them.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod commands;
pub mod config;
pub mod runtime;

pub use commands::{execute, Command, Operation, TransportArg};
pub use config::{ConfigError, RuntimeConfig};
pub use runtime::{open_bridge, RuntimeBridge};
