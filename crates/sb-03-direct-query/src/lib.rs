//! # Direct Query Channel (sb-03)
//!
//! Synchronous transport: one structured query to the signer's endpoint for the
//! operation kind, one row back.
//!
//! ```text
//! content://<target>.<KIND>   projection [payload, pubkey-or-empty, caller]
//! ```
//!
//! | Row | Outcome |
//! |-----|---------|
//! | `rejected` column present | `Rejected` |
//! | endpoint error / no row | `Failed("no response")` |
//! | payload column present | `Success(payload)` |
//! | otherwise | `Failed("no valid response")` |
//!
//! `DirectQueryApi::query` blocks; use `DirectQueryChannel::query_async` from
//! async code.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{CommandQueryEndpoint, InMemoryQueryEndpoint};
pub use domain::errors::EndpointError;
pub use domain::projection::Projection;
pub use domain::row::{classify_outcome, QueryRow, LOGIN_PAYLOAD};
pub use ports::inbound::DirectQueryApi;
pub use ports::outbound::QueryEndpoint;
pub use service::DirectQueryChannel;
