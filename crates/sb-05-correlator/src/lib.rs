//! # Response Router / Correlator (sb-05)
//!
//! Issues delegated operations over either transport and correlates late
//! replies with the request that produced them.
//!
//! ## Architecture
//!
//! ```text
//!  caller ──→ SignerBridge ──Direct──→ DirectQueryChannel ──→ signer endpoint
//!                  │
//!               Deferred
//!                  ↓
//!             Correlator ──save──→ PendingRequestStore
//!                  │      ──launch→ DeferredReplyChannel ──→ signer app
//!                  │
//!  inbound link ──→ resolve ──decode──→ DeliveryHub ──→ handle | subscriber | buffer
//! ```
//!
//! ## Invariants
//!
//! - At most one deferred request is outstanding; a new `begin` supersedes it
//!   and the superseded handle observes `Cancelled`.
//! - The pending record is durable before the signer is launched.
//! - Every reply is delivered exactly once, or suppressed as a duplicate.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::link::InboundLink;
pub use domain::outcome::{PendingStatus, ResolveOutcome};
pub use domain::state::CorrelatorState;
pub use ports::inbound::{Dispatch, SignerBridgeApi};
pub use service::{Correlator, SignerBridge};
