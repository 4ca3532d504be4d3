//! # Shared Bus - Reply Delivery Primitives
//!
//! Consumer-side building blocks the correlator routes replies through.
//!
//! ## Delivery Rules
//!
//! - A deferred reply goes to the one-shot `CompletionHandle` when its caller
//!   is still alive.
//! - Otherwise it goes to the single `Broadcast` subscriber.
//! - Otherwise it is buffered and handed to the next subscriber on attach.
//!
//! ```text
//! ┌──────────────┐   deliver()   ┌──────────────┐   wait()    ┌──────────┐
//! │  Correlator  │ ────────────→ │ DeliveryHub  │ ──────────→ │  caller  │
//! └──────────────┘               │              │             └──────────┘
//!                                │  [buffer]    │   recv()    ┌──────────┐
//!                                │              │ ──────────→ │ listener │
//!                                └──────────────┘             └──────────┘
//! ```
//!
//! ## Duplicate Suppression
//!
//! - `ProcessedLinkCache` remembers routed inbound addresses so a link
//!   re-delivered across lifecycle callbacks is not resolved twice.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod broadcast;
pub mod completion;
pub mod hub;
pub mod processed_links;

// Re-export main types
pub use broadcast::{Broadcast, BroadcastOutcome, Subscription};
pub use completion::{completion_pair, CompletionHandle, CompletionSlot, FulfillOutcome};
pub use hub::{DeliveryHub, DeliveryPath};
pub use processed_links::{link_digest, ProcessedLinkCache, ProcessedLinkError};
