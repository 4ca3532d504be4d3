//! # Deferred Reply Channel (sb-04)
//!
//! Two-step transport: launch the signer now, receive the reply later as an
//! inbound link. This crate owns the launch half; the reply half is routed by
//! the correlator.
//!
//! - `ports::outbound::SignerLauncher` - platform seam for starting the signer
//! - `adapters::RecordingLauncher` - in-memory launcher for tests
//! - `adapters::CommandLauncher` - shells out to an opener program

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{CommandLauncher, LaunchEvent, RecordingLauncher};
pub use domain::errors::LaunchError;
pub use ports::outbound::SignerLauncher;
pub use service::{DeferredReplyChannel, OpenOutcome};
