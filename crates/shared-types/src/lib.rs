//! # Shared Types Crate
//!
//! Domain entities and the error taxonomy used by every signer-bridge crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: request, response and pending-record types
//!   are defined here and nowhere else.
//! - **Opaque payloads**: the bridge never interprets cryptographic content;
//!   payloads in and out are plain strings.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
