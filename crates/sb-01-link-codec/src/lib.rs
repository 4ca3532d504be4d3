//! # Signer Link Codec (sb-01)
//!
//! Pure encoding and decoding of the addresses exchanged with an external
//! signer application. No I/O happens here.
//!
//! ## Inbound
//!
//! A signer answers by opening a reply address on the caller's scheme:
//!
//! ```text
//! signerbridge://result?pubkey=<hex>
//! signerbridge://result?event=<json>
//! signerbridge://result?result=<payload>
//! signerbridge://result?signature=<sig>&id=<event id>
//! signerbridge://result?error=<message>
//! signerbridge://result?rejected=true
//! signerbridge://result<payload>            (fallback form, no query)
//! ```
//!
//! `reply::parse` classifies the address into a `LinkReply`; `reply::decode`
//! maps straight to a `DelegatedResponse` and never fails.
//!
//! ## Outbound
//!
//! `OutboundRequest::build` produces the launch address (`nostrsigner:<body>`)
//! and its extras. `query_endpoint` names the direct query endpoint for an
//! operation kind.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;

pub use domain::address::SplitAddress;
pub use domain::errors::ParseError;
pub use domain::extras::ResultExtras;
pub use domain::outbound::{
    endpoint_suffix, query_endpoint, store_listing_url, OutboundRequest, DEFAULT_PERMISSIONS,
    DEFAULT_SIGNER_TARGET, SIGNER_URI_SCHEME,
};
pub use domain::reply::{decode, encode, failure_message, is_hex_pubkey, parse, LinkReply};

/// Scheme the bridge listens on for replies unless configured otherwise.
pub const DEFAULT_REPLY_SCHEME: &str = "signerbridge";
