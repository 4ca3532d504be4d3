//! # Inbound Reply Classification
//!
//! Turns a reply address into exactly one `LinkReply`.
//!
//! ## Field Precedence
//!
//! When several fields are present the first match wins:
//!
//! ```text
//! rejected > error > pubkey > event > result > signature+id > (none)
//! ```
//!
//! ## Fallback Path Form
//!
//! Some signer builds reply with `scheme://result<payload>` and no query. The
//! fallback is consulted only when none of `pubkey`, `event`, `result` came in
//! through the query string.

use std::fmt;

use shared_types::DelegatedResponse;
use tracing::debug;

use super::address::SplitAddress;
use super::errors::ParseError;

/// Literal that prefixes the payload in the fallback path form.
pub const RESULT_MARKER: &str = "result";

/// Query parameter names recognised in a reply.
pub mod params {
    pub const RESULT: &str = "result";
    pub const SIGNATURE: &str = "signature";
    pub const EVENT: &str = "event";
    pub const PUBKEY: &str = "pubkey";
    pub const ID: &str = "id";
    pub const ERROR: &str = "error";
    pub const REJECTED: &str = "rejected";
}

/// A classified reply from the signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkReply {
    /// The user or signer declined.
    Rejected,
    /// The signer reported an error.
    Error(String),
    /// A hex public key.
    PublicKey(String),
    /// A fully signed event (JSON).
    SignedEvent(String),
    /// Generic result: ciphertext, plaintext, JSON, ...
    Result(String),
    /// A bare signature together with the event id it covers.
    Signature { signature: String, id: String },
}

impl LinkReply {
    /// Short label for logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            LinkReply::Rejected => "rejected",
            LinkReply::Error(_) => "error",
            LinkReply::PublicKey(_) => "pubkey",
            LinkReply::SignedEvent(_) => "signed_event",
            LinkReply::Result(_) => "result",
            LinkReply::Signature { .. } => "signature",
        }
    }

    /// Map to the terminal response delivered to consumers.
    #[must_use]
    pub fn into_response(self) -> DelegatedResponse {
        match self {
            LinkReply::Rejected => DelegatedResponse::Rejected,
            LinkReply::Error(message) => DelegatedResponse::Failed(message),
            LinkReply::PublicKey(payload)
            | LinkReply::SignedEvent(payload)
            | LinkReply::Result(payload)
            | LinkReply::Signature {
                signature: payload, ..
            } => DelegatedResponse::Success(payload),
        }
    }
}

impl fmt::Display for LinkReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Payload recovered from the fallback path form.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FallbackPayload {
    PublicKey(String),
    Json(String),
    Opaque(String),
    Empty,
}

/// Parse a reply address addressed to `expected_scheme`.
///
/// # Errors
///
/// Any `ParseError`; never panics on untrusted input.
pub fn parse(address: &str, expected_scheme: &str) -> Result<LinkReply, ParseError> {
    let split = SplitAddress::parse(address)?;
    if !split.has_scheme(expected_scheme) {
        return Err(ParseError::UnexpectedScheme {
            expected: expected_scheme.to_string(),
            found: split.scheme.to_string(),
        });
    }

    let rejected = split.query_param(params::REJECTED);
    let error = split.query_param(params::ERROR);
    let mut pubkey = split.query_param(params::PUBKEY);
    let event = split.query_param(params::EVENT);
    let mut result = split.query_param(params::RESULT);
    let signature = split.query_param(params::SIGNATURE);
    let id = split.query_param(params::ID);

    let mut fallback_empty = false;
    if pubkey.is_none() && event.is_none() && result.is_none() {
        match classify_fallback(&split.host_path) {
            Some(FallbackPayload::PublicKey(hex)) => pubkey = Some(hex),
            Some(FallbackPayload::Json(json)) => result = Some(json),
            Some(FallbackPayload::Opaque(data)) => result = Some(data),
            Some(FallbackPayload::Empty) => fallback_empty = true,
            None => {}
        }
    }

    let reply = if rejected.is_some() {
        LinkReply::Rejected
    } else if let Some(message) = error {
        LinkReply::Error(message)
    } else if let Some(hex) = pubkey {
        LinkReply::PublicKey(hex)
    } else if let Some(signed) = event {
        LinkReply::SignedEvent(signed)
    } else if let Some(payload) = result {
        LinkReply::Result(payload)
    } else if let (Some(signature), Some(id)) = (signature, id) {
        LinkReply::Signature { signature, id }
    } else if fallback_empty {
        return Err(ParseError::EmptyPayload);
    } else {
        return Err(ParseError::NoValidResponse);
    };

    debug!(reply = %reply, "Classified inbound reply");
    Ok(reply)
}

/// Parse and map straight to a response. Total: failures become `Failed`.
#[must_use]
pub fn decode(address: &str, expected_scheme: &str) -> DelegatedResponse {
    match parse(address, expected_scheme) {
        Ok(reply) => reply.into_response(),
        Err(err) => {
            debug!(error = %err, "Reply did not parse");
            DelegatedResponse::Failed(failure_message(&err))
        }
    }
}

/// Message carried by the `Failed` outcome for a parse failure.
#[must_use]
pub fn failure_message(err: &ParseError) -> String {
    match err {
        ParseError::NoValidResponse | ParseError::EmptyPayload => {
            DelegatedResponse::NO_VALID_RESPONSE.to_string()
        }
        other => other.to_string(),
    }
}

fn classify_fallback(host_path: &str) -> Option<FallbackPayload> {
    let data = host_path.strip_prefix(RESULT_MARKER)?;

    let payload = if is_hex_pubkey(data) {
        FallbackPayload::PublicKey(data.to_string())
    } else if data.starts_with('{') || data.starts_with('[') {
        FallbackPayload::Json(data.to_string())
    } else if !data.is_empty() {
        FallbackPayload::Opaque(data.to_string())
    } else {
        FallbackPayload::Empty
    };
    Some(payload)
}

/// 64 hex characters, either case.
#[must_use]
pub fn is_hex_pubkey(candidate: &str) -> bool {
    candidate.len() == 64 && candidate.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Build a reply address for `reply`. Used by signer simulators and tests.
#[must_use]
pub fn encode(scheme: &str, reply: &LinkReply) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    match reply {
        LinkReply::Rejected => {
            query.append_pair(params::REJECTED, "true");
        }
        LinkReply::Error(message) => {
            query.append_pair(params::ERROR, message);
        }
        LinkReply::PublicKey(hex) => {
            query.append_pair(params::PUBKEY, hex);
        }
        LinkReply::SignedEvent(event) => {
            query.append_pair(params::EVENT, event);
        }
        LinkReply::Result(payload) => {
            query.append_pair(params::RESULT, payload);
        }
        LinkReply::Signature { signature, id } => {
            query.append_pair(params::SIGNATURE, signature);
            query.append_pair(params::ID, id);
        }
    }
    format!("{scheme}://{RESULT_MARKER}?{}", query.finish())
}
