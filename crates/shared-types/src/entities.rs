//! # Core Domain Entities
//!
//! Defines the request/response model shared by every signer-bridge crate.
//!
//! ## Clusters
//!
//! - **Requests**: `OperationKind`, `DelegatedRequest`, `Transport`
//! - **Outcomes**: `DelegatedResponse`
//! - **Durable state**: `PendingRecord`
//! - **Identity**: `CallerIdentity`

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::errors::BridgeError;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Operation-specific parameters (event JSON, plaintext, peer public key, ...).
pub type Parameters = BTreeMap<String, String>;

/// Parameter carrying the unsigned event JSON for `SignEvent`.
pub const PARAM_EVENT: &str = "event";
/// Parameter carrying the plaintext for `Nip44Encrypt`.
pub const PARAM_PLAINTEXT: &str = "plaintext";
/// Parameter carrying the ciphertext for `Nip44Decrypt`.
pub const PARAM_CIPHERTEXT: &str = "ciphertext";
/// Parameter carrying the peer public key for the NIP-44 operations.
pub const PARAM_PUBKEY: &str = "pubkey";
/// Optional permission set (JSON array) sent with `GetPublicKey`.
pub const PARAM_PERMISSIONS: &str = "permissions";

/// Current Unix time in seconds.
#[must_use]
pub fn now_secs() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// =============================================================================
// REQUESTS
// =============================================================================

/// The delegated operations the external signer performs.
///
/// Attached to every outstanding request so a reply can be interpreted
/// correctly (e.g. whether the payload is a public key or a ciphertext).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    GetPublicKey,
    SignEvent,
    Nip44Encrypt,
    Nip44Decrypt,
}

impl OperationKind {
    /// All kinds, in wire order.
    pub const ALL: [OperationKind; 4] = [
        OperationKind::GetPublicKey,
        OperationKind::SignEvent,
        OperationKind::Nip44Encrypt,
        OperationKind::Nip44Decrypt,
    ];

    /// Wire name used in the outbound `type` extra.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::GetPublicKey => "get_public_key",
            OperationKind::SignEvent => "sign_event",
            OperationKind::Nip44Encrypt => "nip44_encrypt",
            OperationKind::Nip44Decrypt => "nip44_decrypt",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| BridgeError::InvalidArgument {
                reason: format!("unknown operation kind: {s}"),
            })
    }
}

/// Which channel carries a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// Synchronous single round trip, no UI interruption.
    Direct,
    /// Launch now, receive the reply later through an inbound link.
    Deferred,
}

/// A delegated operation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatedRequest {
    kind: OperationKind,
    parameters: Parameters,
    transport: Transport,
}

impl DelegatedRequest {
    /// Build a request, checking that the kind's required parameters exist.
    ///
    /// # Errors
    ///
    /// `BridgeError::InvalidArgument` if a required parameter is missing.
    pub fn new(
        kind: OperationKind,
        parameters: Parameters,
        transport: Transport,
    ) -> Result<Self, BridgeError> {
        let required: &[&str] = match kind {
            OperationKind::GetPublicKey => &[],
            OperationKind::SignEvent => &[PARAM_EVENT],
            OperationKind::Nip44Encrypt => &[PARAM_PLAINTEXT, PARAM_PUBKEY],
            OperationKind::Nip44Decrypt => &[PARAM_CIPHERTEXT, PARAM_PUBKEY],
        };

        if let Some(missing) = required.iter().find(|name| !parameters.contains_key(**name)) {
            return Err(BridgeError::InvalidArgument {
                reason: format!("{kind} requires the `{missing}` parameter"),
            });
        }

        Ok(Self {
            kind,
            parameters,
            transport,
        })
    }

    /// Request the signer's public key.
    #[must_use]
    pub fn get_public_key(transport: Transport) -> Self {
        Self {
            kind: OperationKind::GetPublicKey,
            parameters: Parameters::new(),
            transport,
        }
    }

    /// Request a signature over an unsigned event.
    #[must_use]
    pub fn sign_event(event_json: impl Into<String>, transport: Transport) -> Self {
        let mut parameters = Parameters::new();
        parameters.insert(PARAM_EVENT.to_string(), event_json.into());
        Self {
            kind: OperationKind::SignEvent,
            parameters,
            transport,
        }
    }

    /// Request NIP-44 encryption of `plaintext` for `pubkey`.
    #[must_use]
    pub fn encrypt(
        plaintext: impl Into<String>,
        pubkey: impl Into<String>,
        transport: Transport,
    ) -> Self {
        let mut parameters = Parameters::new();
        parameters.insert(PARAM_PLAINTEXT.to_string(), plaintext.into());
        parameters.insert(PARAM_PUBKEY.to_string(), pubkey.into());
        Self {
            kind: OperationKind::Nip44Encrypt,
            parameters,
            transport,
        }
    }

    /// Request NIP-44 decryption of `ciphertext` from `pubkey`.
    #[must_use]
    pub fn decrypt(
        ciphertext: impl Into<String>,
        pubkey: impl Into<String>,
        transport: Transport,
    ) -> Self {
        let mut parameters = Parameters::new();
        parameters.insert(PARAM_CIPHERTEXT.to_string(), ciphertext.into());
        parameters.insert(PARAM_PUBKEY.to_string(), pubkey.into());
        Self {
            kind: OperationKind::Nip44Decrypt,
            parameters,
            transport,
        }
    }

    /// Attach an explicit permission set to a `GetPublicKey` request.
    #[must_use]
    pub fn with_permissions(mut self, permissions_json: impl Into<String>) -> Self {
        self.parameters
            .insert(PARAM_PERMISSIONS.to_string(), permissions_json.into());
        self
    }

    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    #[must_use]
    pub fn transport(&self) -> Transport {
        self.transport
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Look up a single parameter.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// The body handed to the signer: event JSON, plaintext or ciphertext.
    ///
    /// Empty for `GetPublicKey`.
    #[must_use]
    pub fn body(&self) -> &str {
        let name = match self.kind {
            OperationKind::GetPublicKey => return "",
            OperationKind::SignEvent => PARAM_EVENT,
            OperationKind::Nip44Encrypt => PARAM_PLAINTEXT,
            OperationKind::Nip44Decrypt => PARAM_CIPHERTEXT,
        };
        self.parameter(name).unwrap_or_default()
    }

    /// Peer public key for the NIP-44 operations, empty otherwise.
    #[must_use]
    pub fn peer_pubkey(&self) -> &str {
        match self.kind {
            OperationKind::Nip44Encrypt | OperationKind::Nip44Decrypt => {
                self.parameter(PARAM_PUBKEY).unwrap_or_default()
            }
            _ => "",
        }
    }
}

// =============================================================================
// OUTCOMES
// =============================================================================

/// Terminal outcome of a delegated operation. Exactly one describes any request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum DelegatedResponse {
    /// The signer produced a payload (public key, signed event, ciphertext, ...).
    Success(String),
    /// The user or the signer declined.
    Rejected,
    /// Anything else went wrong; the message is human readable.
    Failed(String),
    /// The request was cancelled or superseded before a reply arrived.
    Cancelled,
}

impl DelegatedResponse {
    /// Message used when a channel produced nothing at all.
    pub const NO_RESPONSE: &'static str = "no response";

    /// Message used when a reply exists but carries no usable field.
    pub const NO_VALID_RESPONSE: &'static str = "no valid response";

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, DelegatedResponse::Success(_))
    }

    /// The success payload, if any.
    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        match self {
            DelegatedResponse::Success(payload) => Some(payload),
            _ => None,
        }
    }

    /// Collapse the outcome into a `Result` for callers that only care
    /// about the payload.
    ///
    /// # Errors
    ///
    /// - `Rejected` for a declined request
    /// - `NoResponse` / `MalformedReply` for the two empty-reply messages
    /// - `Superseded` for a cancelled request
    /// - `Failed` for any other signer-reported failure
    pub fn into_result(self) -> Result<String, BridgeError> {
        match self {
            DelegatedResponse::Success(payload) => Ok(payload),
            DelegatedResponse::Rejected => Err(BridgeError::Rejected),
            DelegatedResponse::Cancelled => Err(BridgeError::Superseded),
            DelegatedResponse::Failed(message) if message == Self::NO_RESPONSE => {
                Err(BridgeError::NoResponse)
            }
            DelegatedResponse::Failed(message) if message == Self::NO_VALID_RESPONSE => {
                Err(BridgeError::MalformedReply { reason: message })
            }
            DelegatedResponse::Failed(reason) => Err(BridgeError::Failed { reason }),
        }
    }
}

impl fmt::Display for DelegatedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelegatedResponse::Success(payload) => write!(f, "success: {payload}"),
            DelegatedResponse::Rejected => f.write_str("rejected"),
            DelegatedResponse::Failed(message) => write!(f, "failed: {message}"),
            DelegatedResponse::Cancelled => f.write_str("cancelled"),
        }
    }
}

// =============================================================================
// DURABLE STATE
// =============================================================================

/// Durable marker of an outstanding deferred request.
///
/// The only piece of correlation state that survives process recreation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRecord {
    /// Kind of the request awaiting a reply.
    pub kind: OperationKind,
    /// Outbound address the signer was launched with.
    pub raw_address: String,
    /// When the request was issued.
    pub created_at: Timestamp,
}

impl PendingRecord {
    #[must_use]
    pub fn new(kind: OperationKind, raw_address: impl Into<String>) -> Self {
        Self {
            kind,
            raw_address: raw_address.into(),
            created_at: now_secs(),
        }
    }

    /// Seconds since the request was issued.
    #[must_use]
    pub fn age(&self, now: Timestamp) -> u64 {
        now.saturating_sub(self.created_at)
    }
}

// =============================================================================
// IDENTITY
// =============================================================================

/// Who is asking. The signer applies its per-caller permission policy to this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// Application identifier (sent as `package`).
    pub app_id: String,
    /// Human readable name (sent as `appName`).
    pub app_name: String,
    /// Active account (npub) used by direct queries.
    #[serde(default)]
    pub account: Option<String>,
}

impl CallerIdentity {
    #[must_use]
    pub fn new(app_id: impl Into<String>, app_name: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_name: app_name.into(),
            account: None,
        }
    }

    #[must_use]
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Identity column passed to direct queries.
    #[must_use]
    pub fn query_identity(&self) -> &str {
        self.account.as_deref().unwrap_or(&self.app_id)
    }
}
