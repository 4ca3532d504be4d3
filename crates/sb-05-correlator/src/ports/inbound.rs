//! # Inbound Ports (Driving Ports / API)
//!
//! The caller-facing operations of the bridge.

use async_trait::async_trait;
use shared_bus::CompletionHandle;
use shared_types::{BridgeError, DelegatedResponse, Transport};

/// How a delegated operation was answered.
#[derive(Debug)]
pub enum Dispatch {
    /// Direct transport: the signer already answered.
    Completed(DelegatedResponse),
    /// Deferred transport: the answer arrives on this handle (or, if the
    /// process is recreated first, on the broadcast).
    Awaiting(CompletionHandle),
}

impl Dispatch {
    /// Wait for the response regardless of transport.
    pub async fn into_response(self) -> DelegatedResponse {
        match self {
            Dispatch::Completed(response) => response,
            Dispatch::Awaiting(handle) => handle.wait().await,
        }
    }
}

/// Delegated signer operations.
///
/// Errors are returned only when nothing is in flight (bad arguments, the
/// pending record could not be stored, the signer could not be launched).
#[async_trait]
pub trait SignerBridgeApi: Send + Sync {
    /// Ask the signer for the user's public key.
    async fn request_public_key(&self, transport: Transport) -> Result<Dispatch, BridgeError>;

    /// Ask the signer to sign an unsigned event (JSON).
    async fn sign_event(&self, event_json: &str, transport: Transport) -> Result<Dispatch, BridgeError>;

    /// NIP-44 encrypt `plaintext` for `pubkey`.
    async fn encrypt(
        &self,
        plaintext: &str,
        pubkey: &str,
        transport: Transport,
    ) -> Result<Dispatch, BridgeError>;

    /// NIP-44 decrypt `ciphertext` from `pubkey`.
    async fn decrypt(
        &self,
        ciphertext: &str,
        pubkey: &str,
        transport: Transport,
    ) -> Result<Dispatch, BridgeError>;
}
