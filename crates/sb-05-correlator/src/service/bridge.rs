//! # Signer Bridge
//!
//! Caller-facing facade: picks the transport, fills in the caller identity and
//! exposes the broadcast and lifecycle hooks of the correlator.

use std::sync::Arc;

use async_trait::async_trait;
use sb_01_link_codec::ResultExtras;
use sb_02_pending_store::KeyValueStore;
use sb_03_direct_query::{DirectQueryChannel, QueryEndpoint};
use sb_04_deferred_reply::{OpenOutcome, SignerLauncher};
use shared_bus::Subscription;
use shared_types::{BridgeError, CallerIdentity, DelegatedRequest, Transport};
use tracing::debug;

use crate::domain::link::InboundLink;
use crate::domain::outcome::{PendingStatus, ResolveOutcome};
use crate::ports::inbound::{Dispatch, SignerBridgeApi};
use crate::service::correlator::Correlator;

pub struct SignerBridge<S, L, E> {
    correlator: Arc<Correlator<S, L>>,
    direct: DirectQueryChannel<E>,
    identity: CallerIdentity,
}

impl<S, L, E> SignerBridge<S, L, E>
where
    S: KeyValueStore,
    L: SignerLauncher,
    E: QueryEndpoint + 'static,
{
    pub fn new(
        correlator: Correlator<S, L>,
        direct: DirectQueryChannel<E>,
        identity: CallerIdentity,
    ) -> Self {
        Self {
            correlator: Arc::new(correlator),
            direct,
            identity,
        }
    }

    #[must_use]
    pub fn correlator(&self) -> &Arc<Correlator<S, L>> {
        &self.correlator
    }

    #[must_use]
    pub fn identity(&self) -> &CallerIdentity {
        &self.identity
    }

    /// Send `request` over its transport.
    ///
    /// # Errors
    ///
    /// Only for deferred requests, see [`Correlator::begin`].
    pub async fn dispatch(&self, request: DelegatedRequest) -> Result<Dispatch, BridgeError> {
        debug!(kind = %request.kind(), transport = ?request.transport(), "Dispatching request");
        match request.transport() {
            Transport::Direct => {
                let response = self.direct.query_async(request, self.identity.clone()).await;
                Ok(Dispatch::Completed(response))
            }
            Transport::Deferred => self
                .correlator
                .begin(&request, &self.identity)
                .map(Dispatch::Awaiting),
        }
    }

    /// Attach the broadcast subscriber. A buffered reply is received at once.
    pub fn subscribe(&self) -> Subscription {
        self.correlator.attach()
    }

    pub fn unsubscribe(&self) {
        self.correlator.detach();
    }

    /// Route an inbound reply link.
    pub fn handle_link(&self, link: &mut InboundLink) -> ResolveOutcome {
        self.correlator.resolve(link)
    }

    /// Route a result-code reply.
    pub fn handle_result(&self, extras: &ResultExtras) -> ResolveOutcome {
        self.correlator.resolve_result(extras)
    }

    /// Keep an inbound reply received before the host was ready. Returns
    /// whether the address was a reply and got stashed.
    pub fn stash_inbound(&self, address: &str) -> Result<bool, BridgeError> {
        self.correlator.stash_inbound(address)
    }

    /// Resolve a stashed inbound address, if any.
    pub fn resume(&self) -> Result<Option<ResolveOutcome>, BridgeError> {
        self.correlator.resume()
    }

    /// Open the signer app, or its store listing if it is missing.
    pub fn launch_signer(&self) -> Result<OpenOutcome, BridgeError> {
        self.correlator.channel().open_signer()
    }

    pub fn open_signer_in_store(&self) -> Result<(), BridgeError> {
        self.correlator.channel().open_store()
    }

    #[must_use]
    pub fn pending(&self) -> Option<PendingStatus> {
        self.correlator.pending()
    }

    /// Drop the outstanding deferred request.
    pub fn abandon(&self) -> Result<bool, BridgeError> {
        self.correlator.abandon()
    }
}

fn require(value: &str, what: &str) -> Result<(), BridgeError> {
    if value.trim().is_empty() {
        return Err(BridgeError::InvalidArgument {
            reason: format!("{what} must not be empty"),
        });
    }
    Ok(())
}

#[async_trait]
impl<S, L, E> SignerBridgeApi for SignerBridge<S, L, E>
where
    S: KeyValueStore,
    L: SignerLauncher,
    E: QueryEndpoint + 'static,
{
    async fn request_public_key(&self, transport: Transport) -> Result<Dispatch, BridgeError> {
        self.dispatch(DelegatedRequest::get_public_key(transport)).await
    }

    async fn sign_event(&self, event_json: &str, transport: Transport) -> Result<Dispatch, BridgeError> {
        require(event_json, "event")?;
        self.dispatch(DelegatedRequest::sign_event(event_json, transport))
            .await
    }

    async fn encrypt(
        &self,
        plaintext: &str,
        pubkey: &str,
        transport: Transport,
    ) -> Result<Dispatch, BridgeError> {
        require(pubkey, "pubkey")?;
        self.dispatch(DelegatedRequest::encrypt(plaintext, pubkey, transport))
            .await
    }

    async fn decrypt(
        &self,
        ciphertext: &str,
        pubkey: &str,
        transport: Transport,
    ) -> Result<Dispatch, BridgeError> {
        require(ciphertext, "ciphertext")?;
        require(pubkey, "pubkey")?;
        self.dispatch(DelegatedRequest::decrypt(ciphertext, pubkey, transport))
            .await
    }
}
