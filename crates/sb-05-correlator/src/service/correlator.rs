//! # Correlator
//!
//! Sole owner of the outstanding deferred request. The durable record, the
//! completion slot, the broadcast and the processed-link cache sit behind one
//! mutex, so `begin`, `resolve`, `attach`, `detach` and `abandon` are atomic
//! with respect to each other.
//!
//! ## Delivery
//!
//! A decoded reply goes to the live completion handle if there is one, else
//! to the broadcast subscriber, else into the broadcast buffer. A reply is
//! never dropped because the correlator does not know about the request: after
//! a restart (or with no record at all) it still reaches the broadcast.
//!
//! Only addresses carrying the reply scheme are replies. Any other link is
//! ignored without touching the outstanding request.
//!
//! ## Stale records
//!
//! If the durable record cannot be cleared once its request is over, the
//! in-memory state keeps describing that record (as a restart would see it)
//! and it is flagged stale. The next `resolve`, `resolve_result` or `abandon`
//! retries the clear; `begin` overwrites it.

use parking_lot::Mutex;
use sb_01_link_codec::{decode, ResultExtras, SplitAddress};
use sb_02_pending_store::{KeyValueStore, PendingRequestStore};
use sb_04_deferred_reply::{DeferredReplyChannel, SignerLauncher};
use shared_bus::{completion_pair, CompletionHandle, DeliveryHub, ProcessedLinkCache, Subscription};
use shared_types::{
    BridgeError, CallerIdentity, DelegatedRequest, DelegatedResponse, PendingRecord,
};
use tracing::{debug, info, warn};

use crate::domain::link::InboundLink;
use crate::domain::outcome::{PendingStatus, ResolveOutcome};
use crate::domain::state::CorrelatorState;

struct Inner<S> {
    state: CorrelatorState,
    store: PendingRequestStore<S>,
    hub: DeliveryHub,
    processed: ProcessedLinkCache,
    /// The durable record belongs to a request that is already over.
    stale: bool,
}

impl<S: KeyValueStore> Inner<S> {
    /// Clear the record and route `response` to one consumer.
    fn finish(&mut self, response: DelegatedResponse) -> ResolveOutcome {
        let kind = self.state.kind();
        self.retire_record();

        let path = self.hub.deliver(response.clone());
        info!(kind = ?kind, ?path, response = %response, "Reply routed");
        ResolveOutcome::Delivered { path, response }
    }

    /// Clear the durable record of a finished request. On failure the state
    /// keeps mirroring the record left on disk and is marked stale.
    fn retire_record(&mut self) {
        match self.store.clear() {
            Ok(()) => {
                self.state = CorrelatorState::Idle;
                self.stale = false;
            }
            Err(e) => {
                warn!(error = %e, "Failed to clear pending record; will retry");
                if let Some(record) = self.state.record().cloned() {
                    self.state = CorrelatorState::awaiting(record, false);
                    self.stale = true;
                }
            }
        }
    }

    /// Retry a clear that failed earlier.
    fn settle_stale(&mut self) {
        if self.stale {
            self.retire_record();
        }
    }

    fn cancel_waiter(&mut self) {
        if let Some(mut previous) = self.hub.take_waiter() {
            debug!(kind = %previous.kind(), "Cancelling previous completion handle");
            previous.fulfill(DelegatedResponse::Cancelled);
        }
    }
}

/// Routes replies for the single outstanding deferred request.
pub struct Correlator<S, L> {
    inner: Mutex<Inner<S>>,
    channel: DeferredReplyChannel<L>,
    reply_scheme: String,
}

impl<S: KeyValueStore, L: SignerLauncher> Correlator<S, L> {
    /// Build a correlator, recovering any record left by a previous process.
    ///
    /// A recovered request has no completion handle; its reply is routed to
    /// the broadcast. An unreadable record is discarded.
    pub fn new(store: S, channel: DeferredReplyChannel<L>, reply_scheme: impl Into<String>) -> Self {
        let mut store = PendingRequestStore::new(store);
        let state = match store.load() {
            Ok(Some(record)) => {
                info!(
                    kind = %record.kind,
                    created_at = record.created_at,
                    "Recovered pending request from a previous process"
                );
                CorrelatorState::awaiting(record, false)
            }
            Ok(None) => CorrelatorState::Idle,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable pending record");
                if let Err(e) = store.clear() {
                    warn!(error = %e, "Failed to clear unreadable pending record");
                }
                CorrelatorState::Idle
            }
        };

        Self {
            inner: Mutex::new(Inner {
                state,
                store,
                hub: DeliveryHub::new(),
                processed: ProcessedLinkCache::new(),
                stale: false,
            }),
            channel,
            reply_scheme: reply_scheme.into(),
        }
    }

    #[must_use]
    pub fn reply_scheme(&self) -> &str {
        &self.reply_scheme
    }

    #[must_use]
    pub fn channel(&self) -> &DeferredReplyChannel<L> {
        &self.channel
    }

    /// Run `f` against the underlying key-value store.
    pub fn with_store<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(self.inner.lock().store.inner())
    }

    /// Whether `address` carries the reply scheme.
    fn is_reply(&self, address: &str) -> bool {
        SplitAddress::parse(address).is_ok_and(|split| split.has_scheme(&self.reply_scheme))
    }

    /// Issue a deferred request.
    ///
    /// The pending record is durable before the signer is launched. An
    /// outstanding request is superseded and its handle observes `Cancelled`.
    ///
    /// # Errors
    ///
    /// - `BridgeError::Storage` if the record could not be written; nothing
    ///   changed.
    /// - `BridgeError::Unreachable` if the launch failed; the record is
    ///   cleared, or left stale if clearing fails too.
    pub fn begin(
        &self,
        request: &DelegatedRequest,
        identity: &CallerIdentity,
    ) -> Result<CompletionHandle, BridgeError> {
        let kind = request.kind();
        let outbound = self.channel.prepare(request, identity);
        let record = PendingRecord::new(kind, outbound.address.clone());

        let mut inner = self.inner.lock();
        inner.store.save(&record)?;
        inner.stale = false;

        if let Some(previous) = inner.state.kind() {
            info!(previous = %previous, next = %kind, "Superseding outstanding request");
        }
        inner.cancel_waiter();
        inner.processed.clear();

        if let Err(e) = self.channel.launch(&outbound) {
            inner.state = CorrelatorState::awaiting(record, false);
            inner.retire_record();
            return Err(e);
        }

        let (slot, handle) = completion_pair(kind);
        inner.hub.set_waiter(slot);
        inner.state = CorrelatorState::awaiting(record, true);
        debug!(%kind, "Deferred request issued");
        Ok(handle)
    }

    /// Route an inbound reply link.
    ///
    /// A link without the reply scheme is `Ignored` and changes nothing.
    /// Parse failures are delivered as `Failed`. A link already marked, or an
    /// address already routed since the last `begin`, is suppressed.
    pub fn resolve(&self, link: &mut InboundLink) -> ResolveOutcome {
        if link.is_processed() {
            debug!("Inbound link already processed");
            return ResolveOutcome::DuplicateSuppressed;
        }
        if !self.is_reply(link.address()) {
            debug!(expected = %self.reply_scheme, "Inbound link is not a signer reply; ignored");
            return ResolveOutcome::Ignored;
        }

        let mut inner = self.inner.lock();
        if inner.processed.check_and_mark(link.address()).is_err() {
            link.mark_processed();
            warn!("Duplicate inbound link suppressed");
            return ResolveOutcome::DuplicateSuppressed;
        }

        if inner.state.is_idle() {
            debug!("Reply arrived with no pending request; routing to broadcast");
        }
        let response = decode(link.address(), &self.reply_scheme);
        let outcome = inner.finish(response);
        link.mark_processed();
        outcome
    }

    /// Convenience for a freshly received address.
    pub fn resolve_address(&self, address: &str) -> ResolveOutcome {
        self.resolve(&mut InboundLink::new(address))
    }

    /// Route a result-code reply for the outstanding request.
    ///
    /// Ignored when nothing is pending: the extras cannot be interpreted
    /// without knowing the request kind.
    pub fn resolve_result(&self, extras: &ResultExtras) -> ResolveOutcome {
        let mut inner = self.inner.lock();
        inner.settle_stale();
        if inner.stale {
            debug!("Result reply for a finished request ignored");
            return ResolveOutcome::Ignored;
        }
        let Some(kind) = inner.state.kind() else {
            debug!("Result reply with no pending request ignored");
            return ResolveOutcome::Ignored;
        };
        let response = extras.classify(kind);
        inner.finish(response)
    }

    /// Attach the broadcast subscriber; a buffered response is flushed to it.
    pub fn attach(&self) -> Subscription {
        self.inner.lock().hub.attach()
    }

    /// Detach the broadcast subscriber. The buffer is untouched.
    pub fn detach(&self) {
        self.inner.lock().hub.detach();
    }

    /// Drop the outstanding request: the record and any stashed link are
    /// cleared together and a waiting handle observes `Cancelled`. Returns
    /// whether a live request was pending.
    ///
    /// # Errors
    ///
    /// `BridgeError::Storage` if the store could not be cleared; nothing
    /// changed.
    pub fn abandon(&self) -> Result<bool, BridgeError> {
        let mut inner = self.inner.lock();
        inner.store.reset()?;
        inner.cancel_waiter();
        let was_pending = !inner.state.is_idle() && !inner.stale;
        inner.state = CorrelatorState::Idle;
        inner.stale = false;
        if was_pending {
            info!("Outstanding request abandoned");
        }
        Ok(was_pending)
    }

    /// Snapshot of the outstanding request.
    #[must_use]
    pub fn pending(&self) -> Option<PendingStatus> {
        let inner = self.inner.lock();
        let record = inner.state.record()?;
        Some(PendingStatus {
            kind: record.kind,
            raw_address: record.raw_address.clone(),
            created_at: record.created_at,
            handle_attached: inner.state.handle_attached() && inner.hub.has_waiter(),
            response_buffered: inner.hub.buffered().is_some(),
            stale: inner.stale,
        })
    }

    #[must_use]
    pub fn state(&self) -> CorrelatorState {
        self.inner.lock().state.clone()
    }

    /// Response waiting for the next subscriber, if any.
    #[must_use]
    pub fn buffered(&self) -> Option<DelegatedResponse> {
        self.inner.lock().hub.buffered().cloned()
    }

    /// Keep an inbound reply address until `resume` is called. Returns
    /// `false`, stashing nothing, for a link without the reply scheme.
    ///
    /// # Errors
    ///
    /// `BridgeError::Storage` if the stash could not be written.
    pub fn stash_inbound(&self, address: &str) -> Result<bool, BridgeError> {
        if !self.is_reply(address) {
            debug!(expected = %self.reply_scheme, "Not stashing a link that is not a signer reply");
            return Ok(false);
        }
        self.inner.lock().store.stash_inbound(address)?;
        debug!("Inbound link stashed");
        Ok(true)
    }

    /// Resolve the stashed inbound address, if any. The stash is cleared
    /// before resolution, so a failing reply is not retried.
    ///
    /// # Errors
    ///
    /// `BridgeError::Storage` if the stash could not be read or cleared.
    pub fn resume(&self) -> Result<Option<ResolveOutcome>, BridgeError> {
        let stashed = self.inner.lock().store.take_inbound()?;
        Ok(stashed.map(|address| {
            debug!("Resuming stashed inbound link");
            self.resolve_address(&address)
        }))
    }
}
