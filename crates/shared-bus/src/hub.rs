//! # Delivery Hub
//!
//! Single abstraction over the two delivery paths of a deferred reply:
//!
//! ```text
//!   response ──→ try_fulfill_waiter ──ok──→ [CompletionHandle]
//!                       │
//!                  no waiter / gone
//!                       ↓
//!              buffer_if_unattended ──→ [Subscription]  or  [buffer]
//! ```
//!
//! The path is chosen here, never by the caller.

use shared_types::DelegatedResponse;
use tracing::debug;

use crate::broadcast::{Broadcast, BroadcastOutcome, Subscription};
use crate::completion::{CompletionSlot, FulfillOutcome};

/// Where a response was routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPath {
    /// Fulfilled the one-shot completion handle.
    Waiter,
    /// Sent to the attached broadcast subscriber.
    Subscriber,
    /// Held in the broadcast buffer for the next subscriber.
    Buffered,
}

/// Owns the completion slot and the broadcast for one correlator.
#[derive(Debug, Default)]
pub struct DeliveryHub {
    waiter: Option<CompletionSlot>,
    broadcast: Broadcast,
}

impl DeliveryHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a waiter, returning the one it replaced.
    pub fn set_waiter(&mut self, slot: CompletionSlot) -> Option<CompletionSlot> {
        self.waiter.replace(slot)
    }

    /// Remove the current waiter without fulfilling it.
    pub fn take_waiter(&mut self) -> Option<CompletionSlot> {
        self.waiter.take()
    }

    /// Whether an unfulfilled waiter is installed.
    #[must_use]
    pub fn has_waiter(&self) -> bool {
        self.waiter.as_ref().is_some_and(|w| !w.is_fulfilled())
    }

    /// Hand `response` to the waiter if one is installed and still listening.
    ///
    /// The waiter is consumed either way. On failure the response comes back
    /// so the caller can fall through to the broadcast.
    pub fn try_fulfill_waiter(
        &mut self,
        response: DelegatedResponse,
    ) -> Result<(), DelegatedResponse> {
        let Some(mut slot) = self.waiter.take() else {
            return Err(response);
        };

        match slot.fulfill(response.clone()) {
            FulfillOutcome::Delivered => Ok(()),
            FulfillOutcome::AlreadyFulfilled => Err(response),
            FulfillOutcome::ReceiverGone(response) => Err(response),
        }
    }

    /// Publish to the subscriber, buffering when nobody is attached.
    pub fn buffer_if_unattended(&mut self, response: DelegatedResponse) -> DeliveryPath {
        match self.broadcast.publish(response) {
            BroadcastOutcome::Delivered => DeliveryPath::Subscriber,
            BroadcastOutcome::Buffered => DeliveryPath::Buffered,
        }
    }

    /// Route `response` to exactly one consumer.
    pub fn deliver(&mut self, response: DelegatedResponse) -> DeliveryPath {
        match self.try_fulfill_waiter(response) {
            Ok(()) => {
                debug!("Response routed to completion handle");
                DeliveryPath::Waiter
            }
            Err(response) => self.buffer_if_unattended(response),
        }
    }

    /// Attach a broadcast subscriber (flushes any buffered response).
    pub fn attach(&mut self) -> Subscription {
        self.broadcast.attach()
    }

    /// Detach the broadcast subscriber.
    pub fn detach(&mut self) {
        self.broadcast.detach();
    }

    #[must_use]
    pub fn has_subscriber(&self) -> bool {
        self.broadcast.has_subscriber()
    }

    #[must_use]
    pub fn buffered(&self) -> Option<&DelegatedResponse> {
        self.broadcast.buffered()
    }
}
