//! # Buffered Broadcast
//!
//! Subscribable delivery channel used when no one-shot handle is available.
//!
//! ## Invariants
//!
//! - At most one active subscriber at a time; attaching replaces the previous one.
//! - At most one buffered, undelivered response.
//! - A buffered response is handed to the next subscriber on attach and then
//!   cleared, so it is never delivered twice.

use shared_types::DelegatedResponse;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Where a published response ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastOutcome {
    /// Sent to the attached subscriber.
    Delivered,
    /// No live subscriber; held until the next attach.
    Buffered,
}

/// Single-subscriber broadcast with a one-item buffer.
#[derive(Debug, Default)]
pub struct Broadcast {
    subscriber: Option<mpsc::UnboundedSender<DelegatedResponse>>,
    buffered: Option<DelegatedResponse>,
}

impl Broadcast {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a subscriber, flushing any buffered response to it first.
    ///
    /// Replaces (and thereby closes) any previously attached subscriber.
    pub fn attach(&mut self) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();

        if let Some(response) = self.buffered.take() {
            info!(response = %response, "Flushing buffered response to new subscriber");
            // The receiver is alive in this scope, so the send cannot fail.
            let _ = sender.send(response);
        }

        if self.subscriber.replace(sender).is_some() {
            debug!("Previous subscriber replaced");
        }

        Subscription { receiver }
    }

    /// Clear the current subscriber. The buffered value, if any, is untouched.
    pub fn detach(&mut self) {
        if self.subscriber.take().is_some() {
            debug!("Subscriber detached");
        }
    }

    /// Whether a live subscriber is attached.
    #[must_use]
    pub fn has_subscriber(&self) -> bool {
        self.subscriber.as_ref().is_some_and(|s| !s.is_closed())
    }

    /// The buffered response awaiting a subscriber, if any.
    #[must_use]
    pub fn buffered(&self) -> Option<&DelegatedResponse> {
        self.buffered.as_ref()
    }

    /// Deliver to the live subscriber, or buffer when nobody is listening.
    ///
    /// A newer buffered response overwrites an older one.
    pub fn publish(&mut self, response: DelegatedResponse) -> BroadcastOutcome {
        let response = match &self.subscriber {
            Some(sender) => match sender.send(response) {
                Ok(()) => {
                    debug!("Response delivered to subscriber");
                    return BroadcastOutcome::Delivered;
                }
                Err(mpsc::error::SendError(response)) => {
                    debug!("Subscriber gone, falling back to buffer");
                    self.subscriber = None;
                    response
                }
            },
            None => response,
        };

        if let Some(previous) = self.buffered.replace(response) {
            debug!(previous = %previous, "Buffered response overwritten");
        }
        BroadcastOutcome::Buffered
    }
}

/// Receiving side of a broadcast attachment.
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<DelegatedResponse>,
}

impl Subscription {
    /// Receive the next response.
    ///
    /// Returns `None` once the subscription was detached or replaced and all
    /// already-sent responses have been drained.
    pub async fn recv(&mut self) -> Option<DelegatedResponse> {
        self.receiver.recv().await
    }

    /// Receive without waiting.
    pub fn try_recv(&mut self) -> Option<DelegatedResponse> {
        self.receiver.try_recv().ok()
    }
}
