//! # Completion Handles
//!
//! One-shot delivery slot for a single deferred request.
//!
//! The correlator keeps the `CompletionSlot` (sending side); the caller that
//! issued the request keeps the `CompletionHandle` (receiving side). A slot
//! fires at most once. Fulfilling it again is a no-op and never surfaces a
//! duplicate-delivery error to the caller that already got its result.

use shared_types::{DelegatedResponse, OperationKind};
use tokio::sync::oneshot;
use tracing::debug;

/// Result of a fulfil attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FulfillOutcome {
    /// The response was handed to the waiting caller.
    Delivered,
    /// The slot already fired; the response was discarded.
    AlreadyFulfilled,
    /// The caller dropped its handle; the response is returned untouched.
    ReceiverGone(DelegatedResponse),
}

/// Create a connected slot/handle pair for a request of `kind`.
#[must_use]
pub fn completion_pair(kind: OperationKind) -> (CompletionSlot, CompletionHandle) {
    let (sender, receiver) = oneshot::channel();
    (
        CompletionSlot {
            kind,
            sender: Some(sender),
        },
        CompletionHandle { kind, receiver },
    )
}

/// Sending side of a completion handle.
#[derive(Debug)]
pub struct CompletionSlot {
    kind: OperationKind,
    sender: Option<oneshot::Sender<DelegatedResponse>>,
}

impl CompletionSlot {
    /// Kind of the request this slot answers.
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Whether the slot has already fired.
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        self.sender.is_none()
    }

    /// Whether the caller still holds its handle.
    #[must_use]
    pub fn has_receiver(&self) -> bool {
        self.sender.as_ref().is_some_and(|s| !s.is_closed())
    }

    /// Fire the slot with `response`.
    pub fn fulfill(&mut self, response: DelegatedResponse) -> FulfillOutcome {
        let Some(sender) = self.sender.take() else {
            debug!(kind = %self.kind, "Completion slot already fulfilled, ignoring");
            return FulfillOutcome::AlreadyFulfilled;
        };

        match sender.send(response) {
            Ok(()) => FulfillOutcome::Delivered,
            Err(response) => {
                debug!(kind = %self.kind, "Completion handle dropped before delivery");
                FulfillOutcome::ReceiverGone(response)
            }
        }
    }
}

/// Receiving side, owned by the caller that issued the request.
#[derive(Debug)]
pub struct CompletionHandle {
    kind: OperationKind,
    receiver: oneshot::Receiver<DelegatedResponse>,
}

impl CompletionHandle {
    /// Kind of the request this handle waits on.
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Wait for the response.
    ///
    /// A slot dropped without firing (its owner went away) reads as `Cancelled`.
    pub async fn wait(self) -> DelegatedResponse {
        self.receiver.await.unwrap_or(DelegatedResponse::Cancelled)
    }

    /// Blocking variant of [`wait`](Self::wait) for synchronous callers.
    ///
    /// Must not be called from inside an async runtime.
    #[must_use]
    pub fn blocking_wait(self) -> DelegatedResponse {
        self.receiver
            .blocking_recv()
            .unwrap_or(DelegatedResponse::Cancelled)
    }

    /// Take the response if it has already arrived.
    ///
    /// Returns `None` while the request is still outstanding.
    pub fn try_take(&mut self) -> Option<DelegatedResponse> {
        match self.receiver.try_recv() {
            Ok(response) => Some(response),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(DelegatedResponse::Cancelled),
        }
    }
}
