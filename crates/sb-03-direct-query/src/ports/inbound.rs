use shared_types::{CallerIdentity, DelegatedRequest, DelegatedResponse};

/// Synchronous delegated operations.
pub trait DirectQueryApi: Send + Sync {
    /// Run `request` against the signer and block until it answers or fails.
    ///
    /// Never retried; every failure becomes a `DelegatedResponse`.
    fn query(&self, request: &DelegatedRequest, identity: &CallerIdentity) -> DelegatedResponse;
}
