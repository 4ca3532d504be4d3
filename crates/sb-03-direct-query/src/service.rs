//! # Direct Query Channel
//!
//! One blocking call per request, no persisted state, no retries.

use std::sync::Arc;

use sb_01_link_codec::query_endpoint;
use shared_types::{CallerIdentity, DelegatedRequest, DelegatedResponse};
use tracing::{debug, warn};

use crate::domain::projection::Projection;
use crate::domain::row::classify_outcome;
use crate::ports::inbound::DirectQueryApi;
use crate::ports::outbound::QueryEndpoint;

/// Direct transport to the signer addressed by `target`.
pub struct DirectQueryChannel<E> {
    endpoint: Arc<E>,
    target: String,
}

impl<E> Clone for DirectQueryChannel<E> {
    fn clone(&self) -> Self {
        Self {
            endpoint: Arc::clone(&self.endpoint),
            target: self.target.clone(),
        }
    }
}

impl<E: QueryEndpoint> DirectQueryChannel<E> {
    pub fn new(endpoint: E, target: impl Into<String>) -> Self {
        Self::from_shared(Arc::new(endpoint), target)
    }

    pub fn from_shared(endpoint: Arc<E>, target: impl Into<String>) -> Self {
        Self {
            endpoint,
            target: target.into(),
        }
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn endpoint(&self) -> &Arc<E> {
        &self.endpoint
    }
}

impl<E: QueryEndpoint + 'static> DirectQueryChannel<E> {
    /// Run the blocking query on the blocking thread pool.
    pub async fn query_async(
        &self,
        request: DelegatedRequest,
        identity: CallerIdentity,
    ) -> DelegatedResponse {
        let channel = self.clone();
        match tokio::task::spawn_blocking(move || channel.query(&request, &identity)).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Direct query task failed");
                DelegatedResponse::Failed(DelegatedResponse::NO_RESPONSE.to_string())
            }
        }
    }
}

impl<E: QueryEndpoint> DirectQueryApi for DirectQueryChannel<E> {
    fn query(&self, request: &DelegatedRequest, identity: &CallerIdentity) -> DelegatedResponse {
        let kind = request.kind();
        let endpoint = query_endpoint(&self.target, kind);
        let projection = Projection::for_request(request, identity);

        let outcome = self.endpoint.query(&endpoint, &projection);
        if let Err(e) = &outcome {
            warn!(%kind, endpoint = %endpoint, error = %e, "Direct query failed");
        }

        let response = classify_outcome(kind, outcome);
        debug!(%kind, response = %response, "Direct query classified");
        response
    }
}
