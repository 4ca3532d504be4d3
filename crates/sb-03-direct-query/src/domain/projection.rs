use serde::{Deserialize, Serialize};
use shared_types::{CallerIdentity, DelegatedRequest, OperationKind};

use super::row::LOGIN_PAYLOAD;

/// The three values handed to a query endpoint: `[payload, pubkey, caller]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub payload: String,
    /// Peer public key for NIP-44 operations, empty otherwise.
    pub pubkey: String,
    /// Caller identity the signer applies its permission policy to.
    pub caller: String,
}

impl Projection {
    #[must_use]
    pub fn for_request(request: &DelegatedRequest, identity: &CallerIdentity) -> Self {
        let payload = match request.kind() {
            OperationKind::GetPublicKey => LOGIN_PAYLOAD,
            _ => request.body(),
        };
        Self {
            payload: payload.to_string(),
            pubkey: request.peer_pubkey().to_string(),
            caller: identity.query_identity().to_string(),
        }
    }

    #[must_use]
    pub fn as_array(&self) -> [&str; 3] {
        [&self.payload, &self.pubkey, &self.caller]
    }
}
