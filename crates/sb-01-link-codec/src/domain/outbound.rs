//! # Outbound Addresses
//!
//! Builds everything the bridge sends *to* the signer:
//!
//! - the launch request for the deferred channel (`nostrsigner:<body>` plus extras)
//! - the per-operation query endpoint for the direct channel
//! - the store listing used when the signer is not installed

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shared_types::{CallerIdentity, DelegatedRequest, OperationKind, PARAM_PERMISSIONS, PARAM_PUBKEY};

/// Scheme of the signer's launch address.
pub const SIGNER_URI_SCHEME: &str = "nostrsigner";

/// Default signer application identifier.
pub const DEFAULT_SIGNER_TARGET: &str = "com.greenart7c3.nostrsigner";

/// Permissions requested with `get_public_key` when the caller names none.
pub const DEFAULT_PERMISSIONS: &str = r#"[{"type":"nip44_decrypt","kind":null},{"type":"nip44_encrypt","kind":null},{"type":"sign_event","kind":30078}]"#;

/// Extra names carried by a launch request.
pub mod extras {
    pub const TYPE: &str = "type";
    pub const PACKAGE: &str = "package";
    pub const APP_NAME: &str = "appName";
    pub const PERMISSIONS: &str = "permissions";
    pub const PUBKEY: &str = "pubkey";
}

/// A launch request for the deferred channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundRequest {
    /// Signer application the request is addressed to.
    pub target: String,
    /// Launch address, `nostrsigner:<body>`.
    pub address: String,
    /// Named string extras (`type`, `package`, `appName`, ...).
    pub extras: BTreeMap<String, String>,
}

impl OutboundRequest {
    /// Build the launch request for `request` on behalf of `identity`.
    #[must_use]
    pub fn build(request: &DelegatedRequest, identity: &CallerIdentity, target: &str) -> Self {
        let kind = request.kind();
        let mut extras = BTreeMap::new();
        extras.insert(extras::TYPE.to_string(), kind.as_str().to_string());
        extras.insert(extras::PACKAGE.to_string(), identity.app_id.clone());
        extras.insert(extras::APP_NAME.to_string(), identity.app_name.clone());

        match kind {
            OperationKind::GetPublicKey => {
                let permissions = request
                    .parameter(PARAM_PERMISSIONS)
                    .unwrap_or(DEFAULT_PERMISSIONS);
                extras.insert(extras::PERMISSIONS.to_string(), permissions.to_string());
            }
            OperationKind::SignEvent => {}
            OperationKind::Nip44Encrypt | OperationKind::Nip44Decrypt => {
                let pubkey = request.parameter(PARAM_PUBKEY).unwrap_or_default();
                extras.insert(extras::PUBKEY.to_string(), pubkey.to_string());
            }
        }

        Self {
            target: target.to_string(),
            address: format!("{SIGNER_URI_SCHEME}:{}", request.body()),
            extras,
        }
    }

    /// Operation kind named in the `type` extra.
    #[must_use]
    pub fn kind(&self) -> Option<OperationKind> {
        self.extras.get(extras::TYPE)?.parse().ok()
    }
}

/// Authority suffix of the query endpoint for `kind`.
#[must_use]
pub fn endpoint_suffix(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::GetPublicKey => "GET_PUBLIC_KEY",
        OperationKind::SignEvent => "SIGN_EVENT",
        OperationKind::Nip44Encrypt => "NIP44_ENCRYPT",
        OperationKind::Nip44Decrypt => "NIP44_DECRYPT",
    }
}

/// Direct query endpoint, `content://<target>.<KIND>`.
#[must_use]
pub fn query_endpoint(target: &str, kind: OperationKind) -> String {
    format!("content://{target}.{}", endpoint_suffix(kind))
}

/// Store listing for installing the signer.
#[must_use]
pub fn store_listing_url(target: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("id", target)
        .finish();
    format!("https://play.google.com/store/apps/details?{query}")
}
