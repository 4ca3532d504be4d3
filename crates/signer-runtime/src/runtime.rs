//! # Runtime Wiring
//!
//! Builds a [`SignerBridge`] from [`RuntimeConfig`]: file-backed pending
//! store, command adapters where programs are configured, and inert
//! stand-ins where they are not.

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use sb_02_pending_store::FileBackedKVStore;
use sb_03_direct_query::{CommandQueryEndpoint, DirectQueryChannel, InMemoryQueryEndpoint, QueryEndpoint};
use sb_04_deferred_reply::{CommandLauncher, DeferredReplyChannel, RecordingLauncher, SignerLauncher};
use sb_05_correlator::{Correlator, SignerBridge};
use tracing::{info, warn};

use crate::config::RuntimeConfig;

pub type RuntimeLauncher = Arc<dyn SignerLauncher>;
pub type RuntimeEndpoint = Arc<dyn QueryEndpoint>;
pub type RuntimeBridge = SignerBridge<FileBackedKVStore, RuntimeLauncher, RuntimeEndpoint>;

/// Open the bridge described by `config`.
///
/// Any request left pending by a previous process is recovered.
pub fn open_bridge(config: &RuntimeConfig) -> Result<RuntimeBridge> {
    fs::create_dir_all(&config.storage.data_dir).with_context(|| {
        format!(
            "Failed to create data directory {}",
            config.storage.data_dir.display()
        )
    })?;

    let store_path = config.storage.store_path();
    let store = FileBackedKVStore::open(&store_path)
        .with_context(|| format!("Failed to open pending store {}", store_path.display()))?;

    let target = config.signer.target.as_str();
    let channel = DeferredReplyChannel::new(build_launcher(config), target);
    let correlator = Correlator::new(store, channel, config.signer.reply_scheme.as_str());
    let direct = DirectQueryChannel::new(build_endpoint(config), target);

    info!(
        target_app = %target,
        store = %store_path.display(),
        recovered = correlator.pending().is_some(),
        "Signer bridge ready"
    );
    Ok(SignerBridge::new(
        correlator,
        direct,
        config.identity.caller_identity(),
    ))
}

fn build_launcher(config: &RuntimeConfig) -> RuntimeLauncher {
    match &config.signer.opener {
        Some(program) => {
            Arc::new(CommandLauncher::new(program).with_args(config.signer.opener_args.iter().cloned()))
        }
        None => {
            warn!("No signer opener configured; launches are recorded but not delivered");
            Arc::new(RecordingLauncher::new())
        }
    }
}

fn build_endpoint(config: &RuntimeConfig) -> RuntimeEndpoint {
    match &config.signer.query_program {
        Some(program) => Arc::new(
            CommandQueryEndpoint::new(program).with_args(config.signer.query_args.iter().cloned()),
        ),
        None => Arc::new(InMemoryQueryEndpoint::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sb_05_correlator::{Dispatch, InboundLink, ResolveOutcome};
    use shared_bus::DeliveryPath;
    use shared_types::{DelegatedRequest, DelegatedResponse, OperationKind, Transport};

    fn config(dir: &std::path::Path) -> RuntimeConfig {
        let mut config = RuntimeConfig::default();
        config.storage.data_dir = dir.join("nested");
        config
    }

    #[tokio::test]
    async fn test_pending_request_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());

        {
            let bridge = open_bridge(&config).unwrap();
            let dispatch = bridge
                .dispatch(DelegatedRequest::sign_event("{}", Transport::Deferred))
                .await
                .unwrap();
            assert!(matches!(dispatch, Dispatch::Awaiting(_)));
        }

        let bridge = open_bridge(&config).unwrap();
        let pending = bridge.pending().unwrap();
        assert_eq!(pending.kind, OperationKind::SignEvent);
        assert!(!pending.handle_attached);

        let outcome = bridge.handle_link(&mut InboundLink::new("signerbridge://result?event=signed"));
        assert_eq!(outcome.path(), Some(DeliveryPath::Buffered));
        assert_eq!(
            bridge.subscribe().try_recv(),
            Some(DelegatedResponse::Success("signed".into()))
        );
        assert!(bridge.pending().is_none());
        assert_eq!(
            bridge.handle_link(&mut InboundLink::new("signerbridge://result?event=signed")),
            ResolveOutcome::DuplicateSuppressed
        );
    }

    #[tokio::test]
    async fn test_unconfigured_query_program_fails_direct_requests() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = open_bridge(&config(dir.path())).unwrap();

        let response = bridge
            .dispatch(DelegatedRequest::get_public_key(Transport::Direct))
            .await
            .unwrap()
            .into_response()
            .await;
        assert_eq!(response, DelegatedResponse::Failed("no response".into()));
    }
}
