//! # Deferred Reply Channel (launch side)
//!
//! Builds the outbound request for the configured signer and hands it over.
//! Persisting the pending record before `launch` is the correlator's job.

use std::sync::Arc;

use sb_01_link_codec::{store_listing_url, OutboundRequest};
use shared_types::{BridgeError, CallerIdentity, DelegatedRequest};
use tracing::{info, warn};

use crate::domain::errors::LaunchError;
use crate::ports::outbound::SignerLauncher;

/// Result of asking for the signer app itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// The signer came to the foreground.
    Opened,
    /// The signer is missing; its store listing was opened instead.
    SentToStore,
}

pub struct DeferredReplyChannel<L> {
    launcher: Arc<L>,
    target: String,
}

impl<L> Clone for DeferredReplyChannel<L> {
    fn clone(&self) -> Self {
        Self {
            launcher: Arc::clone(&self.launcher),
            target: self.target.clone(),
        }
    }
}

impl<L: SignerLauncher> DeferredReplyChannel<L> {
    pub fn new(launcher: L, target: impl Into<String>) -> Self {
        Self::from_shared(Arc::new(launcher), target)
    }

    pub fn from_shared(launcher: Arc<L>, target: impl Into<String>) -> Self {
        Self {
            launcher,
            target: target.into(),
        }
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn launcher(&self) -> &Arc<L> {
        &self.launcher
    }

    /// Outbound request for `request`, addressed to this channel's signer.
    #[must_use]
    pub fn prepare(&self, request: &DelegatedRequest, identity: &CallerIdentity) -> OutboundRequest {
        OutboundRequest::build(request, identity, &self.target)
    }

    /// Hand a prepared request to the signer.
    ///
    /// # Errors
    ///
    /// `BridgeError::Unreachable` if the signer could not be launched.
    pub fn launch(&self, outbound: &OutboundRequest) -> Result<(), BridgeError> {
        match self.launcher.launch(outbound) {
            Ok(()) => {
                info!(target_app = %outbound.target, kind = ?outbound.kind(), "Signer launched");
                Ok(())
            }
            Err(e) => {
                warn!(target_app = %outbound.target, error = %e, "Signer launch failed");
                Err(e.into())
            }
        }
    }

    /// Open the signer, or its store listing when it is not installed.
    ///
    /// # Errors
    ///
    /// `BridgeError::Unreachable` if neither could be opened.
    pub fn open_signer(&self) -> Result<OpenOutcome, BridgeError> {
        match self.launcher.open_app(&self.target) {
            Ok(()) => Ok(OpenOutcome::Opened),
            Err(LaunchError::NotInstalled { .. }) => {
                info!(target_app = %self.target, "Signer not installed, opening store listing");
                self.open_store()?;
                Ok(OpenOutcome::SentToStore)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Open the signer's store listing.
    pub fn open_store(&self) -> Result<(), BridgeError> {
        self.launcher
            .open_store_listing(&store_listing_url(&self.target))
            .map_err(BridgeError::from)
    }
}
