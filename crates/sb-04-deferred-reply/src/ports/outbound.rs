use sb_01_link_codec::OutboundRequest;

use crate::domain::errors::LaunchError;

/// Starts the external signer application.
///
/// Implementations return once the signer has been handed the request; they
/// never wait for its answer.
pub trait SignerLauncher: Send + Sync {
    /// Hand `request` to the signer.
    fn launch(&self, request: &OutboundRequest) -> Result<(), LaunchError>;

    /// Bring the signer to the foreground without a request.
    fn open_app(&self, target: &str) -> Result<(), LaunchError>;

    /// Open the store listing at `url`.
    fn open_store_listing(&self, url: &str) -> Result<(), LaunchError>;
}

impl<L: SignerLauncher + ?Sized> SignerLauncher for std::sync::Arc<L> {
    fn launch(&self, request: &OutboundRequest) -> Result<(), LaunchError> {
        (**self).launch(request)
    }

    fn open_app(&self, target: &str) -> Result<(), LaunchError> {
        (**self).open_app(target)
    }

    fn open_store_listing(&self, url: &str) -> Result<(), LaunchError> {
        (**self).open_store_listing(url)
    }
}
