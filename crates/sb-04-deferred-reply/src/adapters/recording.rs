use parking_lot::Mutex;
use sb_01_link_codec::OutboundRequest;

use crate::domain::errors::LaunchError;
use crate::ports::outbound::SignerLauncher;

/// Something a `RecordingLauncher` was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchEvent {
    Launched(OutboundRequest),
    OpenedApp(String),
    OpenedStore(String),
}

#[derive(Debug)]
struct State {
    installed: bool,
    fail_next: Option<String>,
    events: Vec<LaunchEvent>,
}

/// Launcher that records every call. For tests and dry runs.
#[derive(Debug)]
pub struct RecordingLauncher {
    state: Mutex<State>,
}

impl Default for RecordingLauncher {
    fn default() -> Self {
        Self {
            state: Mutex::new(State {
                installed: true,
                fail_next: None,
                events: Vec::new(),
            }),
        }
    }
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the signer being (un)installed.
    pub fn set_installed(&self, installed: bool) {
        self.state.lock().installed = installed;
    }

    /// Make the next launch or open fail with `reason`.
    pub fn fail_next(&self, reason: impl Into<String>) {
        self.state.lock().fail_next = Some(reason.into());
    }

    pub fn events(&self) -> Vec<LaunchEvent> {
        self.state.lock().events.clone()
    }

    /// Requests handed to the signer, oldest first.
    pub fn launched(&self) -> Vec<OutboundRequest> {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|event| match event {
                LaunchEvent::Launched(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, target: &str, event: LaunchEvent) -> Result<(), LaunchError> {
        let mut state = self.state.lock();
        if let Some(reason) = state.fail_next.take() {
            return Err(LaunchError::Failed { reason });
        }
        if !state.installed && !matches!(event, LaunchEvent::OpenedStore(_)) {
            return Err(LaunchError::NotInstalled {
                target: target.to_string(),
            });
        }
        state.events.push(event);
        Ok(())
    }
}

impl SignerLauncher for RecordingLauncher {
    fn launch(&self, request: &OutboundRequest) -> Result<(), LaunchError> {
        self.record(&request.target, LaunchEvent::Launched(request.clone()))
    }

    fn open_app(&self, target: &str) -> Result<(), LaunchError> {
        self.record(target, LaunchEvent::OpenedApp(target.to_string()))
    }

    fn open_store_listing(&self, url: &str) -> Result<(), LaunchError> {
        self.record(url, LaunchEvent::OpenedStore(url.to_string()))
    }
}
