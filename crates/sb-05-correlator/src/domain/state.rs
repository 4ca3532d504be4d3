//! # Correlator State Machine
//!
//! ```text
//!            begin                      resolve
//!   Idle ───────────→ AwaitingReply ───────────→ Idle
//!                      │      ↑
//!                      └──────┘ begin (supersedes)
//! ```

use shared_types::{OperationKind, PendingRecord};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CorrelatorState {
    /// No pending record.
    #[default]
    Idle,
    /// A deferred request is outstanding.
    AwaitingReply {
        record: PendingRecord,
        /// False after a restart: the original caller's handle died with the
        /// previous process, so the reply goes to the broadcast.
        handle_attached: bool,
    },
}

impl CorrelatorState {
    #[must_use]
    pub fn awaiting(record: PendingRecord, handle_attached: bool) -> Self {
        CorrelatorState::AwaitingReply {
            record,
            handle_attached,
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, CorrelatorState::Idle)
    }

    /// Kind of the outstanding request.
    #[must_use]
    pub fn kind(&self) -> Option<OperationKind> {
        match self {
            CorrelatorState::Idle => None,
            CorrelatorState::AwaitingReply { record, .. } => Some(record.kind),
        }
    }

    #[must_use]
    pub fn record(&self) -> Option<&PendingRecord> {
        match self {
            CorrelatorState::Idle => None,
            CorrelatorState::AwaitingReply { record, .. } => Some(record),
        }
    }

    #[must_use]
    pub fn handle_attached(&self) -> bool {
        matches!(
            self,
            CorrelatorState::AwaitingReply {
                handle_attached: true,
                ..
            }
        )
    }
}
