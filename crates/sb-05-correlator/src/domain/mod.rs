//! Correlator domain: state machine, inbound links, routing outcomes.

pub mod link;
pub mod outcome;
pub mod state;
