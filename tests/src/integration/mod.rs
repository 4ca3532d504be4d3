//! # Integration Scenarios

pub mod flows;
pub mod restart_recovery;
pub mod runtime;
