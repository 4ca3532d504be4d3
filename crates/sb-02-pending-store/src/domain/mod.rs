//! Domain layer: store errors and the fixed key layout.

pub mod errors;
pub mod keys;
