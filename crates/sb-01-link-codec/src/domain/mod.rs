//! Domain layer for the link codec.

pub mod address;
pub mod errors;
pub mod extras;
pub mod outbound;
pub mod reply;
