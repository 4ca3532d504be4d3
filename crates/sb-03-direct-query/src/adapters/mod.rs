//! Query endpoint adapters.

pub mod command;
pub mod memory;

pub use command::CommandQueryEndpoint;
pub use memory::InMemoryQueryEndpoint;
