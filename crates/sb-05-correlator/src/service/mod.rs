mod bridge;
mod correlator;

pub use bridge::SignerBridge;
pub use correlator::Correlator;
