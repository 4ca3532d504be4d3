//! # Signer Bridge Test Suite
//!
//! Cross-crate scenarios that no single crate can exercise alone.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs             # Request → reply through the full bridge
//!     ├── restart_recovery.rs  # Process recreation against a file-backed store
//!     └── runtime.rs           # signer-runtime commands with real adapters
//!
//! tests/benches/
//! └── bridge_benchmarks.rs     # Link decoding, correlator round trips
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sb-tests
//! cargo test -p sb-tests integration::restart_recovery
//! cargo bench -p sb-tests
//! ```

pub mod integration;
