//! Rankcast Common Utilities
//!
//! Shared infrastructure for all rankcast crates:
//! - Error types and result aliases
//! - Clock and restart backoff utilities for the stream supervisor
//! - Cooperative shutdown signal
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod shutdown;

pub use clock::*;
pub use config::*;
pub use error::*;
pub use shutdown::Shutdown;
