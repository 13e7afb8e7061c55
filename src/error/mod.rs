//! Error handling module for specbridge
//!
//! This module provides the error type shared by the spec pipeline and the protocol layer.

mod error;

// Re-export the main error types and utilities
pub use error::{BridgeError, Result};
