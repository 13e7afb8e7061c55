//! Configuration module for specbridge
//!
//! This module provides configuration management and loading utilities.

mod config;

// Re-export the main configuration types
pub use config::{Config, LoggingConfig, ServerConfig, UpstreamConfig};
