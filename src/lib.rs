//! specbridge - browse OpenAPI specifications from MCP clients
//!
//! Exposes two tools over the Model Context Protocol: a compact overview of every endpoint
//! in a specification, and the fully dereferenced definition of a single endpoint. Swagger
//! 2.0 documents are converted to OpenAPI 3.x on the way in.

pub mod config;
pub mod error;
pub mod mcp;
pub mod spec;
pub mod startup;
pub mod upstream;

pub use config::Config;
pub use error::{BridgeError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "specbridge.yaml";
