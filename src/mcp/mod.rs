//! MCP (Model Context Protocol) implementation
//!
//! JSON-RPC dispatch shared by the HTTP and stdio transports.

pub mod errors;
pub mod server;
pub mod stdio;
pub mod types;

pub use errors::{McpError, McpErrorCode};
pub use server::{configure_routes, McpServer, OPERATION_TOOL, OVERVIEW_TOOL};
pub use types::*;
