//! JSON-RPC 2.0 error objects for the MCP transports

use crate::error::BridgeError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Error codes used in JSON-RPC error responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McpErrorCode {
    // Standard JSON-RPC error codes
    ParseError = -32700,
    InvalidRequest = -32600,
    MethodNotFound = -32601,
    InvalidParams = -32602,
    InternalError = -32603,

    // MCP resource errors
    ResourceNotFound = -32002,
}

impl McpErrorCode {
    /// Get the error code as i32
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Get a default message for this error code
    pub fn default_message(&self) -> &'static str {
        match self {
            McpErrorCode::ParseError => "Parse error",
            McpErrorCode::InvalidRequest => "Invalid request",
            McpErrorCode::MethodNotFound => "Method not found",
            McpErrorCode::InvalidParams => "Invalid params",
            McpErrorCode::InternalError => "Internal error",
            McpErrorCode::ResourceNotFound => "Resource not found",
        }
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl McpError {
    pub fn new(code: McpErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(code: McpErrorCode, message: impl Into<String>, data: Value) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(McpErrorCode::ParseError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(McpErrorCode::InvalidRequest, message)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::with_data(
            McpErrorCode::MethodNotFound,
            format!("Method '{}' not found", method),
            json!({ "method": method }),
        )
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(McpErrorCode::InvalidParams, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(McpErrorCode::InternalError, message)
    }

    pub fn resource_not_found(uri: &str) -> Self {
        Self::with_data(
            McpErrorCode::ResourceNotFound,
            format!("Resource '{}' not found", uri),
            json!({ "uri": uri }),
        )
    }
}

/// Envelope-level conversion; tool failures never go through here
impl From<BridgeError> for McpError {
    fn from(error: BridgeError) -> Self {
        let category = error.category();
        match error {
            BridgeError::Validation { message } => McpError::invalid_params(message),
            BridgeError::Serde(e) => McpError::with_data(
                McpErrorCode::InvalidParams,
                format!("Serialization error: {}", e),
                json!({ "category": category }),
            ),
            other => McpError {
                data: Some(json!({ "category": category })),
                ..McpError::internal_error(other.to_string())
            },
        }
    }
}
