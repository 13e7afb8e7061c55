//! MCP types and structures
//!
//! Only the subset of the protocol this server speaks: tool definitions, tool calls and
//! results, and the JSON-RPC envelope.

use crate::error::{BridgeError, Result};
use crate::mcp::errors::McpError;
use jsonschema::JSONSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// MCP Tool definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    /// Tool name (unique identifier)
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON Schema for input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl Tool {
    /// Create a new Tool with validation
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Result<Self> {
        let tool = Tool {
            name: name.into(),
            description: description.into(),
            input_schema,
        };

        tool.validate()?;
        Ok(tool)
    }

    /// Validate the tool definition
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(BridgeError::validation("Tool name cannot be empty"));
        }
        if self.description.trim().is_empty() {
            return Err(BridgeError::validation("Tool description cannot be empty"));
        }

        JSONSchema::compile(&self.input_schema).map_err(|e| {
            BridgeError::validation(format!("Invalid JSON Schema for tool '{}': {}", self.name, e))
        })?;

        Ok(())
    }

    /// Same tool with extra text appended to its description
    pub fn with_description_suffix(&self, suffix: &str) -> Self {
        let mut tool = self.clone();
        if !suffix.trim().is_empty() {
            tool.description = format!("{}\n\n{}", self.description, suffix.trim());
        }
        tool
    }

    /// Validate arguments against the input schema
    pub fn validate_arguments(&self, arguments: &Value) -> Result<()> {
        let schema = JSONSchema::compile(&self.input_schema).map_err(|e| {
            BridgeError::validation(format!("Failed to compile schema for tool '{}': {}", self.name, e))
        })?;

        let result = schema.validate(arguments);
        match result {
            Ok(()) => Ok(()),
            Err(errors) => {
                let error_messages: Vec<String> = errors.map(|e| format!("  - {}", e)).collect();
                Err(BridgeError::validation(format!(
                    "Invalid arguments for tool '{}':\n{}",
                    self.name,
                    error_messages.join("\n")
                )))
            }
        }
    }
}

/// Tool call request (`tools/call` params)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// String argument, `None` when absent or not a string
    pub fn string_argument(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(Value::as_str)
    }
}

/// Content item of a tool result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Tool call result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolResult {
    /// Successful result carrying one text item
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::text(text)],
            is_error: false,
        }
    }

    /// Failed result; the message is the whole text so the model sees remediation data verbatim
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::text(message)],
            is_error: true,
        }
    }
}

impl From<Result<String>> for ToolResult {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(text) => ToolResult::text(text),
            Err(e) => ToolResult::error(e.to_string()),
        }
    }
}

/// MCP Request message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRequest {
    /// JSON-RPC version (always "2.0")
    #[serde(default)]
    pub jsonrpc: String,
    /// Request ID; absent for notifications
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl McpRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// MCP Response message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    /// Echoes the request id; `null` when the request could not be read
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

impl McpResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, error: McpError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: None,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lookup_tool() -> Tool {
        Tool::new(
            "lookup",
            "Look something up",
            json!({
                "type": "object",
                "properties": {"id": {"type": "string"}},
                "required": ["id"]
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_tool_rejects_empty_name() {
        assert!(Tool::new(" ", "desc", json!({"type": "object"})).is_err());
    }

    #[test]
    fn test_tool_serializes_input_schema_camel_case() {
        let value = serde_json::to_value(lookup_tool()).unwrap();
        assert_eq!(value["inputSchema"]["required"], json!(["id"]));
    }

    #[test]
    fn test_validate_arguments() {
        let tool = lookup_tool();
        assert!(tool.validate_arguments(&json!({"id": "stripe"})).is_ok());

        let error = tool.validate_arguments(&json!({"id": 7})).unwrap_err();
        assert!(error.to_string().contains("Invalid arguments for tool 'lookup'"));
        assert!(tool.validate_arguments(&json!({})).is_err());
    }

    #[test]
    fn test_description_suffix() {
        let tool = lookup_tool().with_description_suffix("  known: a, b \n");
        assert_eq!(tool.description, "Look something up\n\nknown: a, b");
        assert_eq!(lookup_tool().with_description_suffix("").description, "Look something up");
    }

    #[test]
    fn test_tool_result_shape() {
        let value = serde_json::to_value(ToolResult::error("nope")).unwrap();
        assert_eq!(value, json!({"content": [{"type": "text", "text": "nope"}], "isError": true}));
    }

    #[test]
    fn test_response_omits_missing_members() {
        let value = serde_json::to_value(McpResponse::success(Some(json!(3)), json!({}))).unwrap();
        assert_eq!(value, json!({"jsonrpc": "2.0", "id": 3, "result": {}}));

        let value = serde_json::to_value(McpResponse::error(None, McpError::parse_error("bad"))).unwrap();
        assert_eq!(value["id"], Value::Null);
        assert_eq!(value["error"]["code"], -32700);
    }
}
