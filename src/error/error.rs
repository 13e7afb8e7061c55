//! Error types and handling for specbridge

use thiserror::Error;

/// Result type alias for specbridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Main error type for specbridge
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Identifier resolves to no specification, or token matches no operation
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Raw spec text is neither JSON nor YAML
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Swagger 2.0 conversion did not yield a usable OpenAPI 3.x document
    #[error("Conversion error: {message}")]
    Conversion { message: String },

    /// Generated overview exceeds the size ceiling
    #[error("Overview too large: {length} characters exceeds the limit of {limit}")]
    TooLarge { length: usize, limit: usize },

    /// An upstream service answered with a non-success status
    #[error("Upstream error: {url} returned status {status}")]
    Upstream { url: String, status: u16 },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// MCP protocol errors
    #[error("MCP protocol error: {message}")]
    Mcp { message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// YAML errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl BridgeError {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a conversion error
    pub fn conversion<S: Into<String>>(message: S) -> Self {
        Self::Conversion {
            message: message.into(),
        }
    }

    /// Create a too-large error
    pub fn too_large(length: usize, limit: usize) -> Self {
        Self::TooLarge { length, limit }
    }

    /// Create an upstream error
    pub fn upstream<S: Into<String>>(url: S, status: u16) -> Self {
        Self::Upstream {
            url: url.into(),
            status,
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an MCP protocol error
    pub fn mcp<S: Into<String>>(message: S) -> Self {
        Self::Mcp {
            message: message.into(),
        }
    }

    /// Whether this error came from the spec-resolution domain rather than plumbing
    pub fn is_domain_error(&self) -> bool {
        matches!(
            self,
            BridgeError::NotFound { .. }
                | BridgeError::Parse { .. }
                | BridgeError::Conversion { .. }
                | BridgeError::TooLarge { .. }
                | BridgeError::Upstream { .. }
        )
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            BridgeError::NotFound { .. } => "not_found",
            BridgeError::Parse { .. } => "parse",
            BridgeError::Conversion { .. } => "conversion",
            BridgeError::TooLarge { .. } => "too_large",
            BridgeError::Upstream { .. } => "upstream",
            BridgeError::Config { .. } => "config",
            BridgeError::Validation { .. } => "validation",
            BridgeError::Mcp { .. } => "mcp",
            BridgeError::Io(_) => "io",
            BridgeError::Serde(_) => "serialization",
            BridgeError::Yaml(_) => "yaml",
            BridgeError::Http(_) => "http",
        }
    }
}
