//! MCP server: JSON-RPC dispatch and the HTTP transport

use crate::config::{Config, ServerConfig};
use crate::error::{BridgeError, Result};
use crate::mcp::errors::{McpError, McpErrorCode};
use crate::mcp::types::{McpRequest, McpResponse, Tool, ToolCall, ToolResult};
use crate::spec::SpecPipeline;
use crate::upstream::{build_http_client, CapabilityCatalog, HttpCapabilityCatalog};
use actix_web::{http::StatusCode, middleware::Logger, web, App, HttpResponse, HttpServer};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Protocol version announced when the client does not request one
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

pub const OVERVIEW_TOOL: &str = "getApiOverview";
pub const OPERATION_TOOL: &str = "getApiOperation";

/// MCP server exposing the spec pipeline as two tools
pub struct McpServer {
    pipeline: Arc<SpecPipeline>,
    catalog: Arc<dyn CapabilityCatalog>,
    tools: Vec<Tool>,
}

impl McpServer {
    pub fn new(pipeline: Arc<SpecPipeline>, catalog: Arc<dyn CapabilityCatalog>) -> Result<Self> {
        Ok(Self {
            pipeline,
            catalog,
            tools: builtin_tools()?,
        })
    }

    /// Build the server and its HTTP collaborators from configuration
    pub fn with_config(config: &Config) -> Result<Self> {
        let pipeline = SpecPipeline::from_config(&config.upstream)?;
        let client = build_http_client(Duration::from_secs(config.upstream.request_timeout_secs))?;
        let catalog = HttpCapabilityCatalog::new(client, &config.upstream.catalog_url);

        Self::new(Arc::new(pipeline), Arc::new(catalog))
    }

    pub fn pipeline(&self) -> &Arc<SpecPipeline> {
        &self.pipeline
    }

    /// Tool definitions with the live catalog appended to each description
    pub async fn list_tools(&self) -> Vec<Tool> {
        let suffix = match self.catalog.catalog_text().await {
            Ok(text) => text,
            Err(e) => {
                warn!("Capability catalog unavailable, listing tools without it: {}", e);
                String::new()
            }
        };

        self.tools
            .iter()
            .map(|tool| tool.with_description_suffix(&suffix))
            .collect()
    }

    /// Run one tool call; every failure becomes an `isError` result
    pub async fn call_tool(&self, call: ToolCall) -> ToolResult {
        let Some(tool) = self.tools.iter().find(|tool| tool.name == call.name) else {
            let available: Vec<&str> = self.tools.iter().map(|tool| tool.name.as_str()).collect();
            return ToolResult::error(format!(
                "Unknown tool '{}'. Available tools: {}",
                call.name,
                available.join(", ")
            ));
        };

        if let Err(e) = tool.validate_arguments(&call.arguments) {
            return ToolResult::error(e.to_string());
        }

        let id = call.string_argument("id").unwrap_or_default();
        let result = match call.name.as_str() {
            OVERVIEW_TOOL => self.pipeline.api_overview(id).await,
            OPERATION_TOOL => {
                let token = call.string_argument("operationIdOrRoute").unwrap_or_default();
                self.pipeline.api_operation(id, token).await
            }
            other => Err(BridgeError::mcp(format!("Tool '{}' has no handler", other))),
        };

        match &result {
            Err(e) if e.is_domain_error() => info!("Tool {} failed ({}): {}", call.name, e.category(), e),
            Err(e) => warn!("Tool {} failed ({}): {}", call.name, e.category(), e),
            Ok(_) => {}
        }
        ToolResult::from(result)
    }

    /// Handle one raw JSON-RPC message. `None` means nothing is sent back.
    pub async fn handle_message(&self, raw: &str) -> Option<String> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                debug!("Rejecting unparsable message: {}", e);
                return serialize(McpResponse::error(
                    None,
                    McpError::parse_error(format!("{}: {}", McpErrorCode::ParseError.default_message(), e)),
                ));
            }
        };

        let id = value.get("id").cloned().filter(|id| !id.is_null());
        match serde_json::from_value::<McpRequest>(value) {
            Ok(request) => self.handle_mcp_request(request).await.and_then(serialize),
            Err(e) => serialize(McpResponse::error(
                id,
                McpError::invalid_request(format!("{}: {}", McpErrorCode::InvalidRequest.default_message(), e)),
            )),
        }
    }

    /// Dispatch a decoded request
    pub async fn handle_mcp_request(&self, request: McpRequest) -> Option<McpResponse> {
        debug!("Handling MCP method: {}", request.method);

        if request.is_notification() {
            // Notifications are never answered, known or not
            debug!("Received notification {}", request.method);
            return None;
        }

        let id = request.id.clone();
        let params = request.params.unwrap_or_else(|| json!({}));

        let response = match request.method.as_str() {
            "ping" => McpResponse::success(id, json!({})),
            "initialize" => {
                let protocol_version = params
                    .get("protocolVersion")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_PROTOCOL_VERSION);
                McpResponse::success(
                    id,
                    json!({
                        "protocolVersion": protocol_version,
                        "capabilities": {"tools": {}},
                        "serverInfo": {
                            "name": env!("CARGO_PKG_NAME"),
                            "version": env!("CARGO_PKG_VERSION")
                        }
                    }),
                )
            }
            "initialized" | "notifications/initialized" => return None,
            "prompts/list" => McpResponse::success(id, json!({"prompts": []})),
            "resources/list" => McpResponse::success(id, json!({"resources": []})),
            "resources/read" => {
                let uri = params.get("uri").and_then(Value::as_str).unwrap_or_default();
                McpResponse::error(id, McpError::resource_not_found(uri))
            }
            "tools/list" => McpResponse::success(id, json!({"tools": self.list_tools().await})),
            "tools/call" => match serde_json::from_value::<ToolCall>(params) {
                Ok(call) => match serde_json::to_value(self.call_tool(call).await) {
                    Ok(result) => McpResponse::success(id, result),
                    Err(e) => McpResponse::error(id, BridgeError::from(e).into()),
                },
                Err(e) => McpResponse::error(
                    id,
                    McpError::invalid_params(format!("Invalid tool call parameters: {}", e)),
                ),
            },
            method => McpResponse::error(id, McpError::method_not_found(method)),
        };

        Some(response)
    }

    /// Serve MCP over HTTP until the server is stopped
    pub async fn start(self, config: &ServerConfig) -> Result<()> {
        info!("Starting MCP server on {}:{}", config.host, config.port);

        let server_data = web::Data::new(Arc::new(self));
        HttpServer::new(move || {
            App::new()
                .app_data(server_data.clone())
                .wrap(Logger::default())
                .configure(configure_routes)
        })
        .client_request_timeout(Duration::from_secs(config.timeout))
        .bind((config.host.as_str(), config.port))?
        .run()
        .await?;

        Ok(())
    }
}

/// Register every HTTP route; shared by [`McpServer::start`] and the tests
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/mcp", web::post().to(mcp_jsonrpc_handler))
        .route("/api/{id}/overview", web::get().to(overview_handler))
        .route("/api/{id}/operations/{token:.*}", web::get().to(operation_handler));
}

fn builtin_tools() -> Result<Vec<Tool>> {
    Ok(vec![
        Tool::new(
            OVERVIEW_TOOL,
            "Get an overview of an OpenAPI specification: one line per endpoint with its \
             operationId, method, URL, query parameters and summary.",
            json!({
                "type": "object",
                "properties": {
                    "id": {
                        "type": "string",
                        "description": "API identifier from the list below, or a direct URL to an OpenAPI/Swagger document"
                    }
                },
                "required": ["id"]
            }),
        )?,
        Tool::new(
            OPERATION_TOOL,
            "Get the complete, dereferenced specification of a single endpoint as YAML.",
            json!({
                "type": "object",
                "properties": {
                    "id": {
                        "type": "string",
                        "description": "API identifier from the list below, or a direct URL to an OpenAPI/Swagger document"
                    },
                    "operationIdOrRoute": {
                        "type": "string",
                        "description": "operationId, the route of a GET endpoint such as /pets/{petId}, or METHOD /route such as DELETE /pets/{petId}"
                    }
                },
                "required": ["id", "operationIdOrRoute"]
            }),
        )?,
    ])
}

fn serialize(response: McpResponse) -> Option<String> {
    match serde_json::to_string(&response) {
        Ok(text) => Some(text),
        Err(e) => {
            error!("Failed to serialize JSON-RPC response: {}", e);
            None
        }
    }
}

/// HTTP status for a pipeline failure on the plain-text routes
pub fn status_for(error: &BridgeError) -> StatusCode {
    match error {
        BridgeError::NotFound { .. } => StatusCode::NOT_FOUND,
        BridgeError::Validation { .. } => StatusCode::BAD_REQUEST,
        BridgeError::Parse { .. } | BridgeError::Conversion { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        BridgeError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        BridgeError::Upstream { .. } | BridgeError::Http(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn text_response(result: Result<String>) -> HttpResponse {
    match result {
        Ok(text) => HttpResponse::Ok().content_type("text/plain; charset=utf-8").body(text),
        Err(e) => HttpResponse::build(status_for(&e))
            .content_type("text/plain; charset=utf-8")
            .body(e.to_string()),
    }
}

/// Path segments may arrive with `/` still percent-encoded when the id is a URL
fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// Health check endpoint
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// MCP JSON-RPC 2.0 endpoint. The body is taken raw so malformed JSON still gets -32700.
pub async fn mcp_jsonrpc_handler(body: String, mcp_server: web::Data<Arc<McpServer>>) -> HttpResponse {
    match mcp_server.handle_message(&body).await {
        Some(response) => HttpResponse::Ok().content_type("application/json").body(response),
        None => HttpResponse::Accepted().finish(),
    }
}

/// `GET /api/{id}/overview`
pub async fn overview_handler(path: web::Path<String>, mcp_server: web::Data<Arc<McpServer>>) -> HttpResponse {
    let id = decode_segment(&path.into_inner());
    text_response(mcp_server.pipeline().api_overview(&id).await)
}

/// `GET /api/{id}/operations/{token}`
pub async fn operation_handler(
    path: web::Path<(String, String)>,
    mcp_server: web::Data<Arc<McpServer>>,
) -> HttpResponse {
    let (id, token) = path.into_inner();
    let id = decode_segment(&id);
    let token = decode_segment(&token);
    text_response(mcp_server.pipeline().api_operation(&id, &token).await)
}
