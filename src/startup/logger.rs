//! Startup logging

use crate::config::Config;
use std::path::Path;
use tracing::{info, warn};

/// Transport the process is about to serve
#[derive(Debug, Clone, PartialEq)]
pub enum TransportMode {
    Http { host: String, port: u16 },
    Stdio,
}

/// Startup logger for configuration and transport information
pub struct StartupLogger;

impl StartupLogger {
    /// Display startup information
    pub fn display_startup_info(config: &Config, config_path: &Path, version: &str, mode: &TransportMode) {
        info!("🚀 specbridge v{} starting...", version);
        info!("");

        Self::display_configuration(config, config_path);
        Self::display_upstreams(config);
        Self::display_transport(mode);

        info!("✅ specbridge ready");
    }

    fn display_configuration(config: &Config, config_path: &Path) {
        info!("📁 Configuration:");
        if config_path.exists() {
            info!("   Config file: {:?} ✅", config_path);
        } else {
            info!("   Config file: built-in defaults ({:?} not found)", config_path);
        }
        info!("   Log level: {} ({})", config.logging.level, config.logging.format);
        info!("");
    }

    fn display_upstreams(config: &Config) {
        let upstream = &config.upstream;
        info!("🔗 Upstream Services:");
        info!("   Discovery: {}", upstream.discovery_url);
        info!("   Catalog: {}", upstream.catalog_url);
        info!("   Swagger converter: {} (wait {}s)", upstream.converter_url, upstream.conversion_timeout_secs);
        info!("   Detail links: {}", upstream.detail_base_url);
        if upstream.request_timeout_secs > 120 {
            warn!("   ⚠️  Request timeout of {}s is unusually long", upstream.request_timeout_secs);
        } else {
            info!("   Request timeout: {}s", upstream.request_timeout_secs);
        }
        info!("");
    }

    fn display_transport(mode: &TransportMode) {
        info!("🌐 Transport:");
        match mode {
            TransportMode::Http { host, port } => {
                info!("   JSON-RPC: http://{}:{}/mcp", host, port);
                info!("   Overview: http://{}:{}/api/{{id}}/overview", host, port);
                info!("   Health: http://{}:{}/health", host, port);
            }
            TransportMode::Stdio => {
                info!("   stdio (one JSON-RPC message per line)");
            }
        }
        info!("");
    }
}

/// Display startup banner with version information
pub fn display_startup_banner(version: &str) {
    info!("");
    info!("╔══════════════════════════════════════════════════════════════╗");
    info!("║                      specbridge v{:<8}                    ║", version);
    info!("║           OpenAPI specifications for MCP clients             ║");
    info!("╚══════════════════════════════════════════════════════════════╝");
    info!("");
}
