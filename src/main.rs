use anyhow::Result;
use clap::Parser;
use specbridge::config::{Config, LoggingConfig};
use specbridge::mcp::{stdio, McpServer};
use specbridge::startup::{self, StartupLogger, TransportMode};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = specbridge::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the configuration file
    #[arg(short, long)]
    log_level: Option<String>,

    /// Server host
    #[arg(long)]
    host: Option<String>,

    /// Server port
    #[arg(long)]
    port: Option<u16>,

    /// Serve MCP over stdin/stdout instead of HTTP
    #[arg(long)]
    stdio: bool,

    /// Write diagnostics to stderr in stdio mode
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config, cli.host, cli.port)?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
        config.logging.validate()?;
    }

    // stdout carries the protocol in stdio mode; stay silent unless asked
    if !cli.stdio || cli.debug {
        init_logging(&config.logging)?;
    }

    startup::display_startup_banner(env!("CARGO_PKG_VERSION"));

    let mode = if cli.stdio {
        TransportMode::Stdio
    } else {
        TransportMode::Http {
            host: config.server.host.clone(),
            port: config.server.port,
        }
    };
    StartupLogger::display_startup_info(&config, &cli.config, env!("CARGO_PKG_VERSION"), &mode);

    let server = McpServer::with_config(&config).map_err(|e| {
        error!("Failed to initialize MCP server: {}", e);
        e
    })?;

    match mode {
        TransportMode::Stdio => stdio::run_stdio(&server).await?,
        TransportMode::Http { .. } => server.start(&config.server).await?,
    }

    info!("specbridge stopped");
    Ok(())
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.to_lowercase()));

    let registry = tracing_subscriber::registry().with(env_filter);

    // Logs go to stderr so stdio mode keeps stdout for JSON-RPC
    if logging.format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    Ok(())
}
