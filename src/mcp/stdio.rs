//! Line-delimited JSON-RPC over stdin/stdout

use crate::error::Result;
use crate::mcp::errors::{McpError, McpErrorCode};
use crate::mcp::server::McpServer;
use crate::mcp::types::McpResponse;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Serve until the reader reaches EOF. One message per line in, one response per line out.
pub async fn serve<R, W>(server: &McpServer, mut reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            info!("stdin closed, shutting down stdio mode");
            break;
        }

        let response = match std::str::from_utf8(&line) {
            Ok(text) if text.trim().is_empty() => continue,
            Ok(text) => server.handle_message(text.trim()).await,
            Err(e) => {
                warn!("Rejecting stdin line that is not UTF-8: {}", e);
                serde_json::to_string(&McpResponse::error(
                    None,
                    McpError::parse_error(format!("{}: {}", McpErrorCode::ParseError.default_message(), e)),
                ))
                .ok()
            }
        };

        if let Some(response) = response {
            writer.write_all(response.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
            debug!("Sent response ({} bytes)", response.len());
        }
    }

    Ok(())
}

/// [`serve`] on the process's own stdin and stdout
pub async fn run_stdio(server: &McpServer) -> Result<()> {
    info!("stdio mode ready - waiting for JSON-RPC messages");
    let reader = tokio::io::BufReader::new(tokio::io::stdin());
    serve(server, reader, tokio::io::stdout()).await
}
