//! n8n MCP Server implementation.
//!
//! This module provides the main MCP server that exposes the n8n tools.

use rmcp::transport::stdio;
use rmcp::ServiceExt;
use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::operations::N8nApi;
use crate::shutdown::ShutdownCoordinator;

use super::tools::N8nService;

/// n8n MCP Server
///
/// Exposes an n8n instance via Model Context Protocol over stdio.
pub struct N8nMcpServer {
    service: N8nService,
}

impl N8nMcpServer {
    /// Create a server for the instance described by `config`.
    ///
    /// Fails if the configuration is unusable (for example, no API key).
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::from_api(N8nApi::from_config(config)?))
    }

    /// Create a server around an existing client.
    pub fn from_api(api: N8nApi) -> Self {
        Self {
            service: N8nService::new(api),
        }
    }

    /// Run the MCP server with stdio transport until the client disconnects
    /// or shutdown is requested.
    pub async fn run_stdio(self, shutdown: ShutdownCoordinator) -> Result<()> {
        info!("Starting n8n MCP server (stdio transport)");

        let service = self
            .service
            .serve(stdio())
            .await
            .map_err(|e| Error::Internal(format!("MCP server error: {}", e)))?;

        tokio::select! {
            quit_reason = service.waiting() => {
                let quit_reason = quit_reason
                    .map_err(|e| Error::Internal(format!("MCP server error: {}", e)))?;
                info!("n8n MCP server stopped: {:?}", quit_reason);
            }
            _ = shutdown.wait_for_shutdown() => {
                info!("n8n MCP server stopping on shutdown request");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_requires_api_key() {
        let config = Config::default();
        assert!(N8nMcpServer::new(&config).is_err());
    }

    #[test]
    fn test_server_creation() {
        let mut config = Config::default();
        config.n8n.api_key = "test-key".to_string();
        assert!(N8nMcpServer::new(&config).is_ok());
    }
}
