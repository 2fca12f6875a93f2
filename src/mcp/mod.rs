//! n8n MCP Server
//!
//! Exposes an n8n instance via Model Context Protocol (MCP), so AI agents
//! (Claude Desktop, IDE assistants, etc.) can manage workflows directly.
//!
//! ## Capabilities
//!
//! - **Workflows**: list, get, create, update, delete, activate, execute
//! - **Executions**: list, get, delete
//! - **Credentials / tags**: list
//! - **Webhooks**: discover triggers and their URLs, run a test execution
//!
//! ## Example
//!
//! ```rust,ignore
//! use n8n_mcp::{config::Config, mcp::N8nMcpServer, shutdown::ShutdownCoordinator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let server = N8nMcpServer::new(&Config::load())?;
//!     server.run_stdio(ShutdownCoordinator::new()).await?;
//!     Ok(())
//! }
//! ```

mod server;
mod tools;

pub use server::N8nMcpServer;
pub use tools::N8nService;
