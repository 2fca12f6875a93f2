//! n8n MCP Server binary
//!
//! Run with: n8n-mcp [OPTIONS] [COMMAND]
//!
//! Starts an MCP server over stdio that exposes an n8n instance's REST API
//! as tools. Configure it with `N8N_URL` and `N8N_API_KEY` (or a config
//! file, see `--config`).
//!
//! ## Usage with Claude Desktop
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "n8n": {
//!       "command": "n8n-mcp",
//!       "env": {
//!         "N8N_URL": "https://n8n.example.com",
//!         "N8N_API_KEY": "..."
//!       }
//!     }
//!   }
//! }
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use n8n_mcp::config::Config;
use n8n_mcp::operations::N8nApi;
use n8n_mcp::shutdown::ShutdownCoordinator;
use n8n_mcp::N8nMcpServer;

#[derive(Parser)]
#[command(name = "n8n-mcp")]
#[command(about = "n8n MCP Server - Manage n8n workflows via Model Context Protocol")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/n8n-mcp/config.toml)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (writes to stderr)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdio (default)
    Serve,
    /// Print every webhook trigger as JSON
    Webhooks {
        /// Only scan active workflows
        #[arg(long)]
        active: bool,
    },
    /// Check that n8n is reachable with the configured API key
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is the MCP transport
    let filter = if cli.debug {
        "n8n_mcp=debug,rmcp=debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "n8n_mcp=info".into())
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => cmd_serve(&config).await,
        Commands::Webhooks { active } => cmd_webhooks(&config, active).await,
        Commands::Check => cmd_check(&config).await,
    }
}

async fn cmd_serve(config: &Config) -> anyhow::Result<()> {
    tracing::info!(url = %config.n8n.base_url(), "Starting n8n MCP server");

    let server = N8nMcpServer::new(config)?;
    let shutdown = ShutdownCoordinator::new();
    shutdown.start_signal_listener();
    server.run_stdio(shutdown).await?;

    Ok(())
}

async fn cmd_webhooks(config: &Config, active: bool) -> anyhow::Result<()> {
    let api = N8nApi::from_config(config)?;
    let webhooks = api.list_webhooks(active.then_some(true)).await?;
    println!("{}", serde_json::to_string_pretty(&webhooks)?);
    Ok(())
}

async fn cmd_check(config: &Config) -> anyhow::Result<()> {
    let api = N8nApi::from_config(config)?;
    match api.list_workflows(None, Some(1), None).await {
        Ok(_) => {
            println!("✓ Connected to {}", config.n8n.base_url());
            Ok(())
        }
        Err(e) => {
            println!("✗ {}", e.external_message());
            anyhow::bail!("n8n check failed ({})", e.code())
        }
    }
}
