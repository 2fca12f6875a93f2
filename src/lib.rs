//! n8n-mcp - Model Context Protocol server for n8n
//!
//! Lets AI agents manage an n8n instance through its public REST API:
//! workflows, executions, credentials, tags and webhook triggers.
//!
//! ## Key Features
//!
//! - **Resilient requests**: transient failures (connection errors, 429,
//!   5xx) are retried with capped exponential backoff, honouring
//!   `Retry-After`
//! - **Lenient validation**: responses are coerced into typed shapes when
//!   they fit and passed through untouched when they don't
//! - **Sanitized errors**: agents get a stable code and a fixed message,
//!   never a raw upstream body
//! - **Webhook discovery**: every webhook trigger with its production and
//!   test URLs
//!
//! ## Layout
//!
//! - [`client`]: classifier, retry policy, executor, HTTP transport
//! - [`models`]: entity shapes and the response validator
//! - [`webhook`]: webhook node scanner
//! - [`operations`]: one method per n8n operation
//! - [`mcp`]: the rmcp tool surface

pub mod client;
pub mod config;
pub mod error;
pub mod mcp;
pub mod metrics;
pub mod models;
pub mod operations;
pub mod shutdown;
pub mod webhook;

pub use error::{Error, Result};
pub use mcp::N8nMcpServer;
