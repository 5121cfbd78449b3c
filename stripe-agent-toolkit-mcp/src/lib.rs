#![cfg_attr(docsrs, feature(doc_cfg))]

//! Model Context Protocol integration for the Stripe agent toolkit.
//!
//! [`StripeMcpServer`] is an [`rmcp::ServerHandler`] that registers every
//! permitted tool at construction. Serve it over any `rmcp` transport;
//! stdin/stdout in production.
//!
//! # Usage
//!
//! ```rust,no_run
//! use rmcp::ServiceExt;
//! use stripe_agent_toolkit::Configuration;
//! use stripe_agent_toolkit_mcp::StripeMcpServer;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let server = StripeMcpServer::new("sk_test_123", Configuration::default());
//! let service = server.serve(rmcp::transport::stdio()).await?;
//! service.waiting().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod server;

pub use server::StripeMcpServer;

/// Server name reported during `initialize`.
pub const SERVER_NAME: &str = "Stripe";

/// Server version reported during `initialize`.
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
