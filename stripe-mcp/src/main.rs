//! Stripe MCP server over stdio.
//!
//! # Usage
//!
//! ```bash
//! # Enable every tool
//! stripe-mcp --tools=all --api-key=sk_test_...
//!
//! # Enable a subset on behalf of a connected account
//! stripe-mcp --tools=customers.create,customers.read --stripe-account=acct_...
//!
//! # Read settings from a file
//! STRIPE_MCP_CONFIG=/path/to/stripe-mcp.toml stripe-mcp
//! ```
//!
//! # Environment Variables
//!
//! - `STRIPE_SECRET_KEY` - Secret key when `--api-key` is not given
//! - `STRIPE_MCP_CONFIG` - Path to a TOML configuration file
//! - `RUST_LOG` - Log level filter (default: `info`)
//!
//! Logs go to stderr; stdout carries the protocol.

use clap::Parser;
use rmcp::ServiceExt;
use stripe_agent_toolkit_mcp::StripeMcpServer;
use tracing_subscriber::EnvFilter;

use stripe_mcp::cli::Cli;

#[tokio::main]
#[allow(clippy::print_stderr)] // the startup failure banner goes to stderr, not the log
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!("Stripe MCP server failed: {e}");
        eprintln!("\nError initializing Stripe MCP server:\n\n   {e}\n");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = cli.into_settings()?;
    let server = StripeMcpServer::new(settings.api_key, settings.configuration);
    let tools = server.tools().len();
    let service = server.serve(rmcp::transport::stdio()).await?;
    tracing::info!(tools, "Stripe MCP Server running on stdio");

    tokio::select! {
        result = service.waiting() => {
            let reason = result?;
            tracing::debug!(?reason, "MCP session ended");
        }
        () = shutdown_signal() => {}
    }

    tracing::info!("Stripe MCP server shut down");
    Ok(())
}

/// Waits for Ctrl-C or SIGTERM (Unix).
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down..."),
            _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down..."),
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.expect("failed to listen for Ctrl-C");
        tracing::info!("Received Ctrl-C, shutting down...");
    }
}
