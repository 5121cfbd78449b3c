//! Launcher for the Stripe MCP server.
//!
//! Exposed as a library so the argument and configuration-file handling can
//! be tested without spawning the binary.
//!
//! - [`cli`] - Command-line flags, validation, and the resulting [`cli::Settings`]
//! - [`config`] - Optional TOML file with `$VAR` expansion

pub mod cli;
pub mod config;
