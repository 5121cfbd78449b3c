#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Stripe tools for LLM agent frameworks.
//!
//! This crate turns a fixed catalog of Stripe operations into tools an LLM
//! can call. A [`configuration::Configuration`] decides which tools are
//! exposed and which implicit context (connected account, customer) every
//! call carries.
//!
//! # Overview
//!
//! Each tool pairs a prompt, a parameter shape, and an operation that makes
//! exactly one payment API call. Tools are filtered by permission once, at
//! construction time, and dispatched by method name. Operation failures come
//! back to the model as fixed `"Failed to ..."` strings; unknown methods and
//! malformed arguments are surfaced to the host as [`error::ToolkitError`].
//!
//! # Modules
//!
//! - [`configuration`] - Permissions, context, and the permission filter
//! - [`schema`] - Parameter shapes, JSON Schema rendering, argument validation
//! - [`operations`] - One module per Stripe resource
//! - [`tools`] - The tool catalog
//! - [`dispatch`] - Method-name dispatch and meter events
//! - [`api`] / [`client`] - The payment API seam and its HTTP implementation
//! - [`openai`], [`structured`], [`middleware`] - Framework adapters
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod api;
pub mod client;
pub mod configuration;
pub mod dispatch;
pub mod encoding;
pub mod error;
pub mod middleware;
pub mod openai;
pub mod operations;
pub mod schema;
pub mod structured;
pub mod toolkit;
pub mod tools;

pub use configuration::{Configuration, Context};
pub use error::{OperationError, ToolkitError};
pub use toolkit::Toolkit;
