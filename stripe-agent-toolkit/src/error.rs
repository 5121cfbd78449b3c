//! Error types for the toolkit.
//!
//! Two layers exist. [`OperationError`] is an expected outcome of calling
//! the payment API: it carries a fixed, user-safe message that is handed
//! back to the model as the tool result. [`ToolkitError`] is a programming
//! or integration error that the embedding framework should surface.

use crate::client::ApiError;
use crate::schema::SchemaError;

/// A failed payment API call, collapsed to a fixed message.
///
/// The display text is always the message (e.g. `"Failed to create customer"`).
/// The underlying [`ApiError`] is kept as the source for diagnostics and is
/// never shown to the model.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct OperationError {
    message: &'static str,
    #[source]
    source: ApiError,
}

impl OperationError {
    /// Wraps an API error under a fixed failure message.
    #[must_use]
    pub const fn new(message: &'static str, source: ApiError) -> Self {
        Self { message, source }
    }

    /// The fixed failure message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        self.message
    }

    /// The API error that caused the failure.
    #[must_use]
    pub const fn api_error(&self) -> &ApiError {
        &self.source
    }
}

/// Errors surfaced to the embedding framework rather than the model.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ToolkitError {
    /// The requested method is not in this toolkit's toolset.
    #[error("Invalid method {0}")]
    InvalidMethod(String),
    /// The tool arguments do not match the tool's parameter shape.
    #[error("Invalid arguments for {tool}: {source}")]
    InvalidArguments {
        /// Tool method name.
        tool: String,
        /// The validation failure.
        #[source]
        source: SchemaError,
    },
    /// Tool call arguments were not valid JSON text.
    #[error("Failed to parse arguments for {tool}: {source}")]
    ArgumentsJson {
        /// Tool method name.
        tool: String,
        /// The parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// A tool result could not be serialized.
    #[error("Failed to serialize result: {0}")]
    Serialization(#[from] serde_json::Error),
    /// A usage meter event could not be recorded.
    #[error("Failed to create meter event: {0}")]
    MeterEvent(#[source] ApiError),
}
