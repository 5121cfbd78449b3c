//! Model-middleware adapter with usage billing.
//!
//! [`MiddlewareToolkit`] exposes tools as a name-keyed map and produces a
//! [`BillingMiddleware`] that reports token usage to Stripe billing meters
//! after each generation. Metering never fails a generation: errors are
//! logged and dropped.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::configuration::Configuration;
use crate::dispatch::ToolDispatcher;
use crate::error::ToolkitError;
use crate::structured::StructuredTool;
use crate::toolkit::Toolkit;

/// Token usage of one generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    /// Tokens in the prompt.
    pub prompt_tokens: u64,
    /// Tokens in the completion.
    pub completion_tokens: u64,
}

/// Meter event names. A missing meter is not billed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meters {
    /// Event name for prompt tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// Event name for completion tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Who to bill and on which meters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingConfig {
    /// Customer the usage is billed to.
    pub customer: String,
    /// Meter event names.
    #[serde(default)]
    pub meters: Meters,
}

/// Middleware options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Billing settings. `None` disables metering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing: Option<BillingConfig>,
}

/// A generation result that reports its token usage.
pub trait Metered {
    /// The generation's usage.
    fn usage(&self) -> Usage;
}

impl Metered for Usage {
    fn usage(&self) -> Usage {
        *self
    }
}

/// A streamed generation chunk. Only the finishing chunk carries usage.
pub trait StreamPart {
    /// Usage if this is the finishing chunk.
    fn finish_usage(&self) -> Option<Usage>;
}

/// Bills token usage around model calls.
#[derive(Clone, Debug)]
pub struct BillingMiddleware {
    dispatcher: Arc<ToolDispatcher>,
    config: MiddlewareConfig,
}

impl BillingMiddleware {
    /// Reports `usage`: prompt tokens on the input meter, then completion
    /// tokens on the output meter.
    ///
    /// # Errors
    ///
    /// Returns the first [`ToolkitError::MeterEvent`] encountered.
    pub async fn bill(&self, usage: Usage) -> Result<(), ToolkitError> {
        let Some(billing) = &self.config.billing else {
            return Ok(());
        };
        if let Some(input) = &billing.meters.input {
            self.dispatcher
                .create_meter_event(input, &billing.customer, &usage.prompt_tokens.to_string())
                .await?;
        }
        if let Some(output) = &billing.meters.output {
            self.dispatcher
                .create_meter_event(
                    output,
                    &billing.customer,
                    &usage.completion_tokens.to_string(),
                )
                .await?;
        }
        Ok(())
    }

    async fn bill_logged(&self, usage: Usage) {
        if let Err(err) = self.bill(usage).await {
            #[cfg(feature = "telemetry")]
            tracing::warn!(error = %err, "Failed to record usage");
            #[cfg(not(feature = "telemetry"))]
            let _ = err;
        }
    }

    /// Awaits `generate` and bills its usage if it succeeded.
    ///
    /// # Errors
    ///
    /// Returns the generation's own error unchanged.
    pub async fn wrap_generate<F, T, E>(&self, generate: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        T: Metered,
    {
        let result = generate.await?;
        if self.config.billing.is_some() {
            self.bill_logged(result.usage()).await;
        }
        Ok(result)
    }

    /// Passes `stream` through, billing when the finishing chunk arrives.
    pub fn wrap_stream<S>(&self, stream: S) -> impl Stream<Item = S::Item> + Send + use<S>
    where
        S: Stream + Send,
        S::Item: StreamPart + Send,
    {
        let middleware = self.clone();
        stream.then(move |part| {
            let middleware = middleware.clone();
            async move {
                if let Some(usage) = part.finish_usage() {
                    middleware.bill_logged(usage).await;
                }
                part
            }
        })
    }
}

/// Toolkit exposing tools keyed by method name, plus billing middleware.
#[derive(Clone, Debug)]
pub struct MiddlewareToolkit {
    toolkit: Toolkit,
    tools: BTreeMap<&'static str, StructuredTool>,
}

impl MiddlewareToolkit {
    /// Creates a toolkit that calls Stripe with `secret_key`.
    #[must_use]
    pub fn new(secret_key: impl Into<String>, configuration: Configuration) -> Self {
        Self::from_toolkit(Toolkit::new(secret_key, configuration))
    }

    /// Wraps an existing [`Toolkit`].
    #[must_use]
    pub fn from_toolkit(toolkit: Toolkit) -> Self {
        let tools = toolkit
            .tools()
            .iter()
            .map(|tool| {
                (
                    tool.method.as_str(),
                    StructuredTool::new(tool, Arc::clone(toolkit.dispatcher())),
                )
            })
            .collect();
        Self { toolkit, tools }
    }

    /// The tools keyed by method name.
    #[must_use]
    pub const fn get_tools(&self) -> &BTreeMap<&'static str, StructuredTool> {
        &self.tools
    }

    /// Creates billing middleware sharing this toolkit's dispatcher.
    #[must_use]
    pub fn middleware(&self, config: MiddlewareConfig) -> BillingMiddleware {
        BillingMiddleware {
            dispatcher: Arc::clone(self.toolkit.dispatcher()),
            config,
        }
    }
}
