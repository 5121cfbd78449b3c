//! Routes tool invocations by method name.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value, json};

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::api::{ApiMethod, ApiRequest, PaymentApi, RequestOptions};
use crate::configuration::Context;
use crate::error::ToolkitError;
use crate::tools::Tool;

/// Path of the billing meter events endpoint.
const METER_EVENTS_PATH: &str = "/v1/billing/meter_events";

/// Looks up a tool by method name, validates its arguments, and runs it.
///
/// The method table is built once and never mutated, so a dispatcher can be
/// shared across tasks behind an [`Arc`].
pub struct ToolDispatcher {
    api: Arc<dyn PaymentApi>,
    context: Context,
    tools: HashMap<&'static str, Tool>,
}

impl fmt::Debug for ToolDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDispatcher")
            .field("context", &self.context)
            .field("tools", &self.tools.keys())
            .finish_non_exhaustive()
    }
}

impl ToolDispatcher {
    /// Creates a dispatcher that accepts exactly the given tools.
    #[must_use]
    pub fn new(api: Arc<dyn PaymentApi>, context: Context, tools: &[Tool]) -> Self {
        let tools = tools
            .iter()
            .map(|tool| (tool.method.as_str(), tool.clone()))
            .collect();
        Self {
            api,
            context,
            tools,
        }
    }

    /// The context every call runs with.
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// Returns the tool registered under `method`, if any.
    #[must_use]
    pub fn tool(&self, method: &str) -> Option<&Tool> {
        self.tools.get(method)
    }

    /// Returns `true` if `method` can be dispatched.
    #[must_use]
    pub fn contains(&self, method: &str) -> bool {
        self.tools.contains_key(method)
    }

    /// Runs `method` with `args` and returns the result as JSON text.
    ///
    /// Operation failures are not errors here: the fixed failure message is
    /// returned as a JSON string (e.g. `"\"Failed to create customer\""`).
    ///
    /// # Errors
    ///
    /// Returns [`ToolkitError::InvalidMethod`] if `method` is not in this
    /// toolset and [`ToolkitError::InvalidArguments`] if `args` do not
    /// match the tool's parameters.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "stripe.toolkit.run", skip(self, args), err)
    )]
    pub async fn run(&self, method: &str, args: &Value) -> Result<String, ToolkitError> {
        self.prepare(method, args)?.invoke().await
    }

    /// Resolves `method` and validates `args` without calling the API.
    ///
    /// # Errors
    ///
    /// Same as [`ToolDispatcher::run`].
    pub fn prepare(&self, method: &str, args: &Value) -> Result<PreparedCall<'_>, ToolkitError> {
        let tool = self
            .tools
            .get(method)
            .ok_or_else(|| ToolkitError::InvalidMethod(method.to_owned()))?;
        let params = tool
            .parameters
            .parse(args)
            .map_err(|source| ToolkitError::InvalidArguments {
                tool: method.to_owned(),
                source,
            })?;
        Ok(PreparedCall {
            dispatcher: self,
            tool,
            params,
        })
    }

    /// Records a billing meter event for `customer` on behalf of the context account.
    ///
    /// # Errors
    ///
    /// Returns [`ToolkitError::MeterEvent`] if the API call fails.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "stripe.toolkit.meter_event", skip(self), err)
    )]
    pub async fn create_meter_event(
        &self,
        event: &str,
        customer: &str,
        value: &str,
    ) -> Result<(), ToolkitError> {
        let mut params = Map::new();
        params.insert("event_name".to_owned(), json!(event));
        params.insert(
            "payload".to_owned(),
            json!({ "stripe_customer_id": customer, "value": value }),
        );
        let request = ApiRequest::new(
            ApiMethod::Create,
            METER_EVENTS_PATH,
            RequestOptions::on_behalf_of(self.context.account.as_deref()),
        )
        .with_params(params);
        self.api
            .request(request)
            .await
            .map_err(ToolkitError::MeterEvent)?;
        Ok(())
    }
}

/// A tool call whose arguments passed validation but has not been sent.
#[derive(Debug)]
pub struct PreparedCall<'a> {
    dispatcher: &'a ToolDispatcher,
    tool: &'a Tool,
    params: Map<String, Value>,
}

impl PreparedCall<'_> {
    /// The tool this call runs.
    #[must_use]
    pub const fn tool(&self) -> &Tool {
        self.tool
    }

    /// Calls the API and returns the result or the failure message as JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ToolkitError::Serialization`] only if the output cannot be serialized.
    pub async fn invoke(self) -> Result<String, ToolkitError> {
        let dispatcher = self.dispatcher;
        let output = match self
            .tool
            .method
            .invoke(&*dispatcher.api, &dispatcher.context, self.params)
            .await
        {
            Ok(value) => serde_json::to_string(&value)?,
            Err(err) => serde_json::to_string(err.message())?,
        };
        Ok(output)
    }
}
