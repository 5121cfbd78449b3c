//! The [`rmcp`] server handler.
//!
//! [`StripeMcpServer`] owns a [`Toolkit`] built in MCP mode. The permitted
//! tools are registered once at construction; `tools/list` returns them and
//! `tools/call` routes through [`Toolkit::run`]. Everything else in the
//! protocol (initialization, ping, notifications, framing, request
//! concurrency) is handled by `rmcp`.

use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, ErrorData, Implementation, JsonObject,
    ListToolsResult, PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
    Tool,
};
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler};
use serde_json::Value;
use stripe_agent_toolkit::api::PaymentApi;
use stripe_agent_toolkit::configuration::Mode;
use stripe_agent_toolkit::{Configuration, Toolkit, ToolkitError};

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::{SERVER_NAME, SERVER_VERSION};

/// An MCP server exposing the permitted Stripe tools.
#[derive(Debug, Clone)]
pub struct StripeMcpServer {
    toolkit: Toolkit,
    tools: Arc<[Tool]>,
}

impl StripeMcpServer {
    /// Creates a server calling Stripe with `secret_key`.
    ///
    /// The context mode is forced to [`Mode::ModelContextProtocol`].
    #[must_use]
    pub fn new(secret_key: impl Into<String>, mut configuration: Configuration) -> Self {
        configuration.context.mode = Some(Mode::ModelContextProtocol);
        Self::from_toolkit(Toolkit::new(secret_key, configuration))
    }

    /// Creates a server on top of an arbitrary [`PaymentApi`].
    #[must_use]
    pub fn with_api(api: Arc<dyn PaymentApi>, mut configuration: Configuration) -> Self {
        configuration.context.mode = Some(Mode::ModelContextProtocol);
        Self::from_toolkit(Toolkit::with_api(api, configuration))
    }

    fn from_toolkit(toolkit: Toolkit) -> Self {
        let tools = toolkit
            .tools()
            .iter()
            .map(|tool| {
                Tool::new(
                    tool.method.as_str(),
                    tool.description.clone(),
                    input_schema(tool.parameters.to_json_schema()),
                )
            })
            .collect();
        Self { toolkit, tools }
    }

    /// The registered tools, in catalog order.
    #[must_use]
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Runs one tool and wraps its JSON text output as a text content item.
    ///
    /// # Errors
    ///
    /// Returns an `invalid_params` error for unknown tools or invalid arguments.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "mcp.tools.call", skip_all, fields(tool = %params.name))
    )]
    pub async fn run_tool(&self, params: CallToolRequestParams) -> Result<CallToolResult, ErrorData> {
        let args = Value::Object(params.arguments.unwrap_or_default());
        let output = self
            .toolkit
            .run(&params.name, &args)
            .await
            .map_err(invalid_params)?;
        Ok(CallToolResult::success(vec![Content::text(output)]))
    }
}

impl ServerHandler for StripeMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_owned(),
                version: SERVER_VERSION.to_owned(),
                ..Default::default()
            },
            instructions: None,
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult::with_all_items(self.tools.to_vec())))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        self.run_tool(request)
    }
}

fn input_schema(schema: Value) -> Arc<JsonObject> {
    match schema {
        Value::Object(object) => Arc::new(object),
        _ => Arc::default(),
    }
}

fn invalid_params(err: ToolkitError) -> ErrorData {
    #[cfg(feature = "telemetry")]
    tracing::warn!(error = %err, "MCP tool call rejected");
    ErrorData::invalid_params(err.to_string(), None)
}
