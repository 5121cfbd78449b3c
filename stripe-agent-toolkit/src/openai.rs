//! OpenAI function-calling adapter.
//!
//! Exposes the permitted tools as `{"type": "function", ...}` definitions
//! and turns the model's tool calls into `role: "tool"` messages.
//!
//! ```no_run
//! # async fn example(tool_calls: Vec<stripe_agent_toolkit::openai::ToolCall>) {
//! use stripe_agent_toolkit::configuration::Configuration;
//! use stripe_agent_toolkit::openai::OpenAiToolkit;
//!
//! let toolkit = OpenAiToolkit::new("sk_test_123", Configuration::default());
//! let definitions = toolkit.get_tools();
//! // ... send `definitions` with the chat completion request ...
//! let executed = toolkit.execute_tools(&tool_calls).await.unwrap();
//! # let _ = (definitions, executed);
//! # }
//! ```

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::configuration::Configuration;
use crate::error::ToolkitError;
use crate::toolkit::Toolkit;

/// A tool definition in the chat completions `tools` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionTool {
    /// Always `"function"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// The function definition.
    pub function: FunctionDefinition,
}

/// Name, description and JSON Schema of a callable function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Method name the model calls.
    pub name: String,
    /// Prompt text.
    pub description: String,
    /// JSON Schema of the arguments.
    pub parameters: Value,
}

/// A tool call emitted by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call identifier, echoed back in the tool message.
    pub id: String,
    /// Always `"function"`.
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    /// The function being called.
    pub function: FunctionCall,
}

/// The function part of a [`ToolCall`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Method name.
    pub name: String,
    /// Arguments as JSON text.
    pub arguments: String,
}

/// A `role: "tool"` message answering one [`ToolCall`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolMessage {
    /// Always `"tool"`.
    pub role: String,
    /// The answered call's identifier.
    pub tool_call_id: String,
    /// JSON text of the tool result.
    pub content: String,
}

/// Outcome of [`OpenAiToolkit::execute_tools`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutedTools {
    /// One message per executed call, in call order.
    pub tool_messages: Vec<ToolMessage>,
    /// Calls naming tools outside this toolset, untouched.
    pub remaining_tool_calls: Vec<ToolCall>,
}

fn function_kind() -> String {
    "function".to_owned()
}

/// Toolkit for OpenAI chat completions.
#[derive(Clone, Debug)]
pub struct OpenAiToolkit {
    toolkit: Toolkit,
    definitions: Vec<ChatCompletionTool>,
}

impl OpenAiToolkit {
    /// Creates a toolkit that calls Stripe with `secret_key`.
    #[must_use]
    pub fn new(secret_key: impl Into<String>, configuration: Configuration) -> Self {
        Self::from_toolkit(Toolkit::new(secret_key, configuration))
    }

    /// Wraps an existing [`Toolkit`].
    #[must_use]
    pub fn from_toolkit(toolkit: Toolkit) -> Self {
        let definitions = toolkit
            .tools()
            .iter()
            .map(|tool| ChatCompletionTool {
                kind: function_kind(),
                function: FunctionDefinition {
                    name: tool.method.as_str().to_owned(),
                    description: tool.description.clone(),
                    parameters: tool.parameters.to_json_schema(),
                },
            })
            .collect();
        Self {
            toolkit,
            definitions,
        }
    }

    /// Tool definitions to send with a chat completion request.
    #[must_use]
    pub fn get_tools(&self) -> &[ChatCompletionTool] {
        &self.definitions
    }

    /// Runs one tool call and returns its tool message.
    ///
    /// # Errors
    ///
    /// Returns [`ToolkitError`] if the arguments are not valid JSON, the
    /// method is not in this toolset, or the arguments do not match.
    pub async fn handle_tool_call(&self, tool_call: &ToolCall) -> Result<ToolMessage, ToolkitError> {
        let args = call_arguments(tool_call)?;
        let content = self.toolkit.run(&tool_call.function.name, &args).await?;
        Ok(tool_message(tool_call, content))
    }

    /// Runs every call that names a tool in this toolset, concurrently.
    ///
    /// Every executable call is validated before any of them is sent, so a
    /// malformed call leaves the API untouched. Calls for other tools are
    /// returned in `remaining_tool_calls` so the caller can route them
    /// elsewhere.
    ///
    /// # Errors
    ///
    /// Returns the first [`ToolkitError`] raised while validating an
    /// executable call.
    pub async fn execute_tools(&self, tool_calls: &[ToolCall]) -> Result<ExecutedTools, ToolkitError> {
        let dispatcher = self.toolkit.dispatcher();
        let (executable, remaining): (Vec<&ToolCall>, Vec<&ToolCall>) = tool_calls
            .iter()
            .partition(|call| dispatcher.contains(&call.function.name));

        let prepared = executable
            .into_iter()
            .map(|call| -> Result<_, ToolkitError> {
                let args = call_arguments(call)?;
                Ok((call, dispatcher.prepare(&call.function.name, &args)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let outputs = join_all(prepared.into_iter().map(|(call, prepared)| async move {
            prepared.invoke().await.map(|content| tool_message(call, content))
        }))
        .await;

        Ok(ExecutedTools {
            tool_messages: outputs.into_iter().collect::<Result<_, _>>()?,
            remaining_tool_calls: remaining.into_iter().cloned().collect(),
        })
    }
}

fn call_arguments(tool_call: &ToolCall) -> Result<Value, ToolkitError> {
    serde_json::from_str(&tool_call.function.arguments).map_err(|source| {
        ToolkitError::ArgumentsJson {
            tool: tool_call.function.name.clone(),
            source,
        }
    })
}

fn tool_message(tool_call: &ToolCall, content: String) -> ToolMessage {
    ToolMessage {
        role: "tool".to_owned(),
        tool_call_id: tool_call.id.clone(),
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::configuration::{Actions, Context, Permission, Resource};
    use serde_json::json;
    use std::sync::Arc;

    fn toolkit(api: Arc<MockApi>) -> OpenAiToolkit {
        let mut actions = Actions::new();
        actions
            .grant(Resource::Customers, Permission::Create)
            .grant(Resource::Balance, Permission::Read);
        OpenAiToolkit::from_toolkit(Toolkit::with_api(
            api,
            Configuration::new(actions, Context::default()),
        ))
    }

    fn call(id: &str, name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: id.to_owned(),
            kind: function_kind(),
            function: FunctionCall {
                name: name.to_owned(),
                arguments: arguments.to_owned(),
            },
        }
    }

    #[test]
    fn test_get_tools_shape() {
        let toolkit = toolkit(Arc::new(MockApi::new()));
        let tools = serde_json::to_value(toolkit.get_tools()).unwrap();

        assert_eq!(tools.as_array().unwrap().len(), 2);
        assert_eq!(tools[0]["type"], "function");
        assert_eq!(tools[0]["function"]["name"], "create_customer");
        assert_eq!(tools[0]["function"]["parameters"]["type"], "object");
        assert_eq!(tools[0]["function"]["parameters"]["required"], json!(["name"]));
        assert_eq!(tools[1]["function"]["name"], "retrieve_balance");
    }

    #[tokio::test]
    async fn test_handle_tool_call() {
        let api = Arc::new(MockApi::returning(json!({"id": "cus_1"})));
        let toolkit = toolkit(api);

        let message = toolkit
            .handle_tool_call(&call("call_1", "create_customer", r#"{"name":"Jane"}"#))
            .await
            .unwrap();

        assert_eq!(
            message,
            ToolMessage {
                role: "tool".to_owned(),
                tool_call_id: "call_1".to_owned(),
                content: r#"{"id":"cus_1"}"#.to_owned(),
            }
        );
    }

    #[tokio::test]
    async fn test_handle_tool_call_rejects_bad_json() {
        let toolkit = toolkit(Arc::new(MockApi::new()));
        let err = toolkit
            .handle_tool_call(&call("call_1", "create_customer", "{name"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolkitError::ArgumentsJson { .. }));
    }

    #[tokio::test]
    async fn test_execute_tools_splits_calls() {
        let api = Arc::new(MockApi::new());
        let toolkit = toolkit(api.clone());
        let calls = [
            call("call_1", "create_customer", r#"{"name":"Jane"}"#),
            call("call_2", "get_weather", r#"{"city":"Paris"}"#),
            call("call_3", "retrieve_balance", "{}"),
        ];

        let executed = toolkit.execute_tools(&calls).await.unwrap();

        let ids: Vec<&str> = executed
            .tool_messages
            .iter()
            .map(|m| m.tool_call_id.as_str())
            .collect();
        assert_eq!(ids, ["call_1", "call_3"]);
        assert_eq!(executed.remaining_tool_calls, [calls[1].clone()]);
        assert_eq!(api.request_count(), 2);
    }

    #[tokio::test]
    async fn test_execute_tools_validates_every_call_first() {
        let api = Arc::new(MockApi::new());
        let toolkit = toolkit(api.clone());

        let bad_json = [
            call("call_1", "retrieve_balance", "{}"),
            call("call_2", "create_customer", "{name"),
        ];
        let err = toolkit.execute_tools(&bad_json).await.unwrap_err();
        assert!(matches!(err, ToolkitError::ArgumentsJson { ref tool, .. } if tool == "create_customer"));

        let bad_arguments = [
            call("call_1", "retrieve_balance", "{}"),
            call("call_2", "create_customer", r#"{"email":"jane@example.com"}"#),
        ];
        let err = toolkit.execute_tools(&bad_arguments).await.unwrap_err();
        assert!(matches!(err, ToolkitError::InvalidArguments { .. }));

        assert_eq!(api.request_count(), 0);
    }

    #[tokio::test]
    async fn test_execute_tools_with_no_calls() {
        let toolkit = toolkit(Arc::new(MockApi::new()));
        assert_eq!(toolkit.execute_tools(&[]).await.unwrap(), ExecutedTools::default());
    }

    #[test]
    fn test_tool_call_deserializes_without_type() {
        let call: ToolCall = serde_json::from_value(json!({
            "id": "call_1",
            "function": {"name": "create_customer", "arguments": "{}"}
        }))
        .unwrap();
        assert_eq!(call.kind, "function");
    }
}
