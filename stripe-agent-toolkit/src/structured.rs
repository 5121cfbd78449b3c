//! Structured-tool adapter.
//!
//! Each permitted tool becomes a [`StructuredTool`]: a named, described,
//! schema-validated callable that agent frameworks in the LangChain style
//! can register directly.

use std::sync::Arc;

use serde_json::Value;

use crate::configuration::Configuration;
use crate::dispatch::ToolDispatcher;
use crate::error::ToolkitError;
use crate::schema::ParameterShape;
use crate::tools::Tool;
use crate::toolkit::Toolkit;

/// One callable tool.
#[derive(Clone, Debug)]
pub struct StructuredTool {
    name: &'static str,
    description: String,
    schema: ParameterShape,
    dispatcher: Arc<ToolDispatcher>,
}

impl StructuredTool {
    pub(crate) fn new(tool: &Tool, dispatcher: Arc<ToolDispatcher>) -> Self {
        Self {
            name: tool.method.as_str(),
            description: tool.description.clone(),
            schema: tool.parameters.clone(),
            dispatcher,
        }
    }

    /// The method name, used as the tool name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Prompt text.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Argument shape.
    #[must_use]
    pub const fn schema(&self) -> &ParameterShape {
        &self.schema
    }

    /// Argument shape as JSON Schema.
    #[must_use]
    pub fn json_schema(&self) -> Value {
        self.schema.to_json_schema()
    }

    /// Validates `args` and runs the tool, returning JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ToolkitError::InvalidArguments`] if `args` do not match the schema.
    pub async fn call(&self, args: &Value) -> Result<String, ToolkitError> {
        let parsed = self
            .schema
            .parse(args)
            .map_err(|source| ToolkitError::InvalidArguments {
                tool: self.name.to_owned(),
                source,
            })?;
        self.dispatcher.run(self.name, &Value::Object(parsed)).await
    }
}

/// Toolkit exposing permitted tools as [`StructuredTool`]s.
#[derive(Clone, Debug)]
pub struct StructuredToolkit {
    tools: Vec<StructuredTool>,
}

impl StructuredToolkit {
    /// Creates a toolkit that calls Stripe with `secret_key`.
    #[must_use]
    pub fn new(secret_key: impl Into<String>, configuration: Configuration) -> Self {
        Self::from_toolkit(&Toolkit::new(secret_key, configuration))
    }

    /// Wraps an existing [`Toolkit`].
    #[must_use]
    pub fn from_toolkit(toolkit: &Toolkit) -> Self {
        let tools = toolkit
            .tools()
            .iter()
            .map(|tool| StructuredTool::new(tool, Arc::clone(toolkit.dispatcher())))
            .collect();
        Self { tools }
    }

    /// The tools, in catalog order.
    #[must_use]
    pub fn get_tools(&self) -> &[StructuredTool] {
        &self.tools
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::configuration::{Actions, Context, Permission, Resource};
    use serde_json::json;

    fn toolkit(api: Arc<MockApi>, context: Context) -> StructuredToolkit {
        let mut actions = Actions::new();
        actions
            .grant(Resource::Invoices, Permission::Create)
            .grant(Resource::Invoices, Permission::Read)
            .grant(Resource::Invoices, Permission::Update);
        StructuredToolkit::from_toolkit(&Toolkit::with_api(api, Configuration::new(actions, context)))
    }

    #[test]
    fn test_tools_carry_names_and_schemas() {
        let toolkit = toolkit(Arc::new(MockApi::new()), Context::default().with_customer("cus_1"));
        let names: Vec<&str> = toolkit.get_tools().iter().map(StructuredTool::name).collect();
        assert_eq!(names, ["create_invoice", "list_invoices", "finalize_invoice"]);

        let create = &toolkit.get_tools()[0];
        assert!(create.description().contains("create an invoice"));
        assert_eq!(create.schema().field_names(), ["days_until_due"]);
        assert_eq!(create.json_schema()["required"], json!([]));
    }

    #[tokio::test]
    async fn test_call_runs_through_dispatcher() {
        let api = Arc::new(MockApi::returning(json!({"data": [{"id": "in_1"}]})));
        let toolkit = toolkit(api.clone(), Context::default());

        let output = toolkit.get_tools()[1]
            .call(&json!({"limit": 1, "ignored": true}))
            .await
            .unwrap();

        assert_eq!(output, r#"[{"id":"in_1"}]"#);
        let request = api.last_request();
        assert_eq!(Value::Object(request.params), json!({"limit": 1}));
    }

    #[tokio::test]
    async fn test_call_rejects_invalid_arguments() {
        let api = Arc::new(MockApi::new());
        let toolkit = toolkit(api.clone(), Context::default());

        let err = toolkit.get_tools()[2]
            .call(&json!({"invoice": 42}))
            .await
            .unwrap_err();

        assert!(matches!(err, ToolkitError::InvalidArguments { ref tool, .. } if tool == "finalize_invoice"));
        assert_eq!(api.request_count(), 0);
    }
}
