//! The shared core every framework adapter wraps.

use std::sync::Arc;

use serde_json::Value;

use crate::api::PaymentApi;
use crate::client::StripeClient;
use crate::configuration::Configuration;
use crate::dispatch::ToolDispatcher;
use crate::error::ToolkitError;
use crate::tools::{Tool, filter_tools};

/// A permission-filtered toolset bound to a payment API.
///
/// Cheap to clone; clones share the same dispatcher.
#[derive(Clone, Debug)]
pub struct Toolkit {
    dispatcher: Arc<ToolDispatcher>,
    tools: Arc<[Tool]>,
}

impl Toolkit {
    /// Creates a toolkit that calls Stripe with `secret_key`.
    #[must_use]
    pub fn new(secret_key: impl Into<String>, configuration: Configuration) -> Self {
        let client = StripeClient::new(secret_key).with_mode(configuration.context.mode);
        Self::with_api(Arc::new(client), configuration)
    }

    /// Creates a toolkit on top of an arbitrary [`PaymentApi`].
    #[must_use]
    pub fn with_api(api: Arc<dyn PaymentApi>, configuration: Configuration) -> Self {
        let tools: Arc<[Tool]> = filter_tools(&configuration).into();
        let dispatcher = ToolDispatcher::new(api, configuration.context, &tools);

        #[cfg(feature = "telemetry")]
        tracing::debug!(tools = tools.len(), "Toolkit initialized");

        Self {
            dispatcher: Arc::new(dispatcher),
            tools,
        }
    }

    /// The permitted tools, in catalog order.
    #[must_use]
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// The dispatcher shared by this toolkit.
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<ToolDispatcher> {
        &self.dispatcher
    }

    /// Runs a tool by method name. See [`ToolDispatcher::run`].
    ///
    /// # Errors
    ///
    /// Returns [`ToolkitError`] for unknown methods or invalid arguments.
    pub async fn run(&self, method: &str, args: &Value) -> Result<String, ToolkitError> {
        self.dispatcher.run(method, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::configuration::{Actions, Context, Mode, Permission, Resource};
    use crate::tools::Method;
    use serde_json::json;

    #[test]
    fn test_tools_are_filtered() {
        let mut actions = Actions::new();
        actions.grant(Resource::Balance, Permission::Read);
        let toolkit = Toolkit::with_api(
            Arc::new(MockApi::new()),
            Configuration::new(actions, Context::default()),
        );

        let methods: Vec<Method> = toolkit.tools().iter().map(|t| t.method).collect();
        assert_eq!(methods, [Method::RetrieveBalance]);
        assert!(toolkit.dispatcher().contains("retrieve_balance"));
        assert!(!toolkit.dispatcher().contains("create_customer"));
    }

    #[test]
    fn test_new_keeps_context() {
        let context = Context::default()
            .with_account("acct_1")
            .with_mode(Mode::ModelContextProtocol);
        let toolkit = Toolkit::new("sk_test_123", Configuration::new(Actions::new(), context.clone()));
        assert_eq!(toolkit.dispatcher().context(), &context);
        assert!(toolkit.tools().is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_dispatcher() {
        let mut actions = Actions::new();
        actions.grant(Resource::Balance, Permission::Read);
        let api = Arc::new(MockApi::returning(json!({"object": "balance"})));
        let toolkit = Toolkit::with_api(api.clone(), Configuration::new(actions, Context::default()));
        let clone = toolkit.clone();

        let output = clone.run("retrieve_balance", &json!({})).await.unwrap();

        assert_eq!(output, r#"{"object":"balance"}"#);
        assert!(Arc::ptr_eq(toolkit.dispatcher(), clone.dispatcher()));
        assert_eq!(api.request_count(), 1);
    }
}
