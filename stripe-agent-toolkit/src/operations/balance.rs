//! Balance operations.

use serde_json::{Map, Value};

use super::{render_prompt, send};
use crate::api::{ApiMethod, PaymentApi};
use crate::configuration::Context;
use crate::error::OperationError;
use crate::schema::ParameterShape;

/// `retrieve_balance` takes no arguments.
#[must_use]
pub const fn retrieve_balance_parameters(_context: &Context) -> ParameterShape {
    ParameterShape::empty()
}

/// Prompt for `retrieve_balance`.
#[must_use]
pub fn retrieve_balance_prompt(_context: &Context) -> String {
    render_prompt("This tool will retrieve the balance from Stripe.", &[])
}

/// Retrieves the account balance and returns the full object.
///
/// # Errors
///
/// Returns `"Failed to retrieve balance"` if the API call fails.
pub async fn retrieve_balance(
    api: &dyn PaymentApi,
    context: &Context,
    params: Map<String, Value>,
) -> Result<Value, OperationError> {
    send(
        api,
        context,
        ApiMethod::Retrieve,
        "/v1/balance",
        params,
        "Failed to retrieve balance",
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use serde_json::json;

    #[tokio::test]
    async fn test_retrieve_balance() {
        let balance = json!({"object": "balance", "available": [{"amount": 100, "currency": "usd"}]});
        let api = MockApi::returning(balance.clone());

        let result = retrieve_balance(&api, &Context::default().with_account("acct_1"), Map::new())
            .await
            .unwrap();

        assert_eq!(result, balance);
        let request = api.last_request();
        assert_eq!(request.method, ApiMethod::Retrieve);
        assert_eq!(request.path, "/v1/balance");
        assert_eq!(request.options.stripe_account.as_deref(), Some("acct_1"));
    }

    #[tokio::test]
    async fn test_retrieve_balance_failure_message() {
        let err = retrieve_balance(&MockApi::failing(), &Context::default(), Map::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to retrieve balance");
    }
}
