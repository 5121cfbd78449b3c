//! Payment intent operations.

use serde_json::{Map, Value};

use super::{LIMIT_DESCRIPTION, arg, customer_arg, inject_customer, list_data, render_prompt, send};
use crate::api::{ApiMethod, PaymentApi};
use crate::configuration::Context;
use crate::error::OperationError;
use crate::schema::{Field, ParameterShape};

/// Arguments for `list_payment_intents`. Omits `customer` when the context fixes one.
#[must_use]
pub fn list_payment_intents_parameters(context: &Context) -> ParameterShape {
    let shape = ParameterShape::new(vec![
        Field::string("customer", "The ID of the customer to list payment intents for.")
            .optional(),
        Field::integer("limit", LIMIT_DESCRIPTION)
            .range(1, 100)
            .optional(),
    ]);
    if context.customer.is_some() {
        shape.without("customer")
    } else {
        shape
    }
}

/// Prompt for `list_payment_intents`.
#[must_use]
pub fn list_payment_intents_prompt(context: &Context) -> String {
    let arguments: Vec<String> = customer_arg(
        context,
        true,
        "The ID of the customer to list payment intents for.",
    )
    .into_iter()
    .chain([arg("limit", "int", true, "The number of payment intents to return.")])
    .collect();
    render_prompt("This tool will list payment intents in Stripe.", &arguments)
}

/// Lists payment intents and returns the `data` array.
///
/// # Errors
///
/// Returns `"Failed to list payment intents"` if the API call fails.
pub async fn list_payment_intents(
    api: &dyn PaymentApi,
    context: &Context,
    mut params: Map<String, Value>,
) -> Result<Value, OperationError> {
    inject_customer(context, &mut params);
    send(
        api,
        context,
        ApiMethod::List,
        "/v1/payment_intents",
        params,
        "Failed to list payment intents",
    )
    .await
    .map(list_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_payment_intents_filters_by_customer() {
        let api = MockApi::returning(json!({"data": [{"id": "pi_1"}]}));
        let params = json!({"customer": "cus_1", "limit": 5})
            .as_object()
            .cloned()
            .unwrap();

        let result = list_payment_intents(&api, &Context::default(), params)
            .await
            .unwrap();

        assert_eq!(result, json!([{"id": "pi_1"}]));
        let request = api.last_request();
        assert_eq!(request.path, "/v1/payment_intents");
        assert_eq!(request.params["customer"], "cus_1");
        assert_eq!(request.params["limit"], 5);
    }

    #[tokio::test]
    async fn test_list_payment_intents_failure_message() {
        let err = list_payment_intents(&MockApi::failing(), &Context::default(), Map::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to list payment intents");
    }
}
