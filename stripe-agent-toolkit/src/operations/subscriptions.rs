//! Subscription operations.

use serde_json::{Map, Value};

use super::{LIMIT_DESCRIPTION, arg, customer_arg, inject_customer, list_data, render_prompt, send};
use crate::api::{ApiMethod, PaymentApi};
use crate::configuration::Context;
use crate::error::OperationError;
use crate::schema::{Field, ParameterShape};

/// Statuses accepted by the `status` filter.
pub const SUBSCRIPTION_STATUSES: &[&str] = &[
    "active",
    "past_due",
    "unpaid",
    "canceled",
    "incomplete",
    "incomplete_expired",
    "trialing",
    "all",
];

/// Arguments for `list_subscriptions`. Omits `customer` when the context fixes one.
#[must_use]
pub fn list_subscriptions_parameters(context: &Context) -> ParameterShape {
    let shape = ParameterShape::new(vec![
        Field::string("customer", "The ID of the customer to list subscriptions for.").optional(),
        Field::string("price", "The ID of the price to list subscriptions for.").optional(),
        Field::enumeration(
            "status",
            SUBSCRIPTION_STATUSES,
            "The status of the subscriptions to retrieve.",
        )
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

/// Prompt for `list_subscriptions`.
#[must_use]
pub fn list_subscriptions_prompt(context: &Context) -> String {
    let arguments: Vec<String> = customer_arg(
        context,
        true,
        "The ID of the customer to list subscriptions for.",
    )
    .into_iter()
    .chain([
        arg("price", "str", true, "The ID of the price to list subscriptions for."),
        arg("status", "str", true, "The status of the subscriptions to list."),
        arg("limit", "int", true, "The number of subscriptions to return."),
    ])
    .collect();
    render_prompt("This tool will list all subscriptions in Stripe.", &arguments)
}

/// Lists subscriptions and returns the `data` array.
///
/// # Errors
///
/// Returns `"Failed to list subscriptions"` if the API call fails.
pub async fn list_subscriptions(
    api: &dyn PaymentApi,
    context: &Context,
    mut params: Map<String, Value>,
) -> Result<Value, OperationError> {
    inject_customer(context, &mut params);
    send(
        api,
        context,
        ApiMethod::List,
        "/v1/subscriptions",
        params,
        "Failed to list subscriptions",
    )
    .await
    .map(list_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use serde_json::json;

    #[test]
    fn test_status_is_enumerated() {
        let shape = list_subscriptions_parameters(&Context::default());
        assert!(shape.parse(&json!({"status": "trialing"})).is_ok());
        assert!(shape.parse(&json!({"status": "paused"})).is_err());
        assert_eq!(
            list_subscriptions_parameters(&Context::default().with_customer("cus_1")).field_names(),
            ["price", "status", "limit"]
        );
    }

    #[tokio::test]
    async fn test_list_subscriptions_injects_customer() {
        let api = MockApi::returning(json!({"data": [{"id": "sub_1"}]}));
        let params = json!({"status": "active"}).as_object().cloned().unwrap();

        let result = list_subscriptions(&api, &Context::default().with_customer("cus_1"), params)
            .await
            .unwrap();

        assert_eq!(result, json!([{"id": "sub_1"}]));
        let request = api.last_request();
        assert_eq!(request.params["customer"], "cus_1");
        assert_eq!(request.params["status"], "active");
    }

    #[tokio::test]
    async fn test_list_subscriptions_failure_message() {
        let err = list_subscriptions(&MockApi::failing(), &Context::default(), Map::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to list subscriptions");
    }
}
