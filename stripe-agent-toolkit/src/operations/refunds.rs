//! Refund operations.

use serde_json::{Map, Value};

use super::{arg, project, render_prompt, send};
use crate::api::{ApiMethod, PaymentApi};
use crate::configuration::Context;
use crate::error::OperationError;
use crate::schema::{Field, ParameterShape};

/// Arguments for `create_refund`.
#[must_use]
pub fn create_refund_parameters(_context: &Context) -> ParameterShape {
    ParameterShape::new(vec![
        Field::string("payment_intent", "The ID of the PaymentIntent to refund."),
        Field::integer("amount", "The amount to refund in cents.").optional(),
    ])
}

/// Prompt for `create_refund`.
#[must_use]
pub fn create_refund_prompt(_context: &Context) -> String {
    render_prompt(
        "This tool will refund a payment intent in Stripe.",
        &[
            arg("payment_intent", "str", false, "The ID of the payment intent to refund."),
            arg("amount", "int", true, "The amount to refund in cents."),
        ],
    )
}

/// Refunds a payment intent and returns `{id, status, amount}`.
///
/// # Errors
///
/// Returns `"Failed to create refund"` if the API call fails.
pub async fn create_refund(
    api: &dyn PaymentApi,
    context: &Context,
    params: Map<String, Value>,
) -> Result<Value, OperationError> {
    let refund = send(
        api,
        context,
        ApiMethod::Create,
        "/v1/refunds",
        params,
        "Failed to create refund",
    )
    .await?;
    Ok(project(&refund, &["id", "status", "amount"]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_refund_projects() {
        let api = MockApi::returning(json!({
            "id": "re_1",
            "status": "succeeded",
            "amount": 500,
            "currency": "usd"
        }));
        let params = json!({"payment_intent": "pi_1", "amount": 500})
            .as_object()
            .cloned()
            .unwrap();

        let result = create_refund(&api, &Context::default(), params).await.unwrap();

        assert_eq!(result, json!({"id": "re_1", "status": "succeeded", "amount": 500}));
        assert_eq!(api.last_request().params["payment_intent"], "pi_1");
    }

    #[tokio::test]
    async fn test_create_refund_failure_message() {
        let err = create_refund(&MockApi::failing(), &Context::default(), Map::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to create refund");
    }
}
