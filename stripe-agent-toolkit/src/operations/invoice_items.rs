//! Invoice item operations.

use serde_json::{Map, Value};

use super::{arg, customer_arg, inject_customer, project, render_prompt, send};
use crate::api::{ApiMethod, PaymentApi};
use crate::configuration::Context;
use crate::error::OperationError;
use crate::schema::{Field, ParameterShape};

/// Arguments for `create_invoice_item`. Omits `customer` when the context fixes one.
#[must_use]
pub fn create_invoice_item_parameters(context: &Context) -> ParameterShape {
    let shape = ParameterShape::new(vec![
        Field::string(
            "customer",
            "The ID of the customer to create the invoice item for.",
        ),
        Field::string("price", "The ID of the price for the item."),
        Field::string("invoice", "The ID of the invoice to create the item for."),
    ]);
    if context.customer.is_some() {
        shape.without("customer")
    } else {
        shape
    }
}

/// Prompt for `create_invoice_item`.
#[must_use]
pub fn create_invoice_item_prompt(context: &Context) -> String {
    let arguments: Vec<String> = customer_arg(
        context,
        false,
        "The ID of the customer to create the invoice item for.",
    )
    .into_iter()
    .chain([
        arg("price", "str", false, "The ID of the price to create the invoice item for."),
        arg(
            "invoice",
            "str",
            false,
            "The ID of the invoice to create the invoice item for.",
        ),
    ])
    .collect();
    render_prompt("This tool will create an invoice item in Stripe.", &arguments)
}

/// Adds a price to an invoice and returns `{id, invoice}`.
///
/// # Errors
///
/// Returns `"Failed to create invoice item"` if the API call fails.
pub async fn create_invoice_item(
    api: &dyn PaymentApi,
    context: &Context,
    mut params: Map<String, Value>,
) -> Result<Value, OperationError> {
    inject_customer(context, &mut params);
    let item = send(
        api,
        context,
        ApiMethod::Create,
        "/v1/invoiceitems",
        params,
        "Failed to create invoice item",
    )
    .await?;
    Ok(project(&item, &["id", "invoice"]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_invoice_item_projects_and_injects() {
        let api = MockApi::returning(json!({"id": "ii_1", "invoice": "in_1", "amount": 500}));
        let params = json!({"price": "price_1", "invoice": "in_1"})
            .as_object()
            .cloned()
            .unwrap();

        let result = create_invoice_item(&api, &Context::default().with_customer("cus_1"), params)
            .await
            .unwrap();

        assert_eq!(result, json!({"id": "ii_1", "invoice": "in_1"}));
        let request = api.last_request();
        assert_eq!(request.path, "/v1/invoiceitems");
        assert_eq!(request.params["customer"], "cus_1");
    }

    #[test]
    fn test_prompt_drops_customer_line_with_context() {
        let prompt = create_invoice_item_prompt(&Context::default().with_customer("cus_1"));
        assert!(prompt.contains("It takes two arguments:"));
        assert!(!prompt.contains("- customer"));
        let prompt = create_invoice_item_prompt(&Context::default());
        assert!(prompt.contains("It takes three arguments:"));
    }

    #[tokio::test]
    async fn test_create_invoice_item_failure_message() {
        let err = create_invoice_item(&MockApi::failing(), &Context::default(), Map::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to create invoice item");
    }
}
