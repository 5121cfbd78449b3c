//! Price operations.

use serde_json::{Map, Value};

use super::{arg, list_data, render_prompt, send};
use crate::api::{ApiMethod, PaymentApi};
use crate::configuration::Context;
use crate::error::OperationError;
use crate::schema::{Field, ParameterShape};

/// Arguments for `create_price`.
#[must_use]
pub fn create_price_parameters(_context: &Context) -> ParameterShape {
    ParameterShape::new(vec![
        Field::string("product", "The ID of the product to create the price for."),
        Field::integer("unit_amount", "The unit amount of the price in cents."),
        Field::string("currency", "The currency of the price."),
    ])
}

/// Prompt for `create_price`.
#[must_use]
pub fn create_price_prompt(_context: &Context) -> String {
    render_prompt(
        "This tool will create a price in Stripe. If a product has not already been specified, a product should be created first.",
        &[
            arg("product", "str", false, "The ID of the product to create the price for."),
            arg("unit_amount", "int", false, "The unit amount of the price in cents."),
            arg("currency", "str", false, "The currency of the price."),
        ],
    )
}

/// Creates a price and returns the full object.
///
/// # Errors
///
/// Returns `"Failed to create price"` if the API call fails.
pub async fn create_price(
    api: &dyn PaymentApi,
    context: &Context,
    params: Map<String, Value>,
) -> Result<Value, OperationError> {
    send(
        api,
        context,
        ApiMethod::Create,
        "/v1/prices",
        params,
        "Failed to create price",
    )
    .await
}

/// Arguments for `list_prices`.
#[must_use]
pub fn list_prices_parameters(_context: &Context) -> ParameterShape {
    ParameterShape::new(vec![
        Field::string("product", "The ID of the product to list prices for.").optional(),
        Field::integer(
            "limit",
            "A limit on the number of objects to be returned. Limit can range between 1 and 100, and the default is 10.",
        )
        .range(1, 100)
        .optional(),
    ])
}

/// Prompt for `list_prices`.
#[must_use]
pub fn list_prices_prompt(_context: &Context) -> String {
    render_prompt(
        "This tool will fetch a list of Prices from Stripe.",
        &[
            arg("product", "str", true, "The ID of the product to list prices for."),
            arg("limit", "int", true, "The number of prices to return."),
        ],
    )
}

/// Lists prices and returns the `data` array.
///
/// # Errors
///
/// Returns `"Failed to list prices"` if the API call fails.
pub async fn list_prices(
    api: &dyn PaymentApi,
    context: &Context,
    params: Map<String, Value>,
) -> Result<Value, OperationError> {
    send(
        api,
        context,
        ApiMethod::List,
        "/v1/prices",
        params,
        "Failed to list prices",
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
    async fn test_create_price_passes_params_through() {
        let api = MockApi::returning(json!({"id": "price_1", "unit_amount": 1000}));
        let params = json!({"product": "prod_1", "unit_amount": 1000, "currency": "usd"})
            .as_object()
            .cloned()
            .unwrap();

        let result = create_price(&api, &Context::default(), params.clone())
            .await
            .unwrap();

        assert_eq!(result["id"], "price_1");
        assert_eq!(api.last_request().params, params);
    }

    #[tokio::test]
    async fn test_list_prices_failure_message() {
        let err = list_prices(&MockApi::failing(), &Context::default(), Map::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to list prices");
    }
}
