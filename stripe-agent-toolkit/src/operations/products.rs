//! Product operations.

use serde_json::{Map, Value};

use super::{arg, list_data, render_prompt, send};
use crate::api::{ApiMethod, PaymentApi};
use crate::configuration::Context;
use crate::error::OperationError;
use crate::schema::{Field, ParameterShape};

const LIMIT_DESCRIPTION: &str = "A limit on the number of objects to be returned. Limit can range between 1 and 100, and the default is 10.";

/// Arguments for `create_product`.
#[must_use]
pub fn create_product_parameters(_context: &Context) -> ParameterShape {
    ParameterShape::new(vec![
        Field::string("name", "The name of the product."),
        Field::string("description", "The description of the product.").optional(),
    ])
}

/// Prompt for `create_product`.
#[must_use]
pub fn create_product_prompt(_context: &Context) -> String {
    render_prompt(
        "This tool will create a product in Stripe.",
        &[
            arg("name", "str", false, "The name of the product."),
            arg("description", "str", true, "The description of the product."),
        ],
    )
}

/// Creates a product and returns the full object.
///
/// # Errors
///
/// Returns `"Failed to create product"` if the API call fails.
pub async fn create_product(
    api: &dyn PaymentApi,
    context: &Context,
    params: Map<String, Value>,
) -> Result<Value, OperationError> {
    send(
        api,
        context,
        ApiMethod::Create,
        "/v1/products",
        params,
        "Failed to create product",
    )
    .await
}

/// Arguments for `list_products`.
#[must_use]
pub fn list_products_parameters(_context: &Context) -> ParameterShape {
    ParameterShape::new(vec![
        Field::integer("limit", LIMIT_DESCRIPTION)
            .range(1, 100)
            .optional(),
    ])
}

/// Prompt for `list_products`.
#[must_use]
pub fn list_products_prompt(_context: &Context) -> String {
    render_prompt(
        "This tool will fetch a list of Products from Stripe.",
        &[arg("limit", "int", true, "The number of products to return.")],
    )
}

/// Lists products and returns the `data` array.
///
/// # Errors
///
/// Returns `"Failed to list products"` if the API call fails.
pub async fn list_products(
    api: &dyn PaymentApi,
    context: &Context,
    params: Map<String, Value>,
) -> Result<Value, OperationError> {
    send(
        api,
        context,
        ApiMethod::List,
        "/v1/products",
        params,
        "Failed to list products",
    )
    .await
    .map(list_data)
}
