//! Payment link operations.

use serde_json::{Map, Value};

use super::{arg, project, render_prompt, send};
use crate::api::{ApiMethod, PaymentApi};
use crate::configuration::Context;
use crate::error::OperationError;
use crate::schema::{Field, ParameterShape};

/// Arguments for `create_payment_link`.
#[must_use]
pub fn create_payment_link_parameters(_context: &Context) -> ParameterShape {
    ParameterShape::new(vec![
        Field::string("price", "The ID of the price to create the payment link for."),
        Field::integer("quantity", "The quantity of the product to include."),
    ])
}

/// Prompt for `create_payment_link`.
#[must_use]
pub fn create_payment_link_prompt(_context: &Context) -> String {
    render_prompt(
        "This tool will create a payment link in Stripe.",
        &[
            arg("price", "str", false, "The ID of the price to create the payment link for."),
            arg(
                "quantity",
                "int",
                false,
                "The quantity of the product to include in the payment link.",
            ),
        ],
    )
}

/// Creates a single-line-item payment link and returns `{id, url}`.
///
/// # Errors
///
/// Returns `"Failed to create payment link"` if the API call fails.
pub async fn create_payment_link(
    api: &dyn PaymentApi,
    context: &Context,
    params: Map<String, Value>,
) -> Result<Value, OperationError> {
    let mut body = Map::new();
    body.insert(
        "line_items".to_owned(),
        Value::Array(vec![Value::Object(params)]),
    );
    let link = send(
        api,
        context,
        ApiMethod::Create,
        "/v1/payment_links",
        body,
        "Failed to create payment link",
    )
    .await?;
    Ok(project(&link, &["id", "url"]))
}
