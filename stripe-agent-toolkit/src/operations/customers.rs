//! Customer operations.

use serde_json::{Map, Value};

use super::{LIMIT_DESCRIPTION, arg, list_data, project, render_prompt, send};
use crate::api::{ApiMethod, PaymentApi};
use crate::configuration::Context;
use crate::error::OperationError;
use crate::schema::{Field, ParameterShape};

/// Arguments for `create_customer`.
#[must_use]
pub fn create_customer_parameters(_context: &Context) -> ParameterShape {
    ParameterShape::new(vec![
        Field::string("name", "The name of the customer"),
        Field::email("email", "The email of the customer").optional(),
    ])
}

/// Prompt for `create_customer`.
#[must_use]
pub fn create_customer_prompt(_context: &Context) -> String {
    render_prompt(
        "This tool will create a customer in Stripe.",
        &[
            arg("name", "str", false, "The name of the customer."),
            arg("email", "str", true, "The email of the customer."),
        ],
    )
}

/// Creates a customer and returns `{id}`.
///
/// # Errors
///
/// Returns `"Failed to create customer"` if the API call fails.
pub async fn create_customer(
    api: &dyn PaymentApi,
    context: &Context,
    params: Map<String, Value>,
) -> Result<Value, OperationError> {
    let customer = send(
        api,
        context,
        ApiMethod::Create,
        "/v1/customers",
        params,
        "Failed to create customer",
    )
    .await?;
    Ok(project(&customer, &["id"]))
}

/// Arguments for `list_customers`.
#[must_use]
pub fn list_customers_parameters(_context: &Context) -> ParameterShape {
    ParameterShape::new(vec![
        Field::integer("limit", LIMIT_DESCRIPTION)
            .range(1, 100)
            .optional(),
        Field::string(
            "email",
            "A case-sensitive filter on the list based on the customer's email field. The value must be a string.",
        )
        .optional(),
    ])
}

/// Prompt for `list_customers`.
#[must_use]
pub fn list_customers_prompt(_context: &Context) -> String {
    render_prompt(
        "This tool will fetch a list of Customers from Stripe.",
        &[
            arg("limit", "int", true, "The number of customers to return."),
            arg("email", "str", true, "A case-sensitive filter on the customer's email."),
        ],
    )
}

/// Lists customers, projected to `[{id, email, name}]`.
///
/// # Errors
///
/// Returns `"Failed to list customers"` if the API call fails.
pub async fn list_customers(
    api: &dyn PaymentApi,
    context: &Context,
    params: Map<String, Value>,
) -> Result<Value, OperationError> {
    let customers = send(
        api,
        context,
        ApiMethod::List,
        "/v1/customers",
        params,
        "Failed to list customers",
    )
    .await?;
    let projected = match list_data(customers) {
        Value::Array(items) => items
            .iter()
            .map(|customer| project(customer, &["id", "email", "name"]))
            .collect(),
        _ => Vec::new(),
    };
    Ok(Value::Array(projected))
}
