//! Invoice operations.

use std::sync::LazyLock;

use serde_json::{Map, Value};
use url::Url;

use super::{arg, customer_arg, inject_customer, list_data, project, render_prompt, send};
use crate::api::{ApiMethod, PaymentApi};
use crate::configuration::Context;
use crate::error::OperationError;
use crate::schema::{Field, ParameterShape};

static INVOICES_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://api.stripe.com/v1/invoices").expect("Invalid invoices URL")
});

const INVOICE_FIELDS: [&str; 4] = ["id", "url", "customer", "status"];

/// Projects an invoice to `{id, url, customer, status}`. `url` is the hosted invoice URL.
fn summarize(invoice: &Value) -> Value {
    let mut summary = project(invoice, &INVOICE_FIELDS);
    if let Value::Object(map) = &mut summary {
        map.insert(
            "url".to_owned(),
            invoice
                .get("hosted_invoice_url")
                .cloned()
                .unwrap_or(Value::Null),
        );
    }
    summary
}

/// Arguments for `create_invoice`. Omits `customer` when the context fixes one.
#[must_use]
pub fn create_invoice_parameters(context: &Context) -> ParameterShape {
    let shape = ParameterShape::new(vec![
        Field::string("customer", "The ID of the customer to create the invoice for."),
        Field::integer("days_until_due", "The number of days until the invoice is due.").optional(),
    ]);
    if context.customer.is_some() {
        shape.without("customer")
    } else {
        shape
    }
}

/// Prompt for `create_invoice`.
#[must_use]
pub fn create_invoice_prompt(context: &Context) -> String {
    let arguments: Vec<String> = customer_arg(
        context,
        false,
        "The ID of the customer to create the invoice for.",
    )
    .into_iter()
    .chain([arg(
        "days_until_due",
        "int",
        true,
        "The number of days until the invoice is due.",
    )])
    .collect();
    render_prompt("This tool will create an invoice in Stripe.", &arguments)
}

/// Creates an invoice and returns `{id, url, customer, status}`.
///
/// # Errors
///
/// Returns `"Failed to create invoice"` if the API call fails.
pub async fn create_invoice(
    api: &dyn PaymentApi,
    context: &Context,
    mut params: Map<String, Value>,
) -> Result<Value, OperationError> {
    inject_customer(context, &mut params);
    let invoice = send(
        api,
        context,
        ApiMethod::Create,
        "/v1/invoices",
        params,
        "Failed to create invoice",
    )
    .await?;
    Ok(summarize(&invoice))
}

/// Arguments for `list_invoices`. Omits `customer` when the context fixes one.
#[must_use]
pub fn list_invoices_parameters(context: &Context) -> ParameterShape {
    let shape = ParameterShape::new(vec![
        Field::string("customer", "The ID of the customer to list invoices for.").optional(),
        Field::integer(
            "limit",
            "A limit on the number of objects to be returned. Limit can range between 1 and 100, and the default is 10.",
        )
        .range(1, 100)
        .optional(),
    ]);
    if context.customer.is_some() {
        shape.without("customer")
    } else {
        shape
    }
}

/// Prompt for `list_invoices`.
#[must_use]
pub fn list_invoices_prompt(context: &Context) -> String {
    let arguments: Vec<String> =
        customer_arg(context, true, "The ID of the customer to list invoices for.")
            .into_iter()
            .chain([arg("limit", "int", true, "The number of invoices to return.")])
            .collect();
    render_prompt("This tool will fetch a list of Invoices from Stripe.", &arguments)
}

/// Lists invoices and returns the `data` array.
///
/// # Errors
///
/// Returns `"Failed to list invoices"` if the API call fails.
pub async fn list_invoices(
    api: &dyn PaymentApi,
    context: &Context,
    mut params: Map<String, Value>,
) -> Result<Value, OperationError> {
    inject_customer(context, &mut params);
    send(
        api,
        context,
        ApiMethod::List,
        "/v1/invoices",
        params,
        "Failed to list invoices",
    )
    .await
    .map(list_data)
}

/// Arguments for `finalize_invoice`.
#[must_use]
pub fn finalize_invoice_parameters(_context: &Context) -> ParameterShape {
    ParameterShape::new(vec![Field::string(
        "invoice",
        "The ID of the invoice to finalize.",
    )])
}

/// Prompt for `finalize_invoice`.
#[must_use]
pub fn finalize_invoice_prompt(_context: &Context) -> String {
    render_prompt(
        "This tool will finalize an invoice in Stripe.",
        &[arg("invoice", "str", false, "The ID of the invoice to finalize.")],
    )
}

/// Finalizes a draft invoice and returns `{id, url, customer, status}`.
///
/// # Errors
///
/// Returns `"Failed to finalize invoice"` if the API call fails.
pub async fn finalize_invoice(
    api: &dyn PaymentApi,
    context: &Context,
    params: Map<String, Value>,
) -> Result<Value, OperationError> {
    let invoice_id = params
        .get("invoice")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let invoice = send(
        api,
        context,
        ApiMethod::Update,
        finalize_path(invoice_id),
        Map::new(),
        "Failed to finalize invoice",
    )
    .await?;
    Ok(summarize(&invoice))
}

/// `/v1/invoices/{id}/finalize` with `id` escaped as a single path segment.
fn finalize_path(invoice_id: &str) -> String {
    let mut url = INVOICES_URL.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.push(invoice_id).push("finalize");
    }
    url.path().to_owned()
}
