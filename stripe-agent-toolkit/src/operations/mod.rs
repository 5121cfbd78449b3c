//! Operation functions, one module per resource.
//!
//! Every operation has three parts: a parameter shape and a prompt, both
//! derived from the [`Context`], and an async function that performs
//! exactly one payment API call. Operations never surface raw API errors:
//! a failure becomes an [`OperationError`] with a fixed message.

use serde_json::{Map, Value};

use crate::api::{ApiMethod, ApiRequest, PaymentApi, RequestOptions};
use crate::configuration::Context;
use crate::error::OperationError;

pub mod balance;
pub mod customers;
pub mod documentation;
pub mod invoice_items;
pub mod invoices;
pub mod payment_intents;
pub mod payment_links;
pub mod prices;
pub mod products;
pub mod refunds;
pub mod subscriptions;

/// Sends one request on behalf of the context account and maps failures.
pub(crate) async fn send(
    api: &dyn PaymentApi,
    context: &Context,
    method: ApiMethod,
    path: impl Into<String>,
    params: Map<String, Value>,
    failure: &'static str,
) -> Result<Value, OperationError> {
    let request = ApiRequest::new(
        method,
        path,
        RequestOptions::on_behalf_of(context.account.as_deref()),
    )
    .with_params(params);
    api.request(request).await.map_err(|e| fail(failure, e))
}

pub(crate) fn fail(message: &'static str, source: crate::client::ApiError) -> OperationError {
    #[cfg(feature = "telemetry")]
    tracing::warn!(error = %source, stripe_message = ?source.stripe_message(), "{message}");
    OperationError::new(message, source)
}

/// Fills `customer` from the context, overriding whatever the caller sent.
pub(crate) fn inject_customer(context: &Context, params: &mut Map<String, Value>) {
    if let Some(customer) = &context.customer {
        params.insert("customer".to_owned(), Value::String(customer.clone()));
    }
}

/// Keeps only `keys` from a response object, in order. Missing keys become `null`.
pub(crate) fn project(value: &Value, keys: &[&str]) -> Value {
    Value::Object(
        keys.iter()
            .map(|key| ((*key).to_owned(), value.get(key).cloned().unwrap_or(Value::Null)))
            .collect(),
    )
}

/// The `data` array of a list response.
pub(crate) fn list_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

const COUNTS: [&str; 5] = ["no", "one", "two", "three", "four"];

/// Renders a prompt from a summary line and `- name (type): text` argument lines.
pub(crate) fn render_prompt(summary: &str, arguments: &[String]) -> String {
    let header = match arguments.len() {
        0 => "It takes no input.".to_owned(),
        1 => "It takes one argument:".to_owned(),
        n => format!(
            "It takes {} arguments:",
            COUNTS.get(n).copied().unwrap_or("several")
        ),
    };
    let mut prompt = format!("\n{summary}\n\n{header}\n");
    for line in arguments {
        prompt.push_str(line);
        prompt.push('\n');
    }
    prompt
}

/// The argument line for an optional-or-required field in a prompt.
pub(crate) fn arg(name: &str, ty: &str, optional: bool, text: &str) -> String {
    if optional {
        format!("- {name} ({ty}, optional): {text}")
    } else {
        format!("- {name} ({ty}): {text}")
    }
}

/// Prompt line for the `customer` argument. `None` when the context fixes the customer.
pub(crate) fn customer_arg(context: &Context, optional: bool, text: &str) -> Option<String> {
    context
        .customer
        .is_none()
        .then(|| arg("customer", "str", optional, text))
}

pub(crate) const LIMIT_DESCRIPTION: &str =
    "A limit on the number of objects to be returned. Limit can range between 1 and 100.";

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fail_keeps_stripe_message_as_source() {
        let source = crate::client::ApiError::HttpStatus {
            context: "Stripe API request",
            status: reqwest::StatusCode::NOT_FOUND,
            body: r#"{"error":{"message":"No such customer: 'cus_x'"}}"#.to_owned(),
        };

        let err = fail("Failed to create invoice", source);

        assert_eq!(err.to_string(), "Failed to create invoice");
        assert_eq!(
            err.api_error().stripe_message().as_deref(),
            Some("No such customer: 'cus_x'")
        );
    }

    #[test]
    fn test_render_prompt_counts_arguments() {
        assert_eq!(
            render_prompt("This tool does nothing.", &[]),
            "\nThis tool does nothing.\n\nIt takes no input.\n"
        );
        let prompt = render_prompt(
            "This tool does two things.",
            &[
                arg("a", "str", false, "A."),
                arg("b", "int", true, "B."),
            ],
        );
        assert!(prompt.contains("It takes two arguments:\n- a (str): A.\n- b (int, optional): B.\n"));
    }

    #[test]
    fn test_project_fills_missing_with_null() {
        let value = json!({"id": "in_1", "status": "draft", "extra": 1});
        assert_eq!(
            project(&value, &["id", "url", "status"]),
            json!({"id": "in_1", "url": null, "status": "draft"})
        );
    }

    #[test]
    fn test_inject_customer_overrides() {
        let mut params = Map::new();
        params.insert("customer".into(), json!("cus_other"));
        inject_customer(&Context::default().with_customer("cus_ctx"), &mut params);
        assert_eq!(params["customer"], "cus_ctx");
    }

    #[test]
    fn test_list_data() {
        assert_eq!(list_data(json!({"data": [1, 2]})), json!([1, 2]));
        assert_eq!(list_data(json!("x")), Value::Null);
    }
}
