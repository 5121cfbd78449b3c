//! Documentation search.

use serde_json::{Map, Value};

use super::{arg, fail, render_prompt};
use crate::api::PaymentApi;
use crate::configuration::Context;
use crate::error::OperationError;
use crate::schema::{Field, ParameterShape};

/// Languages the search service can bias results towards.
pub const LANGUAGES: &[&str] = &[
    "dotnet", "go", "java", "node", "php", "ruby", "python", "curl",
];

/// Arguments for `search_documentation`.
#[must_use]
pub fn search_documentation_parameters(_context: &Context) -> ParameterShape {
    ParameterShape::new(vec![
        Field::string(
            "question",
            "The user question about integrating with Stripe will be used to search the documentation.",
        ),
        Field::enumeration(
            "language",
            LANGUAGES,
            "The programming language to search for in the the documentation.",
        )
        .optional(),
    ])
}

/// Prompt for `search_documentation`.
#[must_use]
pub fn search_documentation_prompt(_context: &Context) -> String {
    render_prompt(
        "This tool will take in a user question about integrating with Stripe in their application, then search and retrieve relevant Stripe documentation to answer the question.",
        &[
            arg(
                "question",
                "str",
                false,
                "The user question to search an answer for in the Stripe documentation.",
            ),
            arg(
                "language",
                "str",
                true,
                "The programming language to search for in the the documentation.",
            ),
        ],
    )
}

/// Searches the documentation and returns the `sources` field.
///
/// # Errors
///
/// Returns `"Failed to search documentation"` if the search service fails.
pub async fn search_documentation(
    api: &dyn PaymentApi,
    _context: &Context,
    params: Map<String, Value>,
) -> Result<Value, OperationError> {
    let response = api
        .search_documentation(params)
        .await
        .map_err(|e| fail("Failed to search documentation", e))?;
    Ok(response.get("sources").cloned().unwrap_or(Value::Null))
}
