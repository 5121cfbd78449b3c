//! A [`PaymentApi`] implementation that talks to Stripe over HTTP.
//!
//! [`StripeClient`] authenticates with a secret key, sends form-encoded
//! bodies for create/update calls and query strings for list/retrieve
//! calls, and routes on behalf of a connected account when the request
//! asks for it.
//!
//! ## Features
//!
//! - Uses `reqwest` for async HTTP requests
//! - Optional per-request timeout (none by default)
//! - Integrates with `tracing` if the `telemetry` feature is enabled
//!
//! ## Error Handling
//!
//! [`ApiError`] captures the failure context:
//! - URL construction
//! - HTTP transport failures
//! - JSON deserialization errors
//! - Unexpected HTTP status responses

use std::fmt::Display;
use std::sync::LazyLock;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{Map, Value};
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::api::{ApiRequest, BoxFuture, PaymentApi};
use crate::configuration::Mode;
use crate::encoding::{form_encode, form_pairs};

static DEFAULT_API_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse("https://api.stripe.com").expect("Invalid API base URL"));

static DEFAULT_DOCUMENTATION_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://ai.stripe.com/search").expect("Invalid documentation search URL")
});

/// `User-Agent` sent when no mode is configured.
pub const DEFAULT_USER_AGENT: &str = "stripe-agent-toolkit-rust";

/// `User-Agent` sent when running behind a Model Context Protocol server.
pub const MCP_USER_AGENT: &str = "stripe-mcp";

/// Header naming the connected account a request acts on behalf of.
pub const STRIPE_ACCOUNT_HEADER: &str = "Stripe-Account";

/// Returns the `User-Agent` label for an integration mode.
#[must_use]
pub const fn user_agent(mode: Option<Mode>) -> &'static str {
    match mode {
        Some(Mode::ModelContextProtocol) => MCP_USER_AGENT,
        None => DEFAULT_USER_AGENT,
    }
}

/// Errors that can occur while calling the payment API.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// URL parse error.
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        /// Human-readable context.
        context: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },
    /// HTTP transport error.
    #[error("HTTP error: {context}: {source}")]
    Http {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// JSON deserialization error.
    #[error("Failed to deserialize JSON: {context}: {source}")]
    JsonDeserialization {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// Unexpected HTTP status code.
    #[error("Unexpected HTTP status {status}: {context}: {body}")]
    HttpStatus {
        /// Human-readable context.
        context: &'static str,
        /// The HTTP status code.
        status: StatusCode,
        /// The response body.
        body: String,
    },
    /// Failed to read response body.
    #[error("Failed to read response body as text: {context}: {source}")]
    ResponseBodyRead {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// The `error.message` Stripe put in a non-2xx response body, if any.
    #[must_use]
    pub fn stripe_message(&self) -> Option<String> {
        let Self::HttpStatus { body, .. } = self else {
            return None;
        };
        let parsed: Value = serde_json::from_str(body).ok()?;
        parsed
            .pointer("/error/message")
            .and_then(Value::as_str)
            .map(str::to_owned)
    }
}

/// HTTP client for the Stripe API and the documentation search service.
#[derive(Clone, Debug)]
pub struct StripeClient {
    /// Secret key used as bearer token.
    secret_key: String,
    /// Base URL for API paths.
    api_base: Url,
    /// Full URL of the documentation search endpoint.
    documentation_url: Url,
    /// Shared Reqwest HTTP client.
    client: Client,
    /// `User-Agent` sent with every request.
    user_agent: &'static str,
    /// Optional request timeout.
    timeout: Option<Duration>,
}

impl StripeClient {
    /// Creates a client for the live Stripe API.
    #[must_use]
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            api_base: DEFAULT_API_BASE.clone(),
            documentation_url: DEFAULT_DOCUMENTATION_URL.clone(),
            client: Client::new(),
            user_agent: DEFAULT_USER_AGENT,
            timeout: None,
        }
    }

    /// Labels outbound requests for the given integration mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: Option<Mode>) -> Self {
        self.user_agent = user_agent(mode);
        self
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_api_base(mut self, api_base: Url) -> Self {
        self.api_base = api_base;
        self
    }

    /// Overrides the documentation search URL.
    #[must_use]
    pub fn with_documentation_url(mut self, documentation_url: Url) -> Self {
        self.documentation_url = documentation_url;
        self
    }

    /// Sets a timeout for all future requests.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the API base URL.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Returns the documentation search URL.
    #[must_use]
    pub const fn documentation_url(&self) -> &Url {
        &self.documentation_url
    }

    /// Returns the `User-Agent` label in use.
    #[must_use]
    pub const fn user_agent(&self) -> &'static str {
        self.user_agent
    }

    /// Returns the configured timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Executes a single API call and returns the decoded body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the URL cannot be built, the request fails,
    /// or the API answers with a non-2xx status.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "stripe.client.request", skip_all, fields(path = %request.path), err)
    )]
    pub async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let context = if request.method.has_body() {
            "POST payment API"
        } else {
            "GET payment API"
        };
        let mut url = self
            .api_base
            .join(&request.path)
            .map_err(|e| ApiError::UrlParse {
                context: "Failed to construct API URL",
                source: e,
            })?;

        let req = if request.method.has_body() {
            self.client
                .post(url)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(form_encode(&request.params))
        } else {
            let pairs = form_pairs(&request.params);
            if !pairs.is_empty() {
                url.query_pairs_mut().extend_pairs(pairs);
            }
            self.client.get(url)
        };

        let mut req = req.bearer_auth(&self.secret_key);
        if let Some(account) = &request.options.stripe_account {
            req = req.header(STRIPE_ACCOUNT_HEADER, account);
        }
        self.send(req, context).await
    }

    /// Posts `body` as JSON to the documentation search service.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the service answers
    /// with a non-2xx status.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "stripe.client.search_documentation", skip_all, err)
    )]
    pub async fn search(&self, body: Map<String, Value>) -> Result<Value, ApiError> {
        let req = self
            .client
            .post(self.documentation_url.clone())
            .header("X-Requested-With", "fetch")
            .json(&body);
        self.send(req, "POST documentation search").await
    }

    /// Applies shared headers and the timeout, sends, and decodes the response.
    async fn send(&self, req: RequestBuilder, context: &'static str) -> Result<Value, ApiError> {
        let mut req = req.header(USER_AGENT, self.user_agent);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let http_response = req
            .send()
            .await
            .map_err(|e| ApiError::Http { context, source: e })?;

        let result = if http_response.status().is_success() {
            http_response
                .json::<Value>()
                .await
                .map_err(|e| ApiError::JsonDeserialization { context, source: e })
        } else {
            let status = http_response.status();
            let body = http_response
                .text()
                .await
                .map_err(|e| ApiError::ResponseBodyRead { context, source: e })?;
            Err(ApiError::HttpStatus {
                context,
                status,
                body,
            })
        };

        log_failure(&result);

        result
    }
}

impl PaymentApi for StripeClient {
    fn request(&self, request: ApiRequest) -> BoxFuture<'_, Result<Value, ApiError>> {
        Box::pin(self.execute(request))
    }

    fn search_documentation(
        &self,
        body: Map<String, Value>,
    ) -> BoxFuture<'_, Result<Value, ApiError>> {
        Box::pin(self.search(body))
    }
}

/// Logs a failed request. Noop if the telemetry feature is off.
#[cfg(feature = "telemetry")]
fn log_failure<R, E: Display>(result: &Result<R, E>) {
    if let Err(err) = result {
        tracing::event!(tracing::Level::ERROR, error = %err, "Request to payment API failed");
    }
}

/// Logs a failed request. Noop if the telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
const fn log_failure<R, E: Display>(_result: &Result<R, E>) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiMethod, RequestOptions};
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> StripeClient {
        StripeClient::new("sk_test_123").with_api_base(server.uri().parse::<Url>().unwrap())
    }

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_create_posts_form_body_with_bearer_auth() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/customers"))
            .and(header("Authorization", "Bearer sk_test_123"))
            .and(header("Content-Type", "application/x-www-form-urlencoded"))
            .and(header("User-Agent", DEFAULT_USER_AGENT))
            .and(body_string("name=Jane+Doe&email=jane%40example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "cus_123"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let response = client_for(&mock_server)
            .execute(
                ApiRequest::new(ApiMethod::Create, "/v1/customers", RequestOptions::default())
                    .with_params(params(json!({"name": "Jane Doe", "email": "jane@example.com"}))),
            )
            .await
            .unwrap();

        assert_eq!(response["id"], "cus_123");
        let received = mock_server.received_requests().await.unwrap();
        assert!(received[0].headers.get("stripe-account").is_none());
    }

    #[tokio::test]
    async fn test_list_uses_query_and_account_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/invoices"))
            .and(query_param("customer", "cus_123"))
            .and(query_param("limit", "3"))
            .and(header("Stripe-Account", "acct_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let response = client_for(&mock_server)
            .execute(
                ApiRequest::new(
                    ApiMethod::List,
                    "/v1/invoices",
                    RequestOptions::on_behalf_of(Some("acct_123")),
                )
                .with_params(params(json!({"customer": "cus_123", "limit": 3}))),
            )
            .await
            .unwrap();

        assert_eq!(response, json!({"data": []}));
    }

    #[tokio::test]
    async fn test_error_status_keeps_stripe_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/refunds"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"message": "No such payment_intent: 'pi_x'", "type": "invalid_request_error"}
            })))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .execute(ApiRequest::new(
                ApiMethod::Create,
                "/v1/refunds",
                RequestOptions::default(),
            ))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApiError::HttpStatus {
                status: StatusCode::BAD_REQUEST,
                ..
            }
        ));
        assert_eq!(
            err.stripe_message().as_deref(),
            Some("No such payment_intent: 'pi_x'")
        );
    }

    #[tokio::test]
    async fn test_documentation_search_posts_json() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("X-Requested-With", "fetch"))
            .and(header("User-Agent", MCP_USER_AGENT))
            .and(body_json(json!({"question": "How do refunds work?", "language": "python"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"sources": [{"url": "https://docs.stripe.com/refunds"}]})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = StripeClient::new("sk_test_123")
            .with_mode(Some(Mode::ModelContextProtocol))
            .with_documentation_url(format!("{}/search", mock_server.uri()).parse().unwrap());
        let response = client
            .search(params(
                json!({"question": "How do refunds work?", "language": "python"}),
            ))
            .await
            .unwrap();

        assert_eq!(response["sources"][0]["url"], "https://docs.stripe.com/refunds");
    }

    #[tokio::test]
    async fn test_documentation_search_non_success_fails() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(500).set_body_string("unavailable"))
            .mount(&mock_server)
            .await;

        let client = StripeClient::new("sk_test_123")
            .with_documentation_url(format!("{}/search", mock_server.uri()).parse().unwrap());
        let err = client
            .search(params(json!({"question": "q"})))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("500"));
        assert!(err.stripe_message().is_none());
    }

    #[test]
    fn test_user_agent_follows_mode() {
        assert_eq!(user_agent(None), "stripe-agent-toolkit-rust");
        assert_eq!(user_agent(Some(Mode::ModelContextProtocol)), "stripe-mcp");
        assert_eq!(StripeClient::new("sk").timeout(), None);
    }
}
