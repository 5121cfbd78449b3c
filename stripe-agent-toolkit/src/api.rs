//! The seam between operations and the payment API.
//!
//! Operations never talk HTTP directly. They build an [`ApiRequest`] and
//! hand it to a [`PaymentApi`], which lets tests substitute a recording
//! implementation for [`crate::client::StripeClient`].

use std::future::Future;
use std::pin::Pin;

use serde_json::{Map, Value};

use crate::client::ApiError;

/// Type alias for a boxed, `Send` future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The kind of call made against a resource path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    /// `POST` a new object.
    Create,
    /// `POST` to an existing object or one of its action endpoints.
    Update,
    /// `GET` a collection.
    List,
    /// `GET` a single object.
    Retrieve,
}

impl ApiMethod {
    /// Returns `true` for calls that carry a form body.
    #[must_use]
    pub const fn has_body(self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }
}

/// Per-request options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Connected account to act on behalf of. `None` sends no `Stripe-Account` header.
    pub stripe_account: Option<String>,
}

impl RequestOptions {
    /// Options acting on behalf of `account`, if any.
    #[must_use]
    pub fn on_behalf_of(account: Option<&str>) -> Self {
        Self {
            stripe_account: account.map(str::to_owned),
        }
    }
}

/// A single call against the payment API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// What kind of call this is.
    pub method: ApiMethod,
    /// Path relative to the API base, e.g. `/v1/customers`.
    pub path: String,
    /// Body parameters for create/update, query parameters otherwise.
    pub params: Map<String, Value>,
    /// Per-request options.
    pub options: RequestOptions,
}

impl ApiRequest {
    /// Creates a request with no parameters.
    #[must_use]
    pub fn new(method: ApiMethod, path: impl Into<String>, options: RequestOptions) -> Self {
        Self {
            method,
            path: path.into(),
            params: Map::new(),
            options,
        }
    }

    /// Sets the request parameters.
    #[must_use]
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = params;
        self
    }
}

/// Something that can execute payment API calls.
///
/// Both methods resolve to the decoded JSON response body.
pub trait PaymentApi: Send + Sync {
    /// Executes a single API call.
    fn request(&self, request: ApiRequest) -> BoxFuture<'_, Result<Value, ApiError>>;

    /// Queries the documentation search service with a JSON body.
    fn search_documentation(&self, body: Map<String, Value>)
    -> BoxFuture<'_, Result<Value, ApiError>>;
}
