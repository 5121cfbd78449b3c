//! Toolkit configuration: permissions and per-session context.
//!
//! A [`Configuration`] decides which tools a toolkit instance exposes
//! ([`Actions`]) and which implicit values every request carries
//! ([`Context`]). Permissions should be used together with Restricted API
//! Keys: a permission that is absent or `false` removes every tool that
//! requires it.
//!
//! # Example
//!
//! ```
//! use stripe_agent_toolkit::configuration::{Configuration, Permission, Resource};
//!
//! let configuration: Configuration = serde_json::from_value(serde_json::json!({
//!     "actions": { "customers": { "create": true, "read": true } },
//!     "context": { "account": "acct_123" }
//! }))
//! .unwrap();
//!
//! assert!(configuration.actions.allows(Resource::Customers, Permission::Create));
//! assert!(!configuration.actions.allows(Resource::Invoices, Permission::Create));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::tools::Tool;

/// A Stripe object family a tool operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    /// Customers.
    Customers,
    /// Invoices.
    Invoices,
    /// Invoice items.
    InvoiceItems,
    /// Payment links.
    PaymentLinks,
    /// Products.
    Products,
    /// Prices.
    Prices,
    /// Account balance.
    Balance,
    /// Refunds.
    Refunds,
    /// Payment intents.
    PaymentIntents,
    /// Subscriptions.
    Subscriptions,
    /// Stripe documentation search.
    Documentation,
}

impl Resource {
    /// Every resource, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Customers,
        Self::Invoices,
        Self::InvoiceItems,
        Self::PaymentLinks,
        Self::Products,
        Self::Prices,
        Self::Balance,
        Self::Refunds,
        Self::PaymentIntents,
        Self::Subscriptions,
        Self::Documentation,
    ];

    /// The wire name of the resource (e.g. `"paymentLinks"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Invoices => "invoices",
            Self::InvoiceItems => "invoiceItems",
            Self::PaymentLinks => "paymentLinks",
            Self::Products => "products",
            Self::Prices => "prices",
            Self::Balance => "balance",
            Self::Refunds => "refunds",
            Self::PaymentIntents => "paymentIntents",
            Self::Subscriptions => "subscriptions",
            Self::Documentation => "documentation",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|resource| resource.as_str() == s)
            .ok_or_else(|| UnknownName(s.to_owned()))
    }
}

/// A verb that must be granted on a [`Resource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Create new objects.
    Create,
    /// Modify existing objects.
    Update,
    /// List or retrieve objects.
    Read,
}

impl Permission {
    /// Every permission, in declaration order.
    pub const ALL: [Self; 3] = [Self::Create, Self::Update, Self::Read];

    /// The wire name of the permission.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Read => "read",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|permission| permission.as_str() == s)
            .ok_or_else(|| UnknownName(s.to_owned()))
    }
}

/// A resource or permission name that is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown name: {0}")]
pub struct UnknownName(pub String);

/// A (resource, permission) pair a tool requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Action {
    /// The resource acted upon.
    pub resource: Resource,
    /// The verb required on it.
    pub permission: Permission,
}

impl Action {
    /// Creates a new action requirement.
    #[must_use]
    pub const fn new(resource: Resource, permission: Permission) -> Self {
        Self {
            resource,
            permission,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource, self.permission)
    }
}

/// Sparse permission grants: resource → permission → allowed.
///
/// Any pair that is not present counts as denied. Resource and permission
/// names with no matching tool are skipped when deserializing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Actions(BTreeMap<Resource, BTreeMap<Permission, bool>>);

impl Actions {
    /// Creates an empty set of grants (everything denied).
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns `true` only if `permission` on `resource` is explicitly `true`.
    #[must_use]
    pub fn allows(&self, resource: Resource, permission: Permission) -> bool {
        self.0
            .get(&resource)
            .and_then(|permissions| permissions.get(&permission))
            .copied()
            .unwrap_or(false)
    }

    /// Grants `permission` on `resource`, keeping other grants on the same resource.
    pub fn grant(&mut self, resource: Resource, permission: Permission) -> &mut Self {
        self.set(resource, permission, true)
    }

    /// Sets an explicit value for a (resource, permission) pair.
    pub fn set(&mut self, resource: Resource, permission: Permission, allowed: bool) -> &mut Self {
        self.0
            .entry(resource)
            .or_default()
            .insert(permission, allowed);
        self
    }

    /// Returns `true` if no pair has been configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for Actions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, BTreeMap<String, bool>>::deserialize(deserializer)?;
        let mut actions = Self::new();
        for (resource, permissions) in raw {
            let Ok(resource) = resource.parse::<Resource>() else {
                continue;
            };
            for (permission, allowed) in permissions {
                if let Ok(permission) = permission.parse::<Permission>() {
                    actions.set(resource, permission, allowed);
                }
            }
        }
        Ok(actions)
    }
}

impl FromIterator<Action> for Actions {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        let mut actions = Self::new();
        for action in iter {
            actions.grant(action.resource, action.permission);
        }
        actions
    }
}

/// Labels the integration surface for outbound requests.
///
/// Only changes the `User-Agent` sent to Stripe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Running behind a Model Context Protocol server.
    #[serde(rename = "modelcontextprotocol")]
    ModelContextProtocol,
}

/// Settings applied to every request a toolkit makes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Connected account ID. When set, requests are made on behalf of this account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    /// Customer ID. When set, operations that take a customer use this one
    /// and stop asking the caller for it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,

    /// Integration mode label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
}

impl Context {
    /// Sets the connected account.
    #[must_use]
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Sets the implicit customer.
    #[must_use]
    pub fn with_customer(mut self, customer: impl Into<String>) -> Self {
        self.customer = Some(customer.into());
        self
    }

    /// Sets the integration mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }
}

/// Options supplied once when a toolkit is constructed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Permission grants. Missing entries deny.
    #[serde(default)]
    pub actions: Actions,

    /// Implicit request context.
    #[serde(default)]
    pub context: Context,
}

impl Configuration {
    /// Creates a configuration from grants and a context.
    #[must_use]
    pub const fn new(actions: Actions, context: Context) -> Self {
        Self { actions, context }
    }
}

/// Returns `true` if every action the tool declares is granted.
///
/// A single missing or `false` pair denies the whole tool.
#[must_use]
pub fn is_tool_allowed(tool: &Tool, configuration: &Configuration) -> bool {
    tool.actions
        .iter()
        .all(|action| configuration.actions.allows(action.resource, action.permission))
}
