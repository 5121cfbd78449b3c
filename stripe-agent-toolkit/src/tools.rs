//! The tool catalog.
//!
//! [`tools`] builds the full, context-specialized catalog. Each [`Tool`]
//! pairs a [`Method`] with its human name, prompt, parameter shape, and the
//! permissions it needs. Filtering by permission lives in
//! [`crate::configuration::is_tool_allowed`].

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::api::{BoxFuture, PaymentApi};
use crate::configuration::{Action, Configuration, Context, Permission, Resource, is_tool_allowed};
use crate::error::OperationError;
use crate::operations::{
    balance, customers, documentation, invoice_items, invoices, payment_intents, payment_links,
    prices, products, refunds, subscriptions,
};
use crate::schema::ParameterShape;

/// Identifies one operation. The wire name is snake case (e.g. `create_customer`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `create_customer`
    CreateCustomer,
    /// `list_customers`
    ListCustomers,
    /// `create_product`
    CreateProduct,
    /// `list_products`
    ListProducts,
    /// `create_price`
    CreatePrice,
    /// `list_prices`
    ListPrices,
    /// `create_payment_link`
    CreatePaymentLink,
    /// `create_invoice`
    CreateInvoice,
    /// `list_invoices`
    ListInvoices,
    /// `create_invoice_item`
    CreateInvoiceItem,
    /// `finalize_invoice`
    FinalizeInvoice,
    /// `retrieve_balance`
    RetrieveBalance,
    /// `create_refund`
    CreateRefund,
    /// `list_payment_intents`
    ListPaymentIntents,
    /// `list_subscriptions`
    ListSubscriptions,
    /// `search_documentation`
    SearchDocumentation,
}

type OperationFuture<'a> = BoxFuture<'a, Result<Value, OperationError>>;

impl Method {
    /// Every method, in catalog order.
    pub const ALL: [Self; 16] = [
        Self::CreateCustomer,
        Self::ListCustomers,
        Self::CreateProduct,
        Self::ListProducts,
        Self::CreatePrice,
        Self::ListPrices,
        Self::CreatePaymentLink,
        Self::CreateInvoice,
        Self::ListInvoices,
        Self::CreateInvoiceItem,
        Self::FinalizeInvoice,
        Self::RetrieveBalance,
        Self::CreateRefund,
        Self::ListPaymentIntents,
        Self::ListSubscriptions,
        Self::SearchDocumentation,
    ];

    /// The wire name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateCustomer => "create_customer",
            Self::ListCustomers => "list_customers",
            Self::CreateProduct => "create_product",
            Self::ListProducts => "list_products",
            Self::CreatePrice => "create_price",
            Self::ListPrices => "list_prices",
            Self::CreatePaymentLink => "create_payment_link",
            Self::CreateInvoice => "create_invoice",
            Self::ListInvoices => "list_invoices",
            Self::CreateInvoiceItem => "create_invoice_item",
            Self::FinalizeInvoice => "finalize_invoice",
            Self::RetrieveBalance => "retrieve_balance",
            Self::CreateRefund => "create_refund",
            Self::ListPaymentIntents => "list_payment_intents",
            Self::ListSubscriptions => "list_subscriptions",
            Self::SearchDocumentation => "search_documentation",
        }
    }

    /// Runs the operation with already-validated parameters.
    pub fn invoke<'a>(
        self,
        api: &'a dyn PaymentApi,
        context: &'a Context,
        params: Map<String, Value>,
    ) -> OperationFuture<'a> {
        match self {
            Self::CreateCustomer => Box::pin(customers::create_customer(api, context, params)),
            Self::ListCustomers => Box::pin(customers::list_customers(api, context, params)),
            Self::CreateProduct => Box::pin(products::create_product(api, context, params)),
            Self::ListProducts => Box::pin(products::list_products(api, context, params)),
            Self::CreatePrice => Box::pin(prices::create_price(api, context, params)),
            Self::ListPrices => Box::pin(prices::list_prices(api, context, params)),
            Self::CreatePaymentLink => {
                Box::pin(payment_links::create_payment_link(api, context, params))
            }
            Self::CreateInvoice => Box::pin(invoices::create_invoice(api, context, params)),
            Self::ListInvoices => Box::pin(invoices::list_invoices(api, context, params)),
            Self::CreateInvoiceItem => {
                Box::pin(invoice_items::create_invoice_item(api, context, params))
            }
            Self::FinalizeInvoice => Box::pin(invoices::finalize_invoice(api, context, params)),
            Self::RetrieveBalance => Box::pin(balance::retrieve_balance(api, context, params)),
            Self::CreateRefund => Box::pin(refunds::create_refund(api, context, params)),
            Self::ListPaymentIntents => {
                Box::pin(payment_intents::list_payment_intents(api, context, params))
            }
            Self::ListSubscriptions => {
                Box::pin(subscriptions::list_subscriptions(api, context, params))
            }
            Self::SearchDocumentation => {
                Box::pin(documentation::search_documentation(api, context, params))
            }
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = crate::error::ToolkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| crate::error::ToolkitError::InvalidMethod(s.to_owned()))
    }
}

/// One catalog entry, specialized to a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    /// Operation identifier.
    pub method: Method,
    /// Human name, e.g. `"Create Customer"`.
    pub name: &'static str,
    /// Prompt text describing the tool and its arguments.
    pub description: String,
    /// Accepted arguments.
    pub parameters: ParameterShape,
    /// Permissions the tool requires. All must be granted.
    pub actions: &'static [Action],
}

struct Entry {
    method: Method,
    name: &'static str,
    parameters: fn(&Context) -> ParameterShape,
    prompt: fn(&Context) -> String,
    actions: &'static [Action],
}

const fn action(resource: Resource, permission: Permission) -> Action {
    Action::new(resource, permission)
}

const CATALOG: [Entry; 16] = [
    Entry {
        method: Method::CreateCustomer,
        name: "Create Customer",
        parameters: customers::create_customer_parameters,
        prompt: customers::create_customer_prompt,
        actions: &[action(Resource::Customers, Permission::Create)],
    },
    Entry {
        method: Method::ListCustomers,
        name: "List Customers",
        parameters: customers::list_customers_parameters,
        prompt: customers::list_customers_prompt,
        actions: &[action(Resource::Customers, Permission::Read)],
    },
    Entry {
        method: Method::CreateProduct,
        name: "Create Product",
        parameters: products::create_product_parameters,
        prompt: products::create_product_prompt,
        actions: &[action(Resource::Products, Permission::Create)],
    },
    Entry {
        method: Method::ListProducts,
        name: "List Products",
        parameters: products::list_products_parameters,
        prompt: products::list_products_prompt,
        actions: &[action(Resource::Products, Permission::Read)],
    },
    Entry {
        method: Method::CreatePrice,
        name: "Create Price",
        parameters: prices::create_price_parameters,
        prompt: prices::create_price_prompt,
        actions: &[action(Resource::Prices, Permission::Create)],
    },
    Entry {
        method: Method::ListPrices,
        name: "List Prices",
        parameters: prices::list_prices_parameters,
        prompt: prices::list_prices_prompt,
        actions: &[action(Resource::Prices, Permission::Read)],
    },
    Entry {
        method: Method::CreatePaymentLink,
        name: "Create Payment Link",
        parameters: payment_links::create_payment_link_parameters,
        prompt: payment_links::create_payment_link_prompt,
        actions: &[action(Resource::PaymentLinks, Permission::Create)],
    },
    Entry {
        method: Method::CreateInvoice,
        name: "Create Invoice",
        parameters: invoices::create_invoice_parameters,
        prompt: invoices::create_invoice_prompt,
        actions: &[action(Resource::Invoices, Permission::Create)],
    },
    Entry {
        method: Method::ListInvoices,
        name: "List Invoices",
        parameters: invoices::list_invoices_parameters,
        prompt: invoices::list_invoices_prompt,
        actions: &[action(Resource::Invoices, Permission::Read)],
    },
    Entry {
        method: Method::CreateInvoiceItem,
        name: "Create Invoice Item",
        parameters: invoice_items::create_invoice_item_parameters,
        prompt: invoice_items::create_invoice_item_prompt,
        actions: &[action(Resource::InvoiceItems, Permission::Create)],
    },
    Entry {
        method: Method::FinalizeInvoice,
        name: "Finalize Invoice",
        parameters: invoices::finalize_invoice_parameters,
        prompt: invoices::finalize_invoice_prompt,
        actions: &[action(Resource::Invoices, Permission::Update)],
    },
    Entry {
        method: Method::RetrieveBalance,
        name: "Retrieve Balance",
        parameters: balance::retrieve_balance_parameters,
        prompt: balance::retrieve_balance_prompt,
        actions: &[action(Resource::Balance, Permission::Read)],
    },
    Entry {
        method: Method::CreateRefund,
        name: "Create Refund",
        parameters: refunds::create_refund_parameters,
        prompt: refunds::create_refund_prompt,
        actions: &[action(Resource::Refunds, Permission::Create)],
    },
    Entry {
        method: Method::ListPaymentIntents,
        name: "List Payment Intents",
        parameters: payment_intents::list_payment_intents_parameters,
        prompt: payment_intents::list_payment_intents_prompt,
        actions: &[action(Resource::PaymentIntents, Permission::Read)],
    },
    Entry {
        method: Method::ListSubscriptions,
        name: "List Subscriptions",
        parameters: subscriptions::list_subscriptions_parameters,
        prompt: subscriptions::list_subscriptions_prompt,
        actions: &[action(Resource::Subscriptions, Permission::Read)],
    },
    Entry {
        method: Method::SearchDocumentation,
        name: "Search Documentation",
        parameters: documentation::search_documentation_parameters,
        prompt: documentation::search_documentation_prompt,
        actions: &[action(Resource::Documentation, Permission::Read)],
    },
];

/// Builds the full catalog for `context`, in a fixed order.
#[must_use]
pub fn tools(context: &Context) -> Vec<Tool> {
    CATALOG
        .iter()
        .map(|entry| Tool {
            method: entry.method,
            name: entry.name,
            description: (entry.prompt)(context),
            parameters: (entry.parameters)(context),
            actions: entry.actions,
        })
        .collect()
}

/// The catalog for `configuration.context`, keeping only permitted tools.
#[must_use]
pub fn filter_tools(configuration: &Configuration) -> Vec<Tool> {
    tools(&configuration.context)
        .into_iter()
        .filter(|tool| is_tool_allowed(tool, configuration))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::Actions;

    /// Argument names listed by a prompt, in order.
    fn prompt_arguments(prompt: &str) -> Vec<&str> {
        prompt
            .lines()
            .filter_map(|line| line.strip_prefix("- "))
            .filter_map(|line| line.split_once(" (").map(|(name, _)| name))
            .collect()
    }

    #[test]
    fn test_prompt_arguments_match_parameters() {
        for context in [Context::default(), Context::default().with_customer("cus_123")] {
            for tool in tools(&context) {
                assert_eq!(
                    prompt_arguments(&tool.description),
                    tool.parameters.field_names(),
                    "{} (customer: {:?})",
                    tool.method,
                    context.customer
                );
            }
        }
    }

    #[test]
    fn test_customer_context_hides_customer_field() {
        let context = Context::default().with_customer("cus_123");
        for tool in tools(&context) {
            assert!(tool.parameters.field("customer").is_none(), "{}", tool.method);
        }
        let with_customer: Vec<Method> = tools(&Context::default())
            .into_iter()
            .filter(|tool| tool.parameters.field("customer").is_some())
            .map(|tool| tool.method)
            .collect();
        assert_eq!(
            with_customer,
            [
                Method::CreateInvoice,
                Method::ListInvoices,
                Method::CreateInvoiceItem,
                Method::ListPaymentIntents,
                Method::ListSubscriptions,
            ]
        );
    }

    #[test]
    fn test_catalog_is_deterministic() {
        let names: Vec<&str> = tools(&Context::default())
            .iter()
            .map(|tool| tool.method.as_str())
            .collect();
        let expected: Vec<&str> = Method::ALL.iter().map(|m| m.as_str()).collect();
        assert_eq!(names, expected);
        assert_eq!(tools(&Context::default()), tools(&Context::default()));
    }

    #[test]
    fn test_every_tool_declares_actions() {
        for tool in tools(&Context::default()) {
            assert!(!tool.actions.is_empty(), "{}", tool.method);
        }
    }

    #[test]
    fn test_filter_tools_by_grants() {
        let mut actions = Actions::new();
        actions
            .grant(Resource::Customers, Permission::Create)
            .grant(Resource::Invoices, Permission::Update);
        let configuration = Configuration::new(actions, Context::default());

        let methods: Vec<Method> = filter_tools(&configuration)
            .into_iter()
            .map(|tool| tool.method)
            .collect();
        assert_eq!(methods, [Method::CreateCustomer, Method::FinalizeInvoice]);
        assert!(filter_tools(&Configuration::default()).is_empty());
    }

    #[test]
    fn test_method_round_trips_through_name() {
        for method in Method::ALL {
            assert_eq!(method.as_str().parse::<Method>().unwrap(), method);
        }
        assert!("delete_customer".parse::<Method>().is_err());
    }
}
