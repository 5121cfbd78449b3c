//! Command-line arguments and their resolution into a toolkit configuration.

use std::path::PathBuf;

use clap::Parser;
use stripe_agent_toolkit::configuration::{Action, Actions, Context, Permission, Resource};
use stripe_agent_toolkit::Configuration;

use crate::config::{ConfigError, FileConfig};

/// Tools that can be enabled from the command line.
pub const ACCEPTED_TOOLS: [Action; 16] = [
    Action::new(Resource::Customers, Permission::Create),
    Action::new(Resource::Customers, Permission::Read),
    Action::new(Resource::Products, Permission::Create),
    Action::new(Resource::Products, Permission::Read),
    Action::new(Resource::Prices, Permission::Create),
    Action::new(Resource::Prices, Permission::Read),
    Action::new(Resource::PaymentLinks, Permission::Create),
    Action::new(Resource::Invoices, Permission::Create),
    Action::new(Resource::Invoices, Permission::Read),
    Action::new(Resource::Invoices, Permission::Update),
    Action::new(Resource::InvoiceItems, Permission::Create),
    Action::new(Resource::Balance, Permission::Read),
    Action::new(Resource::Refunds, Permission::Create),
    Action::new(Resource::PaymentIntents, Permission::Read),
    Action::new(Resource::Subscriptions, Permission::Read),
    Action::new(Resource::Documentation, Permission::Read),
];

/// Stripe MCP server over stdio.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "stripe-mcp", version, about)]
pub struct Cli {
    /// Stripe secret key (must start with `sk_`).
    #[arg(long, env = "STRIPE_SECRET_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Comma-separated tools to enable, e.g. `customers.create,balance.read`, or `all`.
    #[arg(long, value_delimiter = ',')]
    pub tools: Option<Vec<String>>,

    /// Connected account to act on behalf of (must start with `acct_`).
    #[arg(long)]
    pub stripe_account: Option<String>,

    /// Path to a TOML file with the same settings. Command-line values win.
    #[arg(long, env = "STRIPE_MCP_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Invalid or missing launch settings.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CliError {
    /// The secret key does not look like one.
    #[error("API key must start with \"sk_\".")]
    InvalidApiKey,
    /// The connected account does not look like one.
    #[error("Stripe account must start with \"acct_\".")]
    InvalidAccount,
    /// No tools were selected.
    #[error("The --tools arguments must be provided.")]
    MissingTools,
    /// A selected tool is not accepted.
    #[error("Invalid tool: {0}. Accepted tools are: {accepted}", accepted = accepted_tools())]
    InvalidTool(String),
    /// No secret key on the command line, in the environment, or in the file.
    #[error(
        "Stripe API key not provided. Please either pass it as an argument --api-key=$KEY or set the STRIPE_SECRET_KEY environment variable."
    )]
    MissingApiKey,
    /// The configuration file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Fully validated launch settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Stripe secret key.
    pub api_key: String,
    /// Permissions and context for the toolkit.
    pub configuration: Configuration,
}

impl Cli {
    /// Loads the configuration file, if any, and resolves the final settings.
    ///
    /// # Errors
    ///
    /// Returns [`CliError`] if the file cannot be loaded or a setting is invalid.
    pub fn into_settings(self) -> Result<Settings, CliError> {
        let file = match &self.config {
            Some(path) => FileConfig::load_from(path)?,
            None => FileConfig::default(),
        };
        self.resolve(file)
    }

    /// Merges command-line values over `file` and validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`CliError`] for the first invalid or missing setting.
    pub fn resolve(self, file: FileConfig) -> Result<Settings, CliError> {
        let api_key = self.api_key.or(file.api_key);
        let tools = self.tools.or(file.tools);
        let account = self.stripe_account.or(file.stripe_account);

        if api_key.as_deref().is_some_and(|key| !key.starts_with("sk_")) {
            return Err(CliError::InvalidApiKey);
        }
        if account.as_deref().is_some_and(|acct| !acct.starts_with("acct_")) {
            return Err(CliError::InvalidAccount);
        }
        let actions = parse_tools(&tools.ok_or(CliError::MissingTools)?)?;
        let api_key = api_key.ok_or(CliError::MissingApiKey)?;

        let mut context = Context::default();
        if let Some(account) = account {
            context = context.with_account(account);
        }

        Ok(Settings {
            api_key,
            configuration: Configuration::new(actions, context),
        })
    }
}

/// Grants every listed tool; `all` grants every accepted tool.
fn parse_tools(tools: &[String]) -> Result<Actions, CliError> {
    let mut selected = Vec::with_capacity(tools.len());
    let mut all = false;
    for tool in tools.iter().map(|tool| tool.trim()) {
        if tool == "all" {
            all = true;
            continue;
        }
        let action = ACCEPTED_TOOLS
            .into_iter()
            .find(|action| action.to_string() == tool)
            .ok_or_else(|| CliError::InvalidTool(tool.to_owned()))?;
        selected.push(action);
    }

    if all {
        return Ok(ACCEPTED_TOOLS.into_iter().collect());
    }
    Ok(selected.into_iter().collect())
}

fn accepted_tools() -> String {
    ACCEPTED_TOOLS
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
