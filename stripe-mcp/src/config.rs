//! Optional TOML configuration file.
//!
//! Holds the same settings as the command line. String values may reference
//! environment variables with `$VAR` or `${VAR}` syntax.
//!
//! # Example Configuration
//!
//! ```toml
//! api_key = "$STRIPE_SECRET_KEY"
//! tools = ["customers.create", "customers.read", "balance.read"]
//! stripe_account = "acct_123"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Settings read from a configuration file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Stripe secret key.
    #[serde(default, alias = "api-key")]
    pub api_key: Option<String>,

    /// Tool list in `resource.permission` form, or `["all"]`.
    #[serde(default)]
    pub tools: Option<Vec<String>>,

    /// Connected account to act on behalf of.
    #[serde(default, alias = "stripe-account")]
    pub stripe_account: Option<String>,
}

/// Errors loading the configuration file.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`FileConfig`].
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl FileConfig {
    /// Loads and parses the file at `path`, expanding variables from the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&content, |name| std::env::var(name).ok())
    }

    /// Parses TOML text, expanding variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the expanded text is not valid.
    pub fn parse(
        content: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let expanded = expand_vars(content, lookup);
        Ok(toml::from_str(&expanded)?)
    }
}

/// Expands `$VAR` and `${VAR}` patterns using `lookup`.
///
/// Unresolved variables are left as-is.
fn expand_vars(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }

        let braced = chars.next_if_eq(&'{').is_some();
        let mut name = String::new();
        let mut closed = false;
        while let Some(&c) = chars.peek() {
            if braced {
                chars.next();
                if c == '}' {
                    closed = true;
                    break;
                }
            } else if c.is_ascii_alphanumeric() || c == '_' {
                chars.next();
            } else {
                break;
            }
            name.push(c);
        }

        let complete = !name.is_empty() && (closed || !braced);
        match complete.then(|| lookup(&name)).flatten() {
            Some(value) => result.push_str(&value),
            None => {
                result.push('$');
                if braced {
                    result.push('{');
                }
                result.push_str(&name);
                if closed {
                    result.push('}');
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(name: &str) -> Option<String> {
        match name {
            "KEY" => Some("sk_test_abc".to_owned()),
            "ACCOUNT" => Some("acct_9".to_owned()),
            _ => None,
        }
    }

    #[test]
    fn test_expand_vars() {
        assert_eq!(expand_vars("$KEY", env), "sk_test_abc");
        assert_eq!(expand_vars("${KEY}-x", env), "sk_test_abc-x");
        assert_eq!(expand_vars("a $MISSING b", env), "a $MISSING b");
        assert_eq!(expand_vars("${MISSING}", env), "${MISSING}");
        assert_eq!(expand_vars("cost $ 5", env), "cost $ 5");
        assert_eq!(expand_vars("${KEY", env), "${KEY");
    }

    #[test]
    fn test_parse_full_file() {
        let content = r#"
api_key = "$KEY"
tools = ["customers.create", "balance.read"]
stripe_account = "${ACCOUNT}"
"#;
        let config = FileConfig::parse(content, env).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk_test_abc"));
        assert_eq!(
            config.tools,
            Some(vec!["customers.create".to_owned(), "balance.read".to_owned()])
        );
        assert_eq!(config.stripe_account.as_deref(), Some("acct_9"));
    }

    #[test]
    fn test_parse_kebab_case_keys() {
        let config = FileConfig::parse("api-key = \"sk_test_1\"\nstripe-account = \"acct_1\"", env)
            .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk_test_1"));
        assert_eq!(config.stripe_account.as_deref(), Some("acct_1"));
    }

    #[test]
    fn test_parse_empty_and_invalid() {
        assert_eq!(FileConfig::parse("", env).unwrap(), FileConfig::default());
        assert!(matches!(
            FileConfig::parse("port = 4021", env),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = FileConfig::load_from(Path::new("/nonexistent/stripe-mcp.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
