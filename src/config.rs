//! Environment-driven service configuration.
//!
//! | Variable | Default | Meaning |
//! | --- | --- | --- |
//! | `TASKRELAY_BIND_ADDR` | `0.0.0.0:8080` | HTTP listen address |
//! | `TASKRELAY_DATABASE_URL` | unset | `PostgreSQL` URL; in-memory storage when unset |
//! | `TASKRELAY_DB_POOL_SIZE` | `8` | Maximum pooled connections |
//! | `TASKRELAY_WEBHOOK_SECRET` | required | Push webhook signing secret |
//! | `TASKRELAY_COMMAND_TOKEN` | required | Bearer token for `POST /commands` |
//! | `TASKRELAY_CHAT_PROVIDER` | `discord` | Provider that receives relayed messages |
//! | `DISCORD_BOT_TOKEN` / `SLACK_BOT_TOKEN` | unset | Backend credentials |
//! | `DISCORD_ENABLED` / `SLACK_ENABLED` | `true` | Backend switches |

use std::net::SocketAddr;

use secrecy::SecretString;
use thiserror::Error;

use crate::notification::domain::ProviderName;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_SIZE: u32 = 8;

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid value for {key}: {reason}")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Parse failure reason.
        reason: String,
    },
}

/// Credentials and switch for one notification backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Bot token, if configured.
    pub token: Option<SecretString>,
    /// Whether the backend may send.
    pub enabled: bool,
}

/// Complete service configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// HTTP listen address.
    pub bind_addr: SocketAddr,
    /// `PostgreSQL` URL. In-memory storage is used when absent.
    pub database_url: Option<SecretString>,
    /// Maximum pooled database connections.
    pub db_pool_size: u32,
    /// Shared secret for push webhook signatures.
    pub webhook_secret: SecretString,
    /// Bearer token accepted by the command endpoint.
    pub command_token: SecretString,
    /// Provider that receives relayed push events and command notices.
    pub chat_provider: ProviderName,
    /// Discord backend settings.
    pub discord: BackendConfig,
    /// Slack backend settings.
    pub slack: BackendConfig,
}

impl RelayConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a value
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, treating blank values as
    /// unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a value
    /// cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let secret = |key: &'static str| read(key).map(SecretString::from);
        let required = |key: &'static str| secret(key).ok_or(ConfigError::Missing(key));

        let bind_addr = parse_or(
            "TASKRELAY_BIND_ADDR",
            read("TASKRELAY_BIND_ADDR"),
            DEFAULT_BIND_ADDR,
        )?;
        let db_pool_size: u32 = parse_or(
            "TASKRELAY_DB_POOL_SIZE",
            read("TASKRELAY_DB_POOL_SIZE"),
            &DEFAULT_POOL_SIZE.to_string(),
        )?;
        if db_pool_size == 0 {
            return Err(ConfigError::Invalid {
                key: "TASKRELAY_DB_POOL_SIZE",
                reason: "pool size must be at least 1".to_owned(),
            });
        }
        let chat_provider = read("TASKRELAY_CHAT_PROVIDER").map_or_else(
            || Ok(ProviderName::discord()),
            |raw| {
                ProviderName::new(raw.trim()).map_err(|err| ConfigError::Invalid {
                    key: "TASKRELAY_CHAT_PROVIDER",
                    reason: err.to_string(),
                })
            },
        )?;

        Ok(Self {
            bind_addr,
            database_url: secret("TASKRELAY_DATABASE_URL"),
            db_pool_size,
            webhook_secret: required("TASKRELAY_WEBHOOK_SECRET")?,
            command_token: required("TASKRELAY_COMMAND_TOKEN")?,
            chat_provider,
            discord: BackendConfig {
                token: secret("DISCORD_BOT_TOKEN"),
                enabled: parse_flag("DISCORD_ENABLED", read("DISCORD_ENABLED"))?,
            },
            slack: BackendConfig {
                token: secret("SLACK_BOT_TOKEN"),
                enabled: parse_flag("SLACK_ENABLED", read("SLACK_ENABLED"))?,
            },
        })
    }
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .as_deref()
        .unwrap_or(default)
        .trim()
        .parse()
        .map_err(|err: T::Err| ConfigError::Invalid {
            key,
            reason: err.to_string(),
        })
}

fn parse_flag(key: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    match value.as_deref().map(|raw| raw.trim().to_ascii_lowercase()).as_deref() {
        None | Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(ConfigError::Invalid {
            key,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}
