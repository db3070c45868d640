//! Postgres connection configuration sourced from the environment.
//!
//! A malformed or missing connection string fails at startup, never per
//! request.

use anyhow::{bail, Context, Result};
use url::Url;

/// Environment variable holding the connection URL.
pub const CONNECTION_ENV_KEY: &str = "POSTGRES_CONNECTION_STRING";

/// Validated connection descriptor for the base adapter.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub env_var_name: &'static str,
    pub raw_connection_string: String,
    pub ssl_mode: Option<String>,
}

impl PostgresConfig {
    /// Loads the connection URL from [`CONNECTION_ENV_KEY`].
    pub fn load() -> Result<Self> {
        let raw = std::env::var(CONNECTION_ENV_KEY).with_context(|| {
            format!("Missing {CONNECTION_ENV_KEY} environment variable; set it before starting the server")
        })?;
        Self::from_value(&raw)
    }

    /// Validates the URL form: a `postgres://` scheme, a host, and a database
    /// path segment.
    pub fn from_value(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            bail!("{CONNECTION_ENV_KEY} is empty");
        }

        let lower = trimmed.to_lowercase();
        if !lower.starts_with("postgres://") && !lower.starts_with("postgresql://") {
            bail!("{CONNECTION_ENV_KEY} must start with postgres:// or postgresql://");
        }

        let parsed = Url::parse(trimmed)
            .with_context(|| format!("{CONNECTION_ENV_KEY} is not a valid connection URL"))?;
        if parsed.host_str().map_or(true, str::is_empty) {
            bail!("{CONNECTION_ENV_KEY} must include a host component");
        }
        if parsed.path().trim_start_matches('/').is_empty() {
            bail!("{CONNECTION_ENV_KEY} must include a database path segment");
        }

        let ssl_mode = parsed
            .query_pairs()
            .find(|(key, _)| key == "sslmode")
            .map(|(_, value)| value.into_owned());

        Ok(Self {
            env_var_name: CONNECTION_ENV_KEY,
            raw_connection_string: trimmed.to_string(),
            ssl_mode,
        })
    }
}
