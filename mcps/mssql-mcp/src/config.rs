//! Connection configuration sourced from the environment.
//!
//! A malformed or missing connection string fails at startup, never per
//! request.

use anyhow::{bail, Context, Result};
use regex::Regex;

/// Environment variable holding the ADO-style connection string.
pub const CONNECTION_ENV_KEY: &str = "MSSQL_CONNECTION_STRING";

/// Validated connection descriptor for the base adapter.
#[derive(Debug, Clone)]
pub struct MssqlConfig {
    pub env_var_name: &'static str,
    pub raw_connection_string: String,
}

impl MssqlConfig {
    /// Loads the connection string from [`CONNECTION_ENV_KEY`].
    pub fn load() -> Result<Self> {
        let raw = std::env::var(CONNECTION_ENV_KEY).with_context(|| {
            format!("Missing {CONNECTION_ENV_KEY} environment variable; set it before starting the server")
        })?;
        Self::from_value(&raw)
    }

    /// Validates a raw connection string.
    ///
    /// The string must carry both a server segment (`Server=` or
    /// `Data Source=`) and a database segment (`Database=` or
    /// `Initial Catalog=`).
    pub fn from_value(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            bail!("{CONNECTION_ENV_KEY} is empty");
        }

        let server_segment = Regex::new(r"(?i)(Server|Data Source)\s*=")?;
        let database_segment = Regex::new(r"(?i)(Database|Initial Catalog)\s*=")?;
        if !server_segment.is_match(trimmed) || !database_segment.is_match(trimmed) {
            bail!(
                "{CONNECTION_ENV_KEY} must include both Server= (or Data Source=) and \
                 Database= (or Initial Catalog=) segments"
            );
        }

        Ok(Self {
            env_var_name: CONNECTION_ENV_KEY,
            raw_connection_string: trimmed.to_string(),
        })
    }
}
