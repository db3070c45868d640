//! Error taxonomy for the guard, the adapter pipeline, and policy construction.

use thiserror::Error;

/// Characters of the offending query echoed back in a rejection message.
const ECHO_LIMIT: usize = 180;

/// What tripped the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardKind {
    /// `database` or `query` was blank after trimming; carries the field name.
    MissingField(&'static str),
    /// The text contains more than one statement or a batch separator.
    MultiStatement,
    /// A token from the named denylist category matched.
    DeniedStatement(String),
    /// A token from the flat denylist matched.
    DeniedToken,
    /// A denylist regex matched; carries the pattern id.
    DeniedPattern(String),
    /// A scoped policy saw no permitted namespace reference.
    ScopeViolation,
}

/// A request rejected by the query guard before any engine I/O.
///
/// The display form embeds a whitespace-collapsed echo of the query so the
/// caller can see what was rejected without a log round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("**Validation Error** ~~{echo}~~ — {reason}")]
pub struct GuardError {
    pub kind: GuardKind,
    pub reason: String,
    pub echo: String,
}

impl GuardError {
    pub fn new(kind: GuardKind, reason: impl Into<String>, query: &str) -> Self {
        Self {
            kind,
            reason: reason.into(),
            echo: query_echo(query),
        }
    }
}

fn query_echo(query: &str) -> String {
    let normalized = crate::guard::collapse_whitespace(query);
    if normalized.is_empty() {
        "[empty query]".to_string()
    } else if normalized.chars().count() > ECHO_LIMIT {
        let mut echo: String = normalized.chars().take(ECHO_LIMIT - 3).collect();
        echo.push_str("...");
        echo
    } else {
        normalized
    }
}

/// Failure surfaced by the adapter pipeline.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Rejected by the guard; the wrapped adapter was never invoked.
    #[error(transparent)]
    Rejected(#[from] GuardError),

    /// Relayed engine/driver failure, identity and message preserved verbatim.
    #[error(transparent)]
    Engine(#[from] anyhow::Error),
}

/// Malformed policy definition, raised at startup rather than per request.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("invalid pattern '{id}': {source}")]
    InvalidPattern {
        id: String,
        #[source]
        source: regex::Error,
    },

    #[error("blank token in '{category}'")]
    BlankToken { category: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_is_collapsed_and_capped() {
        let query = format!("select   {}\n from t", "x".repeat(400));
        let err = GuardError::new(GuardKind::MultiStatement, "nope", &query);
        assert_eq!(err.echo.chars().count(), 180);
        assert!(err.echo.ends_with("..."));
        assert!(err.echo.starts_with("select x"));
    }

    #[test]
    fn blank_query_echoes_placeholder() {
        let err = GuardError::new(GuardKind::MissingField("query"), "query field is required", "  ");
        assert_eq!(err.echo, "[empty query]");
        assert_eq!(
            err.to_string(),
            "**Validation Error** ~~[empty query]~~ — query field is required"
        );
    }

    #[test]
    fn short_queries_echo_unchanged() {
        let err = GuardError::new(GuardKind::DeniedToken, "no", "SELECT 1");
        assert_eq!(err.echo, "SELECT 1");
    }
}
