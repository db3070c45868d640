//! The query guard: rejects unsafe SQL before any connection is touched.
//!
//! Validation is a pure function over the request text and a policy. Checks
//! run in a fixed order (fields, scope, multi-statement, categories, flat
//! tokens, patterns) and the first matching rule wins; pass/fail is boolean
//! with no partial warnings.

use crate::error::{GuardError, GuardKind};
use crate::policy::{template, ValidationPolicy};
use crate::types::QueryRequest;

const MISSING_DATABASE: &str = "database field is required";
const MISSING_QUERY: &str = "query field is required";
const FORBIDDEN_STATEMENT: &str = "Query contains a forbidden statement";
const FORBIDDEN_PATTERN: &str = "Query contains a forbidden pattern";
const SINGLE_STATEMENT: &str = "Only a single SQL statement may be executed per request";

/// Validates a request against a policy without performing any I/O.
///
/// A rejected request never reaches an adapter; the returned error carries
/// the matched rule's message and an echo of the offending query.
pub fn validate(request: &QueryRequest, policy: &ValidationPolicy) -> Result<(), GuardError> {
    let query = request.query.as_str();

    if request.database.trim().is_empty() {
        return Err(GuardError::new(
            GuardKind::MissingField("database"),
            policy
                .message(template::MISSING_DATABASE)
                .unwrap_or(MISSING_DATABASE),
            query,
        ));
    }
    if query.trim().is_empty() {
        return Err(GuardError::new(
            GuardKind::MissingField("query"),
            policy
                .message(template::MISSING_QUERY)
                .unwrap_or(MISSING_QUERY),
            query,
        ));
    }

    // Scope and denylist are independent passes; both must pass.
    if let Some(scope) = policy.scope() {
        if !scope.permits(query) {
            return Err(GuardError::new(
                GuardKind::ScopeViolation,
                scope.message(),
                query,
            ));
        }
    }

    ensure_single_statement(query, policy)?;
    check_statements_and_tokens(query, policy)?;
    check_patterns(query, policy)
}

/// Runs first so later rules cannot misattribute fragments across statement
/// boundaries.
fn ensure_single_statement(query: &str, policy: &ValidationPolicy) -> Result<(), GuardError> {
    // Trailing semicolons close a single statement and are not a violation.
    let stripped = query.trim().trim_end_matches(';');

    for guard in policy.multi_statement_guards() {
        if guard.expression.is_match(stripped) {
            let reason = guard
                .message
                .as_deref()
                .or_else(|| policy.message(template::MULTI_STATEMENT))
                .unwrap_or(SINGLE_STATEMENT);
            return Err(GuardError::new(GuardKind::MultiStatement, reason, query));
        }
    }
    Ok(())
}

fn check_statements_and_tokens(
    query: &str,
    policy: &ValidationPolicy,
) -> Result<(), GuardError> {
    let lower = query.to_lowercase();
    let collapsed = collapse_whitespace(&lower);

    for category in policy.denied_statements() {
        for rule in &category.rules {
            if rule.matches(&lower, &collapsed) {
                let reason = policy
                    .message(&category.name)
                    .or_else(|| policy.message(template::DENIED_TOKEN))
                    .unwrap_or(FORBIDDEN_STATEMENT);
                return Err(GuardError::new(
                    GuardKind::DeniedStatement(category.name.clone()),
                    reason,
                    query,
                ));
            }
        }
    }

    for rule in policy.denied_tokens() {
        if rule.matches(&lower, &collapsed) {
            let reason = policy
                .message(template::DENIED_TOKEN)
                .unwrap_or(FORBIDDEN_STATEMENT);
            return Err(GuardError::new(GuardKind::DeniedToken, reason, query));
        }
    }
    Ok(())
}

fn check_patterns(query: &str, policy: &ValidationPolicy) -> Result<(), GuardError> {
    for pattern in policy.denied_patterns() {
        if pattern.expression.is_match(query) {
            let reason = pattern
                .message
                .as_deref()
                .or_else(|| policy.message(template::DENIED_TOKEN))
                .unwrap_or(FORBIDDEN_PATTERN);
            return Err(GuardError::new(
                GuardKind::DeniedPattern(pattern.id.clone()),
                reason,
                query,
            ));
        }
    }
    Ok(())
}

/// Collapses whitespace runs to single spaces and trims.
pub(crate) fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
