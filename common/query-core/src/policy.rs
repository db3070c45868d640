//! Declarative validation policies.
//!
//! A policy is pure configuration: denylist tables, regex patterns,
//! multi-statement guards, message templates, and optionally a scope
//! allowlist. Policies are built once at startup, compile every matcher up
//! front, and are immutable afterwards, so they can be shared across
//! concurrent invocations without locks.

use std::collections::HashMap;

use regex::Regex;

use crate::error::PolicyError;
use crate::guard::collapse_whitespace;

/// Message template keys shared by every policy.
pub mod template {
    pub const DENIED_TOKEN: &str = "DENIED_TOKEN";
    pub const MULTI_STATEMENT: &str = "MULTI_STATEMENT";
    pub const MISSING_DATABASE: &str = "MISSING_DATABASE";
    pub const MISSING_QUERY: &str = "MISSING_QUERY";
}

/// A named denylist regex.
#[derive(Debug, Clone)]
pub struct ValidationPattern {
    pub id: String,
    pub expression: Regex,
    pub message: Option<String>,
}

/// How a denied token is matched, chosen from its shape when the policy is
/// built.
#[derive(Debug, Clone)]
enum TokenMatcher {
    /// Sigil tokens (`#`, `sp_`): substring of the lowercased raw text, so
    /// temp-table sigils and system-procedure prefixes match anywhere.
    Raw,
    /// Multi-word tokens: substring of the whitespace-collapsed text.
    Collapsed,
    /// Single words: case-insensitive word-boundary match, so `call` cannot
    /// match inside `recall`.
    Word(Regex),
}

/// A single denied token with its precompiled matcher.
#[derive(Debug, Clone)]
pub struct TokenRule {
    token: String,
    matcher: TokenMatcher,
}

impl TokenRule {
    fn compile(raw: &str, category: &str) -> Result<Self, PolicyError> {
        let token = raw.trim().to_lowercase();
        if token.is_empty() {
            return Err(PolicyError::BlankToken {
                category: category.to_string(),
            });
        }

        let (token, matcher) = if token.contains('#') || token.contains('_') {
            (token, TokenMatcher::Raw)
        } else if token.contains(' ') {
            (collapse_whitespace(&token), TokenMatcher::Collapsed)
        } else {
            let expression = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(&token)))
                .map_err(|source| PolicyError::InvalidPattern {
                    id: token.clone(),
                    source,
                })?;
            (token, TokenMatcher::Word(expression))
        };

        Ok(Self { token, matcher })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// `lower` is the lowercased raw query, `collapsed` its
    /// whitespace-collapsed form.
    pub(crate) fn matches(&self, lower: &str, collapsed: &str) -> bool {
        match &self.matcher {
            TokenMatcher::Raw => lower.contains(&self.token),
            TokenMatcher::Collapsed => collapsed.contains(&self.token),
            TokenMatcher::Word(expression) => expression.is_match(lower),
        }
    }
}

/// An ordered denylist category.
#[derive(Debug, Clone)]
pub struct StatementCategory {
    pub name: String,
    pub rules: Vec<TokenRule>,
}

/// Independent allowlist pass for metadata-only policies: the query must
/// reference at least one permitted namespace.
#[derive(Debug, Clone)]
pub struct ScopeAllowlist {
    patterns: Vec<Regex>,
    message: String,
}

impl ScopeAllowlist {
    pub fn permits(&self, query: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(query))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Immutable denylist/allowlist ruleset consumed by the guard.
#[derive(Debug, Clone)]
pub struct ValidationPolicy {
    id: String,
    denied_statements: Vec<StatementCategory>,
    denied_tokens: Vec<TokenRule>,
    denied_patterns: Vec<ValidationPattern>,
    multi_statement_guards: Vec<ValidationPattern>,
    messages: HashMap<String, String>,
    scope: Option<ScopeAllowlist>,
}

impl ValidationPolicy {
    pub fn builder(id: &str) -> PolicyBuilder {
        PolicyBuilder::new(id)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn denied_statements(&self) -> &[StatementCategory] {
        &self.denied_statements
    }

    pub fn denied_tokens(&self) -> &[TokenRule] {
        &self.denied_tokens
    }

    pub fn denied_patterns(&self) -> &[ValidationPattern] {
        &self.denied_patterns
    }

    pub fn multi_statement_guards(&self) -> &[ValidationPattern] {
        &self.multi_statement_guards
    }

    pub fn scope(&self) -> Option<&ScopeAllowlist> {
        self.scope.as_ref()
    }

    /// Resolves a message template by category name or template key.
    pub fn message(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }
}

struct RawPattern {
    id: String,
    expression: String,
    message: Option<String>,
}

/// Collects the declarative tables, then compiles everything in [`build`].
///
/// [`build`]: PolicyBuilder::build
pub struct PolicyBuilder {
    id: String,
    statements: Vec<(String, Vec<String>)>,
    tokens: Vec<String>,
    patterns: Vec<RawPattern>,
    guards: Vec<RawPattern>,
    messages: Vec<(String, String)>,
    scope: Option<(Vec<String>, String)>,
}

impl PolicyBuilder {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            statements: Vec::new(),
            tokens: Vec::new(),
            patterns: Vec::new(),
            guards: Vec::new(),
            messages: Vec::new(),
            scope: None,
        }
    }

    /// Adds a denylist category. Categories are checked in the order they are
    /// declared; the first declared category wins when several would match.
    pub fn statements<'a>(
        mut self,
        name: &str,
        tokens: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        self.statements.push((
            name.to_string(),
            tokens.into_iter().map(str::to_string).collect(),
        ));
        self
    }

    /// Adds free-standing denied tokens, checked after every category.
    pub fn tokens<'a>(mut self, tokens: impl IntoIterator<Item = &'a str>) -> Self {
        self.tokens.extend(tokens.into_iter().map(str::to_string));
        self
    }

    /// Adds a denylist regex tested against the raw, case-preserved query.
    pub fn pattern(mut self, id: &str, expression: &str, message: &str) -> Self {
        self.patterns.push(RawPattern {
            id: id.to_string(),
            expression: expression.to_string(),
            message: Some(message.to_string()),
        });
        self
    }

    /// Adds a multi-statement guard, tested before any denylist rule.
    pub fn multi_statement_guard(mut self, id: &str, expression: &str, message: &str) -> Self {
        self.guards.push(RawPattern {
            id: id.to_string(),
            expression: expression.to_string(),
            message: Some(message.to_string()),
        });
        self
    }

    /// Registers a message template under a category name or template key.
    pub fn message(mut self, key: &str, text: &str) -> Self {
        self.messages.push((key.to_string(), text.to_string()));
        self
    }

    /// Requires the query to reference at least one of the given namespaces.
    pub fn scope_allowlist<'a>(
        mut self,
        namespaces: impl IntoIterator<Item = &'a str>,
        message: &str,
    ) -> Self {
        self.scope = Some((
            namespaces.into_iter().map(str::to_string).collect(),
            message.to_string(),
        ));
        self
    }

    /// Compiles every matcher; any malformed entry fails here, at startup.
    pub fn build(self) -> Result<ValidationPolicy, PolicyError> {
        let denied_statements = self
            .statements
            .into_iter()
            .map(|(name, tokens)| {
                let rules = tokens
                    .iter()
                    .map(|token| TokenRule::compile(token, &name))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(StatementCategory { name, rules })
            })
            .collect::<Result<Vec<_>, PolicyError>>()?;

        let denied_tokens = self
            .tokens
            .iter()
            .map(|token| TokenRule::compile(token, "deniedTokens"))
            .collect::<Result<Vec<_>, _>>()?;

        let denied_patterns = compile_patterns(self.patterns)?;
        let multi_statement_guards = compile_patterns(self.guards)?;

        let scope = match self.scope {
            Some((namespaces, message)) => {
                let patterns = namespaces
                    .iter()
                    .map(|namespace| {
                        Regex::new(&format!("(?i){}", regex::escape(namespace))).map_err(
                            |source| PolicyError::InvalidPattern {
                                id: namespace.clone(),
                                source,
                            },
                        )
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Some(ScopeAllowlist { patterns, message })
            }
            None => None,
        };

        Ok(ValidationPolicy {
            id: self.id,
            denied_statements,
            denied_tokens,
            denied_patterns,
            multi_statement_guards,
            messages: self.messages.into_iter().collect(),
            scope,
        })
    }
}

fn compile_patterns(raw: Vec<RawPattern>) -> Result<Vec<ValidationPattern>, PolicyError> {
    raw.into_iter()
        .map(|pattern| {
            let expression =
                Regex::new(&pattern.expression).map_err(|source| PolicyError::InvalidPattern {
                    id: pattern.id.clone(),
                    source,
                })?;
            Ok(ValidationPattern {
                id: pattern.id,
                expression,
                message: pattern.message,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_tokens_respect_boundaries() {
        let rule = TokenRule::compile("call", "PROCEDURE").unwrap();
        assert!(rule.matches("call my_proc", "call my_proc"));
        assert!(!rule.matches("select recall from t", "select recall from t"));
    }

    #[test]
    fn sigil_tokens_match_anywhere() {
        let rule = TokenRule::compile("sp_", "PROCEDURE").unwrap();
        assert!(rule.matches("exec sp_help", "exec sp_help"));
        let hash = TokenRule::compile("#", "TEMP_TABLE").unwrap();
        assert!(hash.matches("select * from #tmp", "select * from #tmp"));
    }

    #[test]
    fn multi_word_tokens_match_collapsed_text() {
        let rule = TokenRule::compile("begin transaction", "TRANSACTION").unwrap();
        let raw = "begin    \n transaction";
        assert!(rule.matches(raw, &collapse_whitespace(raw)));
    }

    #[test]
    fn blank_token_is_rejected_at_build() {
        let err = ValidationPolicy::builder("test")
            .statements("DDL", ["  "])
            .build()
            .unwrap_err();
        assert!(matches!(err, PolicyError::BlankToken { .. }));
    }

    #[test]
    fn malformed_pattern_is_rejected_at_build() {
        let err = ValidationPolicy::builder("test")
            .pattern("BAD", r"(unclosed", "nope")
            .build()
            .unwrap_err();
        assert!(matches!(err, PolicyError::InvalidPattern { .. }));
    }

    #[test]
    fn scope_allowlist_is_case_insensitive() {
        let policy = ValidationPolicy::builder("test")
            .scope_allowlist(["pg_catalog"], "metadata only")
            .build()
            .unwrap();
        let scope = policy.scope().unwrap();
        assert!(scope.permits("SELECT * FROM PG_CATALOG.pg_class"));
        assert!(!scope.permits("SELECT * FROM employees"));
    }

    #[test]
    fn message_lookup_falls_back_to_none() {
        let policy = ValidationPolicy::builder("test")
            .message("DDL", "DDL is forbidden")
            .build()
            .unwrap();
        assert_eq!(policy.message("DDL"), Some("DDL is forbidden"));
        assert_eq!(policy.message("DML"), None);
    }
}
