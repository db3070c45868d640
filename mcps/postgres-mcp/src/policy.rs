//! The Postgres metadata-only policy.
//!
//! Two independent passes: a scope allowlist requiring the query to reference
//! at least one system-catalog namespace, and the denylist tables. Both must
//! pass. Categories are checked in declaration order; the first declared
//! category wins.

use query_core::{PolicyError, ValidationPolicy};

pub fn validation_policy() -> Result<ValidationPolicy, PolicyError> {
    ValidationPolicy::builder("postgres-metadata-only-v1")
        .scope_allowlist(
            [
                "pg_catalog",
                "information_schema",
                "pg_class",
                "pg_indexes",
                "pg_stat",
                "pg_namespace",
            ],
            "Only metadata queries targeting pg_catalog/information_schema objects are permitted",
        )
        .statements("DDL", ["create", "alter", "drop", "truncate", "comment on"])
        .statements("DML", ["insert", "update", "delete", "merge"])
        .statements(
            "TRANSACTION",
            ["begin", "commit", "rollback", "savepoint", "release savepoint"],
        )
        .statements("PROCEDURE", ["call", "do", "perform", "execute"])
        .statements("COPY", ["copy"])
        .statements("SECURITY", ["grant", "revoke", "set role", "reset role"])
        .statements("MAINTENANCE", ["vacuum", "analyze", "cluster", "reindex"])
        .statements("BATCH_SEPARATOR", [";"])
        .statements("LOCKING", ["lock table", "unlock"])
        .tokens([
            "listen",
            "notify",
            "set transaction",
            "set session",
            "reset session",
            "alter system",
            "pg_terminate_backend",
        ])
        .pattern(
            "SELECT_INTO",
            r"(?i)select\s+.+\s+into\s+",
            "SELECT ... INTO is not allowed",
        )
        .pattern(
            "TEMP_TABLE_PATTERN",
            r"(?i)temporary\s+table|temp\s+table|create\s+temp",
            "Temporary tables are not allowed",
        )
        .pattern("COPY_FROM", r"(?i)copy\s+.+\s+from", "COPY statements are forbidden")
        .multi_statement_guard(
            "MULTI_STATEMENT_SEMICOLON",
            r";\s*\S+",
            "Only a single SQL statement may be executed per request",
        )
        .message("DDL", "DDL statements are forbidden for metadata queries")
        .message("DML", "DML statements are forbidden for metadata queries")
        .message("TRANSACTION", "Transaction control statements are forbidden")
        .message("PROCEDURE", "Stored procedures/functions are forbidden")
        .message("COPY", "COPY statements are forbidden")
        .message("SECURITY", "Security/role changes are forbidden")
        .message("MAINTENANCE", "Maintenance operations (VACUUM/ANALYZE/etc.) are forbidden")
        .message("BATCH_SEPARATOR", "Batch separators are forbidden")
        .message("LOCKING", "Explicit locking statements are forbidden")
        .message("DENIED_TOKEN", "Query contains a forbidden statement")
        .message("MULTI_STATEMENT", "Only a single SQL statement may be executed per request")
        .message("MISSING_DATABASE", "database field is required")
        .message("MISSING_QUERY", "query field is required")
        .build()
}
