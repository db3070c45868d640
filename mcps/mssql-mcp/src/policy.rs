//! The MSSQL denylist policy.
//!
//! Categories are checked in declaration order; the first matching category
//! wins. Tokens with a `#` or `_` match as raw substrings (temp-table sigils,
//! system-procedure prefixes), multi-word tokens match against
//! whitespace-collapsed text, single words at word boundaries.

use query_core::{PolicyError, ValidationPolicy};

pub fn validation_policy() -> Result<ValidationPolicy, PolicyError> {
    ValidationPolicy::builder("mssql-denylist-v1")
        .statements("DDL", ["create", "alter", "drop", "truncate"])
        .statements("DML", ["insert", "update", "delete", "merge"])
        .statements(
            "TRANSACTION",
            ["begin tran", "begin transaction", "commit", "rollback", "save tran"],
        )
        .statements("PROCEDURE", ["exec", "execute", "sp_", "call"])
        .statements("BATCH_SEPARATOR", ["go"])
        .statements("SECURITY", ["grant", "revoke"])
        .statements("BACKUP", ["backup", "restore"])
        .statements("TEMP_TABLE", ["into #", "into temp", "#"])
        .tokens(["use ", "dbcc", "trigger", "identity_insert", "open tran", "close tran"])
        .pattern(
            "SELECT_INTO",
            r"(?i)select\s+.+\s+into\s+",
            "SELECT ... INTO is not allowed",
        )
        .pattern("TEMP_TABLE_PATTERN", r"(?i)#\w+", "Temporary tables are not allowed")
        .pattern(
            "PROCEDURE_EXEC",
            r"(?i)exec\s+\w+",
            "Stored procedures are not allowed",
        )
        .multi_statement_guard(
            "MULTI_STATEMENT_SEMICOLON",
            r";\s*\S+",
            "Only a single SQL statement may be executed per request",
        )
        .multi_statement_guard(
            "MULTI_STATEMENT_GO",
            r"(?i)\bGO\b",
            "Batch separators such as GO are forbidden",
        )
        .message("DDL", "DDL statements (CREATE/ALTER/DROP/TRUNCATE) are forbidden")
        .message("DML", "DML statements (INSERT/UPDATE/DELETE/MERGE) are forbidden")
        .message("TRANSACTION", "Transaction control statements are forbidden")
        .message("PROCEDURE", "Stored procedures are forbidden")
        .message("BATCH_SEPARATOR", "Batch separators such as GO are forbidden")
        .message("SECURITY", "Privilege changes (GRANT/REVOKE) are not allowed")
        .message("BACKUP", "Backup and restore operations are not allowed")
        .message("TEMP_TABLE", "Temporary tables are not allowed")
        .message("DENIED_TOKEN", "Query contains a forbidden statement")
        .message("MULTI_STATEMENT", "Only a single SQL statement may be executed per request")
        .message("MISSING_DATABASE", "database field is required")
        .message("MISSING_QUERY", "query field is required")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_core::{guard, GuardKind, QueryRequest};

    fn check(query: &str) -> Result<(), query_core::GuardError> {
        let request = QueryRequest {
            database: "master".into(),
            query: query.into(),
            max_rows: None,
        };
        guard::validate(&request, &validation_policy().unwrap())
    }

    #[test]
    fn plain_selects_pass() {
        assert!(check("SELECT name FROM sys.tables").is_ok());
        assert!(check("SELECT TOP 10 * FROM information_schema.columns;").is_ok());
    }

    #[test]
    fn ddl_and_dml_are_rejected_with_their_category() {
        let err = check("DROP TABLE dbo.Users").unwrap_err();
        assert_eq!(err.kind, GuardKind::DeniedStatement("DDL".into()));

        let err = check("INSERT INTO dbo.AuditLog VALUES (1)").unwrap_err();
        assert_eq!(err.kind, GuardKind::DeniedStatement("DML".into()));
        assert!(err.reason.contains("DML"));
    }

    #[test]
    fn transaction_control_is_rejected_even_spread_out() {
        let err = check("BEGIN   \n TRANSACTION").unwrap_err();
        assert_eq!(err.kind, GuardKind::DeniedStatement("TRANSACTION".into()));
    }

    #[test]
    fn go_batch_separator_is_a_multi_statement_violation() {
        let err = check("SELECT 1\nGO\nSELECT 2").unwrap_err();
        assert_eq!(err.kind, GuardKind::MultiStatement);
        assert!(err.reason.contains("GO"));
    }

    #[test]
    fn semicolon_separated_statements_are_rejected() {
        let err =
            check("SELECT name FROM sys.databases; SELECT * FROM sys.tables").unwrap_err();
        assert_eq!(err.kind, GuardKind::MultiStatement);
        assert!(err.reason.contains("single SQL statement"));
    }

    #[test]
    fn system_procedure_prefix_is_caught_anywhere() {
        let err = check("SELECT * FROM t WHERE x = 'sp_help'").unwrap_err();
        assert_eq!(err.kind, GuardKind::DeniedStatement("PROCEDURE".into()));
    }

    #[test]
    fn temp_table_sigil_is_rejected() {
        let err = check("SELECT * INTO #tmp FROM dbo.Orders").unwrap_err();
        assert_eq!(err.kind, GuardKind::DeniedStatement("TEMP_TABLE".into()));
    }

    #[test]
    fn dbcc_is_a_denied_token() {
        let err = check("DBCC CHECKDB('master')").unwrap_err();
        assert_eq!(err.kind, GuardKind::DeniedToken);
    }

    #[test]
    fn recall_is_not_call() {
        assert!(check("SELECT recall_count FROM sys.dm_os_counters").is_ok());
    }
}
