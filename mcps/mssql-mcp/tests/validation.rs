//! Pipeline tests for the guarded MSSQL query tool.
//!
//! These run the full decorator chain (guard over a deterministic stub
//! adapter) without a live database; engine-backed tests live behind
//! `--ignored` below.

use std::sync::Arc;

use mssql_mcp::policy::validation_policy;
use query_core::{
    run_query, GuardKind, QueryError, QueryRequest, Row, StubAdapter, ValidatedAdapter,
};
use serde_json::json;

fn request(query: &str, max_rows: Option<u32>) -> QueryRequest {
    QueryRequest {
        database: "master".into(),
        query: query.into(),
        max_rows,
    }
}

fn pipeline(rows: usize) -> (Arc<StubAdapter>, ValidatedAdapter<Arc<StubAdapter>>) {
    let stub = Arc::new(StubAdapter::with_rows(rows));
    let validated = ValidatedAdapter::new(Arc::clone(&stub), validation_policy().unwrap());
    (stub, validated)
}

#[tokio::test]
async fn dml_is_rejected_before_the_adapter_is_ever_called() {
    let (stub, validated) = pipeline(3);

    let err = run_query(&validated, request("INSERT INTO dbo.AuditLog VALUES (1)", None))
        .await
        .unwrap_err();

    match err {
        QueryError::Rejected(guard_err) => {
            assert_eq!(guard_err.kind, GuardKind::DeniedStatement("DML".into()));
            assert!(guard_err.reason.contains("DML"));
        }
        other => panic!("expected a guard rejection, got {other:?}"),
    }
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn multi_statement_text_is_rejected_with_zero_calls() {
    let (stub, validated) = pipeline(3);

    let err = run_query(
        &validated,
        request("SELECT name FROM sys.databases; SELECT * FROM sys.tables", None),
    )
    .await
    .unwrap_err();

    match err {
        QueryError::Rejected(guard_err) => {
            assert_eq!(guard_err.kind, GuardKind::MultiStatement);
            assert!(guard_err.reason.contains("single SQL statement"));
        }
        other => panic!("expected a guard rejection, got {other:?}"),
    }
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn clean_select_returns_the_adapter_rows_unmodified() {
    let mut first = Row::new();
    first.insert("name".into(), json!("sys.tables"));
    first.insert("object_id".into(), json!(42));
    let mut second = Row::new();
    second.insert("name".into(), json!("sys.columns"));
    second.insert("object_id".into(), json!(7));

    let stub = Arc::new(StubAdapter::new(vec![first.clone(), second.clone()]));
    let validated = ValidatedAdapter::new(Arc::clone(&stub), validation_policy().unwrap());

    let envelope = run_query(&validated, request("SELECT name FROM sys.tables", None))
        .await
        .unwrap();

    assert_eq!(envelope.query_result, vec![first, second]);
    assert_eq!(envelope.row_count, 2);
    assert_eq!(stub.calls(), 1);
    assert!(envelope.started_at <= envelope.completed_at);
}

#[tokio::test]
async fn max_rows_caps_a_large_result() {
    let (stub, validated) = pipeline(120);

    let envelope = run_query(&validated, request("SELECT * FROM employees", Some(5)))
        .await
        .unwrap();

    assert_eq!(envelope.query_result.len(), 5);
    assert_eq!(envelope.row_count, 5);
    assert_eq!(envelope.query_result[0]["id"], json!(1));
    assert_eq!(envelope.query_result[4]["id"], json!(5));
    assert_eq!(stub.calls(), 1);
}

#[tokio::test]
async fn sequential_invocations_get_distinct_correlation_ids() {
    let (_, validated) = pipeline(1);

    let first = run_query(&validated, request("SELECT 1", None)).await.unwrap();
    let second = run_query(&validated, request("SELECT 1", None)).await.unwrap();
    assert_ne!(first.correlation_id, second.correlation_id);
}

#[tokio::test]
async fn envelope_text_round_trips() {
    let (_, validated) = pipeline(2);

    let envelope = run_query(&validated, request("SELECT 1", None)).await.unwrap();
    let parsed = query_core::QueryResponseEnvelope::from_text(&envelope.to_text().unwrap()).unwrap();
    assert_eq!(parsed, envelope);
}

// ============================================================================
// Live-engine tests (require a reachable MSSQL instance)
// ============================================================================

#[tokio::test]
#[ignore = "integration test - requires MSSQL_CONNECTION_STRING and a live server"]
async fn live_select_one_row() {
    use mssql_mcp::adapter::MssqlAdapter;
    use mssql_mcp::config::MssqlConfig;

    let config = match MssqlConfig::load() {
        Ok(config) => config,
        Err(_) => {
            eprintln!("Skipping: MSSQL_CONNECTION_STRING not set");
            return;
        }
    };

    let adapter = ValidatedAdapter::new(
        MssqlAdapter::connect(&config).await.unwrap(),
        validation_policy().unwrap(),
    );
    let envelope = run_query(&adapter, request("SELECT name FROM sys.databases", Some(1)))
        .await
        .unwrap();
    assert_eq!(envelope.row_count, 1);
}
