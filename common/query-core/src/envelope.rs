//! One invocation end to end: correlation id, timestamps, translation.

use chrono::Utc;
use rmcp::{
    model::{CallToolResult, Content},
    ErrorData as McpError,
};
use uuid::Uuid;

use crate::adapter::QueryAdapter;
use crate::error::QueryError;
use crate::types::{QueryRequest, QueryResponseEnvelope};

/// Runs one request through the adapter chain and wraps the result.
///
/// A fresh correlation id is generated per invocation; `started_at` is
/// stamped immediately before delegation and `completed_at` immediately
/// after. Failures are logged with the correlation id and propagated
/// unchanged; a completed envelope only exists for successful calls.
pub async fn run_query<A>(
    adapter: &A,
    request: QueryRequest,
) -> Result<QueryResponseEnvelope, QueryError>
where
    A: QueryAdapter + ?Sized,
{
    let correlation_id = Uuid::new_v4();
    let database = request.database.clone();

    tracing::debug!(%correlation_id, database = %database, "dispatching query");
    let started_at = Utc::now();

    let query_result = match adapter.execute(&request).await {
        Ok(rows) => rows,
        Err(error) => {
            tracing::error!(%correlation_id, database = %database, %error, "query execution failed");
            return Err(error);
        }
    };

    let completed_at = Utc::now();
    Ok(QueryResponseEnvelope {
        correlation_id,
        database,
        row_count: query_result.len(),
        query_result,
        started_at,
        completed_at,
    })
}

/// Outermost, caller-facing translation layer.
///
/// Converts a pipeline failure into a non-throwing, error-flagged tool result
/// with the failure's message as display text. This is the only layer that
/// swallows errors; everything beneath it propagates.
pub fn tool_response(
    result: Result<QueryResponseEnvelope, QueryError>,
) -> Result<CallToolResult, McpError> {
    match result {
        Ok(envelope) => {
            let text = envelope
                .to_text()
                .map_err(|e| McpError::internal_error(e.to_string(), None))?;
            Ok(CallToolResult::success(vec![Content::text(text)]))
        }
        Err(error) => Ok(CallToolResult::error(vec![Content::text(format!(
            "Tool execution failed: {error}"
        ))])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::StubAdapter;

    fn request(query: &str, max_rows: Option<u32>) -> QueryRequest {
        QueryRequest {
            database: "master".into(),
            query: query.into(),
            max_rows,
        }
    }

    #[tokio::test]
    async fn envelope_counts_and_echoes() {
        let stub = StubAdapter::with_rows(3);
        let envelope = run_query(&stub, request("SELECT 1", None)).await.unwrap();
        assert_eq!(envelope.database, "master");
        assert_eq!(envelope.row_count, 3);
        assert_eq!(envelope.row_count, envelope.query_result.len());
        assert!(envelope.started_at <= envelope.completed_at);
    }

    #[tokio::test]
    async fn correlation_ids_are_fresh_per_invocation() {
        let stub = StubAdapter::with_rows(1);
        let first = run_query(&stub, request("SELECT 1", None)).await.unwrap();
        let second = run_query(&stub, request("SELECT 1", None)).await.unwrap();
        assert_ne!(first.correlation_id, second.correlation_id);
    }

    #[tokio::test]
    async fn failures_produce_no_envelope() {
        use crate::adapter::ValidatedAdapter;
        use crate::policy::ValidationPolicy;

        let policy = ValidationPolicy::builder("test")
            .statements("DML", ["insert"])
            .message("DML", "DML statements are forbidden")
            .build()
            .unwrap();
        let validated = ValidatedAdapter::new(StubAdapter::with_rows(1), policy);

        let result = run_query(&validated, request("INSERT INTO t VALUES (1)", None)).await;
        assert!(matches!(result, Err(QueryError::Rejected(_))));
    }

    #[tokio::test]
    async fn success_response_carries_the_envelope_text() {
        let stub = StubAdapter::with_rows(1);
        let envelope = run_query(&stub, request("SELECT 1", None)).await.unwrap();

        let result = tool_response(Ok(envelope)).unwrap();
        assert!(!result.is_error.unwrap_or(false));
        assert_eq!(result.content.len(), 1);
    }

    #[tokio::test]
    async fn failure_response_is_error_flagged_not_thrown() {
        let err = QueryError::Engine(anyhow::anyhow!("Login failed for user 'sa'"));
        let result = tool_response(Err(err)).unwrap();
        assert!(result.is_error.unwrap_or(false));
    }
}
