//! Request, row, and response envelope types.
//!
//! Wire field names are camelCase to stay compatible with existing callers of
//! the query tools.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single result row: column name to scalar value.
///
/// Insertion order is the column order and is preserved end to end
/// (`serde_json` runs with `preserve_order`).
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Parameters accepted by the query tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Logical database/catalog name to target.
    pub database: String,
    /// Read-only SQL text limited to a single statement.
    pub query: String,
    /// Optional cap on rows returned by the adapter execution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<u32>,
}

/// The timestamped, correlation-tracked response handed back to the caller.
///
/// Constructed once per successful invocation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponseEnvelope {
    /// Per-invocation identifier useful for tracing logs; never reused.
    pub correlation_id: Uuid,
    /// Echo of the requested database name.
    pub database: String,
    /// Rows produced by the adapter, order preserved.
    pub query_result: Vec<Row>,
    /// Number of rows in `query_result`.
    pub row_count: usize,
    /// Recorded immediately before the adapter is invoked.
    pub started_at: DateTime<Utc>,
    /// Recorded immediately after the adapter resolves.
    pub completed_at: DateTime<Utc>,
}

impl QueryResponseEnvelope {
    /// Serialized text form for textual consumers.
    pub fn to_text(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Structured form for machine consumers; value-identical to the text form.
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    pub fn from_text(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Discovery metadata exposed by each query tool.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolMetadata {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub input_fields: &'static [&'static str],
    pub output_fields: &'static [&'static str],
}
