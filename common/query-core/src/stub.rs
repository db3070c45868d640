//! Deterministic adapter stub for demos and pipeline tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::adapter::QueryAdapter;
use crate::error::QueryError;
use crate::limit;
use crate::types::{QueryRequest, Row};

/// Stands in for a live engine: returns synthetic rows mirroring the shape of
/// a SELECT result, applies the row ceiling like any base adapter, and counts
/// invocations so tests can assert the guard short-circuited.
#[derive(Debug, Default)]
pub struct StubAdapter {
    rows: Vec<Row>,
    calls: AtomicUsize,
}

impl StubAdapter {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            calls: AtomicUsize::new(0),
        }
    }

    /// `count` synthetic rows of the form `{"id": n, "name": "row-n"}`.
    pub fn with_rows(count: usize) -> Self {
        let rows = (1..=count)
            .map(|n| {
                let mut row = Row::new();
                row.insert("id".to_string(), json!(n));
                row.insert("name".to_string(), Value::String(format!("row-{n}")));
                row
            })
            .collect();
        Self::new(rows)
    }

    /// How many times `execute` ran; stays at zero for rejected requests.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryAdapter for StubAdapter {
    async fn execute(&self, request: &QueryRequest) -> Result<Vec<Row>, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(limit::limit_rows(self.rows.clone(), request.max_rows))
    }
}
