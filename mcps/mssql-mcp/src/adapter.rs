//! MSSQL base adapter using `tiberius` and a `bb8` connection pool.
//!
//! This is the only layer that performs engine I/O. Driver errors are relayed
//! verbatim; the row ceiling is applied here, at the I/O boundary.

use anyhow::Context;
use async_trait::async_trait;
use bb8::Pool;
use bb8_tiberius::ConnectionManager;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use tiberius::Row as TiberiusRow;

use query_core::{limit_rows, QueryAdapter, QueryError, QueryRequest, Row};

use crate::config::MssqlConfig;

const POOL_SIZE: u32 = 4;

pub struct MssqlAdapter {
    pool: Pool<ConnectionManager>,
}

impl MssqlAdapter {
    /// Builds the connection pool from a validated ADO-style connection
    /// string.
    pub async fn connect(config: &MssqlConfig) -> anyhow::Result<Self> {
        let tiberius_config = tiberius::Config::from_ado_string(&config.raw_connection_string)
            .context("failed to parse MSSQL connection string")?;

        let manager = ConnectionManager::new(tiberius_config);
        let pool = Pool::builder()
            .max_size(POOL_SIZE)
            .build(manager)
            .await
            .context("failed to create MSSQL connection pool")?;

        tracing::info!("MSSQL connection pool ready");
        Ok(Self { pool })
    }
}

#[async_trait]
impl QueryAdapter for MssqlAdapter {
    async fn execute(&self, request: &QueryRequest) -> Result<Vec<Row>, QueryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| QueryError::Engine(e.into()))?;

        tracing::debug!(database = %request.database, "executing MSSQL query");

        let stream = conn
            .simple_query(&request.query)
            .await
            .map_err(|e| QueryError::Engine(e.into()))?;
        let results = stream
            .into_results()
            .await
            .map_err(|e| QueryError::Engine(e.into()))?;

        // The guard already enforced a single statement, so only the first
        // result set can carry rows.
        let rows: Vec<Row> = results
            .first()
            .map(|set| set.iter().map(convert_row).collect())
            .unwrap_or_default();

        Ok(limit_rows(rows, request.max_rows))
    }
}

fn convert_row(row: &TiberiusRow) -> Row {
    let mut out = Row::new();
    for (index, column) in row.columns().iter().enumerate() {
        out.insert(column.name().to_string(), cell_value(row, index));
    }
    out
}

fn cell_value(row: &TiberiusRow, index: usize) -> Value {
    if let Ok(Some(val)) = row.try_get::<i32, _>(index) {
        return Value::from(i64::from(val));
    }
    if let Ok(Some(val)) = row.try_get::<i64, _>(index) {
        return Value::from(val);
    }
    if let Ok(Some(val)) = row.try_get::<i16, _>(index) {
        return Value::from(i64::from(val));
    }
    if let Ok(Some(val)) = row.try_get::<u8, _>(index) {
        return Value::from(u64::from(val));
    }
    if let Ok(Some(val)) = row.try_get::<f64, _>(index) {
        return Value::from(val);
    }
    if let Ok(Some(val)) = row.try_get::<f32, _>(index) {
        return Value::from(f64::from(val));
    }
    if let Ok(Some(val)) = row.try_get::<bool, _>(index) {
        return Value::from(val);
    }
    if let Ok(Some(val)) = row.try_get::<&str, _>(index) {
        return Value::from(val);
    }
    if let Ok(Some(val)) = row.try_get::<tiberius::Uuid, _>(index) {
        return Value::from(val.to_string());
    }
    if let Ok(Some(val)) = row.try_get::<NaiveDateTime, _>(index) {
        return Value::from(DateTime::<Utc>::from_naive_utc_and_offset(val, Utc).to_rfc3339());
    }
    Value::Null
}
