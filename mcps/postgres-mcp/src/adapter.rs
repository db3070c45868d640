//! Postgres base adapter using `tokio-postgres` and a `deadpool` pool.
//!
//! This is the only layer that performs engine I/O. Driver errors are relayed
//! verbatim; the row ceiling is applied here, at the I/O boundary.

use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use deadpool_postgres::{Manager, Pool};
use serde_json::Value;
use tokio_postgres::NoTls;

use query_core::{limit_rows, QueryAdapter, QueryError, QueryRequest, Row};

use crate::config::PostgresConfig;

const POOL_SIZE: usize = 4;

pub struct PostgresAdapter {
    pool: Pool,
}

impl PostgresAdapter {
    /// Builds the connection pool from a validated connection URL.
    pub fn connect(config: &PostgresConfig) -> anyhow::Result<Self> {
        let pg_config = tokio_postgres::Config::from_str(&config.raw_connection_string)
            .context("failed to parse Postgres connection string")?;

        let manager = Manager::new(pg_config, NoTls);
        let pool = Pool::builder(manager)
            .max_size(POOL_SIZE)
            .build()
            .context("failed to create Postgres connection pool")?;

        tracing::info!("Postgres connection pool ready");
        Ok(Self { pool })
    }
}

#[async_trait]
impl QueryAdapter for PostgresAdapter {
    async fn execute(&self, request: &QueryRequest) -> Result<Vec<Row>, QueryError> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| QueryError::Engine(e.into()))?;

        tracing::debug!(database = %request.database, "executing Postgres query");

        let pg_rows = client
            .query(request.query.as_str(), &[])
            .await
            .map_err(|e| QueryError::Engine(e.into()))?;

        let rows: Vec<Row> = pg_rows.iter().map(convert_row).collect();
        Ok(limit_rows(rows, request.max_rows))
    }
}

fn convert_row(row: &tokio_postgres::Row) -> Row {
    let mut out = Row::new();
    for (index, column) in row.columns().iter().enumerate() {
        out.insert(column.name().to_string(), cell_value(row, index));
    }
    out
}

fn cell_value(row: &tokio_postgres::Row, index: usize) -> Value {
    if let Ok(Some(val)) = row.try_get::<_, Option<i64>>(index) {
        return Value::from(val);
    }
    if let Ok(Some(val)) = row.try_get::<_, Option<i32>>(index) {
        return Value::from(i64::from(val));
    }
    if let Ok(Some(val)) = row.try_get::<_, Option<i16>>(index) {
        return Value::from(i64::from(val));
    }
    // OIDs surface as u32
    if let Ok(Some(val)) = row.try_get::<_, Option<u32>>(index) {
        return Value::from(u64::from(val));
    }
    if let Ok(Some(val)) = row.try_get::<_, Option<f64>>(index) {
        return Value::from(val);
    }
    if let Ok(Some(val)) = row.try_get::<_, Option<f32>>(index) {
        return Value::from(f64::from(val));
    }
    if let Ok(Some(val)) = row.try_get::<_, Option<bool>>(index) {
        return Value::from(val);
    }
    if let Ok(Some(val)) = row.try_get::<_, Option<String>>(index) {
        return Value::from(val);
    }
    if let Ok(Some(val)) = row.try_get::<_, Option<uuid::Uuid>>(index) {
        return Value::from(val.to_string());
    }
    if let Ok(Some(val)) = row.try_get::<_, Option<Value>>(index) {
        return val;
    }
    if let Ok(Some(val)) = row.try_get::<_, Option<DateTime<Utc>>>(index) {
        return Value::from(val.to_rfc3339());
    }
    if let Ok(Some(val)) = row.try_get::<_, Option<NaiveDateTime>>(index) {
        return Value::from(DateTime::<Utc>::from_naive_utc_and_offset(val, Utc).to_rfc3339());
    }
    if let Ok(Some(val)) = row.try_get::<_, Option<NaiveDate>>(index) {
        return Value::from(val.to_string());
    }
    Value::Null
}
