//! Data store abstraction and the PostgreSQL backend.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use fq_protocol::Row;

use crate::error::StoreError;

/// A backend that runs an already-validated SELECT.
///
/// Backends may return either a bare JSON array of row objects or an object
/// wrapper with a `rows` array; `normalize_rows` accepts both.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn fetch(&self, sql: &str) -> Result<Value, StoreError>;
}

/// Normalize a backend result into a plain row sequence.
pub fn normalize_rows(value: Value) -> Result<Vec<Row>, StoreError> {
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        Value::Object(mut wrapper) => match wrapper.remove("rows") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) => return Ok(Vec::new()),
            _ => {
                return Err(StoreError::Shape(
                    "object result without a rows array".into(),
                ));
            }
        },
        other => {
            return Err(StoreError::Shape(format!(
                "expected rows, got {}",
                json_kind(&other)
            )));
        }
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Object(row) => Ok(row),
            other => Err(StoreError::Shape(format!(
                "row is {}, not an object",
                json_kind(&other)
            ))),
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// PostgreSQL backend. Rows are aggregated server-side into one JSON array.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a pool to `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl DataStore for PgStore {
    async fn fetch(&self, sql: &str) -> Result<Value, StoreError> {
        let wrapped = format!("SELECT COALESCE(json_agg(q), '[]'::json) FROM ({sql}) AS q");
        let rows: Value = sqlx::query_scalar(&wrapped).fetch_one(&self.pool).await?;
        Ok(rows)
    }
}
