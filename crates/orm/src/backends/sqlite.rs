//! SQLite Backend Implementation
//!
//! SQLite columns are dynamically typed, so values are decoded from the
//! storage class of each value rather than the declared column type.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqliteRow};
use sqlx::{Column, Row, Sqlite, TypeInfo, ValueRef};

use super::core::*;
use super::DatabaseBackendType;
use crate::config::PoolConfig;
use crate::error::{ModelError, OrmResult};

/// Driver adapter over a SQLite connection pool
#[derive(Debug, Clone)]
pub struct SqliteAdapter {
    pool: SqlitePool,
}

impl SqliteAdapter {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a pool for `url` and wrap it
    pub async fn connect(url: &str, config: &PoolConfig) -> OrmResult<Self> {
        let pool = config
            .pool_options::<Sqlite>()
            .connect(url)
            .await
            .map_err(|e| ModelError::Connection(format!("Failed to create SQLite pool: {}", e)))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn run(&self, kind: StatementKind, statement: &str, params: &[DatabaseValue]) -> Result<ResultEnvelope, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        let query = bind_all(sqlx::query(statement), params);

        match kind {
            StatementKind::Query => {
                let rows = query.fetch_all(&mut *conn).await?;
                Ok(ResultEnvelope::Rows(decode_rows(&rows)?))
            }
            StatementKind::Manipulation if has_returning_clause(statement) => {
                let rows = decode_rows(&query.fetch_all(&mut *conn).await?)?;
                Ok(ResultEnvelope::Mutation {
                    affected: rows.len() as u64,
                    last_insert_row_id: recover_returned_identifier(&rows),
                    raw: JsonValue::Array(rows.into_iter().map(JsonValue::Object).collect()),
                })
            }
            StatementKind::Manipulation => {
                let result = query.execute(&mut *conn).await?;
                let is_insert = StatementKind::leading_keyword(statement) == "insert";
                let last_insert_row_id = Some(result.last_insert_rowid())
                    .filter(|id| is_insert && *id != 0)
                    .map(JsonValue::from);
                Ok(ResultEnvelope::Mutation {
                    affected: result.rows_affected(),
                    raw: serde_json::json!({
                        "changes": result.rows_affected(),
                        "last_insert_rowid": result.last_insert_rowid(),
                    }),
                    last_insert_row_id,
                })
            }
            StatementKind::Control => {
                query.execute(&mut *conn).await?;
                Ok(ResultEnvelope::control(statement))
            }
            StatementKind::Definition | StatementKind::Other => {
                let result = query.execute(&mut *conn).await?;
                Ok(ResultEnvelope::definition(kind, result.rows_affected()))
            }
        }
    }
}

#[async_trait]
impl DriverAdapter for SqliteAdapter {
    fn backend_type(&self) -> DatabaseBackendType {
        DatabaseBackendType::SQLite
    }

    fn sql_dialect(&self) -> SqlDialect {
        SqlDialect::SQLite
    }

    async fn execute(&self, statement: &str, params: &[DatabaseValue]) -> OrmResult<ResultEnvelope> {
        let kind = StatementKind::classify(statement);
        tracing::debug!(backend = "sqlite", ?kind, statement, "executing statement");

        self.run(kind, statement, params).await.map_err(|e| {
            tracing::error!(backend = "sqlite", statement, ?params, error = %e, "statement failed");
            ModelError::backend(e.to_string(), statement, params)
        })
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

fn bind_all<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &[DatabaseValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            DatabaseValue::Null => query.bind(Option::<String>::None),
            DatabaseValue::Bool(b) => query.bind(*b),
            DatabaseValue::Int64(i) => query.bind(*i),
            DatabaseValue::Float64(f) => query.bind(*f),
            DatabaseValue::String(s) => query.bind(s.clone()),
            DatabaseValue::Bytes(b) => query.bind(b.clone()),
            DatabaseValue::Uuid(u) => query.bind(u.to_string()),
            DatabaseValue::DateTime(dt) => query.bind(dt.naive_utc().to_string()),
            DatabaseValue::Json(j) => query.bind(j.to_string()),
        };
    }
    query
}

fn decode_rows(rows: &[SqliteRow]) -> Result<Vec<Record>, sqlx::Error> {
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let mut record = Record::new();
        for (index, column) in row.columns().iter().enumerate() {
            record.insert(column.name().to_string(), decode_value(row, index)?);
        }
        records.push(record);
    }
    Ok(records)
}

fn decode_value(row: &SqliteRow, index: usize) -> Result<JsonValue, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(JsonValue::Null);
    }

    let storage_class = raw.type_info().name().to_string();
    let value = match storage_class.as_str() {
        "INTEGER" => JsonValue::from(row.try_get_unchecked::<i64, _>(index)?),
        "REAL" => JsonValue::from(row.try_get_unchecked::<f64, _>(index)?),
        "BLOB" => JsonValue::from(row.try_get_unchecked::<Vec<u8>, _>(index)?),
        _ => JsonValue::String(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}
