//! MySQL Backend Implementation

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlArguments, MySqlPool, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, MySql, Row, TypeInfo, ValueRef};

use super::core::*;
use super::DatabaseBackendType;
use crate::config::PoolConfig;
use crate::error::{ModelError, OrmResult};

/// Driver adapter over a MySQL connection pool
#[derive(Debug, Clone)]
pub struct MySqlAdapter {
    pool: MySqlPool,
}

impl MySqlAdapter {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Create a pool for `url` and wrap it
    pub async fn connect(url: &str, config: &PoolConfig) -> OrmResult<Self> {
        let pool = config
            .pool_options::<MySql>()
            .connect(url)
            .await
            .map_err(|e| ModelError::Connection(format!("Failed to create MySQL pool: {}", e)))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &MySqlPool {
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
            StatementKind::Manipulation => {
                let result = query.execute(&mut *conn).await?;
                // 0 means the statement did not generate an identifier
                let last_insert_row_id = match result.last_insert_id() {
                    0 => None,
                    id => Some(JsonValue::from(id)),
                };
                Ok(ResultEnvelope::Mutation {
                    affected: result.rows_affected(),
                    raw: serde_json::json!({
                        "rows_affected": result.rows_affected(),
                        "last_insert_id": result.last_insert_id(),
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
impl DriverAdapter for MySqlAdapter {
    fn backend_type(&self) -> DatabaseBackendType {
        DatabaseBackendType::MySQL
    }

    fn sql_dialect(&self) -> SqlDialect {
        SqlDialect::MySQL
    }

    async fn execute(&self, statement: &str, params: &[DatabaseValue]) -> OrmResult<ResultEnvelope> {
        let kind = StatementKind::classify(statement);
        tracing::debug!(backend = "mysql", ?kind, statement, "executing statement");

        self.run(kind, statement, params).await.map_err(|e| {
            tracing::error!(backend = "mysql", statement, ?params, error = %e, "statement failed");
            ModelError::backend(e.to_string(), statement, params)
        })
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

fn bind_all<'q>(mut query: Query<'q, MySql, MySqlArguments>, params: &[DatabaseValue]) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param {
            DatabaseValue::Null => query.bind(Option::<String>::None),
            DatabaseValue::Bool(b) => query.bind(*b),
            DatabaseValue::Int64(i) => query.bind(*i),
            DatabaseValue::Float64(f) => query.bind(*f),
            DatabaseValue::String(s) => query.bind(s.clone()),
            DatabaseValue::Bytes(b) => query.bind(b.clone()),
            DatabaseValue::Uuid(u) => query.bind(u.to_string()),
            DatabaseValue::DateTime(dt) => query.bind(dt.naive_utc()),
            DatabaseValue::Json(j) => query.bind(j.to_string()),
        };
    }
    query
}

fn decode_rows(rows: &[MySqlRow]) -> Result<Vec<Record>, sqlx::Error> {
    rows.iter()
        .map(|row| -> Result<Record, sqlx::Error> {
            let mut record = Record::new();
            for (index, column) in row.columns().iter().enumerate() {
                record.insert(column.name().to_string(), decode_value(row, index)?);
            }
            Ok(record)
        })
        .collect()
}

fn decode_value(row: &MySqlRow, index: usize) -> Result<JsonValue, sqlx::Error> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(JsonValue::Null);
    }

    let type_name = row.columns()[index].type_info().name().to_string();
    let value = match type_name.as_str() {
        "BOOLEAN" => JsonValue::Bool(row.try_get(index)?),
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED" | "BIGINT UNSIGNED" => {
            JsonValue::from(row.try_get::<u64, _>(index)?)
        }
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            JsonValue::from(row.try_get::<i64, _>(index)?)
        }
        "FLOAT" => JsonValue::from(row.try_get::<f32, _>(index)? as f64),
        "DOUBLE" => JsonValue::from(row.try_get::<f64, _>(index)?),
        "DATETIME" | "TIMESTAMP" => JsonValue::String(row.try_get::<chrono::NaiveDateTime, _>(index)?.to_string()),
        "DATE" => JsonValue::String(row.try_get::<chrono::NaiveDate, _>(index)?.to_string()),
        "TIME" => JsonValue::String(row.try_get::<chrono::NaiveTime, _>(index)?.to_string()),
        "JSON" => row.try_get::<JsonValue, _>(index)?,
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            JsonValue::from(row.try_get::<Vec<u8>, _>(index)?)
        }
        // DECIMAL and the textual types arrive as text
        _ => JsonValue::String(String::from_utf8_lossy(&row.try_get_unchecked::<Vec<u8>, _>(index)?).into_owned()),
    };
    Ok(value)
}
