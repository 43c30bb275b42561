//! PostgreSQL Backend Implementation
//!
//! PostgreSQL has no native last-insert-id signal, so inserted identifiers are
//! recovered from the rows of a `RETURNING` clause.
//!
//! Parameters are sent in the binary protocol and PostgreSQL does not cast a
//! `text` parameter into `timestamp`, `uuid`, `jsonb` or numeric columns. The
//! adapter therefore asks the server which type it infers for every
//! placeholder (cached per statement) and shapes each value into exactly that
//! type before binding.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use sqlx::encode::IsNull;
use sqlx::postgres::{PgArgumentBuffer, PgArguments, PgConnection, PgHasArrayType, PgPool, PgRow, PgTypeInfo, PgTypeKind};
use sqlx::query::Query;
use sqlx::{Column, Either, Executor, Postgres, Row, TypeInfo, ValueRef};

use super::core::*;
use super::DatabaseBackendType;
use crate::config::PoolConfig;
use crate::error::{ModelError, OrmResult};

/// Described statements kept before the cache is reset
const PARAMETER_CACHE_LIMIT: usize = 1024;

/// Driver adapter over a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PostgresAdapter {
    pool: PgPool,
    parameter_types: Arc<Mutex<HashMap<String, Arc<[PgTypeInfo]>>>>,
}

impl PostgresAdapter {
    /// Wrap an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            parameter_types: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create a pool for `url` and wrap it
    pub async fn connect(url: &str, config: &PoolConfig) -> OrmResult<Self> {
        let pool = config
            .pool_options::<Postgres>()
            .connect(url)
            .await
            .map_err(|e| ModelError::Connection(format!("Failed to create PostgreSQL pool: {}", e)))?;
        Ok(Self::new(pool))
    }

    /// Get the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Parameter types PostgreSQL infers for the placeholders of `statement`
    async fn parameter_types(
        &self,
        conn: &mut PgConnection,
        statement: &str,
        params: &[DatabaseValue],
    ) -> Result<Arc<[PgTypeInfo]>, sqlx::Error> {
        if params.is_empty() {
            return Ok(Arc::from(Vec::new()));
        }

        let cached = self.parameter_types.lock().get(statement).cloned();
        if let Some(types) = cached {
            return Ok(types);
        }

        let described = conn.describe(statement).await?;
        let types: Arc<[PgTypeInfo]> = match described.parameters() {
            Some(Either::Left(types)) => Arc::from(types.to_vec()),
            _ => Arc::from(Vec::new()),
        };

        let mut cache = self.parameter_types.lock();
        if cache.len() >= PARAMETER_CACHE_LIMIT {
            cache.clear();
        }
        cache.insert(statement.to_string(), types.clone());
        Ok(types)
    }

    async fn run(&self, kind: StatementKind, statement: &str, params: &[DatabaseValue]) -> Result<ResultEnvelope, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        let types = self.parameter_types(&mut conn, statement, params).await?;
        let query = bind_all(sqlx::query(statement), params, &types);

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
                Ok(ResultEnvelope::Mutation {
                    affected: result.rows_affected(),
                    last_insert_row_id: None,
                    raw: serde_json::json!({ "rows_affected": result.rows_affected() }),
                })
            }
            StatementKind::Control => {
                query.execute(&mut *conn).await?;
                Ok(ResultEnvelope::control(statement))
            }
            StatementKind::Definition | StatementKind::Other => {
                let result = query.execute(&mut *conn).await?;
                // column types may have changed under cached statements
                if kind == StatementKind::Definition {
                    self.parameter_types.lock().clear();
                }
                Ok(ResultEnvelope::definition(kind, result.rows_affected()))
            }
        }
    }
}

#[async_trait]
impl DriverAdapter for PostgresAdapter {
    fn backend_type(&self) -> DatabaseBackendType {
        DatabaseBackendType::PostgreSQL
    }

    fn sql_dialect(&self) -> SqlDialect {
        SqlDialect::PostgreSQL
    }

    async fn execute(&self, statement: &str, params: &[DatabaseValue]) -> OrmResult<ResultEnvelope> {
        let kind = StatementKind::classify(statement);
        tracing::debug!(backend = "postgresql", ?kind, statement, "executing statement");

        self.run(kind, statement, params).await.map_err(|e| {
            tracing::error!(backend = "postgresql", statement, ?params, error = %e, "statement failed");
            ModelError::backend(e.to_string(), statement, params)
        })
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Placeholder type families the adapter shapes values for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamType {
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Numeric,
    Text,
    Timestamp,
    TimestampTz,
    Date,
    Time,
    Uuid,
    Json,
    Bytea,
    Enum,
    Other,
}

impl ParamType {
    fn of(type_info: &PgTypeInfo) -> Self {
        match type_info.name() {
            "BOOL" => ParamType::Bool,
            "INT2" => ParamType::Int2,
            "INT4" => ParamType::Int4,
            "INT8" => ParamType::Int8,
            "FLOAT4" => ParamType::Float4,
            "FLOAT8" => ParamType::Float8,
            "NUMERIC" => ParamType::Numeric,
            "TEXT" | "VARCHAR" | "CHAR" | "NAME" => ParamType::Text,
            "TIMESTAMP" => ParamType::Timestamp,
            "TIMESTAMPTZ" => ParamType::TimestampTz,
            "DATE" => ParamType::Date,
            "TIME" => ParamType::Time,
            "UUID" => ParamType::Uuid,
            "JSON" | "JSONB" => ParamType::Json,
            "BYTEA" => ParamType::Bytea,
            _ => match type_info.kind() {
                PgTypeKind::Domain(base) => ParamType::of(base),
                PgTypeKind::Enum(_) => ParamType::Enum,
                _ => ParamType::Other,
            },
        }
    }
}

/// Value shaped for the type of its placeholder
#[derive(Debug, Clone, PartialEq)]
enum PgParam {
    Value(DatabaseValue),
    Int2(i16),
    Int4(i32),
    Float4(f32),
    Numeric(Decimal),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    /// Text payload (or NULL) sent under the described type itself
    Described(Option<String>),
}

/// Shape `value` for a placeholder of type `target`
///
/// Values that cannot be converted are passed through unchanged and the
/// server reports the mismatch.
fn coerce_parameter(value: &DatabaseValue, target: ParamType) -> PgParam {
    use DatabaseValue as V;

    let converted = match (value, target) {
        (V::Null, ParamType::Other) | (V::Null, ParamType::Enum) => Some(PgParam::Described(None)),
        (V::Null, _) => None,

        (V::Int64(i), ParamType::Bool) => Some(PgParam::Value(V::Bool(*i != 0))),
        (V::String(s), ParamType::Bool) => s.trim().parse().ok().map(|b| PgParam::Value(V::Bool(b))),

        (V::Int64(i), ParamType::Int2) => i16::try_from(*i).ok().map(PgParam::Int2),
        (V::String(s), ParamType::Int2) => s.trim().parse().ok().map(PgParam::Int2),
        (V::Int64(i), ParamType::Int4) => i32::try_from(*i).ok().map(PgParam::Int4),
        (V::String(s), ParamType::Int4) => s.trim().parse().ok().map(PgParam::Int4),
        (V::String(s), ParamType::Int8) => s.trim().parse().ok().map(|i| PgParam::Value(V::Int64(i))),

        (V::Int64(i), ParamType::Float4) => Some(PgParam::Float4(*i as f32)),
        (V::Float64(f), ParamType::Float4) => Some(PgParam::Float4(*f as f32)),
        (V::String(s), ParamType::Float4) => s.trim().parse().ok().map(PgParam::Float4),
        (V::Int64(i), ParamType::Float8) => Some(PgParam::Value(V::Float64(*i as f64))),
        (V::String(s), ParamType::Float8) => s.trim().parse().ok().map(|f| PgParam::Value(V::Float64(f))),

        (V::Int64(i), ParamType::Numeric) => Some(PgParam::Numeric(Decimal::from(*i))),
        (V::Float64(f), ParamType::Numeric) => Decimal::try_from(*f).ok().map(PgParam::Numeric),
        (V::String(s), ParamType::Numeric) => Decimal::from_str(s.trim()).ok().map(PgParam::Numeric),

        (V::String(_), ParamType::Text) => None,
        (V::Json(j), ParamType::Text) => Some(PgParam::Value(V::String(j.to_string()))),
        (V::Bytes(_), ParamType::Text) => None,
        (other, ParamType::Text) => match other.to_json() {
            JsonValue::String(s) => Some(PgParam::Value(V::String(s))),
            rendered => Some(PgParam::Value(V::String(rendered.to_string()))),
        },

        (V::String(s), ParamType::Timestamp) => parse_datetime(s).map(|dt| PgParam::Timestamp(dt.naive_utc())),
        (V::DateTime(dt), ParamType::Timestamp) => Some(PgParam::Timestamp(dt.naive_utc())),
        (V::String(s), ParamType::TimestampTz) => parse_datetime(s).map(|dt| PgParam::Value(V::DateTime(dt))),

        (V::String(s), ParamType::Date) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .ok()
            .or_else(|| parse_datetime(s).map(|dt| dt.date_naive()))
            .map(PgParam::Date),
        (V::DateTime(dt), ParamType::Date) => Some(PgParam::Date(dt.date_naive())),
        (V::String(s), ParamType::Time) => NaiveTime::parse_from_str(s.trim(), "%H:%M:%S%.f")
            .ok()
            .map(PgParam::Time),
        (V::DateTime(dt), ParamType::Time) => Some(PgParam::Time(dt.time())),

        (V::String(s), ParamType::Uuid) => uuid::Uuid::parse_str(s.trim()).ok().map(|u| PgParam::Value(V::Uuid(u))),

        (V::Json(_), ParamType::Json) => None,
        (V::String(s), ParamType::Json) => Some(PgParam::Value(V::Json(
            serde_json::from_str(s).unwrap_or_else(|_| JsonValue::String(s.clone())),
        ))),
        (other, ParamType::Json) => Some(PgParam::Value(V::Json(other.to_json()))),

        (V::String(s), ParamType::Bytea) => Some(PgParam::Value(V::Bytes(s.clone().into_bytes()))),

        (V::String(s), ParamType::Enum) => Some(PgParam::Described(Some(s.clone()))),

        _ => None,
    };

    converted.unwrap_or_else(|| PgParam::Value(value.clone()))
}

/// Parse the timestamp renderings attributes carry (RFC 3339, `Y-m-d H:M:S`, bare dates)
fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Text-encoded parameter carrying the type the server described for it
#[derive(Debug, Clone)]
struct DescribedText {
    text: Option<String>,
    type_info: PgTypeInfo,
}

impl sqlx::Type<Postgres> for DescribedText {
    fn type_info() -> PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(_ty: &PgTypeInfo) -> bool {
        true
    }
}

impl<'q> sqlx::Encode<'q, Postgres> for DescribedText {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> IsNull {
        match &self.text {
            Some(text) => <&str as sqlx::Encode<'q, Postgres>>::encode(text.as_str(), buf),
            None => IsNull::Yes,
        }
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(self.type_info.clone())
    }
}

fn bind_all<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[DatabaseValue],
    types: &[PgTypeInfo],
) -> Query<'q, Postgres, PgArguments> {
    for (index, param) in params.iter().enumerate() {
        query = match types.get(index) {
            Some(type_info) => bind_parameter(query, coerce_parameter(param, ParamType::of(type_info)), type_info),
            None => bind_database_value(query, param),
        };
    }
    query
}

fn bind_parameter<'q>(
    query: Query<'q, Postgres, PgArguments>,
    param: PgParam,
    type_info: &PgTypeInfo,
) -> Query<'q, Postgres, PgArguments> {
    match param {
        PgParam::Value(DatabaseValue::Null) => bind_null(query, ParamType::of(type_info)),
        PgParam::Value(value) => bind_database_value(query, &value),
        PgParam::Int2(i) => query.bind(i),
        PgParam::Int4(i) => query.bind(i),
        PgParam::Float4(f) => query.bind(f),
        PgParam::Numeric(n) => query.bind(n),
        PgParam::Timestamp(ts) => query.bind(ts),
        PgParam::Date(d) => query.bind(d),
        PgParam::Time(t) => query.bind(t),
        PgParam::Described(text) => query.bind(DescribedText {
            text,
            type_info: type_info.clone(),
        }),
    }
}

/// NULL typed for its placeholder
fn bind_null<'q>(query: Query<'q, Postgres, PgArguments>, target: ParamType) -> Query<'q, Postgres, PgArguments> {
    match target {
        ParamType::Bool => query.bind(Option::<bool>::None),
        ParamType::Int2 => query.bind(Option::<i16>::None),
        ParamType::Int4 => query.bind(Option::<i32>::None),
        ParamType::Int8 => query.bind(Option::<i64>::None),
        ParamType::Float4 => query.bind(Option::<f32>::None),
        ParamType::Float8 => query.bind(Option::<f64>::None),
        ParamType::Numeric => query.bind(Option::<Decimal>::None),
        ParamType::Timestamp => query.bind(Option::<NaiveDateTime>::None),
        ParamType::TimestampTz => query.bind(Option::<DateTime<Utc>>::None),
        ParamType::Date => query.bind(Option::<NaiveDate>::None),
        ParamType::Time => query.bind(Option::<NaiveTime>::None),
        ParamType::Uuid => query.bind(Option::<uuid::Uuid>::None),
        ParamType::Json => query.bind(Option::<JsonValue>::None),
        ParamType::Bytea => query.bind(Option::<Vec<u8>>::None),
        ParamType::Text | ParamType::Enum | ParamType::Other => query.bind(Option::<String>::None),
    }
}

/// Bind a DatabaseValue to a sqlx query
fn bind_database_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &DatabaseValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        DatabaseValue::Null => query.bind(Option::<String>::None),
        DatabaseValue::Bool(b) => query.bind(*b),
        DatabaseValue::Int64(i) => query.bind(*i),
        DatabaseValue::Float64(f) => query.bind(*f),
        DatabaseValue::String(s) => query.bind(s.clone()),
        DatabaseValue::Bytes(b) => query.bind(b.clone()),
        DatabaseValue::Uuid(u) => query.bind(*u),
        DatabaseValue::DateTime(dt) => query.bind(*dt),
        DatabaseValue::Json(j) => query.bind(j.clone()),
    }
}

fn decode_rows(rows: &[PgRow]) -> Result<Vec<Record>, sqlx::Error> {
    rows.iter().map(decode_row).collect()
}

fn decode_row(row: &PgRow) -> Result<Record, sqlx::Error> {
    let mut record = Record::new();
    for (index, column) in row.columns().iter().enumerate() {
        record.insert(column.name().to_string(), decode_value(row, index)?);
    }
    Ok(record)
}

/// Convert a PostgreSQL column value to an attribute value
fn decode_value(row: &PgRow, index: usize) -> Result<JsonValue, sqlx::Error> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(JsonValue::Null);
    }

    let column = &row.columns()[index];
    let type_info = column.type_info();
    let value = match type_info.name() {
        "BOOL" => JsonValue::Bool(row.try_get(index)?),
        "INT2" => JsonValue::from(row.try_get::<i16, _>(index)?),
        "INT4" => JsonValue::from(row.try_get::<i32, _>(index)?),
        "INT8" => JsonValue::from(row.try_get::<i64, _>(index)?),
        "FLOAT4" => JsonValue::from(row.try_get::<f32, _>(index)? as f64),
        "FLOAT8" => JsonValue::from(row.try_get::<f64, _>(index)?),
        // rendered as text to keep scale and precision
        "NUMERIC" => JsonValue::String(row.try_get::<Decimal, _>(index)?.to_string()),
        "UUID" => JsonValue::String(row.try_get::<uuid::Uuid, _>(index)?.to_string()),
        "TIMESTAMPTZ" => JsonValue::String(
            row.try_get::<DateTime<Utc>, _>(index)?
                .naive_utc()
                .to_string(),
        ),
        "TIMESTAMP" => JsonValue::String(row.try_get::<NaiveDateTime, _>(index)?.to_string()),
        "DATE" => JsonValue::String(row.try_get::<NaiveDate, _>(index)?.to_string()),
        "TIME" => JsonValue::String(row.try_get::<NaiveTime, _>(index)?.to_string()),
        "JSON" | "JSONB" => row.try_get::<JsonValue, _>(index)?,
        "BYTEA" => JsonValue::from(row.try_get::<Vec<u8>, _>(index)?),
        "TEXT" | "VARCHAR" | "CHAR" | "NAME" | "UNKNOWN" => JsonValue::String(row.try_get_unchecked::<String, _>(index)?),
        "BOOL[]" => decode_array::<bool>(row, index)?,
        "INT2[]" => decode_array::<i16>(row, index)?,
        "INT4[]" => decode_array::<i32>(row, index)?,
        "INT8[]" => decode_array::<i64>(row, index)?,
        "FLOAT8[]" => decode_array::<f64>(row, index)?,
        "TEXT[]" | "VARCHAR[]" => decode_array::<String>(row, index)?,
        name => match type_info.kind() {
            // enum labels travel as text in the binary protocol
            PgTypeKind::Enum(_) => JsonValue::String(row.try_get_unchecked::<String, _>(index)?),
            _ => {
                return Err(sqlx::Error::ColumnDecode {
                    index: column.name().to_string(),
                    source: format!("unsupported PostgreSQL column type {}", name).into(),
                })
            }
        },
    };
    Ok(value)
}

fn decode_array<T>(row: &PgRow, index: usize) -> Result<JsonValue, sqlx::Error>
where
    T: for<'r> sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres> + PgHasArrayType + Into<JsonValue>,
{
    let values: Vec<T> = row.try_get(index)?;
    Ok(JsonValue::Array(values.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn timestamp(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_timestamp_strings_bind_as_timestamps() {
        let written = DatabaseValue::String("2026-10-19 17:57:58".to_string());

        assert_eq!(
            coerce_parameter(&written, ParamType::Timestamp),
            PgParam::Timestamp(timestamp("2026-10-19 17:57:58"))
        );
        assert_eq!(
            coerce_parameter(&DatabaseValue::String("2026-10-19T17:57:58.250Z".to_string()), ParamType::Timestamp),
            PgParam::Timestamp(timestamp("2026-10-19 17:57:58") + chrono::Duration::milliseconds(250))
        );
        assert_eq!(
            coerce_parameter(&written, ParamType::TimestampTz),
            PgParam::Value(DatabaseValue::DateTime(timestamp("2026-10-19 17:57:58").and_utc()))
        );
        assert_eq!(
            coerce_parameter(&written, ParamType::Date),
            PgParam::Date(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
        );
    }

    #[test]
    fn test_numeric_and_integer_widths_match_placeholder() {
        assert_eq!(
            coerce_parameter(&DatabaseValue::String("12.50".to_string()), ParamType::Numeric),
            PgParam::Numeric(Decimal::from_str("12.50").unwrap())
        );
        assert_eq!(
            coerce_parameter(&DatabaseValue::Int64(5), ParamType::Numeric),
            PgParam::Numeric(Decimal::from(5))
        );
        assert_eq!(coerce_parameter(&DatabaseValue::Int64(7), ParamType::Int4), PgParam::Int4(7));
        assert_eq!(coerce_parameter(&DatabaseValue::Int64(7), ParamType::Int2), PgParam::Int2(7));
        assert_eq!(
            coerce_parameter(&DatabaseValue::Int64(7), ParamType::Float8),
            PgParam::Value(DatabaseValue::Float64(7.0))
        );
        // out of range stays as is and the server rejects it
        assert_eq!(
            coerce_parameter(&DatabaseValue::Int64(i64::MAX), ParamType::Int4),
            PgParam::Value(DatabaseValue::Int64(i64::MAX))
        );
    }

    #[test]
    fn test_uuid_and_json_text_become_typed_values() {
        let key = uuid::Uuid::new_v4();
        assert_eq!(
            coerce_parameter(&DatabaseValue::String(key.to_string()), ParamType::Uuid),
            PgParam::Value(DatabaseValue::Uuid(key))
        );
        assert_eq!(
            coerce_parameter(&DatabaseValue::String("{\"theme\":\"dark\"}".to_string()), ParamType::Json),
            PgParam::Value(DatabaseValue::Json(json!({"theme": "dark"})))
        );
        assert_eq!(
            coerce_parameter(&DatabaseValue::String("plain".to_string()), ParamType::Json),
            PgParam::Value(DatabaseValue::Json(json!("plain")))
        );
        assert_eq!(
            coerce_parameter(&DatabaseValue::Uuid(key), ParamType::Text),
            PgParam::Value(DatabaseValue::String(key.to_string()))
        );
    }

    #[test]
    fn test_nulls_and_unknown_types() {
        assert_eq!(
            coerce_parameter(&DatabaseValue::Null, ParamType::Timestamp),
            PgParam::Value(DatabaseValue::Null)
        );
        assert_eq!(coerce_parameter(&DatabaseValue::Null, ParamType::Other), PgParam::Described(None));
        assert_eq!(
            coerce_parameter(&DatabaseValue::String("open".to_string()), ParamType::Enum),
            PgParam::Described(Some("open".to_string()))
        );
        assert_eq!(
            coerce_parameter(&DatabaseValue::String("not a date".to_string()), ParamType::Timestamp),
            PgParam::Value(DatabaseValue::String("not a date".to_string()))
        );
    }

    #[test]
    fn test_builtin_type_names_map_to_families() {
        assert_eq!(ParamType::of(&PgTypeInfo::with_name("TIMESTAMP")), ParamType::Timestamp);
        assert_eq!(ParamType::of(&PgTypeInfo::with_name("JSONB")), ParamType::Json);
        assert_eq!(ParamType::of(&PgTypeInfo::with_name("VARCHAR")), ParamType::Text);
        assert_eq!(ParamType::of(&PgTypeInfo::with_name("NUMERIC")), ParamType::Numeric);
    }
}
