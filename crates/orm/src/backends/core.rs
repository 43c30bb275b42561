//! Core Database Backend Traits
//!
//! Every row-oriented backend is reached through a [`DriverAdapter`]. Adapters
//! classify the statement they are given, execute it on a pooled connection
//! and normalize the native reply into a [`ResultEnvelope`].

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::backends::DatabaseBackendType;
use crate::error::OrmResult;

/// Plain column -> value mapping used for rows and serialized models
pub type Record = serde_json::Map<String, JsonValue>;

/// Column aliases probed, in order, for an identifier returned by an insert
pub const IDENTIFIER_ALIASES: [&str; 4] = ["id", "ID", "Id", "IDENTITY"];

/// Abstract row-oriented driver adapter
#[async_trait]
pub trait DriverAdapter: Send + Sync {
    /// Backend family this adapter talks to
    fn backend_type(&self) -> DatabaseBackendType;

    /// SQL dialect used when compiling statements for this adapter
    fn sql_dialect(&self) -> SqlDialect;

    /// Execute a literal statement with positional parameters
    async fn execute(&self, statement: &str, params: &[DatabaseValue]) -> OrmResult<ResultEnvelope>;

    /// Release pooled resources
    async fn close(&self) {}
}

/// Statement class derived from the leading keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Data query (SELECT, SHOW, PRAGMA, ...)
    Query,
    /// Data manipulation (INSERT, UPDATE, DELETE)
    Manipulation,
    /// Data definition (CREATE, ALTER, DROP, ...)
    Definition,
    /// Transaction control (BEGIN, COMMIT, ...)
    Control,
    /// Anything else; executed generically
    Other,
}

impl StatementKind {
    /// Classify a statement by its first non-whitespace token
    pub fn classify(statement: &str) -> Self {
        let keyword = statement
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match keyword.as_str() {
            "select" | "show" | "pragma" | "explain" | "describe" | "with" => StatementKind::Query,
            "insert" | "update" | "delete" => StatementKind::Manipulation,
            "create" | "alter" | "drop" | "truncate" | "rename" => StatementKind::Definition,
            "begin" | "start" | "commit" | "rollback" | "savepoint" | "release" | "save" | "set"
            | "use" => StatementKind::Control,
            _ => StatementKind::Other,
        }
    }

    /// Leading keyword of a statement, lowercased
    pub fn leading_keyword(statement: &str) -> String {
        statement
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase()
    }
}

/// Whether a statement carries a RETURNING clause
pub fn has_returning_clause(statement: &str) -> bool {
    statement
        .split_whitespace()
        .any(|token| token.eq_ignore_ascii_case("returning"))
}

/// Recover an identifier from rows returned by an insert
pub fn recover_returned_identifier(rows: &[Record]) -> Option<JsonValue> {
    let first = rows.first()?;
    IDENTIFIER_ALIASES
        .iter()
        .find_map(|alias| first.get(*alias))
        .filter(|value| !value.is_null())
        .cloned()
}

/// Normalized outcome of a statement
#[derive(Debug, Clone, PartialEq)]
pub enum ResultEnvelope {
    /// Rows produced by a data query
    Rows(Vec<Record>),
    /// Outcome of a data manipulation statement
    Mutation {
        affected: u64,
        last_insert_row_id: Option<JsonValue>,
        raw: JsonValue,
    },
    /// Outcome of a data definition statement
    Definition { message: String, affected: u64 },
    /// Outcome of a transaction control statement
    Control { message: String },
}

impl ResultEnvelope {
    /// Build the envelope for a DDL statement or a generic execution
    pub fn definition(kind: StatementKind, affected: u64) -> Self {
        let message = if kind == StatementKind::Definition {
            "Executed"
        } else {
            "Query executed"
        };
        ResultEnvelope::Definition {
            message: message.to_string(),
            affected,
        }
    }

    /// Build the envelope for a TCL statement
    pub fn control(statement: &str) -> Self {
        ResultEnvelope::Control {
            message: format!("{} executed", StatementKind::leading_keyword(statement).to_uppercase()),
        }
    }

    /// Rows of a query envelope; other shapes yield no rows
    pub fn into_rows(self) -> Vec<Record> {
        match self {
            ResultEnvelope::Rows(rows) => rows,
            _ => Vec::new(),
        }
    }

    /// Affected-row count where the shape reports one
    pub fn affected(&self) -> Option<u64> {
        match self {
            ResultEnvelope::Mutation { affected, .. } | ResultEnvelope::Definition { affected, .. } => {
                Some(*affected)
            }
            _ => None,
        }
    }

    /// Identifier assigned by the backend to an inserted row
    pub fn last_insert_row_id(&self) -> Option<&JsonValue> {
        match self {
            ResultEnvelope::Mutation { last_insert_row_id, .. } => last_insert_row_id.as_ref(),
            _ => None,
        }
    }
}

/// Database value enumeration for type-safe parameter binding
///
/// Attribute values arrive through [`DatabaseValue::from_json`]; the typed
/// variants are produced by the `From` impls and by adapters that shape a
/// value for a typed placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseValue {
    Null,
    Bool(bool),
    Int64(i64),
    Float64(f64),
    String(String),
    Bytes(Vec<u8>),
    Uuid(uuid::Uuid),
    DateTime(chrono::DateTime<chrono::Utc>),
    Json(JsonValue),
}

impl DatabaseValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, DatabaseValue::Null)
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> JsonValue {
        match self {
            DatabaseValue::Null => JsonValue::Null,
            DatabaseValue::Bool(b) => JsonValue::Bool(*b),
            DatabaseValue::Int64(i) => JsonValue::from(*i),
            DatabaseValue::Float64(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            DatabaseValue::String(s) => JsonValue::String(s.clone()),
            DatabaseValue::Bytes(b) => JsonValue::Array(b.iter().map(|&x| JsonValue::from(x)).collect()),
            DatabaseValue::Uuid(u) => JsonValue::String(u.to_string()),
            DatabaseValue::DateTime(dt) => JsonValue::String(dt.to_rfc3339()),
            DatabaseValue::Json(j) => j.clone(),
        }
    }

    /// Create DatabaseValue from an attribute value
    ///
    /// Arrays and objects are bound as JSON text so they fit textual columns
    /// on every backend.
    pub fn from_json(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => DatabaseValue::Null,
            JsonValue::Bool(b) => DatabaseValue::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DatabaseValue::Int64(i)
                } else {
                    n.as_f64().map(DatabaseValue::Float64).unwrap_or(DatabaseValue::Null)
                }
            }
            JsonValue::String(s) => DatabaseValue::String(s),
            composite @ (JsonValue::Array(_) | JsonValue::Object(_)) => {
                DatabaseValue::String(composite.to_string())
            }
        }
    }
}

impl From<JsonValue> for DatabaseValue {
    fn from(value: JsonValue) -> Self {
        DatabaseValue::from_json(value)
    }
}

impl From<bool> for DatabaseValue {
    fn from(value: bool) -> Self {
        DatabaseValue::Bool(value)
    }
}

impl From<i64> for DatabaseValue {
    fn from(value: i64) -> Self {
        DatabaseValue::Int64(value)
    }
}

impl From<f64> for DatabaseValue {
    fn from(value: f64) -> Self {
        DatabaseValue::Float64(value)
    }
}

impl From<&str> for DatabaseValue {
    fn from(value: &str) -> Self {
        DatabaseValue::String(value.to_string())
    }
}

impl From<String> for DatabaseValue {
    fn from(value: String) -> Self {
        DatabaseValue::String(value)
    }
}

impl From<uuid::Uuid> for DatabaseValue {
    fn from(value: uuid::Uuid) -> Self {
        DatabaseValue::Uuid(value)
    }
}

impl From<Vec<u8>> for DatabaseValue {
    fn from(value: Vec<u8>) -> Self {
        DatabaseValue::Bytes(value)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for DatabaseValue {
    fn from(value: chrono::DateTime<chrono::Utc>) -> Self {
        DatabaseValue::DateTime(value)
    }
}

/// SQL dialect enumeration for generating database-specific SQL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    PostgreSQL,
    MySQL,
    SQLite,
}

impl SqlDialect {
    /// Get the parameter placeholder for a zero-based parameter index
    pub fn parameter_placeholder(&self, index: usize) -> String {
        match self {
            SqlDialect::PostgreSQL => format!("${}", index + 1),
            SqlDialect::MySQL | SqlDialect::SQLite => "?".to_string(),
        }
    }

    /// Whether inserted identifiers are reported through a RETURNING clause
    /// rather than a native last-insert-id signal
    pub fn returns_identifiers(&self) -> bool {
        matches!(self, SqlDialect::PostgreSQL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classification_by_leading_keyword() {
        assert_eq!(StatementKind::classify("SELECT * FROM t"), StatementKind::Query);
        assert_eq!(StatementKind::classify("   select 1"), StatementKind::Query);
        assert_eq!(StatementKind::classify("WITH x AS (SELECT 1) SELECT * FROM x"), StatementKind::Query);
        assert_eq!(StatementKind::classify("pragma table_info(t)"), StatementKind::Query);
        assert_eq!(StatementKind::classify("INSERT INTO t (a) VALUES ($1)"), StatementKind::Manipulation);
        assert_eq!(StatementKind::classify("\n\tDelete FROM t"), StatementKind::Manipulation);
        assert_eq!(StatementKind::classify("CREATE TABLE t (id INT)"), StatementKind::Definition);
        assert_eq!(StatementKind::classify("truncate t"), StatementKind::Definition);
        assert_eq!(StatementKind::classify("BEGIN"), StatementKind::Control);
        assert_eq!(StatementKind::classify("rollback"), StatementKind::Control);
        assert_eq!(StatementKind::classify("VACUUM"), StatementKind::Other);
        assert_eq!(StatementKind::classify(""), StatementKind::Other);
    }

    #[test]
    fn test_returning_clause_detection() {
        assert!(has_returning_clause("INSERT INTO t (a) VALUES ($1) RETURNING id"));
        assert!(has_returning_clause("insert into t (a) values (?) returning id as id"));
        assert!(!has_returning_clause("INSERT INTO returning_log (a) VALUES (?)"));
    }

    #[test]
    fn test_identifier_recovery_uses_alias_priority() {
        let mut row = Record::new();
        row.insert("IDENTITY".to_string(), json!(9));
        row.insert("Id".to_string(), json!(7));
        assert_eq!(recover_returned_identifier(&[row]), Some(json!(7)));

        let mut unrelated = Record::new();
        unrelated.insert("total".to_string(), json!(42));
        assert_eq!(recover_returned_identifier(&[unrelated]), None);
        assert_eq!(recover_returned_identifier(&[]), None);
    }

    #[test]
    fn test_envelope_accessors() {
        let mutation = ResultEnvelope::Mutation {
            affected: 1,
            last_insert_row_id: Some(json!(5)),
            raw: JsonValue::Null,
        };
        assert_eq!(mutation.affected(), Some(1));
        assert_eq!(mutation.last_insert_row_id(), Some(&json!(5)));
        assert!(mutation.into_rows().is_empty());

        let control = ResultEnvelope::control("commit");
        assert_eq!(control, ResultEnvelope::Control { message: "COMMIT executed".to_string() });
        assert_eq!(control.affected(), None);
    }

    #[test]
    fn test_placeholders_per_dialect() {
        assert_eq!(SqlDialect::PostgreSQL.parameter_placeholder(0), "$1");
        assert_eq!(SqlDialect::PostgreSQL.parameter_placeholder(2), "$3");
        assert_eq!(SqlDialect::MySQL.parameter_placeholder(2), "?");
        assert_eq!(SqlDialect::SQLite.parameter_placeholder(0), "?");
    }

    #[test]
    fn test_composite_values_bind_as_json_text() {
        assert_eq!(
            DatabaseValue::from_json(json!([1, 2])),
            DatabaseValue::String("[1,2]".to_string())
        );
        assert_eq!(DatabaseValue::from_json(json!(3)), DatabaseValue::Int64(3));
        assert_eq!(DatabaseValue::from_json(json!(1.5)), DatabaseValue::Float64(1.5));
    }

    #[test]
    fn test_typed_values_render_as_json() {
        let at = chrono::DateTime::parse_from_rfc3339("2026-10-19T17:57:58Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        assert_eq!(DatabaseValue::from(at).to_json(), json!("2026-10-19T17:57:58+00:00"));
        assert_eq!(DatabaseValue::from(vec![1u8, 2]).to_json(), json!([1, 2]));
        assert_eq!(DatabaseValue::Json(json!({"a": 1})).to_json(), json!({"a": 1}));
    }
}
