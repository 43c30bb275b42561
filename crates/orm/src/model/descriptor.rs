//! Entity class descriptors
//!
//! Every mapped type owns one `'static` [`ModelDescriptor`] holding its table
//! metadata, write guards, serialization filters and attribute transforms.
//! Descriptors are built once with the consuming builder methods below,
//! typically inside a `once_cell::sync::Lazy`.

use std::collections::HashMap;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{ModelError, ModelResult};

/// Attribute transform used by accessors and mutators
pub type AttributeTransform = fn(Value) -> Value;

/// Declarative attribute cast applied on read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cast {
    String,
    Boolean,
    Integer,
    Array,
    Object,
}

impl Cast {
    /// Apply the cast to a stored value
    pub fn apply(&self, value: Value) -> Value {
        match self {
            Cast::String => cast_string(value),
            Cast::Boolean => Value::Bool(is_truthy(&value)),
            Cast::Integer => cast_integer(value),
            Cast::Array => cast_structured(value, || Value::Array(Vec::new())),
            Cast::Object => cast_structured(value, || Value::Object(serde_json::Map::new())),
        }
    }
}

impl FromStr for Cast {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Cast::String),
            "boolean" | "bool" => Ok(Cast::Boolean),
            "int" | "integer" => Ok(Cast::Integer),
            "array" => Ok(Cast::Array),
            "object" => Ok(Cast::Object),
            other => Err(ModelError::Configuration(format!("Unknown attribute cast '{}'", other))),
        }
    }
}

fn cast_string(value: Value) -> Value {
    match value {
        Value::Null | Value::String(_) => value,
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Number(n) => Value::String(n.to_string()),
        composite => Value::String(composite.to_string()),
    }
}

/// Truthiness of an attribute value: null, false, 0, NaN and "" are false
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn cast_integer(value: Value) -> Value {
    match value {
        Value::String(s) => parse_leading_integer(&s).map(Value::from).unwrap_or(Value::Null),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Value::from(i),
            None => n
                .as_f64()
                .filter(|f| f.is_finite())
                .map(|f| Value::from(f.trunc() as i64))
                .unwrap_or(Value::Null),
        },
        Value::Array(mut items) if !items.is_empty() => cast_integer(items.swap_remove(0)),
        _ => Value::Null,
    }
}

/// Parse the leading base-10 integer of a string (`"42abc"` -> 42)
fn parse_leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn cast_structured(value: Value, empty: fn() -> Value) -> Value {
    match value {
        Value::Null => empty(),
        Value::String(text) => serde_json::from_str(&text).unwrap_or_else(|_| empty()),
        structured => structured,
    }
}

/// Primary key kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    /// Backend-assigned auto-increment integer
    Integer,
    /// Caller-assigned string key
    String,
    /// UUID generated on insert when absent
    Uuid,
}

/// Class-level metadata of a mapped entity type
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    pub model_name: String,
    pub table: String,
    pub primary_key: String,
    pub key_type: KeyType,
    pub incrementing: bool,
    pub timestamps: bool,
    pub created_at_column: String,
    pub updated_at_column: String,
    /// chrono format string for generated timestamps
    pub timestamp_format: String,
    pub soft_deletes: bool,
    pub deleted_at_column: String,
    pub connection: Option<String>,
    pub fillable: Vec<String>,
    pub guarded: Vec<String>,
    pub hidden: Vec<String>,
    pub visible: Vec<String>,
    pub casts: HashMap<String, Cast>,
    pub accessors: HashMap<String, AttributeTransform>,
    pub mutators: HashMap<String, AttributeTransform>,
}

impl ModelDescriptor {
    /// Descriptor with defaults; the table is the snake-case plural of `model_name`
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            table: table_name_for(model_name),
            primary_key: "id".to_string(),
            key_type: KeyType::Integer,
            incrementing: true,
            timestamps: true,
            created_at_column: "created_at".to_string(),
            updated_at_column: "updated_at".to_string(),
            timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
            soft_deletes: false,
            deleted_at_column: "deleted_at".to_string(),
            connection: None,
            fillable: Vec::new(),
            guarded: Vec::new(),
            hidden: Vec::new(),
            visible: Vec::new(),
            casts: HashMap::new(),
            accessors: HashMap::new(),
            mutators: HashMap::new(),
        }
    }

    pub fn table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    pub fn primary_key(mut self, column: &str, key_type: KeyType) -> Self {
        self.primary_key = column.to_string();
        self.key_type = key_type;
        self.incrementing = key_type == KeyType::Integer;
        self
    }

    pub fn incrementing(mut self, incrementing: bool) -> Self {
        self.incrementing = incrementing;
        self
    }

    pub fn timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    pub fn timestamp_columns(mut self, created_at: &str, updated_at: &str) -> Self {
        self.created_at_column = created_at.to_string();
        self.updated_at_column = updated_at.to_string();
        self
    }

    pub fn timestamp_format(mut self, format: &str) -> Self {
        self.timestamp_format = format.to_string();
        self
    }

    pub fn soft_deletes(mut self, enabled: bool) -> Self {
        self.soft_deletes = enabled;
        self
    }

    pub fn deleted_at_column(mut self, column: &str) -> Self {
        self.deleted_at_column = column.to_string();
        self
    }

    /// Connection used when an instance carries no override
    pub fn connection(mut self, name: &str) -> Self {
        self.connection = Some(name.to_string());
        self
    }

    pub fn fillable(mut self, columns: &[&str]) -> Self {
        self.fillable = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn guarded(mut self, columns: &[&str]) -> Self {
        self.guarded = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn hidden(mut self, columns: &[&str]) -> Self {
        self.hidden = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn visible(mut self, columns: &[&str]) -> Self {
        self.visible = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn cast(mut self, column: &str, cast: Cast) -> Self {
        self.casts.insert(column.to_string(), cast);
        self
    }

    pub fn accessor(mut self, column: &str, transform: AttributeTransform) -> Self {
        self.accessors.insert(column.to_string(), transform);
        self
    }

    pub fn mutator(mut self, column: &str, transform: AttributeTransform) -> Self {
        self.mutators.insert(column.to_string(), transform);
        self
    }

    pub fn has_cast(&self, column: &str) -> bool {
        self.casts.contains_key(column)
    }

    /// Check the write guard for `column`
    ///
    /// A non-empty fillable list is authoritative (the primary key and, with
    /// timestamps on, the timestamp columns are implicitly fillable).
    /// Otherwise a non-empty guarded list is authoritative. With both lists
    /// empty every write is rejected.
    pub fn check_writable(&self, column: &str) -> ModelResult<()> {
        if !self.fillable.is_empty() {
            let implicit = column == self.primary_key
                || (self.timestamps && (column == self.created_at_column || column == self.updated_at_column));
            if implicit || self.fillable.iter().any(|c| c == column) {
                return Ok(());
            }
            return Err(ModelError::Authorization(format!(
                "Attribute '{}' is not fillable on model {}",
                column, self.model_name
            )));
        }

        if self.guarded.is_empty() {
            return Err(ModelError::Authorization(format!(
                "No fillable attributes defined for model {}",
                self.model_name
            )));
        }

        if self.guarded.iter().any(|c| c == column) {
            return Err(ModelError::Authorization(format!(
                "Attribute '{}' is guarded and cannot be set on model {}",
                column, self.model_name
            )));
        }
        Ok(())
    }

    /// Whether `column` survives the visible/hidden serialization filters
    pub fn is_serialized(&self, column: &str) -> bool {
        if !self.visible.is_empty() {
            return self.visible.iter().any(|c| c == column);
        }
        !self.hidden.iter().any(|c| c == column)
    }

    /// Default foreign key naming this entity from a child table
    pub fn default_foreign_key(&self) -> String {
        format!("{}_{}", self.table, self.primary_key)
    }

    /// Current time rendered with the timestamp format
    pub fn fresh_timestamp(&self) -> String {
        chrono::Utc::now()
            .naive_utc()
            .format(&self.timestamp_format)
            .to_string()
    }
}

/// Snake-case plural table name for a type name (`AdminDetail` -> `admin_details`)
pub fn table_name_for(model_name: &str) -> String {
    let base = model_name.rsplit("::").next().unwrap_or(model_name);

    let mut snake = String::with_capacity(base.len() + 4);
    for (i, c) in base.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                snake.push('_');
            }
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }

    pluralize(&snake)
}

fn pluralize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('y') {
        if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) {
            return format!("{}ies", stem);
        }
    }
    if word.ends_with('s') || word.ends_with('x') || word.ends_with('z') || word.ends_with("ch") || word.ends_with("sh") {
        return format!("{}es", word);
    }
    format!("{}s", word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_name_derivation() {
        assert_eq!(table_name_for("User"), "users");
        assert_eq!(table_name_for("AdminDetail"), "admin_details");
        assert_eq!(table_name_for("Category"), "categories");
        assert_eq!(table_name_for("Address"), "addresses");
        assert_eq!(table_name_for("app::models::Key"), "keys");
    }

    #[test]
    fn test_integer_cast() {
        assert_eq!(Cast::Integer.apply(json!("42abc")), json!(42));
        assert_eq!(Cast::Integer.apply(json!("3.7")), json!(3));
        assert_eq!(Cast::Integer.apply(json!("  -8")), json!(-8));
        assert_eq!(Cast::Integer.apply(json!("abc")), Value::Null);
        assert_eq!(Cast::Integer.apply(json!("")), Value::Null);
        assert_eq!(Cast::Integer.apply(json!([])), Value::Null);
        assert_eq!(Cast::Integer.apply(json!(["17", "2"])), json!(17));
        assert_eq!(Cast::Integer.apply(json!(9.99)), json!(9));
        assert_eq!(Cast::Integer.apply(json!(0)), json!(0));
        assert_eq!(Cast::Integer.apply(json!(true)), Value::Null);
        assert_eq!(Cast::Integer.apply(json!({"a": 1})), Value::Null);
        assert_eq!(Cast::Integer.apply(Value::Null), Value::Null);
    }

    #[test]
    fn test_boolean_cast() {
        assert_eq!(Cast::Boolean.apply(Value::Null), json!(false));
        assert_eq!(Cast::Boolean.apply(json!(0)), json!(false));
        assert_eq!(Cast::Boolean.apply(json!("")), json!(false));
        assert_eq!(Cast::Boolean.apply(json!("0")), json!(true));
        assert_eq!(Cast::Boolean.apply(json!(2)), json!(true));
        assert_eq!(Cast::Boolean.apply(json!([])), json!(true));
    }

    #[test]
    fn test_string_and_structured_casts() {
        assert_eq!(Cast::String.apply(json!(12)), json!("12"));
        assert_eq!(Cast::String.apply(json!(false)), json!("false"));
        assert_eq!(Cast::String.apply(json!([1, 2])), json!("[1,2]"));
        assert_eq!(Cast::String.apply(Value::Null), Value::Null);

        assert_eq!(Cast::Array.apply(json!("[1,2]")), json!([1, 2]));
        assert_eq!(Cast::Array.apply(json!("not json")), json!([]));
        assert_eq!(Cast::Array.apply(Value::Null), json!([]));
        assert_eq!(Cast::Object.apply(json!("{\"a\":1}")), json!({"a": 1}));
        assert_eq!(Cast::Object.apply(Value::Null), json!({}));
        assert_eq!(Cast::Object.apply(json!({"b": 2})), json!({"b": 2}));
    }

    #[test]
    fn test_casts_are_idempotent() {
        let samples = [
            json!(null),
            json!("42abc"),
            json!("3.7"),
            json!(""),
            json!(7.5),
            json!(["5"]),
            json!("[1,2]"),
            json!("{\"a\":1}"),
            json!(true),
            json!({"k": "v"}),
        ];
        for cast in [Cast::String, Cast::Boolean, Cast::Integer, Cast::Array, Cast::Object] {
            for sample in &samples {
                let once = cast.apply(sample.clone());
                assert_eq!(cast.apply(once.clone()), once, "{:?} on {}", cast, sample);
            }
        }
    }

    #[test]
    fn test_fillable_mode_admits_key_and_timestamps() {
        let descriptor = ModelDescriptor::new("Order").fillable(&["user_id", "total"]);
        assert!(descriptor.check_writable("total").is_ok());
        assert!(descriptor.check_writable("id").is_ok());
        assert!(descriptor.check_writable("created_at").is_ok());
        assert!(matches!(
            descriptor.check_writable("is_admin"),
            Err(ModelError::Authorization(_))
        ));

        let without_timestamps = descriptor.clone().timestamps(false);
        assert!(without_timestamps.check_writable("created_at").is_err());
    }

    #[test]
    fn test_guarded_mode_and_fail_closed() {
        let guarded = ModelDescriptor::new("User").guarded(&["is_admin"]);
        assert!(guarded.check_writable("email").is_ok());
        assert!(guarded.check_writable("is_admin").is_err());

        let closed = ModelDescriptor::new("Audit");
        assert!(matches!(closed.check_writable("anything"), Err(ModelError::Authorization(_))));
    }

    #[test]
    fn test_serialization_filters() {
        let visible = ModelDescriptor::new("User").visible(&["id", "email"]).hidden(&["email"]);
        assert!(visible.is_serialized("email"));
        assert!(!visible.is_serialized("password"));

        let hidden = ModelDescriptor::new("User").hidden(&["password"]);
        assert!(hidden.is_serialized("email"));
        assert!(!hidden.is_serialized("password"));
    }

    #[test]
    fn test_cast_from_str() {
        assert_eq!("int".parse::<Cast>().unwrap(), Cast::Integer);
        assert_eq!("boolean".parse::<Cast>().unwrap(), Cast::Boolean);
        assert!("decimal".parse::<Cast>().is_err());
    }
}
