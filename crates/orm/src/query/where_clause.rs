//! Query Builder WHERE clause operations
//!
//! Every verb appends one conjunct; predicates are combined with AND in the
//! order they were added.

use serde_json::Value;

use super::builder::QueryBuilder;
use super::types::*;

impl<M> QueryBuilder<M> {
    /// Add WHERE condition with equality
    pub fn where_eq<T>(self, column: &str, value: T) -> Self
    where
        T: Into<Value>,
    {
        self.where_op(column, "=", value)
    }

    /// Add WHERE condition with custom operator (`=`, `!=`, `<>`, `<`, `<=`,
    /// `>`, `>=`, `LIKE`, `NOT LIKE`)
    pub fn where_op<T: Into<Value>>(mut self, column: &str, operator: &str, value: T) -> Self {
        self.spec.predicates.push(Predicate::Compare {
            column: column.to_string(),
            operator: operator.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn where_in<T: Into<Value>>(mut self, column: &str, values: Vec<T>) -> Self {
        self.spec.predicates.push(Predicate::In {
            column: column.to_string(),
            values: values.into_iter().map(Into::into).collect(),
            negated: false,
        });
        self
    }

    pub fn where_not_in<T: Into<Value>>(mut self, column: &str, values: Vec<T>) -> Self {
        self.spec.predicates.push(Predicate::In {
            column: column.to_string(),
            values: values.into_iter().map(Into::into).collect(),
            negated: true,
        });
        self
    }

    pub fn where_null(mut self, column: &str) -> Self {
        self.spec.predicates.push(Predicate::Null {
            column: column.to_string(),
            negated: false,
        });
        self
    }

    pub fn where_not_null(mut self, column: &str) -> Self {
        self.spec.predicates.push(Predicate::Null {
            column: column.to_string(),
            negated: true,
        });
        self
    }

    pub fn where_between<T: Into<Value>>(mut self, column: &str, low: T, high: T) -> Self {
        self.spec.predicates.push(Predicate::Between {
            column: column.to_string(),
            low: low.into(),
            high: high.into(),
            negated: false,
        });
        self
    }

    pub fn where_not_between<T: Into<Value>>(mut self, column: &str, low: T, high: T) -> Self {
        self.spec.predicates.push(Predicate::Between {
            column: column.to_string(),
            low: low.into(),
            high: high.into(),
            negated: true,
        });
        self
    }
}
