//! Query Builder SQL generation
//!
//! Values are always bound as positional parameters in the placeholder style
//! of the target dialect. Identifiers are validated before they are spliced
//! into the statement text.

use serde_json::Value;

use super::builder::QueryBuilder;
use super::types::*;
use crate::backends::{DatabaseValue, SqlDialect};
use crate::error::{ModelError, OrmResult};
use crate::security::{validate_column_reference, validate_identifier};

/// Statement text plus its positional parameters
pub type CompiledSql = (String, Vec<DatabaseValue>);

/// Accumulates statement text and parameters for one dialect
pub(crate) struct SqlWriter {
    dialect: SqlDialect,
    pub(crate) sql: String,
    pub(crate) params: Vec<DatabaseValue>,
}

impl SqlWriter {
    pub(crate) fn new(dialect: SqlDialect) -> Self {
        Self {
            dialect,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Register a parameter and return its placeholder
    pub(crate) fn bind(&mut self, value: Value) -> String {
        self.params.push(DatabaseValue::from_json(value));
        self.dialect.parameter_placeholder(self.params.len() - 1)
    }

    pub(crate) fn push(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    pub(crate) fn finish(self) -> CompiledSql {
        (self.sql, self.params)
    }
}

/// Validate a projection entry: a column reference, optionally aliased
fn validate_projection(field: &str) -> OrmResult<()> {
    let lowered = field.to_ascii_lowercase();
    match lowered.find(" as ") {
        Some(pos) => {
            validate_column_reference(field[..pos].trim())?;
            validate_identifier(field[pos + 4..].trim())
        }
        None => validate_column_reference(field),
    }
}

impl QuerySpec {
    /// Compile the SELECT statement
    pub fn to_sql(&self, dialect: SqlDialect) -> OrmResult<CompiledSql> {
        validate_identifier(&self.table)?;
        for field in &self.fields {
            validate_projection(field)?;
        }

        let mut writer = SqlWriter::new(dialect);
        writer.push("SELECT ");
        if self.fields.is_empty() {
            writer.push("*");
        } else {
            writer.push(&self.fields.join(", "));
        }
        writer.push(" FROM ");
        writer.push(&self.table);

        self.write_joins(&mut writer)?;
        self.write_where(&mut writer)?;

        if !self.group_by.is_empty() {
            for column in &self.group_by {
                validate_column_reference(column)?;
            }
            writer.push(" GROUP BY ");
            writer.push(&self.group_by.join(", "));
        }

        if !self.order_by.is_empty() {
            let mut clauses = Vec::with_capacity(self.order_by.len());
            for (column, direction) in &self.order_by {
                validate_column_reference(column)?;
                clauses.push(format!("{} {}", column, direction));
            }
            writer.push(" ORDER BY ");
            writer.push(&clauses.join(", "));
        }

        self.write_limit_offset(&mut writer, dialect);
        Ok(writer.finish())
    }

    /// Compile `SELECT COUNT(*) AS aggregate` over the same source and filters
    pub fn to_count_sql(&self, dialect: SqlDialect) -> OrmResult<CompiledSql> {
        validate_identifier(&self.table)?;

        let mut writer = SqlWriter::new(dialect);
        writer.push("SELECT COUNT(*) AS aggregate FROM ");
        writer.push(&self.table);
        self.write_joins(&mut writer)?;
        self.write_where(&mut writer)?;
        Ok(writer.finish())
    }

    fn write_joins(&self, writer: &mut SqlWriter) -> OrmResult<()> {
        for join in &self.joins {
            validate_identifier(&join.table)?;
            writer.push(&format!(" {} {}", join.join_type, join.table));

            match (&join.on, join.join_type) {
                (_, JoinType::Cross) => {}
                (Some((left, right)), _) => {
                    validate_column_reference(left)?;
                    validate_column_reference(right)?;
                    writer.push(&format!(" ON {} = {}", left, right));
                }
                (None, join_type) => {
                    return Err(ModelError::Query(format!(
                        "{} on '{}' requires a column pair",
                        join_type, join.table
                    )))
                }
            }
        }
        Ok(())
    }

    pub(crate) fn write_where(&self, writer: &mut SqlWriter) -> OrmResult<()> {
        if self.predicates.is_empty() {
            return Ok(());
        }

        let mut conditions = Vec::with_capacity(self.predicates.len());
        for predicate in &self.predicates {
            conditions.push(compile_predicate(predicate, writer)?);
        }
        writer.push(" WHERE ");
        writer.push(&conditions.join(" AND "));
        Ok(())
    }

    fn write_limit_offset(&self, writer: &mut SqlWriter, dialect: SqlDialect) {
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => writer.push(&format!(" LIMIT {} OFFSET {}", limit, offset)),
            (Some(limit), None) => writer.push(&format!(" LIMIT {}", limit)),
            // MySQL and SQLite only accept OFFSET after a LIMIT
            (None, Some(offset)) => match dialect {
                SqlDialect::PostgreSQL => writer.push(&format!(" OFFSET {}", offset)),
                SqlDialect::MySQL => writer.push(&format!(" LIMIT {} OFFSET {}", u64::MAX, offset)),
                SqlDialect::SQLite => writer.push(&format!(" LIMIT -1 OFFSET {}", offset)),
            },
            (None, None) => {}
        }
    }
}

fn compile_predicate(predicate: &Predicate, writer: &mut SqlWriter) -> OrmResult<String> {
    match predicate {
        Predicate::Compare { column, operator, value } => {
            validate_column_reference(column)?;
            let operator: QueryOperator = operator.parse()?;
            let placeholder = writer.bind(value.clone());
            Ok(format!("{} {} {}", column, operator, placeholder))
        }
        Predicate::In { column, values, negated } => {
            validate_column_reference(column)?;
            if values.is_empty() {
                // an empty list matches nothing, its negation everything
                return Ok(if *negated { "1 = 1" } else { "1 = 0" }.to_string());
            }
            let placeholders: Vec<String> = values.iter().map(|v| writer.bind(v.clone())).collect();
            let keyword = if *negated { "NOT IN" } else { "IN" };
            Ok(format!("{} {} ({})", column, keyword, placeholders.join(", ")))
        }
        Predicate::Null { column, negated } => {
            validate_column_reference(column)?;
            let keyword = if *negated { "IS NOT NULL" } else { "IS NULL" };
            Ok(format!("{} {}", column, keyword))
        }
        Predicate::Between { column, low, high, negated } => {
            validate_column_reference(column)?;
            let low = writer.bind(low.clone());
            let high = writer.bind(high.clone());
            let keyword = if *negated { "NOT BETWEEN" } else { "BETWEEN" };
            Ok(format!("{} {} {} AND {}", column, keyword, low, high))
        }
    }
}

impl<M> QueryBuilder<M> {
    /// Compile the SELECT statement for inspection or manual execution
    pub fn to_sql(&self, dialect: SqlDialect) -> OrmResult<CompiledSql> {
        self.spec.to_sql(dialect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_select_with_all_clauses_postgres() {
        let builder: QueryBuilder = QueryBuilder::new("users")
            .select(&["users.id", "users.name", "orders.total AS order_total"])
            .join("orders", "orders.user_id", "users.id")
            .where_eq("users.active", true)
            .where_in("users.role", vec!["admin", "staff"])
            .where_not_null("users.email")
            .where_between("orders.total", 10, 100)
            .group_by(&["users.id", "users.name", "orders.total"])
            .order_by_desc("users.name")
            .limit(10)
            .offset(20);

        let (sql, params) = builder.to_sql(SqlDialect::PostgreSQL).unwrap();
        assert_eq!(
            sql,
            "SELECT users.id, users.name, orders.total AS order_total FROM users \
             INNER JOIN orders ON orders.user_id = users.id \
             WHERE users.active = $1 AND users.role IN ($2, $3) AND users.email IS NOT NULL \
             AND orders.total BETWEEN $4 AND $5 \
             GROUP BY users.id, users.name, orders.total ORDER BY users.name DESC LIMIT 10 OFFSET 20"
        );
        assert_eq!(params.len(), 5);
        assert_eq!(params[0], DatabaseValue::Bool(true));
        assert_eq!(params[2], DatabaseValue::String("staff".to_string()));
    }

    #[test]
    fn test_question_mark_placeholders() {
        let builder: QueryBuilder = QueryBuilder::new("orders")
            .where_op("total", ">=", 50)
            .where_not_between("created_at", "2024-01-01", "2024-02-01");
        let (sql, params) = builder.to_sql(SqlDialect::SQLite).unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM orders WHERE total >= ? AND created_at NOT BETWEEN ? AND ?"
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_empty_in_lists() {
        let empty: Vec<Value> = Vec::new();
        let builder: QueryBuilder = QueryBuilder::new("items")
            .where_in("id", empty.clone())
            .where_not_in("sku", empty);
        let (sql, params) = builder.to_sql(SqlDialect::MySQL).unwrap();
        assert_eq!(sql, "SELECT * FROM items WHERE 1 = 0 AND 1 = 1");
        assert!(params.is_empty());
    }

    #[test]
    fn test_cross_join_and_count() {
        let builder: QueryBuilder = QueryBuilder::new("sizes")
            .cross_join("colors")
            .where_eq("sizes.active", 1)
            .order_by_asc("sizes.id")
            .limit(5);
        let (sql, _) = builder.to_sql(SqlDialect::SQLite).unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM sizes CROSS JOIN colors WHERE sizes.active = ? ORDER BY sizes.id ASC LIMIT 5"
        );

        let (count_sql, params) = builder.spec().to_count_sql(SqlDialect::PostgreSQL).unwrap();
        assert_eq!(
            count_sql,
            "SELECT COUNT(*) AS aggregate FROM sizes CROSS JOIN colors WHERE sizes.active = $1"
        );
        assert_eq!(params, vec![DatabaseValue::Int64(1)]);
    }

    #[test]
    fn test_offset_without_limit_per_dialect() {
        let builder: QueryBuilder = QueryBuilder::new("logs").offset(5);
        assert_eq!(builder.to_sql(SqlDialect::PostgreSQL).unwrap().0, "SELECT * FROM logs OFFSET 5");
        assert_eq!(
            builder.to_sql(SqlDialect::SQLite).unwrap().0,
            "SELECT * FROM logs LIMIT -1 OFFSET 5"
        );
    }

    #[test]
    fn test_rejects_unsafe_identifiers_and_operators() {
        let injected: QueryBuilder = QueryBuilder::new("users").where_eq("id; DROP TABLE users", 1);
        assert!(matches!(injected.to_sql(SqlDialect::PostgreSQL), Err(ModelError::Validation(_))));

        let bad_table: QueryBuilder = QueryBuilder::new("users u");
        assert!(bad_table.to_sql(SqlDialect::PostgreSQL).is_err());

        let bad_op: QueryBuilder = QueryBuilder::new("users").where_op("id", "~~", json!(1));
        assert!(matches!(bad_op.to_sql(SqlDialect::PostgreSQL), Err(ModelError::Query(_))));

        let bad_field: QueryBuilder = QueryBuilder::new("users").select(&["name) FROM secrets --"]);
        assert!(bad_field.to_sql(SqlDialect::PostgreSQL).is_err());
    }
}
