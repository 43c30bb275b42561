//! Query Builder DML operations (INSERT, UPDATE, DELETE)

use serde_json::Value;

use super::builder::QueryBuilder;
use super::sql_generation::{CompiledSql, SqlWriter};
use crate::backends::{Record, SqlDialect};
use crate::error::{ModelError, OrmResult};
use crate::security::validate_identifier;

/// Compile `INSERT INTO table (...) VALUES (...)`, optionally returning the
/// key column under the `id` alias
pub fn compile_insert(
    table: &str,
    values: &Record,
    returning: Option<&str>,
    dialect: SqlDialect,
) -> OrmResult<CompiledSql> {
    validate_identifier(table)?;
    if values.is_empty() {
        return Err(ModelError::Query(format!("Cannot insert an empty row into '{}'", table)));
    }

    let mut writer = SqlWriter::new(dialect);
    let mut columns = Vec::with_capacity(values.len());
    let mut placeholders = Vec::with_capacity(values.len());
    for (column, value) in values {
        validate_identifier(column)?;
        columns.push(column.as_str());
        placeholders.push(writer.bind(value.clone()));
    }

    writer.push(&format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    ));

    if let Some(key) = returning {
        validate_identifier(key)?;
        writer.push(&format!(" RETURNING {} AS id", key));
    }
    Ok(writer.finish())
}

/// Compile `UPDATE table SET ... WHERE key = ?`
pub fn compile_update(
    table: &str,
    values: &Record,
    key_column: &str,
    key_value: &Value,
    dialect: SqlDialect,
) -> OrmResult<CompiledSql> {
    validate_identifier(table)?;
    validate_identifier(key_column)?;
    if values.is_empty() {
        return Err(ModelError::Query(format!("Nothing to update on '{}'", table)));
    }

    let mut writer = SqlWriter::new(dialect);
    let mut assignments = Vec::with_capacity(values.len());
    for (column, value) in values {
        validate_identifier(column)?;
        assignments.push(format!("{} = {}", column, writer.bind(value.clone())));
    }
    let key_placeholder = writer.bind(key_value.clone());

    writer.push(&format!(
        "UPDATE {} SET {} WHERE {} = {}",
        table,
        assignments.join(", "),
        key_column,
        key_placeholder
    ));
    Ok(writer.finish())
}

impl<M> QueryBuilder<M> {
    /// Compile a DELETE over the builder's table and predicates
    pub fn to_delete_sql(&self, dialect: SqlDialect) -> OrmResult<CompiledSql> {
        validate_identifier(&self.spec.table)?;

        let mut writer = SqlWriter::new(dialect);
        writer.push("DELETE FROM ");
        writer.push(&self.spec.table);
        self.spec.write_where(&mut writer)?;
        Ok(writer.finish())
    }
}
