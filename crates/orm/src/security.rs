//! Identifier validation for compiled statements
//!
//! Values always travel as bound parameters. Table and column names cannot be
//! bound, so every identifier that reaches a compiled statement passes through
//! these checks first.

use crate::error::ModelError;

/// Characters allowed in SQL identifiers (alphanumeric, underscore, dollar)
const ALLOWED_IDENTIFIER_CHARS: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_$";

/// Statement keywords that may never be used as a bare identifier
static SQL_KEYWORDS: &[&str] = &[
    "SELECT", "INSERT", "UPDATE", "DELETE", "FROM", "WHERE", "JOIN", "UNION", "DROP", "CREATE",
    "ALTER", "GRANT", "REVOKE", "TRUNCATE", "EXEC", "EXECUTE", "DECLARE",
];

/// Validate that a bare identifier is safe for use in SQL
pub fn validate_identifier(identifier: &str) -> Result<(), ModelError> {
    let first = identifier
        .chars()
        .next()
        .ok_or_else(|| ModelError::Validation("Identifier cannot be empty".to_string()))?;

    // PostgreSQL limit is 63 characters
    if identifier.len() > 63 {
        return Err(ModelError::Validation(format!(
            "Identifier '{}' is too long (max 63 characters)",
            identifier
        )));
    }

    if let Some(c) = identifier.chars().find(|c| !ALLOWED_IDENTIFIER_CHARS.contains(*c)) {
        return Err(ModelError::Validation(format!(
            "Identifier '{}' contains invalid character '{}'",
            identifier, c
        )));
    }

    if first.is_ascii_digit() {
        return Err(ModelError::Validation(format!(
            "Identifier '{}' cannot start with a number",
            identifier
        )));
    }

    if SQL_KEYWORDS.contains(&identifier.to_uppercase().as_str()) {
        return Err(ModelError::Validation(format!(
            "Identifier '{}' is a reserved SQL keyword",
            identifier
        )));
    }

    Ok(())
}

/// Validate a column reference: `column`, `table.column`, `*` or `table.*`
pub fn validate_column_reference(reference: &str) -> Result<(), ModelError> {
    if reference == "*" {
        return Ok(());
    }

    match reference.split_once('.') {
        Some((table, "*")) => validate_identifier(table),
        Some((table, column)) => {
            validate_identifier(table)?;
            validate_identifier(column)
        }
        None => validate_identifier(reference),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("user_table").is_ok());
        assert!(validate_identifier("table1").is_ok());
        assert!(validate_identifier("_private").is_ok());
        assert!(validate_identifier("user").is_ok());

        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("1table").is_err());
        assert!(validate_identifier("table-name").is_err());
        assert!(validate_identifier("table name").is_err());
        assert!(validate_identifier("SELECT").is_err());
        assert!(validate_identifier("select").is_err());
    }

    #[test]
    fn test_validate_column_reference() {
        assert!(validate_column_reference("*").is_ok());
        assert!(validate_column_reference("orders.*").is_ok());
        assert!(validate_column_reference("orders.user_id").is_ok());
        assert!(validate_column_reference("total").is_ok());

        assert!(validate_column_reference("orders.").is_err());
        assert!(validate_column_reference("id; DROP TABLE users").is_err());
        assert!(validate_column_reference("a.b.c").is_err());
    }
}
