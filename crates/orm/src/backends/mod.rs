//! Database Backend Abstractions
//!
//! Row-oriented engines (PostgreSQL, MySQL, SQLite) sit behind the common
//! [`DriverAdapter`] trait and share statement classification and envelope
//! normalization. The document store is reached through [`MongoAdapter`],
//! which stays outside the envelope taxonomy.

pub mod core;
#[cfg(feature = "mongodb")]
pub mod mongodb;
#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-export core traits and types
pub use core::*;
#[cfg(feature = "mongodb")]
pub use self::mongodb::MongoAdapter;
#[cfg(feature = "mysql")]
pub use mysql::MySqlAdapter;
#[cfg(feature = "postgres")]
pub use postgres::PostgresAdapter;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteAdapter;

/// Database backend type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseBackendType {
    PostgreSQL,
    MySQL,
    SQLite,
    MongoDB,
}

impl DatabaseBackendType {
    /// Infer the backend from a connection URL scheme
    pub fn from_url(url: &str) -> Option<Self> {
        let scheme = url.split_once(':').map(|(scheme, _)| scheme)?;
        scheme.parse().ok()
    }

    /// Whether this backend is reached through a [`DriverAdapter`]
    pub fn is_row_oriented(&self) -> bool {
        !matches!(self, DatabaseBackendType::MongoDB)
    }
}

impl std::fmt::Display for DatabaseBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseBackendType::PostgreSQL => write!(f, "postgresql"),
            DatabaseBackendType::MySQL => write!(f, "mysql"),
            DatabaseBackendType::SQLite => write!(f, "sqlite"),
            DatabaseBackendType::MongoDB => write!(f, "mongodb"),
        }
    }
}

impl std::str::FromStr for DatabaseBackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgresql" | "postgres" | "pgsql" => Ok(DatabaseBackendType::PostgreSQL),
            "mysql" | "mariadb" => Ok(DatabaseBackendType::MySQL),
            "sqlite" => Ok(DatabaseBackendType::SQLite),
            "mongodb" | "mongodb+srv" | "mongo" => Ok(DatabaseBackendType::MongoDB),
            _ => Err(format!("Unsupported database backend: {}", s)),
        }
    }
}
