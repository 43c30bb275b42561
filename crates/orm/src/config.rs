//! Connection configuration
//!
//! A [`DatabaseConfig`] names every connection the application may use and
//! which one is the default. It deserializes from any serde source and can be
//! assembled from the process environment.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backends::DatabaseBackendType;
use crate::error::{ModelError, ModelResult};

/// Connection pool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    /// Seconds to wait for a free connection
    pub acquire_timeout: u64,
    pub idle_timeout: Option<u64>,
    pub max_lifetime: Option<u64>,
    pub test_before_acquire: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: 30,
            idle_timeout: Some(600), // 10 minutes
            max_lifetime: Some(1800), // 30 minutes
            test_before_acquire: true,
        }
    }
}

impl PoolConfig {
    /// sqlx pool options for any row-oriented backend
    pub fn pool_options<DB: sqlx::Database>(&self) -> sqlx::pool::PoolOptions<DB> {
        sqlx::pool::PoolOptions::<DB>::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout))
            .idle_timeout(self.idle_timeout.map(Duration::from_secs))
            .max_lifetime(self.max_lifetime.map(Duration::from_secs))
            .test_before_acquire(self.test_before_acquire)
    }
}

/// One named connection, tagged by driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "driver", rename_all = "lowercase")]
pub enum ConnectionConfig {
    Postgres {
        url: String,
        #[serde(default)]
        pool: PoolConfig,
    },
    Mysql {
        url: String,
        #[serde(default)]
        pool: PoolConfig,
    },
    Sqlite {
        url: String,
        #[serde(default)]
        pool: PoolConfig,
    },
    Mongodb {
        uri: String,
        database: String,
    },
}

impl ConnectionConfig {
    /// Backend family of this connection
    pub fn backend_type(&self) -> DatabaseBackendType {
        match self {
            ConnectionConfig::Postgres { .. } => DatabaseBackendType::PostgreSQL,
            ConnectionConfig::Mysql { .. } => DatabaseBackendType::MySQL,
            ConnectionConfig::Sqlite { .. } => DatabaseBackendType::SQLite,
            ConnectionConfig::Mongodb { .. } => DatabaseBackendType::MongoDB,
        }
    }

    fn driver_name(&self) -> &'static str {
        match self {
            ConnectionConfig::Postgres { .. } => "postgres",
            ConnectionConfig::Mysql { .. } => "mysql",
            ConnectionConfig::Sqlite { .. } => "sqlite",
            ConnectionConfig::Mongodb { .. } => "mongodb",
        }
    }
}

/// Every configured connection plus the default one's name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub default: String,
    #[serde(default)]
    pub connections: HashMap<String, ConnectionConfig>,
}

impl DatabaseConfig {
    /// Configuration holding a single connection, which is also the default
    pub fn single(name: impl Into<String>, connection: ConnectionConfig) -> Self {
        let name = name.into();
        let mut connections = HashMap::new();
        connections.insert(name.clone(), connection);
        Self { default: name, connections }
    }

    /// Build the configuration from `DB_CONNECTION`, `DATABASE_URL` and
    /// `MONGODB_DATABASE`
    pub fn from_env() -> ModelResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> ModelResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL").ok_or_else(|| {
            ModelError::Configuration("DATABASE_URL environment variable not set".to_string())
        })?;

        let backend = match lookup("DB_CONNECTION") {
            Some(driver) => driver.parse::<DatabaseBackendType>().map_err(ModelError::Configuration)?,
            None => DatabaseBackendType::from_url(&url).ok_or_else(|| {
                ModelError::Configuration(format!("Cannot infer database driver from URL '{}'", url))
            })?,
        };

        let connection = match backend {
            DatabaseBackendType::PostgreSQL => ConnectionConfig::Postgres { url, pool: PoolConfig::default() },
            DatabaseBackendType::MySQL => ConnectionConfig::Mysql { url, pool: PoolConfig::default() },
            DatabaseBackendType::SQLite => ConnectionConfig::Sqlite { url, pool: PoolConfig::default() },
            DatabaseBackendType::MongoDB => {
                let database = lookup("MONGODB_DATABASE")
                    .or_else(|| database_from_uri(&url))
                    .ok_or_else(|| {
                        ModelError::Configuration(
                            "MONGODB_DATABASE environment variable not set and DATABASE_URL names no database"
                                .to_string(),
                        )
                    })?;
                ConnectionConfig::Mongodb { uri: url, database }
            }
        };

        Ok(Self::single(connection.driver_name(), connection))
    }

    /// Look up a connection by name
    pub fn connection(&self, name: &str) -> Option<&ConnectionConfig> {
        self.connections.get(name)
    }

    /// Check that the default connection is configured
    pub fn validate(&self) -> ModelResult<()> {
        if self.connections.contains_key(&self.default) {
            Ok(())
        } else {
            Err(ModelError::Configuration(format!(
                "Default connection '{}' is not configured",
                self.default
            )))
        }
    }
}

/// Database name from the path of a `mongodb://host/name` URI
fn database_from_uri(uri: &str) -> Option<String> {
    let parsed = url::Url::parse(uri).ok()?;
    let name = parsed.path().trim_start_matches('/');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
