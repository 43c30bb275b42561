//! Connection Provider
//!
//! [`DatabaseManager`] owns every named connection of the application. Row
//! oriented connections are shared as `Arc<dyn DriverAdapter>`; document
//! connections as `Arc<MongoAdapter>`. Entities resolve their connection by
//! name through the manager that is passed to every async operation.

use std::collections::HashMap;
use std::sync::Arc;

use crate::backends::{DatabaseBackendType, DriverAdapter};
#[cfg(feature = "mongodb")]
use crate::backends::MongoAdapter;
use crate::config::{ConnectionConfig, DatabaseConfig};
use crate::error::{ModelError, OrmResult};

/// One named connection, by backend family
#[derive(Clone)]
pub enum Connection {
    /// Row-oriented SQL engine
    Sql(Arc<dyn DriverAdapter>),
    /// Document store
    #[cfg(feature = "mongodb")]
    Document(Arc<MongoAdapter>),
}

impl Connection {
    pub fn backend_type(&self) -> DatabaseBackendType {
        match self {
            Connection::Sql(adapter) => adapter.backend_type(),
            #[cfg(feature = "mongodb")]
            Connection::Document(adapter) => adapter.backend_type(),
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Connection::Sql(adapter) => f.debug_tuple("Sql").field(&adapter.backend_type()).finish(),
            #[cfg(feature = "mongodb")]
            Connection::Document(adapter) => f.debug_tuple("Document").field(&adapter.database_name()).finish(),
        }
    }
}

/// Registry of named connections plus the default connection name
#[derive(Debug, Clone)]
pub struct DatabaseManager {
    default: String,
    connections: HashMap<String, Connection>,
}

impl DatabaseManager {
    /// Create an empty manager whose default connection is `default`
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            connections: HashMap::new(),
        }
    }

    /// Open every configured connection
    pub async fn from_config(config: &DatabaseConfig) -> OrmResult<Self> {
        config.validate()?;

        let mut manager = Self::new(config.default.clone());
        for (name, connection) in &config.connections {
            let connection = open_connection(connection).await?;
            manager.register(name.clone(), connection);
        }

        tracing::info!(
            default = %manager.default,
            connections = manager.connections.len(),
            "database manager ready"
        );
        Ok(manager)
    }

    /// Register a connection under `name`, replacing any previous one
    pub fn register(&mut self, name: impl Into<String>, connection: Connection) {
        let name = name.into();
        tracing::info!(connection = %name, backend = %connection.backend_type(), "registering database connection");
        self.connections.insert(name, connection);
    }

    /// Register a row-oriented adapter under `name`
    pub fn register_adapter(&mut self, name: impl Into<String>, adapter: Arc<dyn DriverAdapter>) {
        self.register(name, Connection::Sql(adapter));
    }

    /// Builder form of [`register_adapter`](Self::register_adapter)
    pub fn with_adapter(mut self, name: impl Into<String>, adapter: Arc<dyn DriverAdapter>) -> Self {
        self.register_adapter(name, adapter);
        self
    }

    pub fn default_connection(&self) -> &str {
        &self.default
    }

    pub fn has_connection(&self, name: &str) -> bool {
        self.connections.contains_key(name)
    }

    /// List all registered connection names
    pub fn connection_names(&self) -> Vec<&str> {
        self.connections.keys().map(String::as_str).collect()
    }

    /// Look up a connection; `None` selects the default
    pub fn connection(&self, name: Option<&str>) -> OrmResult<&Connection> {
        let name = name.unwrap_or(&self.default);
        self.connections.get(name).ok_or_else(|| {
            ModelError::Configuration(format!("Database connection '{}' is not configured", name))
        })
    }

    /// Row-oriented adapter for a connection
    pub fn sql(&self, name: Option<&str>) -> OrmResult<Arc<dyn DriverAdapter>> {
        match self.connection(name)? {
            Connection::Sql(adapter) => Ok(Arc::clone(adapter)),
            #[cfg(feature = "mongodb")]
            Connection::Document(_) => Err(ModelError::Configuration(format!(
                "Database connection '{}' is a document store",
                name.unwrap_or(&self.default)
            ))),
        }
    }

    /// Document-store adapter for a connection
    #[cfg(feature = "mongodb")]
    pub fn document(&self, name: Option<&str>) -> OrmResult<Arc<MongoAdapter>> {
        match self.connection(name)? {
            Connection::Document(adapter) => Ok(Arc::clone(adapter)),
            Connection::Sql(_) => Err(ModelError::Configuration(format!(
                "Database connection '{}' is not a document store",
                name.unwrap_or(&self.default)
            ))),
        }
    }

    /// Close every connection
    pub async fn close(&self) {
        for (name, connection) in &self.connections {
            match connection {
                Connection::Sql(adapter) => adapter.close().await,
                #[cfg(feature = "mongodb")]
                Connection::Document(adapter) => adapter.close().await,
            }
            tracing::debug!(connection = %name, "database connection closed");
        }
    }
}

async fn open_connection(config: &ConnectionConfig) -> OrmResult<Connection> {
    match config {
        #[cfg(feature = "postgres")]
        ConnectionConfig::Postgres { url, pool } => {
            let adapter = crate::backends::PostgresAdapter::connect(url, pool).await?;
            Ok(Connection::Sql(Arc::new(adapter)))
        }
        #[cfg(feature = "mysql")]
        ConnectionConfig::Mysql { url, pool } => {
            let adapter = crate::backends::MySqlAdapter::connect(url, pool).await?;
            Ok(Connection::Sql(Arc::new(adapter)))
        }
        #[cfg(feature = "sqlite")]
        ConnectionConfig::Sqlite { url, pool } => {
            let adapter = crate::backends::SqliteAdapter::connect(url, pool).await?;
            Ok(Connection::Sql(Arc::new(adapter)))
        }
        #[cfg(feature = "mongodb")]
        ConnectionConfig::Mongodb { uri, database } => {
            let adapter = MongoAdapter::new(uri.clone(), database.clone());
            adapter.connect().await?;
            Ok(Connection::Document(Arc::new(adapter)))
        }
        #[allow(unreachable_patterns)]
        other => Err(ModelError::Configuration(format!(
            "Support for the {} backend is not enabled",
            other.backend_type()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{DatabaseValue, ResultEnvelope, SqlDialect};

    struct NullAdapter;

    #[async_trait::async_trait]
    impl DriverAdapter for NullAdapter {
        fn backend_type(&self) -> DatabaseBackendType {
            DatabaseBackendType::SQLite
        }

        fn sql_dialect(&self) -> SqlDialect {
            SqlDialect::SQLite
        }

        async fn execute(&self, _statement: &str, _params: &[DatabaseValue]) -> OrmResult<ResultEnvelope> {
            Ok(ResultEnvelope::Rows(Vec::new()))
        }
    }

    #[test]
    fn test_default_and_named_lookup() {
        let manager = DatabaseManager::new("main")
            .with_adapter("main", Arc::new(NullAdapter))
            .with_adapter("reporting", Arc::new(NullAdapter));

        assert_eq!(manager.default_connection(), "main");
        assert!(manager.has_connection("reporting"));
        assert!(!manager.has_connection("archive"));
        assert!(manager.sql(None).is_ok());
        assert!(manager.sql(Some("reporting")).is_ok());
        assert!(matches!(
            manager.sql(Some("archive")),
            Err(ModelError::Configuration(_))
        ));
    }

    #[cfg(feature = "mongodb")]
    #[test]
    fn test_family_mismatch_is_configuration_error() {
        let mut manager = DatabaseManager::new("main").with_adapter("main", Arc::new(NullAdapter));
        manager.register("docs", Connection::Document(Arc::new(MongoAdapter::new("mongodb://localhost", "app"))));

        assert!(matches!(manager.sql(Some("docs")), Err(ModelError::Configuration(_))));
        assert!(matches!(manager.document(None), Err(ModelError::Configuration(_))));
        assert!(manager.document(Some("docs")).is_ok());
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_from_config_opens_sqlite() {
        let config = DatabaseConfig::single(
            "sqlite",
            ConnectionConfig::Sqlite {
                url: "sqlite::memory:".to_string(),
                pool: crate::config::PoolConfig {
                    max_connections: 1,
                    idle_timeout: None,
                    max_lifetime: None,
                    ..Default::default()
                },
            },
        );

        let manager = DatabaseManager::from_config(&config).await.unwrap();
        let adapter = manager.sql(None).unwrap();
        let envelope = adapter.execute("SELECT 1 AS one", &[]).await.unwrap();
        assert_eq!(envelope.into_rows()[0]["one"], serde_json::json!(1));
        manager.close().await;
    }
}
