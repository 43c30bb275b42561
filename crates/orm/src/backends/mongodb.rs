//! MongoDB document-store adapter
//!
//! The client is created lazily by [`MongoAdapter::connect`]. Collections can
//! only be handed out after a successful connect; statement classification
//! and result envelopes do not apply here.

use bson::{doc, Document};
use ::mongodb::{Client, Collection, Database};
use tokio::sync::RwLock;

use super::DatabaseBackendType;
use crate::error::{ModelError, OrmResult};

/// Document-store adapter holding at most one live client
#[derive(Debug)]
pub struct MongoAdapter {
    uri: String,
    database_name: String,
    client: RwLock<Option<Client>>,
}

impl MongoAdapter {
    /// Create an adapter; no I/O happens until [`connect`](Self::connect)
    pub fn new(uri: impl Into<String>, database_name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database_name: database_name.into(),
            client: RwLock::new(None),
        }
    }

    pub fn backend_type(&self) -> DatabaseBackendType {
        DatabaseBackendType::MongoDB
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// Open the client and ping the server. Repeated calls are no-ops.
    pub async fn connect(&self) -> OrmResult<()> {
        let mut guard = self.client.write().await;
        if guard.is_some() {
            return Ok(());
        }

        let client = Client::with_uri_str(&self.uri).await.map_err(|e| {
            tracing::error!(database = %self.database_name, error = %e, "failed to create MongoDB client");
            ModelError::Connection(format!("Failed to connect to MongoDB: {}", e))
        })?;

        client
            .database(&self.database_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| ModelError::Connection(format!("Ping failed: {}", e)))?;

        tracing::info!(database = %self.database_name, "MongoDB client connected");
        *guard = Some(client);
        Ok(())
    }

    /// Whether [`connect`](Self::connect) has completed
    pub async fn is_connected(&self) -> bool {
        self.client.read().await.is_some()
    }

    /// Handle to the configured database
    pub async fn database(&self) -> OrmResult<Database> {
        let guard = self.client.read().await;
        let client = guard.as_ref().ok_or_else(|| {
            ModelError::Uninitialized(format!(
                "MongoDB client for database '{}' is not connected",
                self.database_name
            ))
        })?;
        Ok(client.database(&self.database_name))
    }

    /// Untyped collection handle
    pub async fn collection(&self, name: &str) -> OrmResult<Collection<Document>> {
        Ok(self.database().await?.collection(name))
    }

    /// Shut the client down. Closing an unconnected adapter is a no-op.
    pub async fn close(&self) {
        let client = self.client.write().await.take();
        if let Some(client) = client {
            client.shutdown().await;
            tracing::info!(database = %self.database_name, "MongoDB client closed");
        }
    }
}
