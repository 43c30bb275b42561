//! Query Builder execution for Model types

use serde_json::Value;

use super::builder::QueryBuilder;
use crate::backends::Record;
use crate::connection::DatabaseManager;
use crate::error::{ModelError, OrmResult};
use crate::loading::EagerLoader;
use crate::model::{Collection, Model};
use crate::relationships::RelationProvider;

impl<M> QueryBuilder<M> {
    /// Execute the SELECT and return plain rows
    pub async fn fetch_records(&self, db: &DatabaseManager) -> OrmResult<Vec<Record>> {
        let adapter = db.sql(self.connection_name())?;
        let (sql, params) = self.to_sql(adapter.sql_dialect())?;
        Ok(adapter.execute(&sql, &params).await?.into_rows())
    }

    /// Number of rows matching the filters
    pub async fn count(&self, db: &DatabaseManager) -> OrmResult<u64> {
        let adapter = db.sql(self.connection_name())?;
        let (sql, params) = self.spec.to_count_sql(adapter.sql_dialect())?;
        let rows = adapter.execute(&sql, &params).await?.into_rows();

        let aggregate = rows.first().and_then(|row| row.get("aggregate")).cloned().unwrap_or(Value::Null);
        match aggregate {
            Value::Number(n) => n
                .as_u64()
                .ok_or_else(|| ModelError::Query(format!("Unexpected row count {}", n))),
            // some drivers report aggregates as text
            Value::String(s) => s
                .parse()
                .map_err(|_| ModelError::Query(format!("Unexpected row count '{}'", s))),
            Value::Null => Ok(0),
            other => Err(ModelError::Query(format!("Unexpected row count {}", other))),
        }
    }
}

impl<M: Model> QueryBuilder<M> {
    /// Execute the query and hydrate every row
    pub async fn get(self, db: &DatabaseManager) -> OrmResult<Collection<M>> {
        let connection = self.spec.connection.clone();
        let rows = self.fetch_records(db).await?;
        Ok(rows
            .into_iter()
            .map(|row| M::hydrate(row, connection.clone()))
            .collect())
    }

    /// First matching row
    pub async fn first(self, db: &DatabaseManager) -> OrmResult<Option<M>> {
        Ok(self.limit(1).get(db).await?.into_iter().next())
    }

    /// First matching row, or a `NotFound` error
    pub async fn first_or_fail(self, db: &DatabaseManager) -> OrmResult<M> {
        let table = self.spec.table.clone();
        self.first(db)
            .await?
            .ok_or_else(|| ModelError::NotFound(format!("No {} row matched the query", table)))
    }
}

impl<M: RelationProvider> QueryBuilder<M> {
    /// Eager-load relation paths on top of this query
    pub fn with<S: AsRef<str>>(self, paths: &[S]) -> EagerLoader<M> {
        EagerLoader::new(self, paths)
    }
}
