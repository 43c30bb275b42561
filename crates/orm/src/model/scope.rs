//! Connection-scoped entity proxy returned by `Model::on`

use std::marker::PhantomData;

use serde_json::Value;

use super::collection::Collection;
use super::core_trait::Model;
use crate::backends::Record;
use crate::connection::DatabaseManager;
use crate::error::{ModelError, ModelResult};
use crate::loading::EagerLoader;
use crate::query::{OrderDirection, QueryBuilder};
use crate::relationships::RelationProvider;

/// The static entity surface bound to one named connection
#[derive(Debug)]
pub struct ConnectionScope<M> {
    connection: String,
    _phantom: PhantomData<fn() -> M>,
}

impl<M> Clone for ConnectionScope<M> {
    fn clone(&self) -> Self {
        Self {
            connection: self.connection.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<M: Model> ConnectionScope<M> {
    pub fn new(connection: impl Into<String>) -> Self {
        Self {
            connection: connection.into(),
            _phantom: PhantomData,
        }
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }

    /// Query builder over the entity's table on this connection
    pub fn query(&self) -> QueryBuilder<M> {
        QueryBuilder::new(M::descriptor().table.clone()).on(self.connection.clone())
    }

    pub fn select<S: AsRef<str>>(&self, fields: &[S]) -> QueryBuilder<M> {
        self.query().select(fields)
    }

    pub fn where_eq<T: Into<Value>>(&self, column: &str, value: T) -> QueryBuilder<M> {
        self.query().where_eq(column, value)
    }

    pub fn where_op<T: Into<Value>>(&self, column: &str, operator: &str, value: T) -> QueryBuilder<M> {
        self.query().where_op(column, operator, value)
    }

    pub fn where_in<T: Into<Value>>(&self, column: &str, values: Vec<T>) -> QueryBuilder<M> {
        self.query().where_in(column, values)
    }

    pub fn where_not_in<T: Into<Value>>(&self, column: &str, values: Vec<T>) -> QueryBuilder<M> {
        self.query().where_not_in(column, values)
    }

    pub fn where_null(&self, column: &str) -> QueryBuilder<M> {
        self.query().where_null(column)
    }

    pub fn where_not_null(&self, column: &str) -> QueryBuilder<M> {
        self.query().where_not_null(column)
    }

    pub fn where_between<T: Into<Value>>(&self, column: &str, low: T, high: T) -> QueryBuilder<M> {
        self.query().where_between(column, low, high)
    }

    pub fn where_not_between<T: Into<Value>>(&self, column: &str, low: T, high: T) -> QueryBuilder<M> {
        self.query().where_not_between(column, low, high)
    }

    pub fn join(&self, table: &str, left_col: &str, right_col: &str) -> QueryBuilder<M> {
        self.query().join(table, left_col, right_col)
    }

    pub fn left_join(&self, table: &str, left_col: &str, right_col: &str) -> QueryBuilder<M> {
        self.query().left_join(table, left_col, right_col)
    }

    pub fn right_join(&self, table: &str, left_col: &str, right_col: &str) -> QueryBuilder<M> {
        self.query().right_join(table, left_col, right_col)
    }

    pub fn full_join(&self, table: &str, left_col: &str, right_col: &str) -> QueryBuilder<M> {
        self.query().full_join(table, left_col, right_col)
    }

    pub fn cross_join(&self, table: &str) -> QueryBuilder<M> {
        self.query().cross_join(table)
    }

    pub fn group_by(&self, columns: &[&str]) -> QueryBuilder<M> {
        self.query().group_by(columns)
    }

    pub fn order_by(&self, column: &str, direction: OrderDirection) -> QueryBuilder<M> {
        self.query().order_by(column, direction)
    }

    pub async fn all(&self, db: &DatabaseManager) -> ModelResult<Collection<M>> {
        self.query().get(db).await
    }

    pub async fn first(&self, db: &DatabaseManager) -> ModelResult<Option<M>> {
        self.query().first(db).await
    }

    pub async fn find<K: Into<Value>>(&self, db: &DatabaseManager, id: K) -> ModelResult<Option<M>> {
        self.query()
            .where_eq(&M::descriptor().primary_key, id)
            .first(db)
            .await
    }

    pub async fn find_or_fail<K: Into<Value>>(&self, db: &DatabaseManager, id: K) -> ModelResult<M> {
        let id = id.into();
        self.find(db, id.clone()).await?.ok_or_else(|| {
            ModelError::NotFound(format!(
                "{} with {} = {} not found on connection '{}'",
                M::descriptor().model_name,
                M::descriptor().primary_key,
                id,
                self.connection
            ))
        })
    }

    /// Fill a new instance through the write guard and save it on this connection
    pub async fn create(&self, db: &DatabaseManager, attributes: Record) -> ModelResult<M> {
        let mut model = M::make(attributes)?;
        model.set_connection(db, &self.connection)?;
        model.save(db).await?;
        Ok(model)
    }
}

impl<M: RelationProvider> ConnectionScope<M> {
    /// Eager-load relation paths over every row on this connection
    pub fn with<S: AsRef<str>>(&self, paths: &[S]) -> EagerLoader<M> {
        EagerLoader::new(self.query(), paths)
    }
}
