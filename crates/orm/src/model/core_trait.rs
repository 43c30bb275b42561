//! Core Model Trait - Base definition for database entities
//!
//! A mapped type implements the four required methods of [`Model`] (usually
//! by holding an [`EntityState`] field) and receives the whole static and
//! instance surface as provided methods.

use serde_json::Value;

use super::attributes::AttributeStore;
use super::collection::Collection;
use super::descriptor::{KeyType, ModelDescriptor};
use super::scope::ConnectionScope;
use crate::backends::Record;
use crate::connection::DatabaseManager;
use crate::error::{ModelError, ModelResult};
use crate::query::{compile_insert, compile_update, OrderDirection, QueryBuilder};

/// Per-instance state: the attribute store plus a connection override
#[derive(Debug, Clone)]
pub struct EntityState {
    attributes: AttributeStore,
    connection: Option<String>,
}

impl EntityState {
    pub fn new(descriptor: &'static ModelDescriptor) -> Self {
        Self {
            attributes: AttributeStore::new(descriptor),
            connection: None,
        }
    }

    /// State hydrated from a backend row
    pub fn hydrated(descriptor: &'static ModelDescriptor, record: Record, connection: Option<String>) -> Self {
        Self {
            attributes: AttributeStore::from_record(descriptor, record),
            connection,
        }
    }

    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeStore {
        &mut self.attributes
    }

    pub fn connection(&self) -> Option<&str> {
        self.connection.as_deref()
    }

    pub(crate) fn set_connection_unchecked(&mut self, connection: Option<String>) {
        self.connection = connection;
    }
}

/// Core trait for database models with standard ORM operations
pub trait Model: Sized + Send + Sync + 'static {
    /// Class-level metadata shared by every instance
    fn descriptor() -> &'static ModelDescriptor;

    /// Wrap an entity state into the concrete type
    fn from_state(state: EntityState) -> Self;

    fn state(&self) -> &EntityState;

    fn state_mut(&mut self) -> &mut EntityState;

    // ---------------------------------------------------------------------
    // Construction

    /// Empty, unsaved instance
    fn new() -> Self {
        Self::from_state(EntityState::new(Self::descriptor()))
    }

    /// Unsaved instance filled through the write guard
    fn make(attributes: Record) -> ModelResult<Self> {
        let mut model = Self::new();
        model.fill(attributes)?;
        Ok(model)
    }

    /// Instance built from a backend row without guards or mutators
    fn hydrate(record: Record, connection: Option<String>) -> Self {
        Self::from_state(EntityState::hydrated(Self::descriptor(), record, connection))
    }

    // ---------------------------------------------------------------------
    // Static query surface

    /// Query builder over this entity's table on its default connection
    fn query() -> QueryBuilder<Self> {
        let descriptor = Self::descriptor();
        let builder = QueryBuilder::new(descriptor.table.clone());
        match &descriptor.connection {
            Some(connection) => builder.on(connection.clone()),
            None => builder,
        }
    }

    /// Connection-scoped proxy exposing the same verbs
    fn on(connection: &str) -> ConnectionScope<Self> {
        ConnectionScope::new(connection)
    }

    fn select<S: AsRef<str>>(fields: &[S]) -> QueryBuilder<Self> {
        Self::query().select(fields)
    }

    fn where_eq<T: Into<Value>>(column: &str, value: T) -> QueryBuilder<Self> {
        Self::query().where_eq(column, value)
    }

    fn where_op<T: Into<Value>>(column: &str, operator: &str, value: T) -> QueryBuilder<Self> {
        Self::query().where_op(column, operator, value)
    }

    fn where_in<T: Into<Value>>(column: &str, values: Vec<T>) -> QueryBuilder<Self> {
        Self::query().where_in(column, values)
    }

    fn where_not_in<T: Into<Value>>(column: &str, values: Vec<T>) -> QueryBuilder<Self> {
        Self::query().where_not_in(column, values)
    }

    fn where_null(column: &str) -> QueryBuilder<Self> {
        Self::query().where_null(column)
    }

    fn where_not_null(column: &str) -> QueryBuilder<Self> {
        Self::query().where_not_null(column)
    }

    fn where_between<T: Into<Value>>(column: &str, low: T, high: T) -> QueryBuilder<Self> {
        Self::query().where_between(column, low, high)
    }

    fn where_not_between<T: Into<Value>>(column: &str, low: T, high: T) -> QueryBuilder<Self> {
        Self::query().where_not_between(column, low, high)
    }

    fn join(table: &str, left_col: &str, right_col: &str) -> QueryBuilder<Self> {
        Self::query().join(table, left_col, right_col)
    }

    fn left_join(table: &str, left_col: &str, right_col: &str) -> QueryBuilder<Self> {
        Self::query().left_join(table, left_col, right_col)
    }

    fn right_join(table: &str, left_col: &str, right_col: &str) -> QueryBuilder<Self> {
        Self::query().right_join(table, left_col, right_col)
    }

    fn full_join(table: &str, left_col: &str, right_col: &str) -> QueryBuilder<Self> {
        Self::query().full_join(table, left_col, right_col)
    }

    fn cross_join(table: &str) -> QueryBuilder<Self> {
        Self::query().cross_join(table)
    }

    fn group_by(columns: &[&str]) -> QueryBuilder<Self> {
        Self::query().group_by(columns)
    }

    fn order_by(column: &str, direction: OrderDirection) -> QueryBuilder<Self> {
        Self::query().order_by(column, direction)
    }

    async fn all(db: &DatabaseManager) -> ModelResult<Collection<Self>> {
        Self::query().get(db).await
    }

    async fn first(db: &DatabaseManager) -> ModelResult<Option<Self>> {
        Self::query().first(db).await
    }

    /// Find a row by primary key
    async fn find<K: Into<Value> + Send>(db: &DatabaseManager, id: K) -> ModelResult<Option<Self>> {
        Self::query()
            .where_eq(&Self::descriptor().primary_key, id)
            .first(db)
            .await
    }

    /// Find a row by primary key, or fail with `NotFound`
    async fn find_or_fail<K: Into<Value> + Send>(db: &DatabaseManager, id: K) -> ModelResult<Self> {
        let id = id.into();
        match Self::find(db, id.clone()).await? {
            Some(model) => Ok(model),
            None => Err(ModelError::NotFound(format!(
                "{} with {} = {} not found",
                Self::descriptor().model_name,
                Self::descriptor().primary_key,
                id
            ))),
        }
    }

    /// Fill a new instance through the write guard and save it
    async fn create(db: &DatabaseManager, attributes: Record) -> ModelResult<Self> {
        let mut model = Self::make(attributes)?;
        model.save(db).await?;
        Ok(model)
    }

    // ---------------------------------------------------------------------
    // Instance surface

    fn table_name(&self) -> &'static str {
        &Self::descriptor().table
    }

    fn key_name(&self) -> &'static str {
        &Self::descriptor().primary_key
    }

    /// Primary key value, null when unsaved
    fn get_key(&self) -> Value {
        self.get_raw_attribute(self.key_name())
    }

    fn is_persisted(&self) -> bool {
        !self.get_key().is_null()
    }

    fn get_attribute(&self, column: &str) -> Value {
        self.state().attributes().get(column)
    }

    fn set_attribute<T: Into<Value>>(&mut self, column: &str, value: T) -> ModelResult<()> {
        self.state_mut().attributes_mut().set(column, value.into())
    }

    fn get_raw_attribute(&self, column: &str) -> Value {
        self.state().attributes().get_raw(column)
    }

    fn set_raw_attribute<T: Into<Value>>(&mut self, column: &str, value: T) {
        self.state_mut().attributes_mut().set_raw(column, value.into());
    }

    /// Every attribute with casts and accessors applied
    fn get_attributes(&self) -> Record {
        self.state().attributes().transformed()
    }

    fn get_raw_attributes(&self) -> Record {
        self.state().attributes().raw().clone()
    }

    fn has_cast(&self, column: &str) -> bool {
        Self::descriptor().has_cast(column)
    }

    fn fill(&mut self, attributes: Record) -> ModelResult<()> {
        self.state_mut().attributes_mut().fill(attributes)
    }

    fn force_fill(&mut self, attributes: Record) {
        self.state_mut().attributes_mut().force_fill(attributes);
    }

    /// Connection override of this instance, else the class default
    fn get_connection(&self) -> Option<&str> {
        self.state()
            .connection()
            .or(Self::descriptor().connection.as_deref())
    }

    /// Pin this instance to a registered connection
    fn set_connection(&mut self, db: &DatabaseManager, connection: &str) -> ModelResult<()> {
        if !db.has_connection(connection) {
            return Err(ModelError::Configuration(format!(
                "Database connection '{}' does not exist",
                connection
            )));
        }
        self.state_mut().set_connection_unchecked(Some(connection.to_string()));
        Ok(())
    }

    /// Insert when unsaved, otherwise update the row keyed by the primary key
    async fn save(&mut self, db: &DatabaseManager) -> ModelResult<()> {
        let descriptor = Self::descriptor();
        let adapter = db.sql(self.get_connection())?;
        let dialect = adapter.sql_dialect();
        let now = descriptor.timestamps.then(|| descriptor.fresh_timestamp());

        if self.is_persisted() {
            if let Some(now) = &now {
                self.set_raw_attribute(&descriptor.updated_at_column, now.clone());
            }

            let mut values = self.get_raw_attributes();
            values.remove(&descriptor.primary_key);
            if descriptor.timestamps {
                values.remove(&descriptor.created_at_column);
            }
            if values.is_empty() {
                return Ok(());
            }

            let key = self.get_key();
            let (sql, params) = compile_update(&descriptor.table, &values, &descriptor.primary_key, &key, dialect)?;
            adapter.execute(&sql, &params).await?;
            tracing::debug!(model = %descriptor.model_name, key = %key, "model updated");
            return Ok(());
        }

        if let Some(now) = &now {
            self.set_raw_attribute(&descriptor.created_at_column, now.clone());
            self.set_raw_attribute(&descriptor.updated_at_column, now.clone());
        }
        if descriptor.key_type == KeyType::Uuid {
            self.set_raw_attribute(&descriptor.primary_key, uuid::Uuid::new_v4().to_string());
        }

        let mut values = self.get_raw_attributes();
        if values.get(&descriptor.primary_key).is_some_and(Value::is_null) {
            values.remove(&descriptor.primary_key);
        }

        let assigns_key = descriptor.incrementing && descriptor.key_type == KeyType::Integer;
        let returning = (assigns_key && dialect.returns_identifiers()).then_some(descriptor.primary_key.as_str());
        let (sql, params) = compile_insert(&descriptor.table, &values, returning, dialect)?;
        let envelope = adapter.execute(&sql, &params).await?;

        if assigns_key {
            if let Some(id) = envelope.last_insert_row_id() {
                self.set_raw_attribute(&descriptor.primary_key, id.clone());
            }
        }
        tracing::debug!(model = %descriptor.model_name, key = %self.get_key(), "model inserted");
        Ok(())
    }

    /// Query for the children of this entity in `R`'s table
    ///
    /// The foreign key defaults to `{table}_{primary_key}` of this entity.
    fn has_many<R: Model>(&self, foreign_key: Option<&str>) -> ModelResult<QueryBuilder<R>> {
        let key = self.get_key();
        if key.is_null() {
            return Err(ModelError::MissingPrimaryKey(Self::descriptor().model_name.clone()));
        }

        let foreign_key = foreign_key
            .map(str::to_string)
            .unwrap_or_else(|| Self::descriptor().default_foreign_key());

        let builder = R::query().where_eq(&foreign_key, key);
        Ok(match self.state().connection() {
            Some(connection) => builder.on(connection.to_string()),
            None => builder,
        })
    }

    /// Mark the instance deleted; `save` persists the timestamp
    fn soft_delete(&mut self) -> ModelResult<()> {
        let descriptor = ensure_soft_deletes::<Self>()?;
        let now = descriptor.fresh_timestamp();
        self.set_raw_attribute(&descriptor.deleted_at_column, now);
        Ok(())
    }

    fn restore(&mut self) -> ModelResult<()> {
        let descriptor = ensure_soft_deletes::<Self>()?;
        self.set_raw_attribute(&descriptor.deleted_at_column, Value::Null);
        Ok(())
    }

    fn is_trashed(&self) -> ModelResult<bool> {
        let descriptor = ensure_soft_deletes::<Self>()?;
        Ok(!self.get_attribute(&descriptor.deleted_at_column).is_null())
    }

    /// Plain representation honoring the visible/hidden filters
    fn to_object(&self) -> Record {
        let descriptor = Self::descriptor();
        let attributes = self.state().attributes();
        attributes
            .raw()
            .keys()
            .filter(|column| descriptor.is_serialized(column))
            .map(|column| (column.clone(), attributes.get(column)))
            .collect()
    }

    /// JSON text of [`to_object`](Self::to_object)
    fn to_json(&self) -> String {
        Value::Object(self.to_object()).to_string()
    }
}

fn ensure_soft_deletes<M: Model>() -> ModelResult<&'static ModelDescriptor> {
    let descriptor = M::descriptor();
    if descriptor.soft_deletes {
        Ok(descriptor)
    } else {
        Err(ModelError::Configuration(format!(
            "Soft deletes are not enabled for model {}",
            descriptor.model_name
        )))
    }
}
