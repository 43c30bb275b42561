//! Relationship Traits - Core traits for relationship management
//!
//! Relation accessors are typed (`fn(&M) -> ModelResult<QueryBuilder<R>>`),
//! but the eager loader walks levels of different entity types. The object
//! safe [`RelationQuery`] and [`EntityType`] traits erase `R` so one level can
//! hand the next level its type.

use std::sync::Arc;

use async_trait::async_trait;

use super::registry::{EntityHandle, RelationRegistry};
use crate::backends::Record;
use crate::connection::DatabaseManager;
use crate::error::ModelResult;
use crate::loading::EagerLoader;
use crate::model::Model;
use crate::query::QueryBuilder;

/// Capability of an entity type to expose named relations
pub trait RelationProvider: Model {
    /// Register the relation accessors of this type
    fn register_relations(_registry: &mut RelationRegistry<Self>) {}

    /// Registry holding every relation of this type
    fn relations() -> RelationRegistry<Self> {
        let mut registry = RelationRegistry::new();
        Self::register_relations(&mut registry);
        registry
    }

    /// Eager-load relation paths over every row of this type
    fn with<S: AsRef<str>>(paths: &[S]) -> EagerLoader<Self> {
        EagerLoader::new(Self::query(), paths)
    }
}

/// A relation query whose target type has been erased
#[async_trait]
pub trait RelationQuery: Send {
    /// Replace the projection of the relation query
    fn select(self: Box<Self>, fields: &[String]) -> Box<dyn RelationQuery>;

    /// Execute and return the related rows in plain form
    async fn fetch(self: Box<Self>, db: &DatabaseManager) -> ModelResult<Vec<Record>>;

    /// Type of the related entities, used to resolve the next level
    fn entity_type(&self) -> Arc<dyn EntityType>;
}

#[async_trait]
impl<R: RelationProvider> RelationQuery for QueryBuilder<R> {
    fn select(self: Box<Self>, fields: &[String]) -> Box<dyn RelationQuery> {
        if fields.iter().all(|field| field == "*") {
            return self;
        }
        Box::new((*self).select(fields))
    }

    async fn fetch(self: Box<Self>, db: &DatabaseManager) -> ModelResult<Vec<Record>> {
        Ok((*self).get(db).await?.to_array())
    }

    fn entity_type(&self) -> Arc<dyn EntityType> {
        Arc::new(EntityHandle::<R>::new())
    }
}

/// An entity type whose relations can be resolved from plain rows
pub trait EntityType: Send + Sync {
    fn model_name(&self) -> &str;

    fn has_relation(&self, name: &str) -> bool;

    /// Build the relation query `name` for a transient entity hydrated from
    /// `row`; `None` when the type has no such relation
    fn relation(
        &self,
        name: &str,
        row: &Record,
        connection: Option<&str>,
    ) -> Option<ModelResult<Box<dyn RelationQuery>>>;
}
