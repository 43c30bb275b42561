//! Relationship Registry - named relation accessors per entity type

use std::collections::HashMap;
use std::marker::PhantomData;

use super::traits::{EntityType, RelationProvider, RelationQuery};
use crate::backends::Record;
use crate::error::ModelResult;
use crate::model::Model;
use crate::query::QueryBuilder;

type ErasedAccessor<M> = Box<dyn Fn(&M) -> ModelResult<Box<dyn RelationQuery>> + Send + Sync>;

/// Named relation accessors of entity type `M`
pub struct RelationRegistry<M> {
    relations: HashMap<String, ErasedAccessor<M>>,
}

impl<M> Default for RelationRegistry<M> {
    fn default() -> Self {
        Self {
            relations: HashMap::new(),
        }
    }
}

impl<M: Model> std::fmt::Debug for RelationRegistry<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationRegistry")
            .field("relations", &self.names())
            .finish()
    }
}

impl<M: Model> RelationRegistry<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `accessor` under `name`, replacing any previous accessor
    pub fn register<R>(&mut self, name: &str, accessor: fn(&M) -> ModelResult<QueryBuilder<R>>) -> &mut Self
    where
        R: RelationProvider,
    {
        self.relations.insert(
            name.to_string(),
            Box::new(move |entity: &M| {
                accessor(entity).map(|builder| Box::new(builder) as Box<dyn RelationQuery>)
            }),
        );
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.relations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run the accessor `name` against `entity`
    pub fn resolve(&self, name: &str, entity: &M) -> Option<ModelResult<Box<dyn RelationQuery>>> {
        self.relations.get(name).map(|accessor| accessor(entity))
    }
}

/// [`EntityType`] implementation for a concrete entity type
pub struct EntityHandle<M: RelationProvider> {
    registry: RelationRegistry<M>,
    _phantom: PhantomData<fn() -> M>,
}

impl<M: RelationProvider> EntityHandle<M> {
    pub fn new() -> Self {
        Self {
            registry: M::relations(),
            _phantom: PhantomData,
        }
    }
}

impl<M: RelationProvider> Default for EntityHandle<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RelationProvider> EntityType for EntityHandle<M> {
    fn model_name(&self) -> &str {
        &M::descriptor().model_name
    }

    fn has_relation(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    fn relation(
        &self,
        name: &str,
        row: &Record,
        connection: Option<&str>,
    ) -> Option<ModelResult<Box<dyn RelationQuery>>> {
        if !self.registry.contains(name) {
            return None;
        }
        let entity = M::hydrate(row.clone(), connection.map(str::to_string));
        self.registry.resolve(name, &entity)
    }
}
