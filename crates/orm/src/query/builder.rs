//! Query Builder - Core builder implementation

use std::marker::PhantomData;

use super::types::*;

/// Fluent builder over a [`QuerySpec`], typed by the entity it hydrates
#[derive(Debug)]
pub struct QueryBuilder<M = ()> {
    pub(crate) spec: QuerySpec,
    _phantom: PhantomData<fn() -> M>,
}

impl<M> Clone for QueryBuilder<M> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<M> QueryBuilder<M> {
    /// Create a new query builder selecting from `table`
    pub fn new(table: impl Into<String>) -> Self {
        Self::from_spec(QuerySpec::new(table))
    }

    pub fn from_spec(spec: QuerySpec) -> Self {
        Self {
            spec,
            _phantom: PhantomData,
        }
    }

    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    pub fn into_spec(self) -> QuerySpec {
        self.spec
    }

    /// Replace the projection
    pub fn select<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.spec.fields = fields
            .iter()
            .map(|f| f.as_ref().trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        self
    }

    /// Run the query on a named connection
    pub fn on(mut self, connection: impl Into<String>) -> Self {
        self.spec.connection = Some(connection.into());
        self
    }

    pub fn connection_name(&self) -> Option<&str> {
        self.spec.connection.as_deref()
    }

    pub fn limit(mut self, count: u64) -> Self {
        self.spec.limit = Some(count);
        self
    }

    pub fn offset(mut self, count: u64) -> Self {
        self.spec.offset = Some(count);
        self
    }
}
