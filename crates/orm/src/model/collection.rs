//! Ordered result sequence of hydrated entities

use std::ops::Deref;

use serde_json::Value;

use super::core_trait::Model;
use crate::backends::Record;

/// Entities returned by a query, in row order
#[derive(Debug, Clone)]
pub struct Collection<M> {
    items: Vec<M>,
}

impl<M> Collection<M> {
    pub fn new(items: Vec<M>) -> Self {
        Self { items }
    }

    pub fn into_vec(self) -> Vec<M> {
        self.items
    }
}

impl<M: Model> Collection<M> {
    /// Transformed value of `column` from every entity
    pub fn pluck(&self, column: &str) -> Vec<Value> {
        self.items.iter().map(|item| item.get_attribute(column)).collect()
    }

    /// Plain representation of every entity
    pub fn to_array(&self) -> Vec<Record> {
        self.items.iter().map(Model::to_object).collect()
    }
}

impl<M> Default for Collection<M> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<M> Deref for Collection<M> {
    type Target = [M];

    fn deref(&self) -> &[M] {
        &self.items
    }
}

impl<M> FromIterator<M> for Collection<M> {
    fn from_iter<I: IntoIterator<Item = M>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<M> IntoIterator for Collection<M> {
    type Item = M;
    type IntoIter = std::vec::IntoIter<M>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, M> IntoIterator for &'a Collection<M> {
    type Item = &'a M;
    type IntoIter = std::slice::Iter<'a, M>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
