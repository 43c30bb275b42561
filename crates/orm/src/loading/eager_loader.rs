//! Eager-Load Resolver
//!
//! Resolves relation paths level by level over plain rows. Every row of a
//! level issues its relation query, the queries of one level run
//! concurrently, and the next level starts only once the whole level has been
//! attached to its parents.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;
use serde_json::Value;

use super::path::{RelationPath, RelationSegment};
use crate::backends::Record;
use crate::connection::DatabaseManager;
use crate::error::ModelResult;
use crate::query::QueryBuilder;
use crate::relationships::{EntityHandle, EntityType, RelationProvider};

/// Relation types already fetched in one run, keyed by relation-name prefix
type LoadedPrefixes = HashMap<Vec<String>, Option<Arc<dyn EntityType>>>;

/// Root query plus the relation paths to load on top of it
#[derive(Debug)]
pub struct EagerLoader<M> {
    builder: QueryBuilder<M>,
    paths: Vec<RelationPath>,
}

impl<M: RelationProvider> EagerLoader<M> {
    pub fn new<S: AsRef<str>>(builder: QueryBuilder<M>, paths: &[S]) -> Self {
        Self {
            builder,
            paths: RelationPath::parse_all(paths),
        }
    }

    /// Append more relation paths
    pub fn with<S: AsRef<str>>(mut self, paths: &[S]) -> Self {
        self.paths.extend(RelationPath::parse_all(paths));
        self
    }

    pub fn paths(&self) -> &[RelationPath] {
        &self.paths
    }

    pub fn builder(&self) -> &QueryBuilder<M> {
        &self.builder
    }

    /// Fetch every root row and load the relation paths onto them
    pub async fn get(self, db: &DatabaseManager) -> ModelResult<Vec<Record>> {
        let Self { builder, paths } = self;
        let connection = builder.connection_name().map(str::to_string);

        let mut roots = builder.get(db).await?.to_array();
        if roots.is_empty() {
            return Ok(roots);
        }

        resolve_paths::<M>(db, &paths, &mut roots, connection.as_deref()).await?;
        Ok(roots)
    }

    /// Same as [`get`](Self::get) over the first root row only
    pub async fn first(self, db: &DatabaseManager) -> ModelResult<Option<Record>> {
        let Self { builder, paths } = self;
        let connection = builder.connection_name().map(str::to_string);

        let root = match builder.first(db).await? {
            Some(root) => root.to_object(),
            None => return Ok(None),
        };

        let mut roots = vec![root];
        resolve_paths::<M>(db, &paths, &mut roots, connection.as_deref()).await?;
        Ok(roots.pop())
    }
}

async fn resolve_paths<M: RelationProvider>(
    db: &DatabaseManager,
    paths: &[RelationPath],
    roots: &mut [Record],
    connection: Option<&str>,
) -> ModelResult<()> {
    let root_type: Arc<dyn EntityType> = Arc::new(EntityHandle::<M>::new());
    let mut loaded = LoadedPrefixes::new();

    for path in paths {
        let mut level: Vec<&mut Record> = roots.iter_mut().collect();
        let mut entity_type = root_type.clone();

        for (depth, segment) in path.segments().iter().enumerate() {
            if level.is_empty() {
                break;
            }

            let prefix = path.prefix(depth + 1);
            let related_type = match loaded.get(&prefix) {
                Some(known) => known.clone(),
                None => {
                    let fetched = load_level(db, &mut level, entity_type.as_ref(), segment, connection).await?;
                    loaded.insert(prefix, fetched.clone());
                    fetched
                }
            };

            match related_type {
                Some(related_type) => {
                    level = descend(level, &segment.name);
                    entity_type = related_type;
                }
                None => break,
            }
        }
    }

    Ok(())
}

/// Run `segment` for every row of `level` and attach the non-empty results.
/// Returns the related entity type, or `None` when no query was issued.
async fn load_level(
    db: &DatabaseManager,
    level: &mut [&mut Record],
    entity_type: &dyn EntityType,
    segment: &RelationSegment,
    connection: Option<&str>,
) -> ModelResult<Option<Arc<dyn EntityType>>> {
    if !entity_type.has_relation(&segment.name) {
        tracing::warn!(
            model = entity_type.model_name(),
            relation = %segment.name,
            "relation is not registered, skipping branch"
        );
        return Ok(None);
    }

    let mut related_type = None;
    let mut targets = Vec::with_capacity(level.len());
    let mut pending = Vec::with_capacity(level.len());

    for (index, row) in level.iter().enumerate() {
        let query = match entity_type.relation(&segment.name, row, connection) {
            Some(query) => query?,
            None => continue,
        };
        let query = if segment.has_projection() {
            query.select(&segment.fields)
        } else {
            query
        };
        if related_type.is_none() {
            related_type = Some(query.entity_type());
        }
        targets.push(index);
        pending.push(query.fetch(db));
    }

    tracing::debug!(
        model = entity_type.model_name(),
        relation = %segment.name,
        queries = pending.len(),
        "loading relation level"
    );

    let results = try_join_all(pending).await?;
    for (index, related) in targets.into_iter().zip(results) {
        if related.is_empty() {
            continue;
        }
        level[index].insert(
            segment.name.clone(),
            Value::Array(related.into_iter().map(Value::Object).collect()),
        );
    }

    Ok(related_type)
}

/// Rows attached under `key` across the whole level
fn descend<'a>(level: Vec<&'a mut Record>, key: &str) -> Vec<&'a mut Record> {
    level
        .into_iter()
        .filter_map(|row| match row.get_mut(key) {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        })
        .flat_map(|items| {
            items.iter_mut().filter_map(|item| match item {
                Value::Object(row) => Some(row),
                _ => None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_descend_collects_nested_rows_in_order() {
        let mut rows = vec![
            record(json!({"id": 1, "orders": [{"id": 10}, {"id": 11}]})),
            record(json!({"id": 2})),
            record(json!({"id": 3, "orders": [{"id": 12}]})),
        ];

        let level: Vec<&mut Record> = rows.iter_mut().collect();
        let next = descend(level, "orders");

        let ids: Vec<Value> = next.iter().map(|row| row["id"].clone()).collect();
        assert_eq!(ids, vec![json!(10), json!(11), json!(12)]);
    }

    #[test]
    fn test_descend_allows_mutating_nested_rows() {
        let mut rows = vec![record(json!({"id": 1, "orders": [{"id": 10}]}))];

        for row in descend(rows.iter_mut().collect(), "orders") {
            row.insert("items".into(), json!([{"id": 100}]));
        }

        assert_eq!(rows[0]["orders"][0]["items"][0]["id"], json!(100));
    }

    #[test]
    fn test_descend_skips_non_array_keys() {
        let mut rows = vec![record(json!({"id": 1, "orders": "not loaded"}))];
        assert!(descend(rows.iter_mut().collect(), "orders").is_empty());
    }
}
