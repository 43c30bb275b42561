//! Serialization boundary - flattens entity graphs into plain JSON
//!
//! Response payloads may mix plain values, shared lists and maps, and
//! arbitrary objects such as entities or collections. [`BindingRegistry`] knows
//! how to flatten each object type; [`BindingRegistry::bind_data`] walks the
//! graph and renders every composite reached a second time as `"[Circular]"`.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::model::{Collection, Model};

/// Marker rendered in place of an already visited composite
pub const CIRCULAR_MARKER: &str = "[Circular]";

/// A response value that may share and nest composites
#[derive(Clone)]
pub enum Payload {
    Value(Value),
    List(Arc<RwLock<Vec<Payload>>>),
    Map(Arc<RwLock<BTreeMap<String, Payload>>>),
    Object(Arc<dyn Any + Send + Sync>),
}

impl Payload {
    pub fn list(items: Vec<Payload>) -> Self {
        Payload::List(Arc::new(RwLock::new(items)))
    }

    pub fn map(entries: BTreeMap<String, Payload>) -> Self {
        Payload::Map(Arc::new(RwLock::new(entries)))
    }

    pub fn empty_map() -> Self {
        Self::map(BTreeMap::new())
    }

    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        Payload::Object(Arc::new(value))
    }

    /// Insert into a map payload; returns false for any other variant
    pub fn insert(&self, key: impl Into<String>, value: Payload) -> bool {
        match self {
            Payload::Map(entries) => {
                entries.write().insert(key.into(), value);
                true
            }
            _ => false,
        }
    }

    /// Append to a list payload; returns false for any other variant
    pub fn push(&self, value: Payload) -> bool {
        match self {
            Payload::List(items) => {
                items.write().push(value);
                true
            }
            _ => false,
        }
    }

    /// Identity of the shared composite, `None` for plain values
    fn identity(&self) -> Option<usize> {
        match self {
            Payload::Value(_) => None,
            Payload::List(items) => Some(Arc::as_ptr(items) as *const () as usize),
            Payload::Map(entries) => Some(Arc::as_ptr(entries) as *const () as usize),
            Payload::Object(object) => Some(Arc::as_ptr(object) as *const () as usize),
        }
    }
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Payload::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Payload::List(items) => write!(f, "List({:p})", Arc::as_ptr(items)),
            Payload::Map(entries) => write!(f, "Map({:p})", Arc::as_ptr(entries)),
            Payload::Object(object) => write!(f, "Object({:p})", Arc::as_ptr(object)),
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Value(value)
    }
}

type Flatten = Arc<dyn Fn(&(dyn Any + Send + Sync)) -> Option<Payload> + Send + Sync>;

struct Binding {
    action: &'static str,
    flatten: Flatten,
}

/// Flatten capabilities per concrete type
#[derive(Default)]
pub struct BindingRegistry {
    bindings: HashMap<TypeId, Binding>,
}

impl std::fmt::Debug for BindingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut actions: Vec<&str> = self.bindings.values().map(|binding| binding.action).collect();
        actions.sort_unstable();
        f.debug_struct("BindingRegistry").field("actions", &actions).finish()
    }
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `flatten` to objects of type `T`, replacing an earlier binding
    pub fn bind<T, F>(&mut self, action: &'static str, flatten: F) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Fn(&T) -> Payload + Send + Sync + 'static,
    {
        let flatten: Flatten = Arc::new(move |object: &(dyn Any + Send + Sync)| object.downcast_ref::<T>().map(&flatten));
        self.bindings.insert(TypeId::of::<T>(), Binding { action, flatten });
        self
    }

    /// Flatten entities of type `M` through `to_object`
    pub fn bind_model<M: Model>(&mut self) -> &mut Self {
        self.bind::<M, _>("toObject", |model| Payload::Value(Value::Object(model.to_object())))
    }

    /// Flatten collections of `M` through `to_array`
    pub fn bind_collection<M: Model>(&mut self) -> &mut Self {
        self.bind::<Collection<M>, _>("toArray", |collection| {
            Payload::Value(Value::Array(collection.to_array().into_iter().map(Value::Object).collect()))
        })
    }

    pub fn is_bound<T: Any>(&self) -> bool {
        self.bindings.contains_key(&TypeId::of::<T>())
    }

    /// Convert `payload` into plain JSON
    pub fn bind_data(&self, payload: &Payload) -> Value {
        let mut seen = HashSet::new();
        self.walk(payload, &mut seen)
    }

    fn walk(&self, payload: &Payload, seen: &mut HashSet<usize>) -> Value {
        if let Some(identity) = payload.identity() {
            if !seen.insert(identity) {
                return Value::String(CIRCULAR_MARKER.to_string());
            }
        }

        match payload {
            Payload::Value(value) => value.clone(),
            Payload::List(items) => {
                let items = items.read().clone();
                Value::Array(items.iter().map(|item| self.walk(item, seen)).collect())
            }
            Payload::Map(entries) => {
                let entries = entries.read().clone();
                Value::Object(
                    entries
                        .iter()
                        .map(|(key, value)| (key.clone(), self.walk(value, seen)))
                        .collect(),
                )
            }
            Payload::Object(object) => {
                let type_id = (**object).type_id();
                match self
                    .bindings
                    .get(&type_id)
                    .and_then(|binding| (binding.flatten)(object.as_ref()))
                {
                    Some(flattened) => self.walk(&flattened, seen),
                    None => {
                        tracing::warn!(?type_id, "no serialization binding for object, rendering null");
                        Value::Null
                    }
                }
            }
        }
    }
}
