//! Model System - entity descriptors, attribute storage and the Model trait
//!
//! - `descriptor`: class-level metadata, casts and key kinds
//! - `attributes`: guarded, transforming attribute storage
//! - `core_trait`: the `Model` trait with its static and instance surface
//! - `collection`: ordered query results
//! - `scope`: the `on(connection)` proxy

pub mod attributes;
pub mod collection;
pub mod core_trait;
pub mod descriptor;
pub mod scope;

pub use attributes::AttributeStore;
pub use collection::Collection;
pub use core_trait::{EntityState, Model};
pub use descriptor::{table_name_for, AttributeTransform, Cast, KeyType, ModelDescriptor};
pub use scope::ConnectionScope;
