//! # quarry-orm: ORM core
//!
//! Entity descriptors with attribute casting and write guards, a fluent
//! query builder, driver adapters for PostgreSQL, MySQL, SQLite and MongoDB,
//! level-by-level eager loading of relations, and a cycle-safe serialization
//! boundary.
//!
//! Entity types describe themselves once through a static
//! [`ModelDescriptor`]; the `once_cell` re-export is the usual way to hold it.

pub mod backends;
pub mod config;
pub mod connection;
pub mod error;
pub mod loading;
pub mod model;
pub mod query;
pub mod relationships;
pub mod security;
pub mod serialization;


pub use backends::{
    DatabaseBackendType, DatabaseValue, DriverAdapter, Record, ResultEnvelope, SqlDialect, StatementKind,
};
pub use config::{ConnectionConfig, DatabaseConfig, PoolConfig};
pub use connection::{Connection, DatabaseManager};
pub use error::*;
pub use loading::{EagerLoader, RelationPath, RelationSegment};
pub use model::*;
pub use query::*;
pub use relationships::{EntityType, RelationProvider, RelationQuery, RelationRegistry};
pub use serialization::{BindingRegistry, Payload, CIRCULAR_MARKER};

pub use once_cell;
