//! Query Builder Module - Fluent query builder compiled per SQL dialect

pub mod builder;
pub mod dml;
pub mod execution;
pub mod joins;
pub mod ordering;
pub mod sql_generation;
pub mod types;
pub mod where_clause;

pub use builder::QueryBuilder;
pub use dml::{compile_insert, compile_update};
pub use sql_generation::CompiledSql;
pub use types::{JoinClause, JoinType, OrderDirection, Predicate, QueryOperator, QuerySpec};
