//! Eager loading of relation paths
//!
//! `User::with(&["orders.items"])` fetches the users, then every order of
//! every user, then every item of every order, splicing each level into its
//! parent rows.

pub mod eager_loader;
pub mod path;

pub use eager_loader::EagerLoader;
pub use path::{RelationPath, RelationSegment};
