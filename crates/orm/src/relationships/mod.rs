//! Relationships - named relation accessors resolved at runtime
//!
//! An entity type opts in by implementing [`RelationProvider`] and registering
//! accessors such as `|user: &User| user.has_many::<Order>(Some("user_id"))`.

pub mod registry;
pub mod traits;

pub use registry::{EntityHandle, RelationRegistry};
pub use traits::{EntityType, RelationProvider, RelationQuery};
