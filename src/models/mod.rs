//! Models module
//!
//! Defines the in-memory schema model the generator reads: schema objects,
//! their columns, and the foreign keys between them.

pub mod column;
pub mod relationship;
pub mod schema;
pub mod schema_object;

pub use column::Column;
pub use relationship::{ForeignKey, ForeignKeyId, NavigationDirection, NavigationProperty};
pub use schema::{ModelError, ObjectId, SchemaModel, SchemaModelBuilder};
pub use schema_object::{DbObjectKind, ObjectError, SchemaObject};
