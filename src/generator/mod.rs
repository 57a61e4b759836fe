//! Code generation
//!
//! Turns a [`SchemaModel`](crate::models::SchemaModel) into C# classes or
//! T-SQL CRUD procedures, depending on [`GenerationMode`].

pub mod class_writer;
pub mod config;
pub mod driver;
pub mod procedure_writer;
pub mod relationships;
pub mod type_map;

pub use class_writer::ClassWriter;
pub use config::{
    AuditColumns, CasingConfig, ClassConfig, CollectionKind, CommentConfig, ConfigError,
    DataContractConfig, DescriptionLocale, GenerationConfig, GenerationMode, MemberConfig,
    NamingConfig, NavigationConfig, ProcedureConfig,
};
pub use driver::{
    GenerationPlan, Generator, ObjectAction, PlannedObject, RunRequirements, generate_to_string,
};
pub use procedure_writer::{ProcedureKind, ProcedureWriter};
pub use relationships::{RelationshipResolver, deduplicate};
pub use type_map::{MappedType, TypeMapping, map_type};
