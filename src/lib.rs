//! POCO codegen - C# data classes and T-SQL CRUD procedures from a schema model
//!
//! Provides:
//! - The schema model (objects, columns, foreign keys)
//! - Class naming and identifier casing rules
//! - SQL Server to C# type mapping
//! - Navigation property resolution with many-to-many join collapsing
//! - Class and stored-procedure emitters writing through a token sink
//! - Loading schema documents from YAML or JSON
//!
//! ```rust
//! use poco_codegen::generator::{GenerationConfig, generate_to_string};
//! use poco_codegen::models::{Column, SchemaModel, SchemaObject};
//!
//! let mut builder = SchemaModel::builder();
//! builder.add_object(
//!     SchemaObject::table("Shop", "dbo", "Order")
//!         .with_column(Column::new("Id", "int").primary_key().identity())
//!         .with_column(Column::new("Total", "money").nullable()),
//! );
//! let output = generate_to_string(&builder.build(), &GenerationConfig::default());
//! assert!(output.contains("public decimal? Total { get; set; }"));
//! ```

pub mod generator;
pub mod import;
pub mod models;
pub mod naming;
pub mod writer;

pub use generator::{
    GenerationConfig, GenerationMode, GenerationPlan, Generator, generate_to_string,
};
pub use import::{ImportError, SchemaDocument};
pub use models::{
    Column, DbObjectKind, ForeignKey, ModelError, NavigationProperty, ObjectError, SchemaModel,
    SchemaObject,
};
pub use naming::NameResolver;
pub use writer::{PlainTextWriter, TokenKind, TokenRecorder, TokenSink};
