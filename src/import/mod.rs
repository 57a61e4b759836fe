//! Schema document import
//!
//! Loads a YAML or JSON description of database objects and foreign keys and
//! assembles it into a [`SchemaModel`]. A document looks like:
//!
//! ```yaml
//! database: Rmc
//! objects:
//!   - schema: Sca
//!     name: Credit
//!     kind: table
//!     columns:
//!       - { name: Id, type: int, identity: true, primary_key: true }
//!       - { name: Code, type: nvarchar, length: 50, nullable: true }
//!   - schema: Sca
//!     name: Broken
//!     kind: view
//!     errors: ["Invalid object name", "Login failed"]
//! foreign_keys:
//!   - name: FK_Credit_Transactor
//!     foreign: { schema: Sca, table: Credit, column: TransactorId }
//!     primary: { schema: Sca, table: Transactor, column: Id }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Column, DbObjectKind, ModelError, ObjectError, SchemaModel, SchemaObject};

/// Error while loading a schema document
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Failed to read schema document: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid YAML schema document: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid JSON schema document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported schema document format: {0}")]
    UnsupportedFormat(String),
    #[error("Foreign key '{foreign_key}' references unknown object {object}")]
    UnknownObject { foreign_key: String, object: String },
    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, ImportError>;

/// Top level of a schema document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaDocument {
    /// Database name shared by every object that does not name its own
    pub database: String,
    pub objects: Vec<ObjectDocument>,
    pub foreign_keys: Vec<ForeignKeyDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDocument {
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub schema: String,
    pub name: String,
    #[serde(default = "default_kind")]
    pub kind: DbObjectKind,
    #[serde(default)]
    pub columns: Vec<ColumnDocument>,
    /// Extraction failure chain, outermost first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

fn default_kind() -> DbObjectKind {
    DbObjectKind::Table
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDocument {
    pub name: String,
    #[serde(default)]
    pub ordinal: Option<u32>,
    #[serde(rename = "type")]
    pub data_type: String,
    /// Type used for mapping when it differs from `type` (user-defined types)
    #[serde(default)]
    pub display_type: Option<String>,
    #[serde(default)]
    pub nullable: bool,
    /// Character or binary length, -1 for `max`
    #[serde(default)]
    pub length: Option<i64>,
    #[serde(default)]
    pub precision: Option<u32>,
    #[serde(default)]
    pub scale: Option<u32>,
    #[serde(default)]
    pub datetime_precision: Option<u32>,
    #[serde(default)]
    pub identity: bool,
    #[serde(default)]
    pub primary_key: bool,
}

impl ColumnDocument {
    fn to_column(&self) -> Column {
        let mut column = Column::new(&self.name, &self.data_type);
        if let Some(display) = &self.display_type {
            column = column.with_display_type(display);
        }
        column.ordinal = self.ordinal;
        column.is_nullable = self.nullable;
        column.string_precision = self.length;
        column.numeric_precision = self.precision;
        column.numeric_scale = self.scale;
        column.datetime_precision = self.datetime_precision;
        column.is_identity = self.identity;
        column.is_primary_key = self.primary_key;
        column
    }
}

/// `schema.table.column` endpoint of a foreign key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnReference {
    #[serde(default)]
    pub schema: String,
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyDocument {
    #[serde(default)]
    pub name: String,
    /// Referencing (child) column
    pub foreign: ColumnReference,
    /// Referenced (parent) column
    pub primary: ColumnReference,
}

impl SchemaDocument {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a `.yaml`, `.yml` or `.json` document
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        let content = std::fs::read_to_string(path)?;
        match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&content),
            "json" => Self::from_json_str(&content),
            _ => Err(ImportError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Assemble the model: objects keep document order, foreign keys are
    /// attached to both endpoint columns and join tables are detected.
    pub fn into_model(self) -> Result<SchemaModel> {
        let mut builder = SchemaModel::builder();

        for object in &self.objects {
            let database = object.database.as_deref().unwrap_or(&self.database);
            let mut schema_object =
                SchemaObject::new(database, &object.schema, &object.name, object.kind);
            for column in &object.columns {
                schema_object = schema_object.with_column(column.to_column());
            }
            if let Some(error) = ObjectError::from_messages(&object.errors) {
                schema_object = schema_object.with_error(error);
            }
            builder.add_object(schema_object);
        }

        for fk in &self.foreign_keys {
            let resolve = |endpoint: &ColumnReference| {
                builder
                    .find_object(&endpoint.schema, &endpoint.table)
                    .ok_or_else(|| ImportError::UnknownObject {
                        foreign_key: fk.name.clone(),
                        object: format!("{}.{}", endpoint.schema, endpoint.table),
                    })
            };
            let foreign = resolve(&fk.foreign)?;
            let primary = resolve(&fk.primary)?;
            builder.add_foreign_key(
                &fk.name,
                foreign,
                &fk.foreign.column,
                primary,
                &fk.primary.column,
            )?;
        }

        debug!(
            objects = self.objects.len(),
            foreign_keys = self.foreign_keys.len(),
            "schema document imported"
        );
        Ok(builder.build())
    }
}

/// Load a schema document file straight into a model
pub fn load_model(path: impl AsRef<Path>) -> Result<SchemaModel> {
    SchemaDocument::from_file(path)?.into_model()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"
database: Rmc
objects:
  - schema: Sca
    name: Transactor
    columns:
      - { name: Id, type: int, identity: true, primary_key: true }
  - schema: Sca
    name: Credit
    columns:
      - { name: Id, type: int, identity: true, primary_key: true }
      - { name: TransactorId, type: int }
      - { name: Amount, type: decimal, precision: 19, scale: 4, nullable: true }
  - schema: Sca
    name: Broken
    kind: view
    errors: ["Invalid object name", "Login failed"]
foreign_keys:
  - name: FK_Credit_Transactor
    foreign: { schema: Sca, table: Credit, column: TransactorId }
    primary: { schema: Sca, table: Transactor, column: Id }
"#;

    #[test]
    fn test_yaml_document_to_model() {
        let model = SchemaDocument::from_yaml_str(DOCUMENT)
            .unwrap()
            .into_model()
            .unwrap();
        assert_eq!(model.len(), 3);
        assert_eq!(model.foreign_keys().len(), 1);

        let credit = model.object(model.find_object("Sca", "Credit").unwrap());
        assert_eq!(credit.database, "Rmc");
        assert_eq!(credit.kind, DbObjectKind::Table);
        assert_eq!(credit.columns[1].foreign_keys.len(), 1);
        assert_eq!(credit.columns[2].display_precision(), "(19,4)");
        assert_eq!(credit.columns[2].ordinal, Some(3));

        let transactor = model.object(model.find_object("Sca", "Transactor").unwrap());
        assert_eq!(transactor.columns[0].referenced_by.len(), 1);
    }

    #[test]
    fn test_error_chain_outermost_first() {
        let model = SchemaDocument::from_yaml_str(DOCUMENT)
            .unwrap()
            .into_model()
            .unwrap();
        let broken = model.object(model.find_object("Sca", "Broken").unwrap());
        let messages: Vec<&str> = broken
            .error
            .as_ref()
            .unwrap()
            .chain()
            .map(|e| e.message.as_str())
            .collect();
        assert_eq!(messages, vec!["Invalid object name", "Login failed"]);
    }

    #[test]
    fn test_unknown_endpoint() {
        let yaml = r#"
objects:
  - { schema: dbo, name: A, columns: [{ name: Id, type: int }] }
foreign_keys:
  - name: FK_A_B
    foreign: { schema: dbo, table: A, column: Id }
    primary: { schema: dbo, table: B, column: Id }
"#;
        let err = SchemaDocument::from_yaml_str(yaml)
            .unwrap()
            .into_model()
            .unwrap_err();
        assert!(matches!(err, ImportError::UnknownObject { ref object, .. } if object == "dbo.B"));
    }

    #[test]
    fn test_unknown_column() {
        let yaml = r#"
objects:
  - { schema: dbo, name: A, columns: [{ name: Id, type: int }] }
foreign_keys:
  - foreign: { schema: dbo, table: A, column: Missing }
    primary: { schema: dbo, table: A, column: Id }
"#;
        let err = SchemaDocument::from_yaml_str(yaml)
            .unwrap()
            .into_model()
            .unwrap_err();
        assert!(matches!(err, ImportError::Model(ModelError::UnknownColumn { .. })));
    }
}
