//! Schema model arena
//!
//! Objects and foreign keys reference each other through stable integer
//! handles ([`ObjectId`], [`ForeignKeyId`]) instead of owning each other, so
//! the parent/child graph stays a plain pair of vectors.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::relationship::{ForeignKey, ForeignKeyId};
use super::schema_object::{DbObjectKind, SchemaObject};

/// Handle of a [`SchemaObject`] inside a [`SchemaModel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub usize);

/// Error while assembling a schema model
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Unknown object handle: {0}")]
    UnknownObject(usize),
    #[error("Column '{column}' not found in {object}")]
    UnknownColumn { object: String, column: String },
}

/// Ordered collection of schema objects and the foreign keys between them.
///
/// Input order of objects is preserved and drives output order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaModel {
    objects: Vec<SchemaObject>,
    foreign_keys: Vec<ForeignKey>,
}

impl SchemaModel {
    pub fn builder() -> SchemaModelBuilder {
        SchemaModelBuilder::default()
    }

    pub fn objects(&self) -> &[SchemaObject] {
        &self.objects
    }

    pub fn object_ids(&self) -> impl Iterator<Item = ObjectId> {
        (0..self.objects.len()).map(ObjectId)
    }

    pub fn object(&self, id: ObjectId) -> &SchemaObject {
        &self.objects[id.0]
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    pub fn foreign_key(&self, id: ForeignKeyId) -> &ForeignKey {
        &self.foreign_keys[id.0]
    }

    pub fn find_object(&self, schema: &str, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .position(|o| o.schema == schema && o.name == name)
            .map(ObjectId)
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }
}

/// Builder attaching foreign keys to columns and deriving join-table flags
#[derive(Debug, Default)]
pub struct SchemaModelBuilder {
    objects: Vec<SchemaObject>,
    foreign_keys: Vec<ForeignKey>,
}

impl SchemaModelBuilder {
    pub fn add_object(&mut self, object: SchemaObject) -> ObjectId {
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    pub fn find_object(&self, schema: &str, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .position(|o| o.schema == schema && o.name == name)
            .map(ObjectId)
    }

    /// Register a foreign key `foreign.foreign_column -> primary.primary_column`.
    pub fn add_foreign_key(
        &mut self,
        name: impl Into<String>,
        foreign: ObjectId,
        foreign_column: &str,
        primary: ObjectId,
        primary_column: &str,
    ) -> Result<ForeignKeyId, ModelError> {
        let foreign_index = self.column_index(foreign, foreign_column)?;
        let primary_index = self.column_index(primary, primary_column)?;

        let id = ForeignKeyId(self.foreign_keys.len());
        let child = &self.objects[foreign.0];
        let parent = &self.objects[primary.0];
        self.foreign_keys.push(ForeignKey {
            id,
            name: name.into(),
            foreign_object: foreign,
            foreign_schema: child.schema.clone(),
            foreign_table: child.name.clone(),
            foreign_column: foreign_column.to_string(),
            primary_object: primary,
            primary_schema: parent.schema.clone(),
            primary_table: parent.name.clone(),
            primary_column: primary_column.to_string(),
            is_many_to_many: false,
            is_many_to_many_complete: false,
            join_partner: None,
        });

        self.objects[foreign.0].columns[foreign_index]
            .foreign_keys
            .push(id);
        self.objects[primary.0].columns[primary_index]
            .referenced_by
            .push(id);
        Ok(id)
    }

    fn column_index(&self, object: ObjectId, column: &str) -> Result<usize, ModelError> {
        let target = self
            .objects
            .get(object.0)
            .ok_or(ModelError::UnknownObject(object.0))?;
        target
            .find_column(column)
            .ok_or_else(|| ModelError::UnknownColumn {
                object: target.to_string(),
                column: column.to_string(),
            })
    }

    pub fn build(mut self) -> SchemaModel {
        self.mark_join_tables();
        SchemaModel {
            objects: self.objects,
            foreign_keys: self.foreign_keys,
        }
    }

    /// A table is a many-to-many join when its primary key is exactly two
    /// columns, each carrying one foreign key, and it has no other foreign keys.
    /// The join is complete when the table has no columns besides those two.
    fn mark_join_tables(&mut self) {
        for object in &self.objects {
            if object.kind != DbObjectKind::Table || object.error.is_some() {
                continue;
            }

            let mut outgoing: Vec<ForeignKeyId> = object
                .columns
                .iter()
                .flat_map(|c| c.foreign_keys.iter().copied())
                .collect();
            outgoing.sort();
            outgoing.dedup();

            let key_columns: Vec<_> = object.primary_key_columns().collect();
            let is_join = key_columns.len() == 2
                && outgoing.len() == 2
                && key_columns.iter().all(|c| c.foreign_keys.len() == 1);
            if !is_join {
                continue;
            }

            let complete = object.columns.len() == key_columns.len();
            debug!(table = %object, complete, "many-to-many join table detected");

            let (first, second) = (outgoing[0], outgoing[1]);
            for (fk, partner) in [(first, second), (second, first)] {
                let key = &mut self.foreign_keys[fk.0];
                key.is_many_to_many = true;
                key.is_many_to_many_complete = complete;
                key.join_partner = Some(partner);
            }
        }
    }
}
