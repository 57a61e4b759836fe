//! Foreign keys and the navigation properties derived from them

use serde::{Deserialize, Serialize};

use super::ObjectId;

/// Handle of a [`ForeignKey`] inside a [`SchemaModel`](super::SchemaModel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ForeignKeyId(pub usize);

/// A single-column relationship from a child (foreign) column to a parent
/// (primary) column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub id: ForeignKeyId,
    /// Constraint name, may be empty
    pub name: String,
    pub foreign_object: ObjectId,
    pub foreign_schema: String,
    pub foreign_table: String,
    pub foreign_column: String,
    pub primary_object: ObjectId,
    pub primary_schema: String,
    pub primary_table: String,
    pub primary_column: String,
    /// The child table is a many-to-many join made of this key and `join_partner`
    pub is_many_to_many: bool,
    /// The join table has no columns besides the two keys
    pub is_many_to_many_complete: bool,
    /// The other foreign key of the join table
    pub join_partner: Option<ForeignKeyId>,
}

impl ForeignKey {
    /// True when this key is one half of a join table that can be collapsed away
    pub fn is_collapsible_join(&self) -> bool {
        self.is_many_to_many && self.is_many_to_many_complete && self.join_partner.is_some()
    }
}

/// Which side of a foreign key a navigation property is seen from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationDirection {
    /// On the child table, pointing at the referenced parent row
    Outgoing,
    /// On the parent table, pointing at all child rows
    Incoming,
    /// On one side of a hidden join table, pointing at the other side
    ManyToMany,
}

/// A generated relationship member of one class pointing at another class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationProperty {
    pub foreign_key: ForeignKeyId,
    pub direction: NavigationDirection,
    /// Output identifier of the target class
    pub class_name: String,
    pub is_single: bool,
    /// Name assigned during duplicate resolution
    pub renamed: Option<String>,
    /// Column whose name supplies a trailing-number disambiguation
    pub source_column: String,
}

impl NavigationProperty {
    pub fn new(
        foreign_key: ForeignKeyId,
        direction: NavigationDirection,
        class_name: impl Into<String>,
        source_column: impl Into<String>,
    ) -> Self {
        Self {
            foreign_key,
            direction,
            class_name: class_name.into(),
            is_single: direction == NavigationDirection::Outgoing,
            renamed: None,
            source_column: source_column.into(),
        }
    }

    /// Name before duplicate resolution: the target class, pluralized for collections.
    pub fn default_name(&self) -> String {
        if self.is_single {
            self.class_name.clone()
        } else {
            crate::naming::pluralize(&self.class_name)
        }
    }

    /// Name to emit.
    pub fn display_name(&self) -> String {
        self.renamed.clone().unwrap_or_else(|| self.default_name())
    }

    pub fn is_outgoing(&self) -> bool {
        self.direction == NavigationDirection::Outgoing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        let single = NavigationProperty::new(
            ForeignKeyId(0),
            NavigationDirection::Outgoing,
            "Transactor",
            "TransactorId",
        );
        assert!(single.is_single);
        assert_eq!(single.display_name(), "Transactor");

        let mut many = NavigationProperty::new(
            ForeignKeyId(0),
            NavigationDirection::Incoming,
            "Credit",
            "TransactorId",
        );
        assert!(!many.is_single);
        assert_eq!(many.display_name(), "Credits");

        many.renamed = Some("Credits1".to_string());
        assert_eq!(many.display_name(), "Credits1");
        assert_eq!(many.default_name(), "Credits");
    }
}
