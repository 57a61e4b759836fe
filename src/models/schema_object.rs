//! Schema object model (tables, views, table-valued parameters, procedures)

use std::fmt;

use serde::{Deserialize, Serialize};

use super::column::Column;

/// Kind of database object a [`SchemaObject`] describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DbObjectKind {
    Table,
    View,
    #[serde(alias = "tvp")]
    TableValuedParameter,
    StoredProcedure,
}

impl DbObjectKind {
    /// Object kinds whose own name is singularized when requested
    pub fn is_singularizable(self) -> bool {
        matches!(
            self,
            DbObjectKind::Table | DbObjectKind::View | DbObjectKind::TableValuedParameter
        )
    }
}

impl fmt::Display for DbObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbObjectKind::Table => write!(f, "table"),
            DbObjectKind::View => write!(f, "view"),
            DbObjectKind::TableValuedParameter => write!(f, "table-valued parameter"),
            DbObjectKind::StoredProcedure => write!(f, "stored procedure"),
        }
    }
}

/// A failure recorded while the object was extracted.
///
/// Causes form a chain from the outermost to the innermost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<ObjectError>>,
}

impl ObjectError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// Attach an inner cause below the innermost one of this chain.
    pub fn caused_by(mut self, inner: ObjectError) -> Self {
        match self.cause.take() {
            Some(existing) => self.cause = Some(Box::new(existing.caused_by(inner))),
            None => self.cause = Some(Box::new(inner)),
        }
        self
    }

    /// Build a chain from messages given outermost first; `None` when empty.
    pub fn from_messages<I, S>(messages: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let messages: Vec<String> = messages.into_iter().map(Into::into).collect();
        messages
            .into_iter()
            .rev()
            .fold(None, |inner, message| {
                Some(ObjectError {
                    message,
                    cause: inner.map(Box::new),
                })
            })
    }

    /// Iterate over the chain, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &ObjectError> {
        std::iter::successors(Some(self), |e| e.cause.as_deref())
    }
}

impl fmt::Display for ObjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// One database object to generate code for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaObject {
    pub database: String,
    pub schema: String,
    pub name: String,
    pub kind: DbObjectKind,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ObjectError>,
}

impl SchemaObject {
    pub fn new(
        database: impl Into<String>,
        schema: impl Into<String>,
        name: impl Into<String>,
        kind: DbObjectKind,
    ) -> Self {
        Self {
            database: database.into(),
            schema: schema.into(),
            name: name.into(),
            kind,
            columns: Vec::new(),
            error: None,
        }
    }

    pub fn table(
        database: impl Into<String>,
        schema: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::new(database, schema, name, DbObjectKind::Table)
    }

    pub fn view(
        database: impl Into<String>,
        schema: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::new(database, schema, name, DbObjectKind::View)
    }

    /// Append a column; its ordinal defaults to its position when not set.
    pub fn with_column(mut self, mut column: Column) -> Self {
        if column.ordinal.is_none() {
            column.ordinal = Some(self.columns.len() as u32 + 1);
        }
        self.columns.push(column);
        self
    }

    pub fn with_error(mut self, error: ObjectError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn is_table(&self) -> bool {
        self.kind == DbObjectKind::Table
    }

    /// Columns in ascending ordinal order (stable for equal ordinals).
    pub fn ordered_columns(&self) -> Vec<&Column> {
        let mut columns: Vec<&Column> = self.columns.iter().collect();
        columns.sort_by_key(|c| c.sort_key());
        columns
    }

    pub fn find_column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn primary_key_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_primary_key)
    }

    pub fn identity_column(&self) -> Option<&Column> {
        self.ordered_columns().into_iter().find(|c| c.is_identity)
    }
}

impl fmt::Display for SchemaObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}
