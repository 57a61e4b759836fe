//! Column model

use serde::{Deserialize, Serialize};

use super::ForeignKeyId;

/// A column of a table, view or table-valued parameter.
///
/// Foreign-key participation is stored as handles into the owning
/// [`SchemaModel`](super::SchemaModel): `foreign_keys` are the keys where this
/// column is the child (it references another table), `referenced_by` are the
/// keys where this column is the referenced parent key.
///
/// # Example
///
/// ```rust
/// use poco_codegen::models::Column;
///
/// let id = Column::new("Id", "int").with_ordinal(1).identity().primary_key();
/// assert!(id.is_identity);
/// assert!(!id.is_nullable);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Column {
    /// Column name as declared in the database
    pub name: String,
    /// Declared position within the owning object (1-based)
    #[serde(default)]
    pub ordinal: Option<u32>,
    /// Raw type name (e.g. "nvarchar", "timestamp")
    pub data_type_name: String,
    /// Type name used for display and type mapping; usually equal to `data_type_name`
    pub data_type_display: String,
    #[serde(default)]
    pub is_nullable: bool,
    /// Character/binary length; -1 means `max`
    #[serde(default)]
    pub string_precision: Option<i64>,
    #[serde(default)]
    pub numeric_precision: Option<u32>,
    #[serde(default)]
    pub numeric_scale: Option<u32>,
    /// Fractional seconds precision for datetime2/time/datetimeoffset
    #[serde(default)]
    pub datetime_precision: Option<u32>,
    #[serde(default)]
    pub is_identity: bool,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(skip)]
    pub foreign_keys: Vec<ForeignKeyId>,
    #[serde(skip)]
    pub referenced_by: Vec<ForeignKeyId>,
}

impl Column {
    /// Create a non-nullable column of the given raw type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        let data_type = data_type.into();
        Self {
            name: name.into(),
            ordinal: None,
            data_type_display: data_type.clone(),
            data_type_name: data_type,
            is_nullable: false,
            string_precision: None,
            numeric_precision: None,
            numeric_scale: None,
            datetime_precision: None,
            is_identity: false,
            is_primary_key: false,
            foreign_keys: Vec::new(),
            referenced_by: Vec::new(),
        }
    }

    pub fn with_ordinal(mut self, ordinal: u32) -> Self {
        self.ordinal = Some(ordinal);
        self
    }

    pub fn with_display_type(mut self, display: impl Into<String>) -> Self {
        self.data_type_display = display.into();
        self
    }

    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    pub fn identity(mut self) -> Self {
        self.is_identity = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn with_length(mut self, length: i64) -> Self {
        self.string_precision = Some(length);
        self
    }

    pub fn with_precision(mut self, precision: u32, scale: u32) -> Self {
        self.numeric_precision = Some(precision);
        self.numeric_scale = Some(scale);
        self
    }

    pub fn with_datetime_precision(mut self, precision: u32) -> Self {
        self.datetime_precision = Some(precision);
        self
    }

    /// Ordinal used for ordering; columns without one sort first.
    pub fn sort_key(&self) -> u32 {
        self.ordinal.unwrap_or(0)
    }

    /// True for optimistic-concurrency columns (`timestamp` / `rowversion`).
    ///
    /// Either the declared type or the displayed type may carry the name, so a
    /// user-defined alias over `rowversion` still counts.
    pub fn is_concurrency(&self) -> bool {
        [&self.data_type_name, &self.data_type_display].into_iter().any(|data_type| {
            data_type.eq_ignore_ascii_case("timestamp")
                || data_type.eq_ignore_ascii_case("rowversion")
        })
    }

    pub fn has_foreign_keys(&self) -> bool {
        !self.foreign_keys.is_empty()
    }

    pub fn is_referenced(&self) -> bool {
        !self.referenced_by.is_empty()
    }

    /// Precision suffix as shown in member comments, e.g. `(255)`, `(max)`, `(19,4)`.
    pub fn display_precision(&self) -> String {
        let data_type = self.data_type_display.to_ascii_lowercase();
        match data_type.as_str() {
            "char" | "nchar" | "varchar" | "nvarchar" | "binary" | "varbinary" => {
                match self.string_precision {
                    Some(-1) => "(max)".to_string(),
                    Some(length) => format!("({})", length),
                    None => String::new(),
                }
            }
            "decimal" | "numeric" => match (self.numeric_precision, self.numeric_scale) {
                (Some(precision), Some(scale)) => format!("({},{})", precision, scale),
                (Some(precision), None) => format!("({})", precision),
                _ => String::new(),
            },
            "datetime2" | "time" | "datetimeoffset" => self
                .datetime_precision
                .map(|p| format!("({})", p))
                .unwrap_or_default(),
            _ => String::new(),
        }
    }

    /// Precision suffix for a T-SQL parameter declaration.
    ///
    /// Only the `char` family and `decimal`/`numeric` carry one.
    pub fn parameter_precision(&self) -> String {
        let data_type = self.data_type_name.to_ascii_lowercase();
        if data_type.contains("char") {
            return match self.string_precision {
                Some(-1) => "(max)".to_string(),
                Some(length) => format!("({})", length),
                None => String::new(),
            };
        }
        if data_type.contains("decimal") || data_type.contains("numeric") {
            return format!(
                "({},{})",
                self.numeric_precision.unwrap_or(18),
                self.numeric_scale.unwrap_or(0)
            );
        }
        String::new()
    }
}
