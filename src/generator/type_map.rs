//! Column type mapping
//!
//! Every recognized SQL Server type maps to exactly one C# type through
//! [`TYPE_TABLE`]; anything else becomes `object`. The table is plain data so
//! the whole mapping can be checked row by row.

use tracing::warn;

use crate::writer::TokenKind::{Keyword, UserType};
use crate::writer::{TokenKind, TokenSink};

/// Namespace of the SQL Server spatial and hierarchy types
pub const SPATIAL_NAMESPACE: &str = "Microsoft.SqlServer.Types";

/// One row of the type table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMapping {
    /// SQL type name, lower case
    pub sql_type: &'static str,
    /// C# type written for the column
    pub clr_type: &'static str,
    /// `Keyword` for C# built-in aliases, `UserType` for framework types
    pub token: TokenKind,
    /// Struct type that needs `?` to hold null
    pub is_value_type: bool,
    /// Written as an array (`byte[]`)
    pub is_array: bool,
    /// Lives in [`SPATIAL_NAMESPACE`]
    pub is_spatial: bool,
}

const fn value(sql_type: &'static str, clr_type: &'static str, token: TokenKind) -> TypeMapping {
    TypeMapping {
        sql_type,
        clr_type,
        token,
        is_value_type: true,
        is_array: false,
        is_spatial: false,
    }
}

const fn reference(sql_type: &'static str, clr_type: &'static str) -> TypeMapping {
    TypeMapping {
        sql_type,
        clr_type,
        token: TokenKind::Keyword,
        is_value_type: false,
        is_array: false,
        is_spatial: false,
    }
}

const fn bytes(sql_type: &'static str) -> TypeMapping {
    TypeMapping {
        sql_type,
        clr_type: "byte",
        token: TokenKind::Keyword,
        is_value_type: false,
        is_array: true,
        is_spatial: false,
    }
}

const fn spatial(sql_type: &'static str, clr_type: &'static str) -> TypeMapping {
    TypeMapping {
        sql_type,
        clr_type,
        token: TokenKind::UserType,
        is_value_type: false,
        is_array: false,
        is_spatial: true,
    }
}

/// SQL Server type to C# type
pub const TYPE_TABLE: &[TypeMapping] = &[
    value("bigint", "long", Keyword),
    bytes("binary"),
    value("bit", "bool", Keyword),
    reference("char", "string"),
    value("date", "DateTime", UserType),
    value("datetime", "DateTime", UserType),
    value("datetime2", "DateTime", UserType),
    value("datetimeoffset", "DateTimeOffset", UserType),
    value("decimal", "decimal", Keyword),
    bytes("filestream"),
    value("float", "double", Keyword),
    spatial("geography", "SqlGeography"),
    spatial("geometry", "SqlGeometry"),
    spatial("hierarchyid", "SqlHierarchyId"),
    bytes("image"),
    value("int", "int", Keyword),
    value("money", "decimal", Keyword),
    reference("nchar", "string"),
    reference("ntext", "string"),
    value("numeric", "decimal", Keyword),
    reference("nvarchar", "string"),
    value("real", "Single", UserType),
    bytes("rowversion"),
    value("smalldatetime", "DateTime", UserType),
    value("smallint", "short", Keyword),
    value("smallmoney", "decimal", Keyword),
    reference("sql_variant", "object"),
    reference("text", "string"),
    value("time", "TimeSpan", UserType),
    bytes("timestamp"),
    value("tinyint", "byte", Keyword),
    value("uniqueidentifier", "Guid", UserType),
    bytes("varbinary"),
    reference("varchar", "string"),
    reference("xml", "string"),
];

/// Mapping of types missing from [`TYPE_TABLE`]
pub static OBJECT_MAPPING: TypeMapping = reference("", "object");

/// Result of mapping one column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedType {
    pub mapping: &'static TypeMapping,
    /// A `?` marker follows the type
    pub is_optional: bool,
}

impl MappedType {
    /// Write the type through `sink`; spatial types get their namespace
    /// prefix when `qualify_spatial` is set.
    pub fn write_to(&self, sink: &mut dyn TokenSink, qualify_spatial: bool) {
        if self.mapping.is_spatial && qualify_spatial {
            sink.write(SPATIAL_NAMESPACE);
            sink.write(".");
        }
        sink.write_token(self.mapping.token, self.mapping.clr_type);
        if self.mapping.is_array {
            sink.write("[]");
        }
        if self.is_optional {
            sink.write("?");
        }
    }

    /// Type as plain text
    pub fn render(&self, qualify_spatial: bool) -> String {
        let mut writer = crate::writer::PlainTextWriter::new();
        self.write_to(&mut writer, qualify_spatial);
        writer.into_string()
    }
}

/// Row of [`TYPE_TABLE`] for a type name, compared case-insensitively
pub fn lookup(type_name: &str) -> Option<&'static TypeMapping> {
    TYPE_TABLE
        .iter()
        .find(|m| m.sql_type.eq_ignore_ascii_case(type_name.trim()))
}

/// Map a column's display type to a C# type.
///
/// Value types become optional when the column is nullable or
/// `force_nullable` is set; every other type already holds null.
///
/// # Example
///
/// ```rust
/// use poco_codegen::generator::type_map::map_type;
///
/// assert_eq!(map_type("int", true, false).render(false), "int?");
/// assert_eq!(map_type("NVARCHAR", true, false).render(false), "string");
/// assert_eq!(
///     map_type("geography", false, false).render(true),
///     "Microsoft.SqlServer.Types.SqlGeography"
/// );
/// ```
pub fn map_type(type_display: &str, is_nullable: bool, force_nullable: bool) -> MappedType {
    let mapping = match lookup(type_display) {
        Some(mapping) => mapping,
        None => {
            warn!(data_type = %type_display, "unrecognized column type mapped to object");
            &OBJECT_MAPPING
        }
    };
    MappedType {
        mapping,
        is_optional: mapping.is_value_type && (is_nullable || force_nullable),
    }
}

/// True when a column of this type needs the spatial types assembly
pub fn requires_spatial_types(type_name: &str) -> bool {
    let lower = type_name.to_ascii_lowercase();
    lower.contains("geography") || lower.contains("geometry") || lower.contains("hierarchyid")
}
