//! CRUD stored procedure emission
//!
//! Every table gets one `CREATE PROCEDURE` script per configured suffix. The
//! suffix decides the variant: it must contain `insert`, `update` or `delete`
//! (any case).

use tracing::{debug, warn};

use crate::generator::config::{AuditColumns, DescriptionLocale, GenerationConfig};
use crate::models::{Column, SchemaObject};
use crate::naming::{singularize, PLACEHOLDER_NAME};
use crate::writer::TokenSink;

const HEADER_RULE: &str = "-- =============================================";

/// CRUD variant of a generated procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureKind {
    Insert,
    Update,
    Delete,
}

impl ProcedureKind {
    /// Variant named by a procedure suffix such as `InsertSP`
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        let lower = suffix.to_lowercase();
        if lower.contains("insert") {
            Some(ProcedureKind::Insert)
        } else if lower.contains("update") {
            Some(ProcedureKind::Update)
        } else if lower.contains("delete") {
            Some(ProcedureKind::Delete)
        } else {
            None
        }
    }

    fn description(self, locale: DescriptionLocale, table: &str) -> String {
        match (locale, self) {
            (DescriptionLocale::English, ProcedureKind::Insert) => {
                format!("Create new [{}] via EntityFramework", table)
            }
            (DescriptionLocale::English, ProcedureKind::Update) => {
                format!("Update [{}] via EntityFramework", table)
            }
            (DescriptionLocale::English, ProcedureKind::Delete) => {
                format!("Delete [{}] via EntityFramework", table)
            }
            (DescriptionLocale::Russian, ProcedureKind::Insert) => {
                format!("Создание нового [{}] через EntityFramework", table)
            }
            (DescriptionLocale::Russian, ProcedureKind::Update) => {
                format!("Обновление [{}] через EntityFramework", table)
            }
            (DescriptionLocale::Russian, ProcedureKind::Delete) => {
                format!("Удаление [{}] через EntityFramework", table)
            }
        }
    }
}

impl std::fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcedureKind::Insert => write!(f, "insert"),
            ProcedureKind::Update => write!(f, "update"),
            ProcedureKind::Delete => write!(f, "delete"),
        }
    }
}

/// `[schema].[name]`, with `dbo` for a missing schema
pub fn table_name(schema: &str, name: &str) -> String {
    let schema = if schema.trim().is_empty() { "dbo" } else { schema };
    let name = if name.trim().is_empty() {
        PLACEHOLDER_NAME
    } else {
        name
    };
    format!("[{}].[{}]", schema, name)
}

/// Parameter name of a column; concurrency columns carry the value read by
/// the client and get an `_Original` suffix.
pub fn parameter_name(column: &Column) -> String {
    if column.is_concurrency() {
        format!("@{}_Original", column.name)
    } else {
        format!("@{}", column.name)
    }
}

/// Whether the parameter for `column` defaults to `NULL`.
pub fn is_optional_parameter(kind: ProcedureKind, column: &Column, audit: &AuditColumns) -> bool {
    let is_audit = audit.is_audit(&column.name);
    match kind {
        ProcedureKind::Insert => {
            column.is_nullable
                || is_audit
                || column.is_identity
                || column.is_concurrency()
                || audit.is_state(&column.name)
        }
        ProcedureKind::Update => (column.is_nullable || is_audit) && !column.is_concurrency(),
        ProcedureKind::Delete => false,
    }
}

/// Row filter of update and delete: every primary key column, then every
/// concurrency column, in ordinal order, joined by `AND`.
pub fn where_clause(columns: &[&Column]) -> String {
    let keys = columns.iter().filter(|c| c.is_primary_key && !c.is_concurrency());
    let versions = columns.iter().filter(|c| c.is_concurrency());
    keys.chain(versions)
        .map(|c| format!("[{}] = {}", c.name, parameter_name(c)))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Emits stored procedure scripts for one configuration
pub struct ProcedureWriter<'a> {
    config: &'a GenerationConfig,
}

impl<'a> ProcedureWriter<'a> {
    pub fn new(config: &'a GenerationConfig) -> Self {
        Self { config }
    }

    /// Variants requested by the configured suffixes, in configuration order.
    /// Suffixes naming no variant are dropped with a warning.
    pub fn requested_variants(&self) -> Vec<(&'a str, ProcedureKind)> {
        self.config
            .procedures
            .suffixes
            .iter()
            .filter_map(|suffix| match ProcedureKind::from_suffix(suffix) {
                Some(kind) => Some((suffix.as_str(), kind)),
                None => {
                    warn!(
                        suffix = %suffix,
                        "procedure suffix names no insert, update or delete variant"
                    );
                    None
                }
            })
            .collect()
    }

    /// Write one procedure script for a table
    pub fn write_procedure(
        &self,
        sink: &mut dyn TokenSink,
        object: &SchemaObject,
        suffix: &str,
        kind: ProcedureKind,
    ) {
        let columns = object.ordered_columns();
        debug!(object = %object, variant = %kind, "writing stored procedure");

        self.write_header(sink, object, kind);
        self.write_declaration(sink, object, suffix);
        self.write_parameters(sink, &columns, kind);

        sink.write_line_keyword("AS");
        sink.write_line_keyword("BEGIN");
        sink.write(&self.config.indent);
        sink.write_line_keyword("SET NOCOUNT ON;");
        sink.end_line();

        let table = table_name(&object.schema, &object.name);
        match kind {
            ProcedureKind::Insert => self.write_insert_body(sink, object, &table, &columns),
            ProcedureKind::Update => self.write_update_body(sink, object, &table, &columns),
            ProcedureKind::Delete => self.write_delete_body(sink, object, &table, &columns),
        }

        sink.write_line_keyword("END");
        sink.write_line_keyword("GO");
    }

    fn write_header(&self, sink: &mut dyn TokenSink, object: &SchemaObject, kind: ProcedureKind) {
        let procedures = &self.config.procedures;
        sink.write_line_comment(HEADER_RULE);
        sink.write_line_comment(&format!("-- Author:\t\t<{}>", procedures.author));
        sink.write_line_comment(&format!("-- Create date:\t<{}>", procedures.create_date));
        sink.write_line_comment(&format!(
            "-- Description:\t<{}>",
            kind.description(procedures.locale, &object.name)
        ));
        sink.write_line_comment(HEADER_RULE);
    }

    fn write_declaration(&self, sink: &mut dyn TokenSink, object: &SchemaObject, suffix: &str) {
        let schema = self
            .config
            .procedures
            .schema
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(object.schema.as_str());
        let name = if self.config.naming.singularize {
            singularize(&object.name)
        } else {
            object.name.clone()
        };
        sink.write_keyword("CREATE PROCEDURE");
        sink.write(" ");
        sink.write_line(&table_name(schema, &format!("{}{}", name, suffix)));
    }

    fn write_parameters(&self, sink: &mut dyn TokenSink, columns: &[&Column], kind: ProcedureKind) {
        let declared: Vec<&Column> = match kind {
            ProcedureKind::Delete => columns
                .iter()
                .copied()
                .filter(|c| c.is_primary_key || c.is_concurrency())
                .collect(),
            _ => columns.to_vec(),
        };
        let audit = &self.config.procedures.audit;

        for (index, column) in declared.iter().enumerate() {
            let mut declaration =
                format!("{}{}", column.data_type_name, column.parameter_precision());
            if is_optional_parameter(kind, column, audit) {
                declaration.push_str(" = NULL");
            }
            if kind != ProcedureKind::Delete {
                declaration.push_str(" OUTPUT");
            }

            sink.write(&self.config.indent);
            sink.write(&parameter_name(column));
            sink.write(" ");
            sink.write_keyword(&declaration);
            if index + 1 < declared.len() {
                sink.write(",");
            }
            sink.end_line();
        }
    }

    fn write_insert_body(
        &self,
        sink: &mut dyn TokenSink,
        object: &SchemaObject,
        table: &str,
        columns: &[&Column],
    ) {
        let audit = &self.config.procedures.audit;
        let tab = &self.config.indent;
        let inserted: Vec<&Column> = columns
            .iter()
            .copied()
            .filter(|c| {
                !c.is_identity
                    && !c.is_concurrency()
                    && !audit.is_created_date(&c.name)
                    && !audit.is_state(&c.name)
                    && !audit.is_modified_date(&c.name)
            })
            .collect();

        sink.write(tab);
        sink.write_keyword("INSERT INTO");
        sink.write(" ");
        if inserted.is_empty() {
            sink.write(table);
            sink.write(" ");
            sink.write_line_keyword("DEFAULT VALUES");
        } else {
            sink.write_line(table);
            let names: Vec<String> = inserted.iter().map(|c| format!("[{}]", c.name)).collect();
            let values: Vec<String> = inserted.iter().map(|c| parameter_name(c)).collect();
            sink.write(&format!("{}{}", tab, tab));
            sink.write_line(&format!("({})", names.join(", ")));
            sink.write(tab);
            sink.write_line_keyword("VALUES");
            sink.write(&format!("{}{}", tab, tab));
            sink.write_line(&format!("({})", values.join(", ")));
        }
        sink.end_line();

        match object.identity_column() {
            Some(identity) => {
                let function = if self
                    .config
                    .procedures
                    .identity_trigger_tables
                    .contains(&object.name)
                {
                    "@@IDENTITY"
                } else {
                    "SCOPE_IDENTITY()"
                };
                sink.write(tab);
                sink.write_keyword("SET");
                sink.write(&format!(" @{} = ", identity.name));
                sink.write_line_keyword(function);
                sink.end_line();

                let mut selected = vec![format!("@{} AS [{}]", identity.name, identity.name)];
                selected.extend(non_identity_names(columns));
                let filter = format!("[{}] = @{}", identity.name, identity.name);
                self.write_reselect(sink, table, &selected, &filter);
            }
            None => {
                let selected: Vec<String> =
                    columns.iter().map(|c| format!("[{}]", c.name)).collect();
                self.write_reselect(sink, table, &selected, &key_filter(columns));
            }
        }
    }

    fn write_update_body(
        &self,
        sink: &mut dyn TokenSink,
        object: &SchemaObject,
        table: &str,
        columns: &[&Column],
    ) {
        let audit = &self.config.procedures.audit;
        let tab = &self.config.indent;
        let assigned: Vec<&Column> = columns
            .iter()
            .copied()
            .filter(|c| {
                !c.is_primary_key
                    && !c.is_identity
                    && !c.is_concurrency()
                    && !audit.is_created_date(&c.name)
                    && !audit.is_created_user(&c.name)
            })
            .collect();

        if assigned.is_empty() {
            debug!(object = %object, "no updatable columns, UPDATE statement skipped");
        } else {
            sink.write(tab);
            sink.write_keyword("UPDATE");
            sink.write(" ");
            sink.write_line(table);
            sink.write(&format!("{}{}", tab, tab));
            sink.write_line_keyword("SET");
            for (index, column) in assigned.iter().enumerate() {
                let value = if audit.is_state(&column.name) {
                    format!("ISNULL(@{}, [{}])", column.name, column.name)
                } else if audit.is_modified_date(&column.name) {
                    "GETDATE()".to_string()
                } else {
                    format!("@{}", column.name)
                };
                let separator = if index + 1 < assigned.len() { "," } else { "" };
                sink.write(&format!("{}{}{}", tab, tab, tab));
                sink.write_line(&format!("[{}] = {}{}", column.name, value, separator));
            }
            sink.write(&format!("{}{}", tab, tab));
            sink.write_keyword("WHERE");
            sink.write(" ");
            sink.write_line(&where_clause(columns));
            sink.end_line();
        }

        let selected = non_identity_names(columns);
        let filter = match object.identity_column() {
            Some(identity) => format!("[{}] = @{}", identity.name, identity.name),
            None => key_filter(columns),
        };
        self.write_reselect(sink, table, &selected, &filter);
    }

    fn write_delete_body(
        &self,
        sink: &mut dyn TokenSink,
        object: &SchemaObject,
        table: &str,
        columns: &[&Column],
    ) {
        let clause = where_clause(columns);
        if clause.is_empty() {
            warn!(
                object = %object,
                "delete procedure has no key or concurrency column to filter on"
            );
        }
        sink.write(&self.config.indent);
        sink.write_keyword("DELETE FROM");
        sink.write(" ");
        sink.write(table);
        sink.write(" ");
        sink.write_keyword("WHERE");
        if clause.is_empty() {
            sink.end_line();
        } else {
            sink.write(" ");
            sink.write_line(&clause);
        }
    }

    /// `SELECT ... FROM ... WHERE <filter> AND @@ROWCOUNT > 0`
    fn write_reselect(
        &self,
        sink: &mut dyn TokenSink,
        table: &str,
        selected: &[String],
        filter: &str,
    ) {
        let tab = &self.config.indent;
        sink.write(tab);
        sink.write_keyword("SELECT");
        sink.write(" ");
        sink.write_line(&selected.join(", "));
        sink.write(tab);
        sink.write_keyword("FROM");
        sink.write(" ");
        sink.write_line(table);
        sink.write(tab);
        sink.write_keyword("WHERE");
        sink.write(" ");
        if filter.is_empty() {
            sink.write_line("@@ROWCOUNT > 0");
        } else {
            sink.write_line(&format!("{} AND @@ROWCOUNT > 0", filter));
        }
    }
}

fn non_identity_names(columns: &[&Column]) -> Vec<String> {
    columns
        .iter()
        .filter(|c| !c.is_identity)
        .map(|c| format!("[{}]", c.name))
        .collect()
}

/// Primary key columns compared to their parameters
fn key_filter(columns: &[&Column]) -> String {
    columns
        .iter()
        .filter(|c| c.is_primary_key)
        .map(|c| format!("[{}] = @{}", c.name, c.name))
        .collect::<Vec<_>>()
        .join(" AND ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::PlainTextWriter;

    fn credit() -> SchemaObject {
        SchemaObject::table("Rmc", "Sca", "Credit")
            .with_column(Column::new("Id", "int").primary_key().identity())
            .with_column(Column::new("TransactorId", "int"))
            .with_column(Column::new("Code", "nvarchar").with_length(50).nullable())
            .with_column(Column::new("CreditState", "int"))
            .with_column(Column::new("CreatedDate", "datetime"))
            .with_column(Column::new("ModifiedDate", "datetime").nullable())
            .with_column(Column::new("timestamp", "timestamp"))
    }

    fn render(object: &SchemaObject, config: &GenerationConfig, suffix: &str) -> String {
        let writer = ProcedureWriter::new(config);
        let kind = ProcedureKind::from_suffix(suffix).unwrap();
        let mut sink = PlainTextWriter::new();
        writer.write_procedure(&mut sink, object, suffix, kind);
        sink.into_string()
    }

    #[test]
    fn test_kind_from_suffix() {
        assert_eq!(ProcedureKind::from_suffix("InsertSP"), Some(ProcedureKind::Insert));
        assert_eq!(ProcedureKind::from_suffix("_UPDATE"), Some(ProcedureKind::Update));
        assert_eq!(ProcedureKind::from_suffix("Remove"), None);
    }

    #[test]
    fn test_where_clause_order() {
        let object = credit();
        let columns = object.ordered_columns();
        assert_eq!(where_clause(&columns), "[Id] = @Id AND [timestamp] = @timestamp_Original");
        let keyless =
            SchemaObject::table("Db", "dbo", "Log").with_column(Column::new("Text", "nvarchar"));
        assert_eq!(where_clause(&keyless.ordered_columns()), "");
    }

    #[test]
    fn test_optional_parameters() {
        let audit = AuditColumns::default();
        let object = credit();
        let column = |name: &str| &object.columns[object.find_column(name).unwrap()];

        assert!(is_optional_parameter(ProcedureKind::Insert, column("Id"), &audit));
        assert!(!is_optional_parameter(ProcedureKind::Insert, column("TransactorId"), &audit));
        assert!(is_optional_parameter(ProcedureKind::Insert, column("CreditState"), &audit));
        assert!(is_optional_parameter(ProcedureKind::Insert, column("timestamp"), &audit));
        assert!(is_optional_parameter(ProcedureKind::Update, column("CreatedDate"), &audit));
        assert!(!is_optional_parameter(ProcedureKind::Update, column("CreditState"), &audit));
        assert!(!is_optional_parameter(ProcedureKind::Update, column("timestamp"), &audit));
    }

    #[test]
    fn test_insert_script() {
        let output = render(&credit(), &GenerationConfig::default(), "InsertSP");
        let expected = "\
-- =============================================
-- Author:\t\t<Author,,Name>
-- Create date:\t<Create Date,,>
-- Description:\t<Create new [Credit] via EntityFramework>
-- =============================================
CREATE PROCEDURE [Sca].[CreditInsertSP]
    @Id int = NULL OUTPUT,
    @TransactorId int OUTPUT,
    @Code nvarchar(50) = NULL OUTPUT,
    @CreditState int = NULL OUTPUT,
    @CreatedDate datetime = NULL OUTPUT,
    @ModifiedDate datetime = NULL OUTPUT,
    @timestamp_Original timestamp = NULL OUTPUT
AS
BEGIN
    SET NOCOUNT ON;

    INSERT INTO [Sca].[Credit]
        ([TransactorId], [Code])
    VALUES
        (@TransactorId, @Code)

    SET @Id = SCOPE_IDENTITY()

    SELECT @Id AS [Id], [TransactorId], [Code], [CreditState], [CreatedDate], [ModifiedDate], [timestamp]
    FROM [Sca].[Credit]
    WHERE [Id] = @Id AND @@ROWCOUNT > 0
END
GO
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_identity_trigger_table() {
        let mut config = GenerationConfig::default();
        config.procedures = config.procedures.with_identity_trigger_table("Credit");
        let output = render(&credit(), &config, "InsertSP");
        assert!(output.contains("    SET @Id = @@IDENTITY\n"));
        assert!(!output.contains("SCOPE_IDENTITY"));
    }

    #[test]
    fn test_update_script_body() {
        let output = render(&credit(), &GenerationConfig::default(), "UpdateSP");
        let body = "\
    UPDATE [Sca].[Credit]
        SET
            [TransactorId] = @TransactorId,
            [Code] = @Code,
            [CreditState] = ISNULL(@CreditState, [CreditState]),
            [ModifiedDate] = GETDATE()
        WHERE [Id] = @Id AND [timestamp] = @timestamp_Original

    SELECT [TransactorId], [Code], [CreditState], [CreatedDate], [ModifiedDate], [timestamp]
    FROM [Sca].[Credit]
    WHERE [Id] = @Id AND @@ROWCOUNT > 0
END
";
        assert!(output.contains(body), "unexpected update body:\n{}", output);
        assert!(output.contains("    @timestamp_Original timestamp OUTPUT\n"));
        assert!(output.contains("    @Code nvarchar(50) = NULL OUTPUT,\n"));
    }

    #[test]
    fn test_delete_script() {
        let mut config = GenerationConfig::default();
        config.procedures = config
            .procedures
            .with_schema("EF")
            .with_locale(DescriptionLocale::Russian);
        let output = render(&credit(), &config, "DeleteSP");
        assert!(output.contains("-- Description:\t<Удаление [Credit] через EntityFramework>\n"));
        assert!(output.contains(
            "CREATE PROCEDURE [EF].[CreditDeleteSP]\n    @Id int,\n    @timestamp_Original timestamp\nAS\n"
        ));
        assert!(output.contains(
            "    DELETE FROM [Sca].[Credit] WHERE [Id] = @Id AND [timestamp] = @timestamp_Original\nEND\nGO\n"
        ));
    }

    #[test]
    fn test_table_without_identity_reselects_by_key() {
        let object = SchemaObject::table("Db", "", "Rate")
            .with_column(Column::new("Code", "char").with_length(3).primary_key())
            .with_column(Column::new("Value", "decimal"));
        let output = render(&object, &GenerationConfig::default(), "InsertSP");
        assert!(output.contains("    @Value decimal(18,0) OUTPUT\n"));
        assert!(output.contains(
            "    SELECT [Code], [Value]\n    FROM [dbo].[Rate]\n    WHERE [Code] = @Code AND @@ROWCOUNT > 0\n"
        ));
    }
}
