//! Class emission
//!
//! Writes one C# class for a table, view, table-valued parameter or
//! procedure result set: attributes, declaration, a constructor when
//! collection navigation properties exist, column members, navigation
//! members and the closing brace.

use crate::generator::config::GenerationConfig;
use crate::generator::type_map::map_type;
use crate::models::{Column, NavigationProperty, SchemaModel, SchemaObject};
use crate::naming::NameResolver;
use crate::writer::TokenSink;

/// Emits class blocks for one configuration
pub struct ClassWriter<'a> {
    config: &'a GenerationConfig,
    model: &'a SchemaModel,
    names: NameResolver<'a>,
    /// Leading whitespace of every line (one indent inside a namespace)
    offset: String,
}

impl<'a> ClassWriter<'a> {
    pub fn new(
        model: &'a SchemaModel,
        config: &'a GenerationConfig,
        offset: impl Into<String>,
    ) -> Self {
        Self {
            config,
            model,
            names: NameResolver::new(config),
            offset: offset.into(),
        }
    }

    pub fn write_class(
        &self,
        sink: &mut dyn TokenSink,
        object: &SchemaObject,
        class_name: &str,
        properties: &[NavigationProperty],
    ) {
        self.write_class_attributes(sink);
        self.write_class_start(sink, class_name);
        self.write_constructor(sink, class_name, properties);

        let columns = object.ordered_columns();
        for (index, column) in columns.iter().enumerate() {
            self.write_column(sink, column);
            if self.config.members.blank_line_between && index + 1 < columns.len() {
                sink.end_line();
            }
        }

        self.write_navigation_properties(sink, properties);

        sink.write(&self.offset);
        sink.write_line("}");
    }

    fn member_indent(&self) -> String {
        format!("{}{}", self.offset, self.config.indent)
    }

    fn write_class_attributes(&self, sink: &mut dyn TokenSink) {
        let contract = &self.config.data_contract;
        if !contract.enabled {
            return;
        }
        sink.write(&self.offset);
        sink.write("[");
        if contract.namespace.is_empty() {
            sink.write_user_type("DataContract");
        } else {
            sink.write_user_type(&format!("DataContract(Namespace = \"{}\")", contract.namespace));
        }
        sink.write_line("]");
    }

    fn write_class_start(&self, sink: &mut dyn TokenSink, class_name: &str) {
        sink.write(&self.offset);
        sink.write_keyword("public");
        sink.write(" ");
        if self.config.class.partial {
            sink.write_keyword("partial");
            sink.write(" ");
        }
        sink.write_keyword("class");
        sink.write(" ");
        sink.write_user_type(class_name);

        let inherit = self.config.class.inherit_list();
        for (index, base) in inherit.iter().enumerate() {
            sink.write(if index == 0 { " : " } else { ", " });
            sink.write_user_type(base);
        }
        sink.end_line();

        sink.write(&self.offset);
        sink.write_line("{");
    }

    /// Initializes every collection property; written only when one exists.
    fn write_constructor(
        &self,
        sink: &mut dyn TokenSink,
        class_name: &str,
        properties: &[NavigationProperty],
    ) {
        let collections: Vec<&NavigationProperty> =
            properties.iter().filter(|p| !p.is_single).collect();
        if collections.is_empty() {
            return;
        }
        let indent = self.member_indent();
        let collection_type = self.config.navigation.collection.concrete_type();

        sink.write(&indent);
        sink.write_keyword("public");
        sink.write(" ");
        sink.write(class_name);
        sink.write_line("()");
        sink.write(&indent);
        sink.write_line("{");

        for property in collections {
            sink.write(&indent);
            sink.write(&self.config.indent);
            sink.write_keyword("this");
            sink.write(".");
            sink.write(&property.display_name());
            sink.write(" = ");
            sink.write_keyword("new");
            sink.write(" ");
            sink.write_user_type(collection_type);
            sink.write("<");
            sink.write_user_type(&property.class_name);
            sink.write_line(">();");
        }

        sink.write(&indent);
        sink.write_line("}");
        sink.end_line();
    }

    fn write_column(&self, sink: &mut dyn TokenSink, column: &Column) {
        let indent = self.member_indent();
        let members = &self.config.members;

        if self.config.data_contract.enabled {
            sink.write(&indent);
            sink.write("[");
            sink.write_user_type("DataMember");
            sink.write_line("]");
        }

        sink.write(&indent);
        sink.write_keyword("public");
        sink.write(" ");
        if members.properties && members.virtual_properties {
            sink.write_keyword("virtual");
            sink.write(" ");
        }

        map_type(&column.data_type_display, column.is_nullable, members.force_nullable)
            .write_to(sink, !self.config.class.using);

        sink.write(" ");
        sink.write(&self.names.member_name(&column.name));
        self.write_member_end(sink);

        if self.config.comments.enabled {
            sink.write(" ");
            let mut comment =
                format!("// {}{}", column.data_type_display, column.display_precision());
            if !self.config.comments.without_nullability {
                comment.push_str(if column.is_nullable { ", null" } else { ", not null" });
            }
            sink.write_comment(&comment);
        }
        sink.end_line();
    }

    fn write_member_end(&self, sink: &mut dyn TokenSink) {
        if self.config.members.properties {
            sink.write(" { ");
            sink.write_keyword("get");
            sink.write("; ");
            sink.write_keyword("set");
            sink.write("; }");
        } else {
            sink.write(";");
        }
    }

    fn write_navigation_properties(
        &self,
        sink: &mut dyn TokenSink,
        properties: &[NavigationProperty],
    ) {
        if properties.is_empty() {
            return;
        }
        let blank_line_between = self.config.members.blank_line_between;
        if !blank_line_between {
            sink.end_line();
        }
        for property in properties {
            if blank_line_between {
                sink.end_line();
            }
            self.write_navigation_property(sink, property);
        }
    }

    fn write_navigation_property(&self, sink: &mut dyn TokenSink, property: &NavigationProperty) {
        let indent = self.member_indent();
        let navigation = &self.config.navigation;

        if navigation.comments {
            let fk = self.model.foreign_key(property.foreign_key);
            let mut comment = format!(
                "// {}.{}.{} -> {}.{}.{}",
                fk.foreign_schema,
                fk.foreign_table,
                fk.foreign_column,
                fk.primary_schema,
                fk.primary_table,
                fk.primary_column
            );
            if !fk.name.is_empty() {
                comment.push_str(&format!(" ({})", fk.name));
            }
            sink.write(&indent);
            sink.write_line_comment(&comment);
        }

        sink.write(&indent);
        sink.write_keyword("public");
        sink.write(" ");
        if self.config.members.properties && navigation.virtual_properties {
            sink.write_keyword("virtual");
            sink.write(" ");
        }

        if property.is_single {
            sink.write_user_type(&property.class_name);
            sink.write(" ");
        } else {
            sink.write_user_type(navigation.collection.declared_type());
            sink.write("<");
            sink.write_user_type(&property.class_name);
            sink.write("> ");
        }
        sink.write(&property.display_name());
        self.write_member_end(sink);
        sink.end_line();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::config::{CollectionKind, MemberConfig, NavigationConfig};
    use crate::models::{ForeignKeyId, NavigationDirection};
    use crate::writer::PlainTextWriter;

    fn credit() -> (SchemaModel, SchemaObject) {
        let mut builder = SchemaModel::builder();
        let transactor = builder.add_object(
            SchemaObject::table("Rmc", "Sca", "Transactor")
                .with_column(Column::new("Id", "int").primary_key().identity()),
        );
        let credit = builder.add_object(
            SchemaObject::table("Rmc", "Sca", "Credit")
                .with_column(Column::new("Id", "int").primary_key().identity())
                .with_column(Column::new("TransactorId", "int"))
                .with_column(Column::new("Amount", "decimal").with_precision(19, 4).nullable())
                .with_column(Column::new("timestamp", "timestamp")),
        );
        builder
            .add_foreign_key("FK_Credit_Transactor", credit, "TransactorId", transactor, "Id")
            .unwrap();
        let model = builder.build();
        let object = model.object(credit).clone();
        (model, object)
    }

    fn render(config: &GenerationConfig, properties: &[NavigationProperty]) -> String {
        let (model, object) = credit();
        let writer = ClassWriter::new(&model, config, "");
        let mut sink = PlainTextWriter::new();
        writer.write_class(&mut sink, &object, "Credit", properties);
        sink.into_string()
    }

    #[test]
    fn test_plain_class() {
        let output = render(&GenerationConfig::default(), &[]);
        let expected = "\
public class Credit
{
    public int Id { get; set; }
    public int TransactorId { get; set; }
    public decimal? Amount { get; set; }
    public byte[] timestamp { get; set; }
}
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_fields_comments_and_contract() {
        let config = GenerationConfig::default()
            .with_members(MemberConfig {
                properties: false,
                ..MemberConfig::default()
            })
            .with_comments(true)
            .with_data_contract("http://example.com/contracts/");
        let output = render(&config, &[]);
        assert!(output.starts_with(
            "[DataContract(Namespace = \"http://example.com/contracts/\")]\npublic class Credit\n"
        ));
        assert!(output.contains(
            "    [DataMember]\n    public decimal? Amount; // decimal(19,4), null\n"
        ));
        assert!(output.contains("    public int Id; // int, not null\n"));
    }

    #[test]
    fn test_single_navigation_has_no_constructor() {
        let config = GenerationConfig::default()
            .with_navigation(NavigationConfig::enabled().with_virtual(true).with_comments(true));
        let properties = vec![NavigationProperty::new(
            ForeignKeyId(0),
            NavigationDirection::Outgoing,
            "Transactor",
            "TransactorId",
        )];
        let output = render(&config, &properties);
        assert!(!output.contains("public Credit()"));
        assert!(output.contains(
            "    public byte[] timestamp { get; set; }\n\n    // Sca.Credit.TransactorId -> Sca.Transactor.Id (FK_Credit_Transactor)\n    public virtual Transactor Transactor { get; set; }\n}\n"
        ));
    }

    #[test]
    fn test_collection_navigation_gets_constructor() {
        let config = GenerationConfig::default().with_navigation(
            NavigationConfig::enabled().with_collection(CollectionKind::Collection),
        );
        let properties = vec![NavigationProperty::new(
            ForeignKeyId(0),
            NavigationDirection::Incoming,
            "Payment",
            "CreditId",
        )];
        let output = render(&config, &properties);
        assert!(output.starts_with(
            "public class Credit\n{\n    public Credit()\n    {\n        this.Payments = new HashSet<Payment>();\n    }\n\n    public int Id"
        ));
        assert!(output.contains("    public ICollection<Payment> Payments { get; set; }\n"));
    }

    #[test]
    fn test_partial_inherit_and_offset() {
        let mut config = GenerationConfig::default();
        config.class.partial = true;
        config.class.inherit = "EntityBase,IVersioned".to_string();
        config.members.blank_line_between = true;
        let (model, object) = credit();
        let writer = ClassWriter::new(&model, &config, "    ");
        let mut sink = PlainTextWriter::new();
        writer.write_class(&mut sink, &object, "Credit", &[]);
        let output = sink.into_string();
        assert!(output.starts_with(
            "    public partial class Credit : EntityBase, IVersioned\n    {\n        public int Id { get; set; }\n\n"
        ));
        assert!(output.ends_with("        public byte[] timestamp { get; set; }\n    }\n"));
    }
}
