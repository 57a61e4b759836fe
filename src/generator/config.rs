//! Configuration for a generation run
//!
//! A [`GenerationConfig`] is supplied once per run and never changes while the
//! schema objects are traversed. Every section defaults sensibly so a config
//! file only needs the keys it wants to change.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Error while loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported config file format: {0}")]
    UnsupportedFormat(String),
}

/// What a run produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// One class per table, view and table-valued parameter
    #[default]
    Classes,
    /// CRUD stored procedures for every table
    StoredProcedures,
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationMode::Classes => write!(f, "classes"),
            GenerationMode::StoredProcedures => write!(f, "stored_procedures"),
        }
    }
}

impl std::str::FromStr for GenerationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classes" | "class" | "poco" => Ok(GenerationMode::Classes),
            "procedures" | "stored_procedures" | "sp" => Ok(GenerationMode::StoredProcedures),
            _ => Err(format!("Unknown generation mode: {}", s)),
        }
    }
}

/// Rules deriving a class name from an object name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Use this name for every object, ignoring all other naming rules
    pub fixed_name: Option<String>,
    pub prefix: String,
    pub suffix: String,
    pub include_database: bool,
    pub database_separator: String,
    pub include_schema: bool,
    pub schema_separator: String,
    /// Leave out the schema segment when the schema is `default_schema`
    pub ignore_default_schema: bool,
    pub default_schema: String,
    /// Singularize table, view and table-valued parameter names
    pub singularize: bool,
    /// Literal text replaced once the name is assembled
    pub search: String,
    pub replace: String,
    pub search_ignore_case: bool,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            fixed_name: None,
            prefix: String::new(),
            suffix: String::new(),
            include_database: false,
            database_separator: String::new(),
            include_schema: false,
            schema_separator: String::new(),
            ignore_default_schema: true,
            default_schema: "dbo".to_string(),
            singularize: false,
            search: String::new(),
            replace: String::new(),
            search_ignore_case: false,
        }
    }
}

impl NamingConfig {
    pub fn with_fixed_name(mut self, name: impl Into<String>) -> Self {
        self.fixed_name = Some(name.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Prepend the database name followed by `separator`
    pub fn with_database(mut self, separator: impl Into<String>) -> Self {
        self.include_database = true;
        self.database_separator = separator.into();
        self
    }

    /// Prepend the schema name followed by `separator`
    pub fn with_schema(mut self, separator: impl Into<String>) -> Self {
        self.include_schema = true;
        self.schema_separator = separator.into();
        self
    }

    pub fn with_ignore_default_schema(mut self, enabled: bool) -> Self {
        self.ignore_default_schema = enabled;
        self
    }

    pub fn with_singularize(mut self, enabled: bool) -> Self {
        self.singularize = enabled;
        self
    }

    pub fn with_search_replace(
        mut self,
        search: impl Into<String>,
        replace: impl Into<String>,
        ignore_case: bool,
    ) -> Self {
        self.search = search.into();
        self.replace = replace.into();
        self.search_ignore_case = ignore_case;
        self
    }
}

/// Word casing applied to object and column names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CasingConfig {
    /// Capitalize every word (`credit_project` -> `CreditProject`)
    pub camel_case: bool,
    /// Text placed between words
    pub word_separator: String,
    pub upper_case: bool,
    pub lower_case: bool,
}

impl CasingConfig {
    pub fn camel_case() -> Self {
        Self {
            camel_case: true,
            ..Self::default()
        }
    }

    pub fn with_word_separator(mut self, separator: impl Into<String>) -> Self {
        self.word_separator = separator.into();
        self
    }

    pub fn with_upper_case(mut self, enabled: bool) -> Self {
        self.upper_case = enabled;
        self
    }

    pub fn with_lower_case(mut self, enabled: bool) -> Self {
        self.lower_case = enabled;
        self
    }

    /// True when names are split into words before casing
    pub fn splits_words(&self) -> bool {
        self.camel_case || !self.word_separator.is_empty()
    }
}

/// Shape of column members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberConfig {
    /// `{ get; set; }` properties instead of bare fields
    pub properties: bool,
    #[serde(rename = "virtual")]
    pub virtual_properties: bool,
    /// Make every value type optional regardless of column nullability
    pub force_nullable: bool,
    /// Blank line between consecutive members
    pub blank_line_between: bool,
}

impl Default for MemberConfig {
    fn default() -> Self {
        Self {
            properties: true,
            virtual_properties: false,
            force_nullable: false,
            blank_line_between: false,
        }
    }
}

/// Inline comments after column members
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentConfig {
    pub enabled: bool,
    /// Leave out the `null` / `not null` note
    pub without_nullability: bool,
}

/// `[DataContract]` / `[DataMember]` attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataContractConfig {
    pub enabled: bool,
    /// Contract namespace; `[DataContract]` has no arguments when empty
    pub namespace: String,
}

/// Collection type of one-to-many navigation properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    /// `List<T>`
    #[default]
    List,
    /// `ICollection<T>`, initialized as `HashSet<T>`
    Collection,
    /// `IEnumerable<T>`
    Enumerable,
}

impl CollectionKind {
    /// Declared type of the property
    pub fn declared_type(self) -> &'static str {
        match self {
            CollectionKind::List => "List",
            CollectionKind::Collection => "ICollection",
            CollectionKind::Enumerable => "IEnumerable",
        }
    }

    /// Concrete type created in the constructor
    pub fn concrete_type(self) -> &'static str {
        match self {
            CollectionKind::Collection => "HashSet",
            CollectionKind::List | CollectionKind::Enumerable => "List",
        }
    }
}

/// Navigation properties derived from foreign keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub enabled: bool,
    #[serde(rename = "virtual")]
    pub virtual_properties: bool,
    /// Keep pure many-to-many join tables as classes of their own
    pub show_join_tables: bool,
    /// Provenance comment above every navigation property
    pub comments: bool,
    pub collection: CollectionKind,
}

impl NavigationConfig {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    pub fn with_virtual(mut self, enabled: bool) -> Self {
        self.virtual_properties = enabled;
        self
    }

    pub fn with_show_join_tables(mut self, enabled: bool) -> Self {
        self.show_join_tables = enabled;
        self
    }

    pub fn with_comments(mut self, enabled: bool) -> Self {
        self.comments = enabled;
        self
    }

    pub fn with_collection(mut self, collection: CollectionKind) -> Self {
        self.collection = collection;
        self
    }
}

/// Class declaration and file wrapper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassConfig {
    /// Emit the `using` block
    pub using: bool,
    /// Wrap all classes in this namespace when non-empty
    pub namespace: String,
    pub partial: bool,
    /// Comma-separated base class and interfaces
    pub inherit: String,
}

impl Default for ClassConfig {
    fn default() -> Self {
        Self {
            using: true,
            namespace: String::new(),
            partial: false,
            inherit: String::new(),
        }
    }
}

impl ClassConfig {
    pub fn inherit_list(&self) -> Vec<&str> {
        self.inherit
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Language of the procedure description line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionLocale {
    #[default]
    English,
    Russian,
}

/// Column-name markers for audit and status columns, matched as substrings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditColumns {
    pub created_date: String,
    pub created_user: String,
    pub modified_date: String,
    pub modified_user: String,
    pub state: String,
}

impl Default for AuditColumns {
    fn default() -> Self {
        Self {
            created_date: "CreatedDate".to_string(),
            created_user: "CreatedUser".to_string(),
            modified_date: "ModifiedDate".to_string(),
            modified_user: "ModifiedUser".to_string(),
            state: "State".to_string(),
        }
    }
}

impl AuditColumns {
    fn matches(name: &str, marker: &str) -> bool {
        !marker.is_empty() && name.contains(marker)
    }

    /// Any of the four created/modified markers
    pub fn is_audit(&self, name: &str) -> bool {
        self.is_created_date(name)
            || self.is_created_user(name)
            || self.is_modified_date(name)
            || Self::matches(name, &self.modified_user)
    }

    pub fn is_created_date(&self, name: &str) -> bool {
        Self::matches(name, &self.created_date)
    }

    pub fn is_created_user(&self, name: &str) -> bool {
        Self::matches(name, &self.created_user)
    }

    pub fn is_modified_date(&self, name: &str) -> bool {
        Self::matches(name, &self.modified_date)
    }

    pub fn is_state(&self, name: &str) -> bool {
        Self::matches(name, &self.state)
    }
}

/// Stored-procedure mode settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcedureConfig {
    /// One script per suffix; the variant is picked by `insert` / `update` /
    /// `delete` appearing in the suffix
    pub suffixes: Vec<String>,
    /// Schema of the created procedures; the table's schema when unset
    pub schema: Option<String>,
    pub author: String,
    pub create_date: String,
    pub locale: DescriptionLocale,
    /// Tables with triggers that insert identity rows; these read `@@IDENTITY`
    pub identity_trigger_tables: BTreeSet<String>,
    pub audit: AuditColumns,
}

impl Default for ProcedureConfig {
    fn default() -> Self {
        Self {
            suffixes: vec![
                "InsertSP".to_string(),
                "UpdateSP".to_string(),
                "DeleteSP".to_string(),
            ],
            schema: None,
            author: "Author,,Name".to_string(),
            create_date: "Create Date,,".to_string(),
            locale: DescriptionLocale::default(),
            identity_trigger_tables: BTreeSet::new(),
            audit: AuditColumns::default(),
        }
    }
}

impl ProcedureConfig {
    pub fn with_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_locale(mut self, locale: DescriptionLocale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_identity_trigger_table(mut self, table: impl Into<String>) -> Self {
        self.identity_trigger_tables.insert(table.into());
        self
    }
}

/// Complete configuration of a generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub mode: GenerationMode,
    pub naming: NamingConfig,
    pub casing: CasingConfig,
    pub members: MemberConfig,
    pub comments: CommentConfig,
    pub data_contract: DataContractConfig,
    pub navigation: NavigationConfig,
    pub class: ClassConfig,
    /// One level of indentation
    pub indent: String,
    pub procedures: ProcedureConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            mode: GenerationMode::default(),
            naming: NamingConfig::default(),
            casing: CasingConfig::default(),
            members: MemberConfig::default(),
            comments: CommentConfig::default(),
            data_contract: DataContractConfig::default(),
            navigation: NavigationConfig::default(),
            class: ClassConfig::default(),
            indent: "    ".to_string(),
            procedures: ProcedureConfig::default(),
        }
    }
}

impl GenerationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML configuration
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a `.yaml`, `.yml` or `.json` configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
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
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_naming(mut self, naming: NamingConfig) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_casing(mut self, casing: CasingConfig) -> Self {
        self.casing = casing;
        self
    }

    pub fn with_members(mut self, members: MemberConfig) -> Self {
        self.members = members;
        self
    }

    /// Enable inline column comments
    pub fn with_comments(mut self, enabled: bool) -> Self {
        self.comments.enabled = enabled;
        self
    }

    /// Enable data-contract attributes with the given contract namespace
    pub fn with_data_contract(mut self, namespace: impl Into<String>) -> Self {
        self.data_contract = DataContractConfig {
            enabled: true,
            namespace: namespace.into(),
        };
        self
    }

    pub fn with_navigation(mut self, navigation: NavigationConfig) -> Self {
        self.navigation = navigation;
        self
    }

    pub fn with_class(mut self, class: ClassConfig) -> Self {
        self.class = class;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.class.namespace = namespace.into();
        self
    }

    pub fn with_using(mut self, enabled: bool) -> Self {
        self.class.using = enabled;
        self
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_procedures(mut self, procedures: ProcedureConfig) -> Self {
        self.procedures = procedures;
        self
    }

    pub fn is_stored_procedures(&self) -> bool {
        self.mode == GenerationMode::StoredProcedures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = GenerationConfig::default();
        assert_eq!(config.mode, GenerationMode::Classes);
        assert_eq!(config.indent, "    ");
        assert!(config.members.properties);
        assert!(config.class.using);
        assert!(!config.navigation.enabled);
        assert_eq!(config.naming.default_schema, "dbo");
        assert!(config.procedures.identity_trigger_tables.is_empty());
        assert_eq!(config.procedures.suffixes.len(), 3);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
mode: stored_procedures
navigation:
  enabled: true
  virtual: true
  collection: collection
procedures:
  identity_trigger_tables: [Transactor, Agreement]
  locale: russian
"#;
        let config = GenerationConfig::from_yaml_str(yaml).unwrap();
        assert!(config.is_stored_procedures());
        assert!(config.navigation.enabled);
        assert!(config.navigation.virtual_properties);
        assert_eq!(config.navigation.collection, CollectionKind::Collection);
        assert!(config.procedures.identity_trigger_tables.contains("Agreement"));
        assert_eq!(config.procedures.locale, DescriptionLocale::Russian);
        assert_eq!(config.procedures.audit.state, "State");
        assert_eq!(config.indent, "    ");
    }

    #[test]
    fn test_json_config() {
        let json = r#"{"casing": {"camel_case": true, "word_separator": "_"}, "indent": "\t"}"#;
        let config = GenerationConfig::from_json_str(json).unwrap();
        assert!(config.casing.camel_case);
        assert!(config.casing.splits_words());
        assert_eq!(config.indent, "\t");
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let result = GenerationConfig::from_yaml_str("mode: [not, a, mode]");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_from_file_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "class:\n  namespace: Sca.Model\n  partial: true").unwrap();
        let config = GenerationConfig::from_file(file.path()).unwrap();
        assert_eq!(config.class.namespace, "Sca.Model");
        assert!(config.class.partial);

        let other = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let result = GenerationConfig::from_file(other.path());
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("procedures".parse::<GenerationMode>(), Ok(GenerationMode::StoredProcedures));
        assert_eq!("Classes".parse::<GenerationMode>(), Ok(GenerationMode::Classes));
        assert!("xml".parse::<GenerationMode>().is_err());
    }

    #[test]
    fn test_inherit_list_and_audit_markers() {
        let class = ClassConfig {
            inherit: "EntityBase, IAuditable,".to_string(),
            ..ClassConfig::default()
        };
        assert_eq!(class.inherit_list(), vec!["EntityBase", "IAuditable"]);

        let audit = AuditColumns::default();
        assert!(audit.is_audit("ModifiedUserId"));
        assert!(audit.is_state("CreditState"));
        assert!(!audit.is_audit("Amount"));
    }
}
