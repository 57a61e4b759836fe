//! Naming module
//!
//! Derives output identifiers from raw schema names. Class names go through
//! the full pipeline (fixed name, prefix, database and schema segments,
//! singularization, casing, search/replace, suffix); column members only get
//! identifier cleaning and casing.

pub mod inflection;

pub use inflection::{pluralize, singularize};

use convert_case::Boundary;
use regex::{NoExpand, RegexBuilder};

use crate::generator::config::{CasingConfig, GenerationConfig, NamingConfig};
use crate::models::DbObjectKind;

/// Stand-in for an empty name component
pub const PLACEHOLDER_NAME: &str = "???";

pub(crate) const WORD_BOUNDARIES: &[Boundary] = &[
    Boundary::UNDERSCORE,
    Boundary::HYPHEN,
    Boundary::SPACE,
    Boundary::LOWER_UPPER,
    Boundary::ACRONYM,
];

/// Resolves class and member names for one configuration
#[derive(Debug, Clone, Copy)]
pub struct NameResolver<'a> {
    naming: &'a NamingConfig,
    casing: &'a CasingConfig,
}

impl<'a> NameResolver<'a> {
    pub fn new(config: &'a GenerationConfig) -> Self {
        Self::from_parts(&config.naming, &config.casing)
    }

    pub fn from_parts(naming: &'a NamingConfig, casing: &'a CasingConfig) -> Self {
        Self { naming, casing }
    }

    /// Class name of a schema object.
    ///
    /// # Example
    ///
    /// ```rust
    /// use poco_codegen::generator::config::{CasingConfig, NamingConfig};
    /// use poco_codegen::models::DbObjectKind;
    /// use poco_codegen::naming::NameResolver;
    ///
    /// let naming = NamingConfig::default().with_singularize(true).with_suffix("Dto");
    /// let casing = CasingConfig::camel_case();
    /// let resolver = NameResolver::from_parts(&naming, &casing);
    /// assert_eq!(
    ///     resolver.class_name("Rmc", "Sca", "credit_projects", DbObjectKind::Table),
    ///     "CreditProjectDto"
    /// );
    /// ```
    pub fn class_name(
        &self,
        database: &str,
        schema: &str,
        name: &str,
        kind: DbObjectKind,
    ) -> String {
        if let Some(fixed) = self.naming.fixed_name.as_deref().filter(|n| !n.is_empty()) {
            return fixed.to_string();
        }

        let mut class_name = self.naming.prefix.clone();

        if self.naming.include_database {
            class_name.push_str(&self.transform(or_placeholder(database)));
            class_name.push_str(&self.naming.database_separator);
        }

        let default_schema =
            self.naming.ignore_default_schema && schema == self.naming.default_schema;
        if self.naming.include_schema && !default_schema {
            class_name.push_str(&self.transform(or_placeholder(schema)));
            class_name.push_str(&self.naming.schema_separator);
        }

        let name = or_placeholder(name);
        let name = if self.naming.singularize && kind.is_singularizable() {
            singularize(name)
        } else {
            name.to_string()
        };
        class_name.push_str(&self.transform(&name));

        let mut class_name = self.search_replace(class_name);
        class_name.push_str(&self.naming.suffix);
        class_name
    }

    /// Member name of a column
    pub fn member_name(&self, column_name: &str) -> String {
        self.transform(&clean_name(or_placeholder(column_name)))
    }

    /// Casing step shared by every name component
    pub fn transform(&self, name: &str) -> String {
        transform_name(name, self.casing)
    }

    fn search_replace(&self, name: String) -> String {
        let search = &self.naming.search;
        if search.is_empty() {
            return name;
        }
        if !self.naming.search_ignore_case {
            return name.replace(search.as_str(), &self.naming.replace);
        }
        match RegexBuilder::new(&regex::escape(search))
            .case_insensitive(true)
            .build()
        {
            Ok(pattern) => pattern
                .replace_all(&name, NoExpand(&self.naming.replace))
                .into_owned(),
            Err(e) => {
                tracing::warn!(search = %search, error = %e, "search pattern rejected");
                name
            }
        }
    }
}

fn or_placeholder(name: &str) -> &str {
    if name.trim().is_empty() {
        PLACEHOLDER_NAME
    } else {
        name
    }
}

/// Split a name into words at underscores, hyphens, spaces and case changes.
pub fn split_words(name: &str) -> Vec<String> {
    convert_case::split(&name, WORD_BOUNDARIES)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Apply the casing rules to a single name.
///
/// When camel case or a word separator is configured the name is split into
/// words, each word is cased and the words are joined with the separator.
/// Otherwise the whole name is upper-cased, lower-cased or kept.
pub fn transform_name(name: &str, casing: &CasingConfig) -> String {
    if casing.splits_words() {
        return split_words(name)
            .iter()
            .map(|word| {
                if casing.camel_case {
                    capitalize(word)
                } else if casing.upper_case {
                    word.to_uppercase()
                } else if casing.lower_case {
                    word.to_lowercase()
                } else {
                    word.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(&casing.word_separator);
    }
    if casing.upper_case {
        name.to_uppercase()
    } else if casing.lower_case {
        name.to_lowercase()
    } else {
        name.to_string()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str().to_lowercase()),
        None => String::new(),
    }
}

/// Turn a column name into a valid identifier: characters other than letters,
/// digits and `_` become `_`, and a leading digit gets a `_` prefix.
pub fn clean_name(name: &str) -> String {
    let mut cleaned: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        cleaned.insert(0, '_');
    }
    cleaned
}
