//! Navigation property resolution
//!
//! Turns the foreign keys touching a table into navigation properties:
//! outgoing keys give single references to the parent class, incoming keys
//! give collections of the child class, and a hidden many-to-many join table
//! is collapsed into a direct collection of the class on its other side.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::generator::config::GenerationConfig;
use crate::models::{
    DbObjectKind, NavigationDirection, NavigationProperty, ObjectId, SchemaModel, SchemaObject,
};
use crate::naming::NameResolver;

static TRAILING_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)$").unwrap());

/// Derives the navigation properties of the tables of one model
pub struct RelationshipResolver<'a> {
    model: &'a SchemaModel,
    config: &'a GenerationConfig,
    names: NameResolver<'a>,
}

impl<'a> RelationshipResolver<'a> {
    pub fn new(model: &'a SchemaModel, config: &'a GenerationConfig) -> Self {
        Self {
            model,
            config,
            names: NameResolver::new(config),
        }
    }

    /// Only tables get navigation properties, and only when they are enabled
    pub fn is_navigable(&self, object: &SchemaObject) -> bool {
        self.config.navigation.enabled && object.is_table()
    }

    /// Navigation properties of one object, outgoing first, then incoming,
    /// each in column ordinal order, with duplicate names resolved.
    pub fn navigation_properties(&self, id: ObjectId) -> Vec<NavigationProperty> {
        let object = self.model.object(id);
        if !self.is_navigable(object) {
            return Vec::new();
        }
        let columns = object.ordered_columns();
        let mut properties = Vec::new();

        for column in columns.iter().filter(|c| c.has_foreign_keys()) {
            for &fk_id in &column.foreign_keys {
                let fk = self.model.foreign_key(fk_id);
                let class_name = self.class_name(object, &fk.primary_schema, &fk.primary_table);
                properties.push(NavigationProperty::new(
                    fk_id,
                    NavigationDirection::Outgoing,
                    class_name,
                    &fk.foreign_column,
                ));
            }
        }

        let collapse_joins = !self.config.navigation.show_join_tables;
        for column in columns.iter().filter(|c| c.is_referenced()) {
            for &fk_id in &column.referenced_by {
                let fk = self.model.foreign_key(fk_id);
                let partner = fk
                    .join_partner
                    .filter(|_| collapse_joins && fk.is_collapsible_join())
                    .map(|partner| self.model.foreign_key(partner));

                let property = match partner {
                    Some(partner) => NavigationProperty::new(
                        fk_id,
                        NavigationDirection::ManyToMany,
                        self.class_name(object, &partner.primary_schema, &partner.primary_table),
                        &partner.foreign_column,
                    ),
                    None => NavigationProperty::new(
                        fk_id,
                        NavigationDirection::Incoming,
                        self.class_name(object, &fk.foreign_schema, &fk.foreign_table),
                        &fk.foreign_column,
                    ),
                };
                properties.push(property);
            }
        }

        deduplicate(&mut properties);
        debug!(object = %object, count = properties.len(), "navigation properties resolved");
        properties
    }

    /// False for a hidden join table: every one of its navigation properties
    /// is an outgoing half of a complete many-to-many join.
    pub fn should_emit(&self, object: &SchemaObject, properties: &[NavigationProperty]) -> bool {
        if !object.is_table() || self.config.navigation.show_join_tables || properties.is_empty() {
            return true;
        }
        let is_join = properties.iter().all(|p| {
            p.is_outgoing() && self.model.foreign_key(p.foreign_key).is_collapsible_join()
        });
        !is_join
    }

    fn class_name(&self, current: &SchemaObject, schema: &str, table: &str) -> String {
        self.names
            .class_name(&current.database, schema, table, DbObjectKind::Table)
    }
}

/// Make navigation property names unique within one class.
///
/// Names are grouped by their default form in first-seen order. In every
/// group with more than one member, members whose source column ends in
/// digits take those digits (`ManagerId2` -> `Manager2`). Members still
/// colliding after that get a running number, the first one keeping its name.
pub fn deduplicate(properties: &mut [NavigationProperty]) {
    for group in duplicate_groups(properties) {
        for index in group {
            let property = &mut properties[index];
            if let Some(digits) = TRAILING_DIGITS.find(&property.source_column) {
                property.renamed = Some(format!("{}{}", property.display_name(), digits.as_str()));
            }
        }
    }

    for group in duplicate_groups(properties) {
        let mut taken: BTreeSet<String> = properties.iter().map(|p| p.display_name()).collect();
        let base = properties[group[0]].display_name();
        let mut counter = 1;
        for &index in &group[1..] {
            let mut candidate = format!("{}{}", base, counter);
            while taken.contains(&candidate) {
                counter += 1;
                candidate = format!("{}{}", base, counter);
            }
            counter += 1;
            taken.insert(candidate.clone());
            properties[index].renamed = Some(candidate);
        }
    }
}

/// Indices of properties sharing a display name, groups of two or more only,
/// ordered by the first occurrence of each name.
fn duplicate_groups(properties: &[NavigationProperty]) -> Vec<Vec<usize>> {
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    for (index, property) in properties.iter().enumerate() {
        let name = property.display_name();
        match groups.iter_mut().find(|(n, _)| *n == name) {
            Some((_, members)) => members.push(index),
            None => groups.push((name, vec![index])),
        }
    }
    groups
        .into_iter()
        .map(|(_, members)| members)
        .filter(|members| members.len() > 1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::config::NavigationConfig;
    use crate::models::{Column, ForeignKeyId};

    fn property(class_name: &str, single: bool, column: &str) -> NavigationProperty {
        let direction = if single {
            NavigationDirection::Outgoing
        } else {
            NavigationDirection::Incoming
        };
        NavigationProperty::new(ForeignKeyId(0), direction, class_name, column)
    }

    fn names(properties: &[NavigationProperty]) -> Vec<String> {
        properties.iter().map(|p| p.display_name()).collect()
    }

    #[test]
    fn test_trailing_digits_win_over_counter() {
        let mut properties = vec![
            property("Manager", true, "ManagerId"),
            property("Manager", true, "ManagerId2"),
        ];
        deduplicate(&mut properties);
        assert_eq!(names(&properties), vec!["Manager", "Manager2"]);
    }

    #[test]
    fn test_counter_for_remaining_duplicates() {
        let mut properties = vec![
            property("Credit", false, "BorrowerId"),
            property("Transactor", true, "TransactorId"),
            property("Credit", false, "GuarantorId"),
            property("Credit", false, "AgentId"),
        ];
        deduplicate(&mut properties);
        assert_eq!(names(&properties), vec!["Credits", "Transactor", "Credits1", "Credits2"]);
        assert!(properties[0].renamed.is_none());
    }

    #[test]
    fn test_counter_skips_names_in_use() {
        let mut properties = vec![
            property("Manager", true, "ManagerId1"),
            property("Manager", true, "ManagerId"),
            property("Manager", true, "BossId"),
        ];
        deduplicate(&mut properties);
        assert_eq!(names(&properties), vec!["Manager1", "Manager", "Manager2"]);
    }

    #[test]
    fn test_unique_names_untouched() {
        let mut properties = vec![property("Transactor", true, "TransactorId1")];
        deduplicate(&mut properties);
        assert_eq!(names(&properties), vec!["Transactor"]);
    }

    fn credit_model() -> (SchemaModel, ObjectId, ObjectId) {
        let mut builder = SchemaModel::builder();
        let transactor = builder.add_object(
            SchemaObject::table("Rmc", "Sca", "Transactor")
                .with_column(Column::new("Id", "int").primary_key().identity()),
        );
        let credit = builder.add_object(
            SchemaObject::table("Rmc", "Sca", "Credit")
                .with_column(Column::new("Id", "int").primary_key().identity())
                .with_column(Column::new("TransactorId", "int"))
                .with_column(Column::new("timestamp", "timestamp")),
        );
        builder
            .add_foreign_key("FK_Credit_Transactor", credit, "TransactorId", transactor, "Id")
            .unwrap();
        (builder.build(), transactor, credit)
    }

    #[test]
    fn test_outgoing_and_incoming_properties() {
        let (model, transactor, credit) = credit_model();
        let config = GenerationConfig::default().with_navigation(NavigationConfig::enabled());
        let resolver = RelationshipResolver::new(&model, &config);

        let credit_props = resolver.navigation_properties(credit);
        assert_eq!(names(&credit_props), vec!["Transactor"]);
        assert!(credit_props[0].is_single);

        let transactor_props = resolver.navigation_properties(transactor);
        assert_eq!(names(&transactor_props), vec!["Credits"]);
        assert_eq!(transactor_props[0].class_name, "Credit");
        assert!(!transactor_props[0].is_single);
    }

    #[test]
    fn test_navigation_disabled() {
        let (model, _, credit) = credit_model();
        let config = GenerationConfig::default();
        let resolver = RelationshipResolver::new(&model, &config);
        assert!(resolver.navigation_properties(credit).is_empty());
    }

    fn join_model(payload: bool) -> (SchemaModel, [ObjectId; 3]) {
        let mut builder = SchemaModel::builder();
        let student = builder.add_object(
            SchemaObject::table("Db", "dbo", "Student")
                .with_column(Column::new("Id", "int").primary_key()),
        );
        let course = builder.add_object(
            SchemaObject::table("Db", "dbo", "Course")
                .with_column(Column::new("Id", "int").primary_key()),
        );
        let mut join = SchemaObject::table("Db", "dbo", "StudentCourse")
            .with_column(Column::new("StudentId", "int").primary_key())
            .with_column(Column::new("CourseId", "int").primary_key());
        if payload {
            join = join.with_column(Column::new("Grade", "int").nullable());
        }
        let join = builder.add_object(join);
        builder.add_foreign_key("FK_1", join, "StudentId", student, "Id").unwrap();
        builder.add_foreign_key("FK_2", join, "CourseId", course, "Id").unwrap();
        (builder.build(), [student, course, join])
    }

    #[test]
    fn test_many_to_many_collapse() {
        let (model, [student, course, join]) = join_model(false);
        let config = GenerationConfig::default().with_navigation(NavigationConfig::enabled());
        let resolver = RelationshipResolver::new(&model, &config);

        let student_props = resolver.navigation_properties(student);
        assert_eq!(names(&student_props), vec!["Courses"]);
        assert_eq!(student_props[0].direction, NavigationDirection::ManyToMany);
        assert_eq!(names(&resolver.navigation_properties(course)), vec!["Students"]);

        let join_props = resolver.navigation_properties(join);
        assert!(!resolver.should_emit(model.object(join), &join_props));
        assert!(resolver.should_emit(model.object(student), &student_props));
    }

    #[test]
    fn test_join_tables_shown() {
        let (model, [student, _, join]) = join_model(false);
        let config = GenerationConfig::default()
            .with_navigation(NavigationConfig::enabled().with_show_join_tables(true));
        let resolver = RelationshipResolver::new(&model, &config);

        assert_eq!(names(&resolver.navigation_properties(student)), vec!["StudentCourses"]);
        let join_props = resolver.navigation_properties(join);
        assert!(resolver.should_emit(model.object(join), &join_props));
    }

    #[test]
    fn test_join_table_with_payload_is_kept() {
        let (model, [student, _, join]) = join_model(true);
        let config = GenerationConfig::default().with_navigation(NavigationConfig::enabled());
        let resolver = RelationshipResolver::new(&model, &config);

        let student_props = resolver.navigation_properties(student);
        assert_eq!(student_props[0].direction, NavigationDirection::Incoming);
        let join_props = resolver.navigation_properties(join);
        assert!(resolver.should_emit(model.object(join), &join_props));
    }
}
