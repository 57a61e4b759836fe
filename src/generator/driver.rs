//! Traversal driver
//!
//! Generation runs in two phases. [`Generator::analyze`] walks the whole
//! model once and decides, per object, what will be written and which
//! run-wide imports the output needs. [`Generator::emit`] then writes the
//! plan through a [`TokenSink`] in input order.

use tracing::{debug, info};

use crate::generator::class_writer::ClassWriter;
use crate::generator::config::GenerationConfig;
use crate::generator::procedure_writer::ProcedureWriter;
use crate::generator::relationships::RelationshipResolver;
use crate::generator::type_map::requires_spatial_types;
use crate::models::{NavigationProperty, ObjectId, SchemaModel, SchemaObject};
use crate::naming::NameResolver;
use crate::writer::{PlainTextWriter, TokenSink};

/// What happens to one schema object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectAction {
    /// Extraction failed; its causes are written as a comment block
    Error,
    /// Written as a class with these navigation properties
    Class { properties: Vec<NavigationProperty> },
    /// Pure join table hidden behind collapsed many-to-many properties
    Suppressed,
    /// Table written as stored procedure scripts
    Procedures,
    /// Nothing to write in the current mode
    Skipped,
}

/// Decision for one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedObject {
    pub id: ObjectId,
    pub class_name: String,
    pub action: ObjectAction,
}

/// Facts about the whole run needed before the first object is written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunRequirements {
    /// At least one object without an extraction error
    pub has_valid_objects: bool,
    /// Some class has navigation properties
    pub uses_navigation: bool,
    /// Some class has a geography, geometry or hierarchyid column
    pub uses_spatial_types: bool,
    /// Data-contract attributes are written
    pub uses_data_contract: bool,
}

/// Result of the analysis phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationPlan {
    pub requirements: RunRequirements,
    pub objects: Vec<PlannedObject>,
}

impl GenerationPlan {
    pub fn count(&self, predicate: impl Fn(&ObjectAction) -> bool) -> usize {
        self.objects.iter().filter(|o| predicate(&o.action)).count()
    }
}

/// Generates classes or stored procedures for a schema model
pub struct Generator<'a> {
    model: &'a SchemaModel,
    config: &'a GenerationConfig,
}

impl<'a> Generator<'a> {
    pub fn new(model: &'a SchemaModel, config: &'a GenerationConfig) -> Self {
        Self { model, config }
    }

    /// Decide every object's output and the run-wide requirements.
    pub fn analyze(&self) -> GenerationPlan {
        let names = NameResolver::new(self.config);
        let relationships = RelationshipResolver::new(self.model, self.config);
        let procedures = self.config.is_stored_procedures();

        let objects: Vec<PlannedObject> = self
            .model
            .object_ids()
            .map(|id| {
                let object = self.model.object(id);
                let class_name =
                    names.class_name(&object.database, &object.schema, &object.name, object.kind);
                let action = if object.error.is_some() {
                    ObjectAction::Error
                } else if procedures {
                    if object.is_table() {
                        ObjectAction::Procedures
                    } else {
                        ObjectAction::Skipped
                    }
                } else {
                    let properties = relationships.navigation_properties(id);
                    if relationships.should_emit(object, &properties) {
                        ObjectAction::Class { properties }
                    } else {
                        debug!(object = %object, "join table suppressed");
                        ObjectAction::Suppressed
                    }
                };
                PlannedObject {
                    id,
                    class_name,
                    action,
                }
            })
            .collect();

        let classes: Vec<(&SchemaObject, &[NavigationProperty])> = objects
            .iter()
            .filter_map(|planned| match &planned.action {
                ObjectAction::Class { properties } => {
                    Some((self.model.object(planned.id), properties.as_slice()))
                }
                _ => None,
            })
            .collect();

        let requirements = RunRequirements {
            has_valid_objects: self.model.objects().iter().any(|o| o.error.is_none()),
            uses_navigation: classes.iter().any(|(_, properties)| !properties.is_empty()),
            uses_spatial_types: classes.iter().any(|(object, _)| {
                object.columns.iter().any(|c| {
                    requires_spatial_types(&c.data_type_name)
                        || requires_spatial_types(&c.data_type_display)
                })
            }),
            uses_data_contract: self.config.data_contract.enabled && !classes.is_empty(),
        };

        GenerationPlan {
            requirements,
            objects,
        }
    }

    /// Clear `sink`, then analyze and write the whole run.
    pub fn generate(&self, sink: &mut dyn TokenSink) {
        sink.clear();
        let plan = self.analyze();
        self.emit(&plan, sink);
    }

    /// Write a previously computed plan.
    pub fn emit(&self, plan: &GenerationPlan, sink: &mut dyn TokenSink) {
        let wrapped = !self.config.is_stored_procedures() && plan.requirements.has_valid_objects;
        let offset = if wrapped && !self.config.class.namespace.is_empty() {
            self.config.indent.clone()
        } else {
            String::new()
        };

        if wrapped {
            self.write_using(sink, &plan.requirements);
            self.write_namespace_start(sink);
        }

        let classes = ClassWriter::new(self.model, self.config, offset.clone());
        let procedures = ProcedureWriter::new(self.config);
        let variants = procedures.requested_variants();
        let mut first_block = true;

        for planned in &plan.objects {
            let object = self.model.object(planned.id);
            match &planned.action {
                ObjectAction::Error => {
                    separate_block(sink, &mut first_block);
                    write_error(sink, object, &offset);
                }
                ObjectAction::Class { properties } => {
                    separate_block(sink, &mut first_block);
                    debug!(object = %object, class = %planned.class_name, "writing class");
                    classes.write_class(sink, object, &planned.class_name, properties);
                }
                ObjectAction::Procedures => {
                    for (suffix, kind) in &variants {
                        separate_block(sink, &mut first_block);
                        procedures.write_procedure(sink, object, suffix, *kind);
                    }
                }
                ObjectAction::Suppressed | ObjectAction::Skipped => {}
            }
        }

        if wrapped && !self.config.class.namespace.is_empty() {
            sink.write_line("}");
        }

        info!(
            mode = %self.config.mode,
            objects = plan.objects.len(),
            errors = plan.count(|a| matches!(a, ObjectAction::Error)),
            suppressed = plan.count(|a| matches!(a, ObjectAction::Suppressed)),
            "generation finished"
        );
    }

    fn write_using(&self, sink: &mut dyn TokenSink, requirements: &RunRequirements) {
        if !self.config.class.using {
            return;
        }
        let mut imports = vec![" System;"];
        if requirements.uses_navigation {
            imports.push(" System.Collections.Generic;");
        }
        if requirements.uses_spatial_types {
            imports.push(" Microsoft.SqlServer.Types;");
        }
        if requirements.uses_data_contract {
            imports.push(" System.Runtime.Serialization;");
        }
        for import in imports {
            sink.write_keyword("using");
            sink.write_line(import);
        }
        sink.end_line();
    }

    fn write_namespace_start(&self, sink: &mut dyn TokenSink) {
        let namespace = &self.config.class.namespace;
        if namespace.is_empty() {
            return;
        }
        sink.write_keyword("namespace");
        sink.write(" ");
        sink.write_line(namespace);
        sink.write_line("{");
    }
}

/// Blank line between consecutive blocks, never before the first
fn separate_block(sink: &mut dyn TokenSink, first_block: &mut bool) {
    if !*first_block {
        sink.end_line();
    }
    *first_block = false;
}

/// Comment block listing the failure chain of an object, outermost first
pub fn write_error(sink: &mut dyn TokenSink, object: &SchemaObject, offset: &str) {
    let mut lines = vec![
        "/*".to_string(),
        format!("{}.{}.{}", object.database, object.schema, object.name),
    ];
    if let Some(error) = &object.error {
        lines.extend(error.chain().map(|e| e.message.clone()));
    }
    lines.push("*/".to_string());

    for line in lines {
        sink.write(offset);
        sink.write_line_error(&line);
    }
}

/// Run the generator into a plain-text buffer
pub fn generate_to_string(model: &SchemaModel, config: &GenerationConfig) -> String {
    let mut writer = PlainTextWriter::new();
    Generator::new(model, config).generate(&mut writer);
    writer.into_string()
}
