//! The serializable customization document.
//!
//! A [`ConfigDocument`] captures everything a user changed about a
//! configuration (visibility, positions, marks, groups, styles, icons,
//! active values, handler assignments and the display parameters), keyed
//! entirely by IRI/URI/name, so it survives re-constructing the
//! configuration against the same ontology. The core only produces and
//! consumes the document; callers choose the on-disk codec (it derives
//! serde both ways).

use serde::{Deserialize, Serialize};

use crate::config::{Configuration, MarkSource};
use crate::error::{Error, Result};
use crate::geom::point;
use crate::handler::PositionHandler;
use crate::style::{Icon, Mark, RelationStyle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionOverrideEntry {
    pub uri: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceMarksEntry {
    pub uri: String,
    pub marks: Vec<MarkSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub name: String,
    pub members: Vec<String>,
    pub mark: Mark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationStyleEntry {
    pub iri: String,
    pub style: RelationStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconEntry {
    pub iri: String,
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveValuesEntry {
    pub iri: String,
    pub descriptors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerAssignmentEntry {
    pub type_iri: String,
    /// Index into [`ConfigDocument::handlers`].
    pub handler: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    pub depth: u32,
    pub max_parallel_relations: u32,
    pub visible_instances: Vec<String>,
    /// The explicitly hidden set, in hide order.
    pub hidden_instances: Vec<String>,
    pub position_overrides: Vec<PositionOverrideEntry>,
    /// Full per-instance mark lists, order preserved (group entries included,
    /// by group name).
    pub marks: Vec<InstanceMarksEntry>,
    pub groups: Vec<GroupEntry>,
    pub relation_styles: Vec<RelationStyleEntry>,
    pub hidden_relation_types: Vec<String>,
    /// Icon per type, `None` meaning "explicitly no icon" (defaults are
    /// re-derived from the icon source at construction, so every type is
    /// listed).
    pub icons: Vec<IconEntry>,
    pub active_values: Vec<ActiveValuesEntry>,
    /// The registered handler list, in registration order.
    pub handlers: Vec<PositionHandler>,
    pub handler_assignments: Vec<HandlerAssignmentEntry>,
}

impl Configuration {
    /// Captures the full customization state as a document.
    pub fn export_document(&self) -> ConfigDocument {
        let descriptor_name =
            |d: usize| self.ontology.descriptor(d).name().to_string();
        ConfigDocument {
            depth: self.depth,
            max_parallel_relations: self.max_parallel_relations,
            visible_instances: self
                .instances
                .iter()
                .filter(|i| i.visible)
                .map(|i| i.uri.clone())
                .collect(),
            hidden_instances: self.hidden_instances().map(str::to_string).collect(),
            position_overrides: self
                .instances
                .iter()
                .filter_map(|i| {
                    i.position_override.map(|p| PositionOverrideEntry {
                        uri: i.uri.clone(),
                        x: p.x,
                        y: p.y,
                    })
                })
                .collect(),
            marks: self
                .instances
                .iter()
                .filter(|i| !i.marks.is_empty())
                .map(|i| InstanceMarksEntry {
                    uri: i.uri.clone(),
                    marks: i.marks.clone(),
                })
                .collect(),
            groups: self
                .groups
                .values()
                .map(|g| GroupEntry {
                    name: g.name.clone(),
                    members: g
                        .members
                        .iter()
                        .map(|&m| self.instances[m].uri.clone())
                        .collect(),
                    mark: g.mark,
                })
                .collect(),
            relation_styles: self
                .relation_types
                .iter()
                .map(|rt| RelationStyleEntry {
                    iri: rt.iri.clone(),
                    style: rt.style,
                })
                .collect(),
            hidden_relation_types: self
                .relation_types
                .iter()
                .filter(|rt| !rt.visible)
                .map(|rt| rt.iri.clone())
                .collect(),
            icons: self
                .types
                .iter()
                .map(|t| IconEntry {
                    iri: t.iri.clone(),
                    icon: t.icon.clone(),
                })
                .collect(),
            active_values: self
                .types
                .iter()
                .map(|t| ActiveValuesEntry {
                    iri: t.iri.clone(),
                    descriptors: t.active_values.iter().copied().map(descriptor_name).collect(),
                })
                .collect(),
            handlers: self.handlers.clone(),
            handler_assignments: self
                .types
                .iter()
                .map(|t| HandlerAssignmentEntry {
                    type_iri: t.iri.clone(),
                    handler: t.handler,
                })
                .collect(),
        }
    }

    /// Applies a document, replacing the customization state wholesale.
    ///
    /// Every identifier in the document is resolved before anything mutates,
    /// so an unknown id rejects the document and leaves the configuration
    /// untouched. Handler assignments go through the same legality gate as
    /// [`Configuration::set_position_handler`]. One full-change notification
    /// fires at the end.
    pub fn apply_document(&mut self, doc: &ConfigDocument) -> Result<()> {
        // Validation pass: resolve everything first.
        for uri in doc
            .visible_instances
            .iter()
            .chain(&doc.hidden_instances)
        {
            self.instance_idx(uri)?;
        }
        for entry in &doc.position_overrides {
            self.instance_idx(&entry.uri)?;
        }
        let group_names: Vec<&str> = doc.groups.iter().map(|g| g.name.as_str()).collect();
        for entry in &doc.marks {
            self.instance_idx(&entry.uri)?;
            for mark in &entry.marks {
                if let MarkSource::Group(name) = mark {
                    if !group_names.contains(&name.as_str()) {
                        return Err(Error::UnknownGroup { name: name.clone() });
                    }
                }
            }
        }
        for group in &doc.groups {
            for uri in &group.members {
                self.instance_idx(uri)?;
            }
        }
        for entry in &doc.relation_styles {
            self.relation_type_idx(&entry.iri)?;
        }
        for iri in &doc.hidden_relation_types {
            self.relation_type_idx(iri)?;
        }
        for entry in &doc.icons {
            self.type_idx(&entry.iri)?;
        }
        let mut active_values: Vec<(usize, Vec<usize>)> = Vec::with_capacity(doc.active_values.len());
        for entry in &doc.active_values {
            let t = self.type_idx(&entry.iri)?;
            let mut descriptors = Vec::with_capacity(entry.descriptors.len());
            for name in &entry.descriptors {
                let d = self.ontology.descriptor_index_of(name).ok_or_else(|| {
                    Error::UnknownValueDescriptor { name: name.clone() }
                })?;
                if !self.types[t].descriptors.contains(&d) {
                    return Err(Error::DescriptorNotInUniverse {
                        type_iri: entry.iri.clone(),
                        name: name.clone(),
                    });
                }
                descriptors.push(d);
            }
            active_values.push((t, descriptors));
        }
        let mut assignments: Vec<(usize, usize)> = Vec::with_capacity(doc.handler_assignments.len());
        for entry in &doc.handler_assignments {
            let t = self.type_idx(&entry.type_iri)?;
            let Some(handler) = doc.handlers.get(entry.handler) else {
                return Err(Error::UnknownHandler {
                    index: entry.handler,
                });
            };
            if !self.handler_legal_for(t, handler.kind) {
                return Err(Error::IllegalHandlerAssignment {
                    kind: handler.kind,
                    type_iri: entry.type_iri.clone(),
                });
            }
            assignments.push((t, entry.handler));
        }

        // Apply pass: start from construction defaults, then layer the
        // document on top.
        self.depth = doc.depth;
        self.max_parallel_relations = doc.max_parallel_relations;
        for inst in &mut self.instances {
            inst.visible = false;
            inst.position_override = None;
            inst.marks.clear();
            inst.groups.clear();
        }
        self.hidden.clear();
        self.groups.clear();
        for t in &mut self.types {
            t.icon = None;
            t.active_values.clear();
            t.handler = 0;
        }
        for rt in &mut self.relation_types {
            rt.style = RelationStyle::default();
            rt.visible = true;
        }

        for uri in &doc.visible_instances {
            let idx = self.instance_idx(uri)?;
            self.instances[idx].visible = true;
        }
        for uri in &doc.hidden_instances {
            let idx = self.instance_idx(uri)?;
            self.hidden.insert(idx);
        }
        for entry in &doc.position_overrides {
            let idx = self.instance_idx(&entry.uri)?;
            self.instances[idx].position_override = Some(point(entry.x, entry.y));
        }
        for entry in &doc.marks {
            let idx = self.instance_idx(&entry.uri)?;
            self.instances[idx].marks = entry.marks.clone();
        }
        for group in &doc.groups {
            let mut members = indexmap::IndexSet::new();
            for uri in &group.members {
                let idx = self.instance_idx(uri)?;
                members.insert(idx);
                self.instances[idx].groups.insert(group.name.clone());
            }
            self.groups.insert(
                group.name.clone(),
                crate::config::Group {
                    name: group.name.clone(),
                    members,
                    mark: group.mark,
                },
            );
        }
        for entry in &doc.relation_styles {
            let t = self.relation_type_idx(&entry.iri)?;
            self.relation_types[t].style = entry.style;
        }
        for iri in &doc.hidden_relation_types {
            let t = self.relation_type_idx(iri)?;
            self.relation_types[t].visible = false;
        }
        for entry in &doc.icons {
            let t = self.type_idx(&entry.iri)?;
            self.types[t].icon = entry.icon.clone();
        }
        for (t, descriptors) in active_values {
            self.types[t].active_values = descriptors.into_iter().collect();
        }
        self.handlers = doc.handlers.clone();
        if self.handlers.is_empty() {
            // Handle 0 must always resolve (it is the construction default).
            self.handlers.push(PositionHandler::stored());
        }
        for (t, handler) in assignments {
            self.types[t].handler = handler;
        }

        self.notify_full();
        Ok(())
    }
}
