//! The configuration graph: mutable visualization state derived from an
//! immutable ontology.
//!
//! A [`Configuration`] owns flat arenas of per-type, per-instance,
//! per-relation-type and per-relation entries, index-aligned 1:1 with the
//! ontology's arenas (entry `i` mirrors ontology entry `i`). Every
//! cross-reference (supertype/subtype edges, membership lists, relation
//! endpoints, relation back-references) is a `usize` handle into those
//! arenas, so a snapshot is a plain copy of the arenas: handles stay valid,
//! nothing needs re-linking, and the result shares no mutable state with the
//! original. Groups are the one deletable entity and are keyed by name
//! instead of by handle.
//!
//! All mutation is single-writer and synchronous: callers mutate through
//! `&mut self`, listeners are invoked on the calling thread after the change
//! is fully applied, and nothing here is internally thread-safe.

mod group;
mod instance;
mod instance_type;
mod relation;

pub use group::Group;
pub use instance::{InstanceConfiguration, MarkSource};
pub use instance_type::{InstanceTypeConfiguration, ValueActivation, Visibility};
pub use relation::{RelationConfiguration, RelationTypeConfiguration};

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use selkie_ontology::Ontology;

use crate::error::{Error, Result};
use crate::geom::point;
use crate::handler::PositionHandler;
use crate::icon::IconSource;
use crate::notify::ChangeListener;
use crate::style::{Icon, Mark, RelationStyle};

/// Default relation-expansion depth for a fresh configuration.
pub const DEFAULT_RELATION_DEPTH: u32 = 1;
/// Default number of parallel relations displayed between two instances.
pub const DEFAULT_MAX_PARALLEL_RELATIONS: u32 = 1;

pub struct Configuration {
    pub(crate) ontology: Arc<Ontology>,
    pub(crate) depth: u32,
    pub(crate) max_parallel_relations: u32,
    /// Index-aligned with the ontology's type arena.
    pub(crate) types: Vec<InstanceTypeConfiguration>,
    /// The unique type with no supertype.
    pub(crate) root_type: usize,
    /// Index-aligned with the ontology's individual arena.
    pub(crate) instances: Vec<InstanceConfiguration>,
    /// Instances the user hid individually via [`Configuration::hide_instance`],
    /// as opposed to instances that are merely not shown yet.
    pub(crate) hidden: IndexSet<usize>,
    /// Index-aligned with the ontology's relation-kind arena.
    pub(crate) relation_types: Vec<RelationTypeConfiguration>,
    /// Index-aligned with the ontology's relation arena.
    pub(crate) relations: Vec<RelationConfiguration>,
    pub(crate) groups: IndexMap<String, Group>,
    pub(crate) handlers: Vec<PositionHandler>,
    /// Not part of the model state: never cloned, never compared.
    pub(crate) listeners: Vec<Box<dyn ChangeListener>>,
}

impl std::fmt::Debug for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configuration")
            .field("depth", &self.depth)
            .field("max_parallel_relations", &self.max_parallel_relations)
            .field("types", &self.types.len())
            .field("instances", &self.instances.len())
            .field("relation_types", &self.relation_types.len())
            .field("relations", &self.relations.len())
            .field("groups", &self.groups.len())
            .field("handlers", &self.handlers.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// A snapshot: a full independent copy of the model state. The ontology
/// (immutable) is shared; the listener list stays with the live
/// configuration, a snapshot starts with none.
impl Clone for Configuration {
    fn clone(&self) -> Self {
        tracing::trace!(
            instances = self.instances.len(),
            relations = self.relations.len(),
            "cloning configuration snapshot"
        );
        Self {
            ontology: Arc::clone(&self.ontology),
            depth: self.depth,
            max_parallel_relations: self.max_parallel_relations,
            types: self.types.clone(),
            root_type: self.root_type,
            instances: self.instances.clone(),
            hidden: self.hidden.clone(),
            relation_types: self.relation_types.clone(),
            relations: self.relations.clone(),
            groups: self.groups.clone(),
            handlers: self.handlers.clone(),
            listeners: Vec::new(),
        }
    }
}

/// Model-state equality. Listeners are ignored; the ontology is compared by
/// identity (two configurations over distinct ontology instances are never
/// equal, even if structurally alike).
impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.ontology, &other.ontology)
            && self.depth == other.depth
            && self.max_parallel_relations == other.max_parallel_relations
            && self.root_type == other.root_type
            && self.types == other.types
            && self.instances == other.instances
            && self.hidden == other.hidden
            && self.relation_types == other.relation_types
            && self.relations == other.relations
            && self.groups == other.groups
            && self.handlers == other.handlers
    }
}

impl Configuration {
    /// Builds the full configuration fan-out from an ontology: one type entry
    /// per ontology type with the hierarchy wired bidirectionally, one
    /// instance entry per individual registered as a member of its direct
    /// types *and every ancestor thereof*, one relation-type/relation entry
    /// per ontology counterpart with endpoint back-references, the default
    /// stored-position handler assigned to every type, and best-effort
    /// default icons.
    ///
    /// Fails only on a malformed hierarchy: the supertype DAG must have
    /// exactly one root.
    pub fn new(ontology: Arc<Ontology>, icons: Option<&dyn IconSource>) -> Result<Self> {
        let roots = ontology.root_types();
        let root_type = match roots.as_slice() {
            [] => return Err(Error::NoRootType),
            [root] => *root,
            many => {
                return Err(Error::MultipleRootTypes {
                    iris: many
                        .iter()
                        .map(|&i| ontology.type_def(i).iri().to_string())
                        .collect(),
                });
            }
        };

        let mut types: Vec<InstanceTypeConfiguration> = Vec::with_capacity(ontology.type_count());
        for (i, def) in ontology.types().enumerate() {
            // Descriptor universe: declared on the type plus inherited from
            // every ancestor, deduplicated, declaration order first.
            let mut descriptors: Vec<usize> = Vec::new();
            for &d in def.descriptors() {
                if !descriptors.contains(&d) {
                    descriptors.push(d);
                }
            }
            for a in ontology.ancestors_of(i) {
                for &d in ontology.type_def(a).descriptors() {
                    if !descriptors.contains(&d) {
                        descriptors.push(d);
                    }
                }
            }
            let active_values: IndexSet<usize> = descriptors.iter().copied().collect();
            let icon = icons.and_then(|s| s.default_icon(def.iri()).ok());
            types.push(InstanceTypeConfiguration {
                iri: def.iri().to_string(),
                name: def.name().to_string(),
                supertypes: def.supertypes().to_vec(),
                subtypes: Vec::new(),
                members: Vec::new(),
                direct_members: Vec::new(),
                descriptors,
                active_values,
                default_icon: icon.clone(),
                icon,
                handler: 0,
            });
        }
        for i in 0..types.len() {
            let supertypes = types[i].supertypes.clone();
            for s in supertypes {
                types[s].subtypes.push(i);
            }
        }

        let mut instances: Vec<InstanceConfiguration> =
            Vec::with_capacity(ontology.individual_count());
        for (i, ind) in ontology.individuals().enumerate() {
            // Type closure: direct types plus all ancestors, deduplicated.
            let mut seen = vec![false; types.len()];
            let mut closure: Vec<usize> = Vec::new();
            for &t in ind.types() {
                if !seen[t] {
                    seen[t] = true;
                    closure.push(t);
                }
                for a in ontology.ancestors_of(t) {
                    if !seen[a] {
                        seen[a] = true;
                        closure.push(a);
                    }
                }
            }
            // Sorted by IRI: the stored order doubles as the deterministic
            // tie-break for handler selection.
            closure.sort_by(|&a, &b| types[a].iri.cmp(&types[b].iri));
            for &t in &closure {
                types[t].members.push(i);
            }
            for &t in ind.types() {
                if !types[t].direct_members.contains(&i) {
                    types[t].direct_members.push(i);
                }
            }
            instances.push(InstanceConfiguration {
                uri: ind.uri().to_string(),
                name: ind.name().to_string(),
                visible: false,
                types: closure,
                default_position: point(0.0, 0.0),
                position_override: None,
                marks: Vec::new(),
                groups: IndexSet::new(),
                relations: Vec::new(),
            });
        }

        let mut relation_types: Vec<RelationTypeConfiguration> = ontology
            .relation_kinds()
            .map(|k| RelationTypeConfiguration {
                iri: k.iri().to_string(),
                name: k.name().to_string(),
                style: RelationStyle::default(),
                visible: true,
                relations: Vec::new(),
            })
            .collect();
        let mut relations: Vec<RelationConfiguration> =
            Vec::with_capacity(ontology.relation_count());
        for (i, rel) in ontology.relations().enumerate() {
            relation_types[rel.kind()].relations.push(i);
            instances[rel.origin()].relations.push(i);
            if rel.destination() != rel.origin() {
                instances[rel.destination()].relations.push(i);
            }
            relations.push(RelationConfiguration {
                uri: rel.uri().to_string(),
                relation_type: rel.kind(),
                origin: rel.origin(),
                destination: rel.destination(),
            });
        }

        // Index alignment with the ontology arenas is the load-bearing
        // invariant behind every handle in this module.
        debug_assert_eq!(types.len(), ontology.type_count());
        debug_assert_eq!(instances.len(), ontology.individual_count());
        debug_assert_eq!(relations.len(), ontology.relation_count());

        tracing::debug!(
            types = types.len(),
            instances = instances.len(),
            relations = relations.len(),
            "configuration constructed"
        );

        Ok(Self {
            ontology,
            depth: DEFAULT_RELATION_DEPTH,
            max_parallel_relations: DEFAULT_MAX_PARALLEL_RELATIONS,
            types,
            root_type,
            instances,
            hidden: IndexSet::new(),
            relation_types,
            relations,
            groups: IndexMap::new(),
            handlers: vec![PositionHandler::stored()],
            listeners: Vec::new(),
        })
    }

    // ------------------------------------------------------------------
    // Lookup helpers
    // ------------------------------------------------------------------

    pub(crate) fn type_idx(&self, iri: &str) -> Result<usize> {
        self.ontology
            .type_index_of(iri)
            .ok_or_else(|| Error::UnknownType {
                iri: iri.to_string(),
            })
    }

    pub(crate) fn instance_idx(&self, uri: &str) -> Result<usize> {
        self.ontology
            .individual_index_of(uri)
            .ok_or_else(|| Error::UnknownInstance {
                uri: uri.to_string(),
            })
    }

    pub(crate) fn relation_type_idx(&self, iri: &str) -> Result<usize> {
        self.ontology
            .relation_kind_index_of(iri)
            .ok_or_else(|| Error::UnknownRelationType {
                iri: iri.to_string(),
            })
    }

    pub(crate) fn relation_idx(&self, uri: &str) -> Result<usize> {
        self.ontology
            .relation_index_of(uri)
            .ok_or_else(|| Error::UnknownRelation {
                uri: uri.to_string(),
            })
    }

    // ------------------------------------------------------------------
    // Read API
    // ------------------------------------------------------------------

    pub fn ontology(&self) -> &Arc<Ontology> {
        &self.ontology
    }

    pub fn relation_depth(&self) -> u32 {
        self.depth
    }

    pub fn max_parallel_relations(&self) -> u32 {
        self.max_parallel_relations
    }

    pub fn instance_type(&self, iri: &str) -> Result<&InstanceTypeConfiguration> {
        Ok(&self.types[self.type_idx(iri)?])
    }

    pub fn instance(&self, uri: &str) -> Result<&InstanceConfiguration> {
        Ok(&self.instances[self.instance_idx(uri)?])
    }

    pub fn relation_type(&self, iri: &str) -> Result<&RelationTypeConfiguration> {
        Ok(&self.relation_types[self.relation_type_idx(iri)?])
    }

    pub fn relation(&self, uri: &str) -> Result<&RelationConfiguration> {
        Ok(&self.relations[self.relation_idx(uri)?])
    }

    pub fn group(&self, name: &str) -> Result<&Group> {
        self.groups.get(name).ok_or_else(|| Error::UnknownGroup {
            name: name.to_string(),
        })
    }

    pub fn instance_types(&self) -> impl Iterator<Item = &InstanceTypeConfiguration> {
        self.types.iter()
    }

    pub fn instances(&self) -> impl Iterator<Item = &InstanceConfiguration> {
        self.instances.iter()
    }

    pub fn relation_types(&self) -> impl Iterator<Item = &RelationTypeConfiguration> {
        self.relation_types.iter()
    }

    pub fn relations(&self) -> impl Iterator<Item = &RelationConfiguration> {
        self.relations.iter()
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    /// Arena accessors for handle-valued fields (members, endpoints, ...).
    pub fn type_entry(&self, handle: usize) -> &InstanceTypeConfiguration {
        &self.types[handle]
    }

    pub fn instance_entry(&self, handle: usize) -> &InstanceConfiguration {
        &self.instances[handle]
    }

    pub fn relation_type_entry(&self, handle: usize) -> &RelationTypeConfiguration {
        &self.relation_types[handle]
    }

    pub fn relation_entry(&self, handle: usize) -> &RelationConfiguration {
        &self.relations[handle]
    }

    pub fn root_type(&self) -> &InstanceTypeConfiguration {
        &self.types[self.root_type]
    }

    pub fn handlers(&self) -> &[PositionHandler] {
        &self.handlers
    }

    pub fn is_instance_visible(&self, uri: &str) -> Result<bool> {
        Ok(self.instances[self.instance_idx(uri)?].visible)
    }

    /// URIs of the instances hidden individually, in hide order.
    pub fn hidden_instances(&self) -> impl Iterator<Item = &str> {
        self.hidden.iter().map(|&i| self.instances[i].uri.as_str())
    }

    /// Derived type visibility over the transitive members (§ of the model:
    /// never stored). A member-less type reports `No`.
    pub fn type_visibility(&self, iri: &str) -> Result<Visibility> {
        let t = self.type_idx(iri)?;
        let members = &self.types[t].members;
        let visible = members
            .iter()
            .filter(|&&m| self.instances[m].visible)
            .count();
        Ok(if members.is_empty() || visible == 0 {
            Visibility::No
        } else if visible == members.len() {
            Visibility::Yes
        } else {
            Visibility::Partial
        })
    }

    /// A relation renders iff its type is visible and both endpoints are.
    pub fn is_relation_visible(&self, uri: &str) -> Result<bool> {
        let rel = &self.relations[self.relation_idx(uri)?];
        Ok(self.relation_types[rel.relation_type].visible
            && self.instances[rel.origin].visible
            && self.instances[rel.destination].visible)
    }

    /// The style a relation renders with (read through its parent type).
    pub fn relation_style(&self, uri: &str) -> Result<&RelationStyle> {
        let rel = &self.relations[self.relation_idx(uri)?];
        Ok(&self.relation_types[rel.relation_type].style)
    }

    /// Folds the instance's mark list left to right: each later mark
    /// overrides the fields it specifies. Group entries resolve against the
    /// group's current shared mark.
    pub fn effective_mark(&self, uri: &str) -> Result<Mark> {
        let inst = &self.instances[self.instance_idx(uri)?];
        let mut acc = Mark::default();
        for source in &inst.marks {
            match source {
                MarkSource::Direct(mark) => acc.apply(mark),
                // A group entry always resolves; a miss would be a
                // membership bookkeeping bug, treated as an empty mark.
                MarkSource::Group(name) => {
                    if let Some(group) = self.groups.get(name) {
                        acc.apply(&group.mark);
                    }
                }
            }
        }
        Ok(acc)
    }

    /// Whether an instance displays a given descriptor: true iff any of its
    /// type configurations has that descriptor active.
    pub fn instance_displays_value(&self, uri: &str, descriptor_name: &str) -> Result<bool> {
        let inst = &self.instances[self.instance_idx(uri)?];
        let d = self.descriptor_idx(descriptor_name)?;
        Ok(inst
            .types
            .iter()
            .any(|&t| self.types[t].active_values.contains(&d)))
    }

    /// Derived activation state of one descriptor over a type's transitive
    /// members. `Indefinite` when the type has no members.
    pub fn value_activation(&self, type_iri: &str, descriptor_name: &str) -> Result<ValueActivation> {
        let t = self.type_idx(type_iri)?;
        let d = self.descriptor_in_universe(t, descriptor_name)?;
        let members = &self.types[t].members;
        if members.is_empty() {
            return Ok(ValueActivation::Indefinite);
        }
        let displaying = members
            .iter()
            .filter(|&&m| {
                self.instances[m]
                    .types
                    .iter()
                    .any(|&mt| self.types[mt].active_values.contains(&d))
            })
            .count();
        Ok(if displaying == 0 {
            ValueActivation::No
        } else if displaying == members.len() {
            ValueActivation::Yes
        } else {
            ValueActivation::Partial
        })
    }

    fn descriptor_idx(&self, name: &str) -> Result<usize> {
        self.ontology
            .descriptor_index_of(name)
            .ok_or_else(|| Error::UnknownValueDescriptor {
                name: name.to_string(),
            })
    }

    fn descriptor_in_universe(&self, type_handle: usize, name: &str) -> Result<usize> {
        let d = self.descriptor_idx(name)?;
        if !self.types[type_handle].descriptors.contains(&d) {
            return Err(Error::DescriptorNotInUniverse {
                type_iri: self.types[type_handle].iri.clone(),
                name: name.to_string(),
            });
        }
        Ok(d)
    }

    // ------------------------------------------------------------------
    // Notification plumbing
    // ------------------------------------------------------------------

    pub fn add_listener(&mut self, listener: Box<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn notify_full(&self) {
        for listener in &self.listeners {
            listener.on_full_change();
        }
    }

    pub(crate) fn notify_instance(&self, handle: usize) {
        for listener in &self.listeners {
            listener.on_instance_change(&self.instances[handle].uri);
        }
    }

    pub(crate) fn notify_relation(&self, handle: usize) {
        for listener in &self.listeners {
            listener.on_relation_change(&self.relations[handle].uri);
        }
    }

    /// Relations touching `handle` whose effective visibility flips together
    /// with that instance: the type is visible and the other endpoint is.
    fn flipping_relations(&self, handle: usize) -> Vec<usize> {
        self.instances[handle]
            .relations
            .iter()
            .copied()
            .filter(|&r| {
                let rel = &self.relations[r];
                let other = if rel.origin == handle {
                    rel.destination
                } else {
                    rel.origin
                };
                self.relation_types[rel.relation_type].visible
                    && (other == handle || self.instances[other].visible)
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Visibility
    // ------------------------------------------------------------------

    pub fn show_instance(&mut self, uri: &str) -> Result<()> {
        let idx = self.instance_idx(uri)?;
        if self.instances[idx].visible {
            return Ok(());
        }
        self.instances[idx].visible = true;
        self.hidden.shift_remove(&idx);
        let flipped = self.flipping_relations(idx);
        self.notify_instance(idx);
        for r in flipped {
            self.notify_relation(r);
        }
        Ok(())
    }

    pub fn hide_instance(&mut self, uri: &str) -> Result<()> {
        let idx = self.instance_idx(uri)?;
        if !self.instances[idx].visible {
            return Ok(());
        }
        // Relations visible up to now flip off with this endpoint.
        let flipped = self.flipping_relations(idx);
        self.instances[idx].visible = false;
        self.hidden.insert(idx);
        self.notify_instance(idx);
        for r in flipped {
            self.notify_relation(r);
        }
        Ok(())
    }

    /// Forces every transitive member visible; afterwards the type's derived
    /// visibility is exactly `Yes`. Fires one full-change notification when
    /// anything flipped.
    pub fn show_instance_type(&mut self, iri: &str) -> Result<()> {
        let t = self.type_idx(iri)?;
        let to_flip: Vec<usize> = self.types[t]
            .members
            .iter()
            .copied()
            .filter(|&m| !self.instances[m].visible)
            .collect();
        if to_flip.is_empty() {
            return Ok(());
        }
        for m in to_flip {
            self.instances[m].visible = true;
            self.hidden.shift_remove(&m);
        }
        self.notify_full();
        Ok(())
    }

    /// Forces every transitive member hidden; derived visibility becomes
    /// exactly `No`.
    pub fn hide_instance_type(&mut self, iri: &str) -> Result<()> {
        let t = self.type_idx(iri)?;
        let to_flip: Vec<usize> = self.types[t]
            .members
            .iter()
            .copied()
            .filter(|&m| self.instances[m].visible)
            .collect();
        if to_flip.is_empty() {
            return Ok(());
        }
        for m in to_flip {
            self.instances[m].visible = false;
        }
        self.notify_full();
        Ok(())
    }

    pub fn show_group(&mut self, name: &str) -> Result<()> {
        self.set_group_visibility(name, true)
    }

    pub fn hide_group(&mut self, name: &str) -> Result<()> {
        self.set_group_visibility(name, false)
    }

    fn set_group_visibility(&mut self, name: &str, visible: bool) -> Result<()> {
        let members: Vec<usize> = self.group(name)?.members().collect();
        // Apply first, recording relation flips at flip time so relations
        // between two group members fire once, when their second endpoint
        // changes.
        let mut events: Vec<(usize, Vec<usize>)> = Vec::new();
        for m in members {
            if self.instances[m].visible == visible {
                continue;
            }
            let flipped = if visible {
                self.instances[m].visible = true;
                self.hidden.shift_remove(&m);
                self.flipping_relations(m)
            } else {
                let f = self.flipping_relations(m);
                self.instances[m].visible = false;
                f
            };
            events.push((m, flipped));
        }
        for (m, flipped) in events {
            self.notify_instance(m);
            for r in flipped {
                self.notify_relation(r);
            }
        }
        Ok(())
    }

    pub fn show_relation_type(&mut self, iri: &str) -> Result<()> {
        self.set_relation_type_visibility(iri, true)
    }

    pub fn hide_relation_type(&mut self, iri: &str) -> Result<()> {
        self.set_relation_type_visibility(iri, false)
    }

    fn set_relation_type_visibility(&mut self, iri: &str, visible: bool) -> Result<()> {
        let t = self.relation_type_idx(iri)?;
        if self.relation_types[t].visible == visible {
            return Ok(());
        }
        self.relation_types[t].visible = visible;
        let members = self.relation_types[t].relations.clone();
        for r in members {
            self.notify_relation(r);
        }
        Ok(())
    }

    pub fn show_all_relations(&mut self) -> Result<()> {
        self.set_all_relations_visibility(true)
    }

    pub fn hide_all_relations(&mut self) -> Result<()> {
        self.set_all_relations_visibility(false)
    }

    fn set_all_relations_visibility(&mut self, visible: bool) -> Result<()> {
        let mut changed = false;
        for rt in &mut self.relation_types {
            if rt.visible != visible {
                rt.visible = visible;
                changed = true;
            }
        }
        if changed {
            self.notify_full();
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Styling
    // ------------------------------------------------------------------

    /// Merges the present fields of `style` into the type's style.
    pub fn set_relation_type_style(&mut self, iri: &str, style: RelationStyle) -> Result<()> {
        let t = self.relation_type_idx(iri)?;
        let mut merged = self.relation_types[t].style;
        merged.merge(&style);
        if merged == self.relation_types[t].style {
            return Ok(());
        }
        self.relation_types[t].style = merged;
        let members = self.relation_types[t].relations.clone();
        for r in members {
            self.notify_relation(r);
        }
        Ok(())
    }

    pub fn set_instance_type_icon(&mut self, iri: &str, icon: Option<Icon>) -> Result<()> {
        let t = self.type_idx(iri)?;
        if self.types[t].icon == icon {
            return Ok(());
        }
        self.types[t].icon = icon;
        let members = self.types[t].members.clone();
        for m in members {
            self.notify_instance(m);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Marking
    // ------------------------------------------------------------------

    /// Appends `mark` as the most recently applied mark. A mark already in
    /// the list is moved to the end, not duplicated; re-applying the trailing
    /// mark is a no-op.
    pub fn mark_instance(&mut self, uri: &str, mark: Mark) -> Result<()> {
        let idx = self.instance_idx(uri)?;
        let entry = MarkSource::Direct(mark);
        if self.instances[idx].marks.last() == Some(&entry) {
            return Ok(());
        }
        self.instances[idx].marks.retain(|m| *m != entry);
        self.instances[idx].marks.push(entry);
        self.notify_instance(idx);
        Ok(())
    }

    pub fn unmark_instance(&mut self, uri: &str, mark: Mark) -> Result<()> {
        let idx = self.instance_idx(uri)?;
        let entry = MarkSource::Direct(mark);
        let before = self.instances[idx].marks.len();
        self.instances[idx].marks.retain(|m| *m != entry);
        if self.instances[idx].marks.len() != before {
            self.notify_instance(idx);
        }
        Ok(())
    }

    /// Removes every mark, group-sourced ones included, and always fires an
    /// instance notification: the position "touch" that forces a repaint
    /// even when the list was already empty.
    pub fn clear_instance(&mut self, uri: &str) -> Result<()> {
        let idx = self.instance_idx(uri)?;
        self.instances[idx].marks.clear();
        self.notify_instance(idx);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Grouping
    // ------------------------------------------------------------------

    /// Creates a group with the given members and an empty shared mark. All
    /// URIs are resolved before anything mutates.
    pub fn create_group(&mut self, name: &str, member_uris: &[&str]) -> Result<()> {
        if self.groups.contains_key(name) {
            return Err(Error::DuplicateGroup {
                name: name.to_string(),
            });
        }
        let mut members: IndexSet<usize> = IndexSet::new();
        for uri in member_uris {
            members.insert(self.instance_idx(uri)?);
        }
        for &m in &members {
            self.instances[m].groups.insert(name.to_string());
            self.instances[m]
                .marks
                .push(MarkSource::Group(name.to_string()));
        }
        self.groups.insert(
            name.to_string(),
            Group {
                name: name.to_string(),
                members: members.clone(),
                mark: Mark::default(),
            },
        );
        for m in members {
            self.notify_instance(m);
        }
        Ok(())
    }

    /// Removes the group entirely. Member marks are cleared while membership
    /// is still intact, then the membership itself.
    pub fn delete_group(&mut self, name: &str) -> Result<()> {
        let members: Vec<usize> = self.group(name)?.members().collect();
        for &m in &members {
            self.instances[m]
                .marks
                .retain(|s| *s != MarkSource::Group(name.to_string()));
            self.instances[m].groups.shift_remove(name);
        }
        self.groups.shift_remove(name);
        for m in members {
            self.notify_instance(m);
        }
        Ok(())
    }

    /// Empties the group but keeps the group object alive with a fresh
    /// default mark.
    pub fn clear_group(&mut self, name: &str) -> Result<()> {
        let members: Vec<usize> = self.group(name)?.members().collect();
        for &m in &members {
            self.instances[m]
                .marks
                .retain(|s| *s != MarkSource::Group(name.to_string()));
            self.instances[m].groups.shift_remove(name);
        }
        let group = self.groups.get_mut(name).ok_or_else(|| Error::UnknownGroup {
            name: name.to_string(),
        })?;
        group.members.clear();
        group.mark = Mark::default();
        for m in members {
            self.notify_instance(m);
        }
        Ok(())
    }

    pub fn add_to_group(&mut self, name: &str, uri: &str) -> Result<()> {
        let idx = self.instance_idx(uri)?;
        let group = self.groups.get_mut(name).ok_or_else(|| Error::UnknownGroup {
            name: name.to_string(),
        })?;
        if !group.members.insert(idx) {
            return Ok(());
        }
        self.instances[idx].groups.insert(name.to_string());
        self.instances[idx]
            .marks
            .push(MarkSource::Group(name.to_string()));
        self.notify_instance(idx);
        Ok(())
    }

    pub fn remove_from_group(&mut self, name: &str, uri: &str) -> Result<()> {
        let idx = self.instance_idx(uri)?;
        let group = self.groups.get_mut(name).ok_or_else(|| Error::UnknownGroup {
            name: name.to_string(),
        })?;
        if !group.members.shift_remove(&idx) {
            return Ok(());
        }
        self.instances[idx].groups.shift_remove(name);
        self.instances[idx]
            .marks
            .retain(|s| *s != MarkSource::Group(name.to_string()));
        self.notify_instance(idx);
        Ok(())
    }

    /// Merges the present fields of `mark` into the group's shared mark and
    /// re-applies it to every member: the group entry moves to the end of
    /// each member's mark list, so it becomes the most recently applied layer
    /// while later direct marks keep composing on top of it.
    pub fn set_group_mark(&mut self, name: &str, mark: Mark) -> Result<()> {
        let group = self.groups.get_mut(name).ok_or_else(|| Error::UnknownGroup {
            name: name.to_string(),
        })?;
        group.mark.apply(&mark);
        let members: Vec<usize> = group.members.iter().copied().collect();
        let entry = MarkSource::Group(name.to_string());
        for &m in &members {
            self.instances[m].marks.retain(|s| *s != entry);
            self.instances[m].marks.push(entry.clone());
        }
        for m in members {
            self.notify_instance(m);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Value selection
    // ------------------------------------------------------------------

    pub fn activate_value(&mut self, type_iri: &str, descriptor_name: &str) -> Result<()> {
        let t = self.type_idx(type_iri)?;
        let d = self.descriptor_in_universe(t, descriptor_name)?;
        if !self.types[t].active_values.insert(d) {
            return Ok(());
        }
        let members = self.types[t].members.clone();
        for m in members {
            self.notify_instance(m);
        }
        Ok(())
    }

    pub fn deactivate_value(&mut self, type_iri: &str, descriptor_name: &str) -> Result<()> {
        let t = self.type_idx(type_iri)?;
        let d = self.descriptor_in_universe(t, descriptor_name)?;
        if !self.types[t].active_values.shift_remove(&d) {
            return Ok(());
        }
        let members = self.types[t].members.clone();
        for m in members {
            self.notify_instance(m);
        }
        Ok(())
    }

    pub fn activate_all_values(&mut self, type_iri: &str) -> Result<()> {
        let t = self.type_idx(type_iri)?;
        if self.types[t].active_values.len() == self.types[t].descriptors.len() {
            return Ok(());
        }
        let all: IndexSet<usize> = self.types[t].descriptors.iter().copied().collect();
        self.types[t].active_values = all;
        let members = self.types[t].members.clone();
        for m in members {
            self.notify_instance(m);
        }
        Ok(())
    }

    pub fn deactivate_all_values(&mut self, type_iri: &str) -> Result<()> {
        let t = self.type_idx(type_iri)?;
        if self.types[t].active_values.is_empty() {
            return Ok(());
        }
        self.types[t].active_values.clear();
        let members = self.types[t].members.clone();
        for m in members {
            self.notify_instance(m);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    /// Sets the user position override.
    pub fn move_instance_to(&mut self, uri: &str, x: f64, y: f64) -> Result<()> {
        let idx = self.instance_idx(uri)?;
        let target = Some(point(x, y));
        if self.instances[idx].position_override == target {
            return Ok(());
        }
        self.instances[idx].position_override = target;
        self.notify_instance(idx);
        Ok(())
    }

    /// Write-back seam for an automatic layout pass: sets the default
    /// (auto-layout) position, leaving any user override in place. Layout may
    /// run on a worker thread, but this call must be marshaled back onto the
    /// model thread like every other mutation.
    pub fn set_default_position(&mut self, uri: &str, x: f64, y: f64) -> Result<()> {
        let idx = self.instance_idx(uri)?;
        let target = point(x, y);
        if self.instances[idx].default_position == target {
            return Ok(());
        }
        self.instances[idx].default_position = target;
        self.notify_instance(idx);
        Ok(())
    }

    pub fn set_relation_depth(&mut self, depth: i32) -> Result<()> {
        if depth < 0 {
            return Err(Error::NegativeDepth { value: depth });
        }
        let depth = depth as u32;
        if self.depth == depth {
            return Ok(());
        }
        self.depth = depth;
        self.notify_full();
        Ok(())
    }

    pub fn set_max_parallel_relations(&mut self, count: i32) -> Result<()> {
        if count < 1 {
            return Err(Error::NonPositiveParallelRelations { value: count });
        }
        let count = count as u32;
        if self.max_parallel_relations == count {
            return Ok(());
        }
        self.max_parallel_relations = count;
        self.notify_full();
        Ok(())
    }

    /// Hides everything, drops all position overrides and clears the
    /// explicit-hidden set. Always fires a full change.
    pub fn restore_standard_alignment(&mut self) {
        for inst in &mut self.instances {
            inst.visible = false;
            inst.position_override = None;
        }
        self.hidden.clear();
        self.notify_full();
    }

    /// Resets marks, groups, icons, relation styles and active values back
    /// to construction defaults. Visibility and positions are untouched (see
    /// [`Configuration::restore_standard_alignment`]). Always fires a full
    /// change.
    pub fn restore_standard_view(&mut self) {
        for inst in &mut self.instances {
            inst.marks.clear();
            inst.groups.clear();
        }
        self.groups.clear();
        for t in &mut self.types {
            t.icon = t.default_icon.clone();
            t.active_values = t.descriptors.iter().copied().collect();
        }
        for rt in &mut self.relation_types {
            rt.style = RelationStyle::default();
        }
        self.notify_full();
    }
}
