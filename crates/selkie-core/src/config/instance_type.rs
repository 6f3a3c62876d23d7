//! Per-type visualization state.
//!
//! One entry per ontology type, index-aligned with the ontology's type arena.
//! Visibility and value activation are never stored here; both are derived
//! from the member instances on demand (see
//! [`Configuration::type_visibility`] and
//! [`Configuration::value_activation`]).
//!
//! [`Configuration::type_visibility`]: crate::Configuration::type_visibility
//! [`Configuration::value_activation`]: crate::Configuration::value_activation

use indexmap::IndexSet;

use crate::style::Icon;

/// Derived visibility of a type over its transitive members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Every transitive member is visible.
    Yes,
    /// No member is visible (including the zero-member case).
    No,
    /// Some but not all members are visible.
    Partial,
}

/// Derived activation state of one value descriptor over a type's members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueActivation {
    /// Every member displays the descriptor.
    Yes,
    /// No member displays it.
    No,
    /// Some members display it.
    Partial,
    /// The type has no members to aggregate over.
    Indefinite,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceTypeConfiguration {
    /// Stable identity, used for cross-snapshot matching and tie-breaking.
    pub(crate) iri: String,
    pub(crate) name: String,
    /// Handles into the type arena of the owning configuration.
    pub(crate) supertypes: Vec<usize>,
    pub(crate) subtypes: Vec<usize>,
    /// All instances of this type or any subtype (instance handles). Kept
    /// consistent incrementally during construction, never re-scanned.
    pub(crate) members: Vec<usize>,
    /// Instances whose individual lists this type directly.
    pub(crate) direct_members: Vec<usize>,
    /// The value-descriptor universe: descriptors declared on the ontology
    /// type plus everything inherited from ancestors, deduplicated. Fixed at
    /// construction.
    pub(crate) descriptors: Vec<usize>,
    /// The subset of `descriptors` currently selected for display.
    pub(crate) active_values: IndexSet<usize>,
    pub(crate) icon: Option<Icon>,
    /// Construction-time icon, restored by `restore_standard_view`.
    pub(crate) default_icon: Option<Icon>,
    /// Handle into the registered position-handler list.
    pub(crate) handler: usize,
}

impl InstanceTypeConfiguration {
    pub fn iri(&self) -> &str {
        &self.iri
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn supertypes(&self) -> &[usize] {
        &self.supertypes
    }

    pub fn subtypes(&self) -> &[usize] {
        &self.subtypes
    }

    /// Transitive members (instance handles).
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn direct_members(&self) -> &[usize] {
        &self.direct_members
    }

    /// Descriptor universe (indices into the ontology's descriptor arena).
    pub fn descriptors(&self) -> &[usize] {
        &self.descriptors
    }

    pub fn active_values(&self) -> impl Iterator<Item = usize> + '_ {
        self.active_values.iter().copied()
    }

    pub fn icon(&self) -> Option<&Icon> {
        self.icon.as_ref()
    }

    /// Handle of the assigned position handler.
    pub fn handler(&self) -> usize {
        self.handler
    }
}
