//! Per-relation-type and per-relation visualization state.

use crate::style::RelationStyle;

#[derive(Debug, Clone, PartialEq)]
pub struct RelationTypeConfiguration {
    pub(crate) iri: String,
    pub(crate) name: String,
    pub(crate) style: RelationStyle,
    /// Relation types start visible, so a relation appears as soon as both
    /// endpoints are shown.
    pub(crate) visible: bool,
    /// Member relations (handles into the relation arena).
    pub(crate) relations: Vec<usize>,
}

impl RelationTypeConfiguration {
    pub fn iri(&self) -> &str {
        &self.iri
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn style(&self) -> &RelationStyle {
        &self.style
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn relations(&self) -> &[usize] {
        &self.relations
    }
}

/// One directed relation between two instances. Style is read through the
/// parent type; effective visibility requires the type and both endpoints to
/// be visible.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationConfiguration {
    pub(crate) uri: String,
    pub(crate) relation_type: usize,
    pub(crate) origin: usize,
    pub(crate) destination: usize,
}

impl RelationConfiguration {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Handle into the relation-type arena.
    pub fn relation_type(&self) -> usize {
        self.relation_type
    }

    /// Origin instance handle.
    pub fn origin(&self) -> usize {
        self.origin
    }

    /// Destination instance handle.
    pub fn destination(&self) -> usize {
        self.destination
    }
}
