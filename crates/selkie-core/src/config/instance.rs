//! Per-individual visualization state.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::geom::Point;
use crate::style::Mark;

/// One entry in an instance's ordered mark list.
///
/// Group-sourced entries hold the group *name*, not a mark copy: the fold
/// resolves them against the group's current shared mark, so updating a group
/// mark is observed by every member without re-applying anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MarkSource {
    Direct(Mark),
    Group(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceConfiguration {
    /// Stable identity, used for cross-snapshot matching.
    pub(crate) uri: String,
    pub(crate) name: String,
    /// Explicit visibility. Instances start hidden.
    pub(crate) visible: bool,
    /// Direct types plus all their ancestors, sorted by type IRI. The sort
    /// order doubles as the deterministic tie-break for handler selection.
    pub(crate) types: Vec<usize>,
    /// Auto-layout position, written back by a layout pass.
    pub(crate) default_position: Point,
    /// User override; takes precedence over `default_position`.
    pub(crate) position_override: Option<Point>,
    /// Applied marks, most recent last. Later marks override earlier ones
    /// field by field.
    pub(crate) marks: Vec<MarkSource>,
    /// Names of the groups this instance belongs to.
    pub(crate) groups: IndexSet<String>,
    /// Handles of every relation touching this instance, origin or
    /// destination side. Used for notification propagation and handler
    /// computation only; derived state, never serialized.
    pub(crate) relations: Vec<usize>,
}

impl InstanceConfiguration {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Type handles, direct and inherited, sorted by type IRI.
    pub fn types(&self) -> &[usize] {
        &self.types
    }

    /// The position the stored-position handler reports: the user override
    /// when present, the auto-layout default otherwise.
    pub fn stored_position(&self) -> Point {
        self.position_override.unwrap_or(self.default_position)
    }

    pub fn position_override(&self) -> Option<Point> {
        self.position_override
    }

    pub fn default_position(&self) -> Point {
        self.default_position
    }

    pub fn marks(&self) -> &[MarkSource] {
        &self.marks
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(String::as_str)
    }

    pub fn relations(&self) -> &[usize] {
        &self.relations
    }
}
