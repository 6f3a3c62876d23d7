//! User-defined instance groups.

use indexmap::IndexSet;

use crate::style::Mark;

/// A named set of instances sharing one mark. The name is the group's
/// identity; groups are the one deletable entity in the graph, so instances
/// reference them by name rather than by handle.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub(crate) name: String,
    /// Instance handles. Instances are never deleted, so handles stay valid.
    pub(crate) members: IndexSet<usize>,
    /// The shared mark. Members carry a `MarkSource::Group` entry naming this
    /// group; the mark itself lives here only.
    pub(crate) mark: Mark,
}

impl Group {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn mark(&self) -> &Mark {
        &self.mark
    }
}
