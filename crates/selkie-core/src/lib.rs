#![forbid(unsafe_code)]

//! Mutable visualization-state graph over an immutable ontology.
//!
//! A [`Configuration`] records which parts of an [`selkie_ontology::Ontology`]
//! are visible and how they look: per-type and per-instance visibility, marks,
//! groups, relation styles, value selection and position handlers. Every
//! mutating operation validates its preconditions first (rejection leaves the
//! state untouched), applies the change, and notifies registered listeners
//! synchronously. Snapshots for undo/redo are plain [`Clone`]s: the graph is
//! stored as index-aligned arenas with handle cross-references, so a copy is
//! fully independent of the original while sharing only the immutable
//! ontology.
//!
//! Single-writer discipline: nothing here is internally thread-safe; all
//! mutation, cloning and listener dispatch happen on one logical model
//! thread. [`PromptSlot`] is the sole blocking coordination primitive, for
//! the surrounding application's modal prompts.

mod config;
mod document;
mod error;
pub mod geom;
mod handler;
mod history;
mod icon;
mod notify;
mod prompt;
mod style;

pub use config::{
    Configuration, DEFAULT_MAX_PARALLEL_RELATIONS, DEFAULT_RELATION_DEPTH, Group,
    InstanceConfiguration, InstanceTypeConfiguration, MarkSource, RelationConfiguration,
    RelationTypeConfiguration, ValueActivation, Visibility,
};
pub use document::{
    ActiveValuesEntry, ConfigDocument, GroupEntry, HandlerAssignmentEntry, IconEntry,
    InstanceMarksEntry, PositionOverrideEntry, RelationStyleEntry,
};
pub use error::{Error, Result};
pub use handler::{HandlerKind, PositionHandler};
pub use history::History;
pub use icon::{IconError, IconSource, NoIcons};
pub use notify::{ChangeEvent, ChangeListener, RecordingListener};
pub use prompt::PromptSlot;
pub use style::{ArrowShape, Color, Icon, Mark, NodeShape, RelationStyle, Stroke};
