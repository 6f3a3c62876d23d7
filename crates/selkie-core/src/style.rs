//! Immutable style value types.
//!
//! Styles and marks are plain values: cloning a configuration copies them
//! bit-for-bit and never aliases mutable state. Both [`RelationStyle`] and
//! [`Mark`] are "sparse" records (every field optional) composed by
//! overriding present fields only, so later layers fall through to earlier
//! ones wherever they say nothing.

use serde::{Deserialize, Serialize};

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stroke {
    Solid,
    Dashed,
    Dotted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeShape {
    Circle,
    Rectangle,
    Diamond,
    Hexagon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrowShape {
    None,
    Open,
    Filled,
    Diamond,
}

/// Per-relation-type display style. Relations read their style from their
/// type; there is no per-relation styling.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RelationStyle {
    pub color: Option<Color>,
    pub stroke: Option<Stroke>,
    pub arrow: Option<ArrowShape>,
    pub reversed: Option<bool>,
}

impl RelationStyle {
    /// Overrides the fields `over` specifies, keeping the rest.
    pub fn merge(&mut self, over: &RelationStyle) {
        if over.color.is_some() {
            self.color = over.color;
        }
        if over.stroke.is_some() {
            self.stroke = over.stroke;
        }
        if over.arrow.is_some() {
            self.arrow = over.arrow;
        }
        if over.reversed.is_some() {
            self.reversed = over.reversed;
        }
    }
}

/// A visual mark on an instance: optional color, stroke and shape.
///
/// An instance carries an ordered list of marks; the effective mark is the
/// left-to-right fold of [`Mark::overlay`], so a later mark overrides exactly
/// the fields it specifies.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Mark {
    pub color: Option<Color>,
    pub stroke: Option<Stroke>,
    pub shape: Option<NodeShape>,
}

impl Mark {
    pub fn color(color: Color) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    /// Returns `self` with the present fields of `over` overriding.
    pub fn overlay(&self, over: &Mark) -> Mark {
        Mark {
            color: over.color.or(self.color),
            stroke: over.stroke.or(self.stroke),
            shape: over.shape.or(self.shape),
        }
    }

    /// In-place variant of [`Mark::overlay`], used for group-mark updates.
    pub fn apply(&mut self, over: &Mark) {
        *self = self.overlay(over);
    }

    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.stroke.is_none() && self.shape.is_none()
    }
}

/// A reference into an external icon asset store. The core never loads image
/// data; it only carries the identifier around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    pub id: String,
}

impl Icon {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}
