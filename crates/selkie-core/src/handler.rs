//! Position handlers: priority-ranked strategies computing an instance's
//! display position.
//!
//! Each type configuration carries one assigned handler. An instance's
//! effective position is computed by the highest-priority handler among the
//! handlers of all types the instance belongs to; ties go to the type with
//! the lexicographically smallest IRI (the stored order of an instance's
//! type list).

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::geom::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandlerKind {
    /// Pass-through: reports the instance's stored position (the user
    /// override when present, the auto-layout default otherwise).
    Stored,
    /// Places the instance just off its hub: anchored at the origin of its
    /// single incoming relation, offset a fixed distance toward the centroid
    /// of its outgoing relations' destinations.
    Interface,
}

/// Offset from the hub anchor toward the dependent centroid, in model units.
const INTERFACE_OFFSET: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionHandler {
    pub kind: HandlerKind,
    pub priority: i32,
}

impl PositionHandler {
    /// The default pass-through handler, registered first in every
    /// configuration and assigned to every type at construction.
    pub fn stored() -> Self {
        Self {
            kind: HandlerKind::Stored,
            priority: 0,
        }
    }

    pub fn interface(priority: i32) -> Self {
        Self {
            kind: HandlerKind::Interface,
            priority,
        }
    }

    /// Ranking between two handlers: the higher numeric priority wins, i.e.
    /// compares `self` as `Greater` when it takes precedence.
    pub fn priority_over(&self, other: &PositionHandler) -> Ordering {
        self.priority.cmp(&other.priority)
    }
}

impl Configuration {
    /// Registers a handler and returns its handle for
    /// [`Configuration::set_position_handler`].
    pub fn register_position_handler(&mut self, handler: PositionHandler) -> usize {
        self.handlers.push(handler);
        self.handlers.len() - 1
    }

    /// Whether `handler` may be assigned to the type. The stored handler is
    /// legal for every type; the interface handler requires every direct
    /// member to have exactly one incoming relation whose origin is not
    /// itself of this type (a self-referential hub could never resolve).
    pub fn is_handler_legal(&self, type_iri: &str, handler: &PositionHandler) -> Result<bool> {
        let t = self.type_idx(type_iri)?;
        Ok(self.handler_legal_for(t, handler.kind))
    }

    pub(crate) fn handler_legal_for(&self, type_handle: usize, kind: HandlerKind) -> bool {
        match kind {
            HandlerKind::Stored => true,
            HandlerKind::Interface => {
                self.types[type_handle].direct_members.iter().all(|&m| {
                    let incoming: Vec<usize> = self.instances[m]
                        .relations
                        .iter()
                        .copied()
                        .filter(|&r| self.relations[r].destination == m)
                        .collect();
                    let [single] = incoming.as_slice() else {
                        return false;
                    };
                    let origin = self.relations[*single].origin;
                    !self.instances[origin].types.contains(&type_handle)
                })
            }
        }
    }

    /// Assigns a registered handler to a type, gated by the legality check.
    /// Rejection leaves the configuration unmodified.
    pub fn set_position_handler(&mut self, type_iri: &str, handler: usize) -> Result<()> {
        let t = self.type_idx(type_iri)?;
        let Some(h) = self.handlers.get(handler) else {
            return Err(Error::UnknownHandler { index: handler });
        };
        let kind = h.kind;
        if !self.handler_legal_for(t, kind) {
            return Err(Error::IllegalHandlerAssignment {
                kind,
                type_iri: type_iri.to_string(),
            });
        }
        if self.types[t].handler == handler {
            return Ok(());
        }
        self.types[t].handler = handler;
        self.notify_full();
        Ok(())
    }

    /// The display position of an instance: the highest-priority handler
    /// among its types' assigned handlers computes it, falling back to the
    /// stored position when that handler declines. Priority ties go to the
    /// type with the lexicographically smallest IRI (the instance's type list
    /// is stored in that order, and only a strictly greater priority
    /// displaces the current pick).
    pub fn effective_position(&self, uri: &str) -> Result<Point> {
        let idx = self.instance_idx(uri)?;
        let inst = &self.instances[idx];
        let mut best: Option<&PositionHandler> = None;
        for &t in &inst.types {
            let candidate = &self.handlers[self.types[t].handler];
            match best {
                Some(current) if candidate.priority_over(current) != Ordering::Greater => {}
                _ => best = Some(candidate),
            }
        }
        let position = best
            .and_then(|h| self.calculate_position(h.kind, idx))
            .unwrap_or_else(|| inst.stored_position());
        Ok(position)
    }

    /// Runs one handler's computation for an instance. `None` means the
    /// handler declines and the caller falls back to the stored position.
    pub(crate) fn calculate_position(&self, kind: HandlerKind, handle: usize) -> Option<Point> {
        match kind {
            HandlerKind::Stored => Some(self.instances[handle].stored_position()),
            HandlerKind::Interface => self.interface_position(handle),
        }
    }

    /// Anchor at the origin of the single incoming relation, then step
    /// [`INTERFACE_OFFSET`] toward the centroid of the outgoing relations'
    /// destinations. Degenerate geometry (no outgoing relations, or the
    /// centroid coinciding with the anchor) yields the anchor itself rather
    /// than a NaN direction.
    fn interface_position(&self, handle: usize) -> Option<Point> {
        let inst = &self.instances[handle];
        let mut incoming = inst
            .relations
            .iter()
            .copied()
            .filter(|&r| self.relations[r].destination == handle);
        let hub = incoming.next()?;
        if incoming.next().is_some() {
            return None;
        }
        let anchor = self.instances[self.relations[hub].origin].stored_position();

        let outgoing: Vec<usize> = inst
            .relations
            .iter()
            .copied()
            .filter(|&r| self.relations[r].origin == handle)
            .collect();
        if outgoing.is_empty() {
            return Some(anchor);
        }
        let mut centroid = crate::geom::vector(0.0, 0.0);
        for &r in &outgoing {
            centroid += self.instances[self.relations[r].destination]
                .stored_position()
                .to_vector();
        }
        let centroid = centroid / outgoing.len() as f64;

        let direction = centroid - anchor.to_vector();
        let length = direction.length();
        if length == 0.0 {
            return Some(anchor);
        }
        Some(anchor + direction / length * INTERFACE_OFFSET)
    }
}
