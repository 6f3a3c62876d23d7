//! Change notification.
//!
//! Every mutating operation, after fully applying its change, invokes the
//! registered listeners synchronously in registration order. There is no
//! payload beyond the identity of what changed: listeners re-read the
//! configuration. If an operation turns out to be a no-op (hiding an already
//! hidden instance, re-applying the trailing mark) no notification fires.
//!
//! A full-change notification means the listener should treat its entire
//! derived state as stale and rebuild instead of patching incrementally; it
//! fires after bulk operations and after undo/redo.

use std::sync::{Arc, Mutex};

/// Callback sink for configuration changes. All methods default to no-ops so
/// a listener implements only what it cares about. The core makes no
/// assumption about what runs inside a callback, but callbacks are expected
/// not to panic and must not re-enter the configuration mutably (they receive
/// `&self` while the configuration is borrowed).
pub trait ChangeListener: Send {
    fn on_full_change(&self) {}

    fn on_instance_change(&self, _uri: &str) {}

    fn on_relation_change(&self, _uri: &str) {}
}

/// One observed change, as recorded by [`RecordingListener`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Full,
    Instance(String),
    Relation(String),
}

/// A listener that records every event it receives; shared-handle so a test
/// can keep a clone and inspect the log after registering the listener.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    events: Arc<Mutex<Vec<ChangeEvent>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains and returns the events recorded so far.
    pub fn take(&self) -> Vec<ChangeEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

impl ChangeListener for RecordingListener {
    fn on_full_change(&self) {
        self.events.lock().unwrap().push(ChangeEvent::Full);
    }

    fn on_instance_change(&self, uri: &str) {
        self.events
            .lock()
            .unwrap()
            .push(ChangeEvent::Instance(uri.to_string()));
    }

    fn on_relation_change(&self, uri: &str) {
        self.events
            .lock()
            .unwrap()
            .push(ChangeEvent::Relation(uri.to_string()));
    }
}
