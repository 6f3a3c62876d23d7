//! Blocking prompt handshake.
//!
//! The surrounding application sometimes needs a modal "choose a URI" style
//! prompt: one thread blocks until another supplies a value. [`PromptSlot`]
//! is that handshake: a single `Mutex`-guarded slot plus a `Condvar`.
//! Waiters loop on the slot, so spurious wakeups are tolerated. There is no
//! timeout and no cancellation; the prompt is answered or the program moves
//! on without the waiter returning.

use std::sync::{Arc, Condvar, Mutex};

#[derive(Debug)]
struct Inner<T> {
    slot: Mutex<Option<T>>,
    ready: Condvar,
}

/// A reusable one-value rendezvous. `Clone` shares the same slot.
#[derive(Debug)]
pub struct PromptSlot<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for PromptSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for PromptSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PromptSlot<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                slot: Mutex::new(None),
                ready: Condvar::new(),
            }),
        }
    }

    /// Blocks until a value is supplied, then takes it, leaving the slot
    /// empty for the next prompt.
    pub fn wait(&self) -> T {
        let mut guard = self.inner.slot.lock().unwrap();
        loop {
            if let Some(value) = guard.take() {
                return value;
            }
            guard = self.inner.ready.wait(guard).unwrap();
        }
    }

    /// Supplies the value and wakes every waiter. A second supply before the
    /// first is consumed replaces it.
    pub fn supply(&self, value: T) {
        *self.inner.slot.lock().unwrap() = Some(value);
        self.inner.ready.notify_all();
    }

    /// Non-blocking probe, for callers polling instead of parking.
    pub fn try_take(&self) -> Option<T> {
        self.inner.slot.lock().unwrap().take()
    }
}
