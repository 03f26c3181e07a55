//! Single-slot "latest value" cells shared between a producer and the render tick.
//!
//! A write replaces the whole value atomically and a read always observes the
//! most recently completed write. There is no queue: a reader that falls
//! behind simply sees the newest value.

use arc_swap::ArcSwap;
use std::sync::Arc;

pub struct SignalCell<T> {
    slot: Arc<ArcSwap<T>>,
}

impl<T> SignalCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            slot: Arc::new(ArcSwap::from_pointee(value)),
        }
    }

    pub fn set(&self, value: T) {
        self.slot.store(Arc::new(value));
    }

    /// Shared handle to the current value without copying it.
    pub fn load(&self) -> Arc<T> {
        self.slot.load_full()
    }
}

impl<T: Clone> SignalCell<T> {
    pub fn get(&self) -> T {
        T::clone(&self.slot.load())
    }
}

impl<T: Default> Default for SignalCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

// Clones share the slot; they are handles, not copies of the value.
impl<T> Clone for SignalCell<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for SignalCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SignalCell").field(&*self.slot.load()).finish()
    }
}
