// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed observer lists.
//!
//! Each component owns the signals it fires. Listeners are called in the
//! order they subscribed.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Handle returned by [`Signal::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub Uuid);

impl SubscriptionId {
    /// Create a new random subscription ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

/// A list of listeners receiving `&T` on every emission
pub struct Signal<T> {
    listeners: IndexMap<SubscriptionId, Box<dyn FnMut(&T)>>,
}

impl<T> Signal<T> {
    /// Create an empty signal
    pub fn new() -> Self {
        Self {
            listeners: IndexMap::new(),
        }
    }

    /// Add a listener
    pub fn subscribe(&mut self, listener: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.listeners.insert(id, Box::new(listener));
        id
    }

    /// Remove a listener, returning whether it was subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.shift_remove(&id).is_some()
    }

    /// Call every listener with `value`
    pub fn emit(&mut self, value: &T) {
        for listener in self.listeners.values_mut() {
            listener(value);
        }
    }

    /// Remove all listeners
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Number of subscribed listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
