// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node events and the subscription interface the node is wired through.

use std::fmt;

use hashbrown::HashMap;
use smallvec::SmallVec;

/// Raised when the field loses focus.
pub const BLUR_EVENT: &str = "blur";
/// Raised when the field gains focus.
pub const FOCUS_EVENT: &str = "focus";
/// Raised on every native text edit.
pub const TEXT_CHANGE_EVENT: &str = "textChange";

/// A delivered event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventData {
    /// One of the `*_EVENT` names.
    pub event_name: &'static str,
    /// The edited text, for [`TEXT_CHANGE_EVENT`].
    pub value: Option<String>,
}

impl EventData {
    /// An event without a payload.
    #[must_use]
    pub fn new(event_name: &'static str) -> Self {
        Self {
            event_name,
            value: None,
        }
    }

    /// A text change event.
    #[must_use]
    pub fn text_change(value: impl Into<String>) -> Self {
        Self {
            event_name: TEXT_CHANGE_EVENT,
            value: Some(value.into()),
        }
    }
}

/// An event callback, identified by name.
///
/// Subscribing a listener whose name is already subscribed to the same event
/// does nothing.
pub struct Listener<N> {
    /// Identity used for deduplication and unsubscription.
    pub name: &'static str,
    /// Called with the node the event was delivered to.
    pub callback: fn(&mut N, &EventData),
}

impl<N> Listener<N> {
    /// Creates a listener.
    #[must_use]
    pub const fn new(name: &'static str, callback: fn(&mut N, &EventData)) -> Self {
        Self { name, callback }
    }
}

impl<N> Copy for Listener<N> {}

impl<N> Clone for Listener<N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> fmt::Debug for Listener<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener").field(&self.name).finish()
    }
}

/// Subscription primitives for node events.
///
/// Embedders may route subscriptions to their own event system; the node only
/// relies on this interface.
pub trait EventSubsystem<N>: fmt::Debug {
    /// Adds `listener` to `event`. Returns `false` if it was already there.
    fn subscribe(&mut self, event: &'static str, listener: Listener<N>) -> bool;

    /// Removes the listener named `name` from `event`. Returns `false` if it
    /// was not subscribed.
    fn unsubscribe(&mut self, event: &str, name: &str) -> bool;

    /// Returns how many listeners `event` has.
    fn listener_count(&self, event: &str) -> usize;

    /// Returns the listeners of `event` in subscription order.
    fn listeners(&self, event: &str) -> Vec<Listener<N>>;
}

/// The default in-process [`EventSubsystem`].
pub struct EventListeners<N> {
    by_event: HashMap<&'static str, SmallVec<[Listener<N>; 2]>>,
}

impl<N> EventListeners<N> {
    /// Creates an empty set of listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of listeners across all events.
    #[must_use]
    pub fn total(&self) -> usize {
        self.by_event.values().map(SmallVec::len).sum()
    }
}

impl<N> Default for EventListeners<N> {
    fn default() -> Self {
        Self {
            by_event: HashMap::new(),
        }
    }
}

impl<N> fmt::Debug for EventListeners<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.by_event.iter().map(|(event, listeners)| (event, listeners.as_slice())))
            .finish()
    }
}

impl<N> EventSubsystem<N> for EventListeners<N> {
    fn subscribe(&mut self, event: &'static str, listener: Listener<N>) -> bool {
        let listeners = self.by_event.entry(event).or_default();
        if listeners.iter().any(|l| l.name == listener.name) {
            return false;
        }
        listeners.push(listener);
        true
    }

    fn unsubscribe(&mut self, event: &str, name: &str) -> bool {
        let Some(listeners) = self.by_event.get_mut(event) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|l| l.name != name);
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            self.by_event.remove(event);
        }
        removed
    }

    fn listener_count(&self, event: &str) -> usize {
        self.by_event.get(event).map_or(0, SmallVec::len)
    }

    fn listeners(&self, event: &str) -> Vec<Listener<N>> {
        self.by_event
            .get(event)
            .map(|listeners| listeners.to_vec())
            .unwrap_or_default()
    }
}
