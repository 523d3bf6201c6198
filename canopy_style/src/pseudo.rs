// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pseudo-class state and handler subscription.
//!
//! A node class registers handlers for the pseudo-classes it can drive, for
//! example a text field registers one handler for `:focus` and `:blur` that
//! starts or stops listening for focus events. Style rules that mention a
//! pseudo-class make the node *interested* in it.
//!
//! Every handler keeps a per-node count of the interests it serves. A handler
//! is invoked with `true` when its count goes from zero to one and with
//! `false` when it drops back to zero, so repeated interest never stacks
//! subscriptions and every `true` is matched by exactly one `false`.

use alloc::vec::Vec;
use core::fmt;

use smallvec::SmallVec;

use canopy_property::{NodeClassId, PropertyRegistry};

use crate::selector::{IdSet, PseudoClassId};

/// A handler invoked with `true` to start listening for the events that
/// drive its pseudo-classes and with `false` to stop.
pub type PseudoClassHandler<N> = fn(&mut N, bool);

/// Identifies a registered handler.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerId(pub u32);

/// Per-node pseudo-class bookkeeping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PseudoClassState {
    /// Sorted.
    active: Vec<PseudoClassId>,
    /// Sorted by pseudo-class; counts are never zero.
    interest: SmallVec<[(PseudoClassId, u32); 4]>,
    /// Sorted by handler; counts are never zero.
    subscriptions: SmallVec<[(HandlerId, u32); 2]>,
    /// The interest last declared through `set_interest`.
    styled: Vec<PseudoClassId>,
}

impl PseudoClassState {
    /// Creates a state with nothing active or watched.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the active pseudo-classes, sorted.
    #[must_use]
    pub fn active(&self) -> &[PseudoClassId] {
        &self.active
    }

    /// Returns `true` if `pseudo` is active.
    #[must_use]
    pub fn is_active(&self, pseudo: PseudoClassId) -> bool {
        self.active.binary_search(&pseudo).is_ok()
    }

    /// Marks `pseudo` active. Returns `false` if it already was.
    pub fn activate(&mut self, pseudo: PseudoClassId) -> bool {
        match self.active.binary_search(&pseudo) {
            Ok(_) => false,
            Err(idx) => {
                self.active.insert(idx, pseudo);
                true
            }
        }
    }

    /// Marks `pseudo` inactive. Returns `false` if it was not active.
    pub fn deactivate(&mut self, pseudo: PseudoClassId) -> bool {
        match self.active.binary_search(&pseudo) {
            Ok(idx) => {
                self.active.remove(idx);
                true
            }
            Err(_) => false,
        }
    }

    /// Returns how many interests are held in `pseudo`.
    #[must_use]
    pub fn interest(&self, pseudo: PseudoClassId) -> u32 {
        lookup(&self.interest, pseudo)
    }

    /// Returns the pseudo-classes with at least one interest.
    #[must_use]
    pub fn watched(&self) -> IdSet<PseudoClassId> {
        self.interest.iter().map(|(pseudo, _)| *pseudo).collect()
    }

    /// Returns how many interests `handler` currently serves.
    #[must_use]
    pub fn subscription_count(&self, handler: HandlerId) -> u32 {
        lookup(&self.subscriptions, handler)
    }

    /// Returns `true` if `handler` is subscribed.
    #[must_use]
    pub fn is_subscribed(&self, handler: HandlerId) -> bool {
        self.subscription_count(handler) > 0
    }

    /// Returns `true` if no handler is subscribed.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

fn lookup<T: Copy + Ord>(counts: &[(T, u32)], key: T) -> u32 {
    counts
        .binary_search_by_key(&key, |(k, _)| *k)
        .map(|idx| counts[idx].1)
        .unwrap_or(0)
}

/// Adds `delta` (±1) to `key`'s count and returns `(before, after)`.
///
/// Counts never go below zero; entries that reach zero are removed.
fn adjust<T: Copy + Ord, const N: usize>(
    counts: &mut SmallVec<[(T, u32); N]>,
    key: T,
    increment: bool,
) -> (u32, u32) {
    match counts.binary_search_by_key(&key, |(k, _)| *k) {
        Ok(idx) => {
            let before = counts[idx].1;
            let after = if increment {
                before.saturating_add(1)
            } else {
                before - 1
            };
            if after == 0 {
                counts.remove(idx);
            } else {
                counts[idx].1 = after;
            }
            (before, after)
        }
        Err(idx) => {
            if increment {
                counts.insert(idx, (key, 1));
                (0, 1)
            } else {
                (0, 0)
            }
        }
    }
}

/// Access to the pseudo-class state of a node.
pub trait PseudoClassHost {
    /// Returns the node's class, used to find applicable handlers.
    fn node_class(&self) -> NodeClassId;

    /// Returns the node's pseudo-class state.
    fn pseudo_state(&self) -> &PseudoClassState;

    /// Returns the node's pseudo-class state mutably.
    fn pseudo_state_mut(&mut self) -> &mut PseudoClassState;
}

struct HandlerEntry<N> {
    class: NodeClassId,
    name: &'static str,
    pseudos: IdSet<PseudoClassId>,
    handler: PseudoClassHandler<N>,
}

/// The table of pseudo-class handlers, filled in when node classes are
/// declared.
///
/// A handler registered on a class also serves every subclass.
///
/// # Example
///
/// ```rust
/// use canopy_property::{NodeClassId, PropertyRegistry};
/// use canopy_style::{PseudoClassHandlers, PseudoClassHost, PseudoClassId, PseudoClassState};
///
/// const FOCUS: PseudoClassId = PseudoClassId(0);
///
/// struct Field {
///     class: NodeClassId,
///     pseudo: PseudoClassState,
///     listening: bool,
/// }
///
/// impl PseudoClassHost for Field {
///     fn node_class(&self) -> NodeClassId {
///         self.class
///     }
///     fn pseudo_state(&self) -> &PseudoClassState {
///         &self.pseudo
///     }
///     fn pseudo_state_mut(&mut self) -> &mut PseudoClassState {
///         &mut self.pseudo
///     }
/// }
///
/// let mut registry = PropertyRegistry::new();
/// let class = registry.register_class("Field", None).unwrap();
/// let mut handlers = PseudoClassHandlers::<Field>::new();
/// handlers.register(class, "focus", [FOCUS], |field, subscribe| {
///     field.listening = subscribe;
/// });
///
/// let mut field = Field { class, pseudo: PseudoClassState::new(), listening: false };
/// handlers.add_interest(&mut field, FOCUS, &registry);
/// assert!(field.listening);
/// handlers.release_all(&mut field);
/// assert!(!field.listening);
/// ```
pub struct PseudoClassHandlers<N> {
    entries: Vec<HandlerEntry<N>>,
}

impl<N> Default for PseudoClassHandlers<N> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<N> fmt::Debug for PseudoClassHandlers<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.entries
                    .iter()
                    .map(|entry| (entry.class, entry.name, entry.pseudos.as_slice())),
            )
            .finish()
    }
}

impl<N> PseudoClassHandlers<N> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` on `class` for the given pseudo-classes.
    pub fn register(
        &mut self,
        class: NodeClassId,
        name: &'static str,
        pseudos: impl IntoIterator<Item = PseudoClassId>,
        handler: PseudoClassHandler<N>,
    ) -> HandlerId {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "handlers are declared statically, far fewer than u32::MAX"
        )]
        let id = HandlerId(self.entries.len() as u32);
        self.entries.push(HandlerEntry {
            class,
            name,
            pseudos: IdSet::from_ids(pseudos),
            handler,
        });
        id
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the handlers serving `pseudo` on nodes of `class`.
    pub fn handlers_for<'a>(
        &'a self,
        class: NodeClassId,
        pseudo: PseudoClassId,
        registry: &'a PropertyRegistry,
    ) -> impl Iterator<Item = HandlerId> + 'a {
        self.entries
            .iter()
            .enumerate()
            .filter(move |(_, entry)| {
                entry.pseudos.contains(pseudo) && registry.is_subclass_of(class, entry.class)
            })
            .map(|(idx, _)| {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "indices come from `register`, which hands out u32 IDs"
                )]
                let id = HandlerId(idx as u32);
                id
            })
    }

    fn entry(&self, id: HandlerId) -> &HandlerEntry<N> {
        &self.entries[id.0 as usize]
    }
}

impl<N: PseudoClassHost> PseudoClassHandlers<N> {
    /// Records one interest in `pseudo`, subscribing any handler that was
    /// not serving an interest yet.
    pub fn add_interest(&self, node: &mut N, pseudo: PseudoClassId, registry: &PropertyRegistry) {
        self.change_interest(node, pseudo, true, registry);
    }

    /// Drops one interest in `pseudo`, unsubscribing any handler left with
    /// no interest. Without a held interest this does nothing.
    pub fn remove_interest(
        &self,
        node: &mut N,
        pseudo: PseudoClassId,
        registry: &PropertyRegistry,
    ) {
        self.change_interest(node, pseudo, false, registry);
    }

    /// Replaces the interest declared by styling with `wanted`.
    ///
    /// Only the differences from the previous call are applied, so calling
    /// this repeatedly with the same set invokes no handler.
    pub fn set_interest(
        &self,
        node: &mut N,
        wanted: &IdSet<PseudoClassId>,
        registry: &PropertyRegistry,
    ) {
        let previous = core::mem::take(&mut node.pseudo_state_mut().styled);
        for pseudo in previous.iter().filter(|p| !wanted.contains(**p)) {
            self.remove_interest(node, *pseudo, registry);
        }
        for pseudo in wanted.as_slice() {
            if previous.binary_search(pseudo).is_err() {
                self.add_interest(node, *pseudo, registry);
            }
        }
        node.pseudo_state_mut().styled = wanted.as_slice().to_vec();
    }

    /// Unsubscribes every subscribed handler and drops all interest.
    ///
    /// Called when the node is destroyed; afterwards the node holds no
    /// subscriptions.
    pub fn release_all(&self, node: &mut N) {
        let state = node.pseudo_state_mut();
        let subscribed = core::mem::take(&mut state.subscriptions);
        state.interest.clear();
        state.styled.clear();
        for (id, _) in subscribed {
            let entry = self.entry(id);
            tracing::trace!(handler = entry.name, subscribe = false, "released pseudo-class handler");
            (entry.handler)(node, false);
        }
    }

    fn change_interest(
        &self,
        node: &mut N,
        pseudo: PseudoClassId,
        increment: bool,
        registry: &PropertyRegistry,
    ) {
        let (before, after) = adjust(&mut node.pseudo_state_mut().interest, pseudo, increment);
        if before == after {
            return;
        }
        let class = node.node_class();
        let handlers: SmallVec<[HandlerId; 2]> =
            self.handlers_for(class, pseudo, registry).collect();
        for id in handlers {
            let (before, after) = adjust(&mut node.pseudo_state_mut().subscriptions, id, increment);
            let subscribe = match (before, after) {
                (0, 1) => true,
                (1, 0) => false,
                _ => continue,
            };
            let entry = self.entry(id);
            tracing::trace!(handler = entry.name, ?pseudo, subscribe, "pseudo-class handler");
            (entry.handler)(node, subscribe);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    const FOCUS: PseudoClassId = PseudoClassId(0);
    const BLUR: PseudoClassId = PseudoClassId(1);
    const PRESSED: PseudoClassId = PseudoClassId(2);

    #[derive(Debug)]
    struct Node {
        class: NodeClassId,
        pseudo: PseudoClassState,
        listeners: i32,
        calls: Vec<bool>,
    }

    impl Node {
        fn new(class: NodeClassId) -> Self {
            Self {
                class,
                pseudo: PseudoClassState::new(),
                listeners: 0,
                calls: Vec::new(),
            }
        }
    }

    impl PseudoClassHost for Node {
        fn node_class(&self) -> NodeClassId {
            self.class
        }
        fn pseudo_state(&self) -> &PseudoClassState {
            &self.pseudo
        }
        fn pseudo_state_mut(&mut self) -> &mut PseudoClassState {
            &mut self.pseudo
        }
    }

    fn focus_handler(node: &mut Node, subscribe: bool) {
        node.calls.push(subscribe);
        node.listeners += if subscribe { 2 } else { -2 };
    }

    struct Fixture {
        registry: PropertyRegistry,
        handlers: PseudoClassHandlers<Node>,
        view: NodeClassId,
        field: NodeClassId,
        focus: HandlerId,
    }

    fn fixture() -> Fixture {
        let mut registry = PropertyRegistry::new();
        let view = registry.register_class("View", None).unwrap();
        let text = registry.register_class("TextBase", Some(view)).unwrap();
        let field = registry.register_class("EditableTextBase", Some(text)).unwrap();
        let mut handlers = PseudoClassHandlers::new();
        let focus = handlers.register(field, "focus", [FOCUS, BLUR], focus_handler);
        Fixture {
            registry,
            handlers,
            view,
            field,
            focus,
        }
    }

    #[test]
    fn handler_runs_once_per_interest_transition() {
        let f = fixture();
        let mut node = Node::new(f.field);

        f.handlers.add_interest(&mut node, FOCUS, &f.registry);
        f.handlers.add_interest(&mut node, FOCUS, &f.registry);
        f.handlers.add_interest(&mut node, BLUR, &f.registry);
        assert_eq!(node.calls, vec![true]);
        assert_eq!(node.pseudo.subscription_count(f.focus), 3);

        f.handlers.remove_interest(&mut node, FOCUS, &f.registry);
        f.handlers.remove_interest(&mut node, BLUR, &f.registry);
        assert_eq!(node.calls, vec![true]);
        f.handlers.remove_interest(&mut node, FOCUS, &f.registry);
        assert_eq!(node.calls, vec![true, false]);
        assert_eq!(node.listeners, 0);
        assert!(node.pseudo.is_idle());
    }

    #[test]
    fn removing_absent_interest_is_a_no_op() {
        let f = fixture();
        let mut node = Node::new(f.field);
        f.handlers.remove_interest(&mut node, FOCUS, &f.registry);
        assert!(node.calls.is_empty());
        assert_eq!(node.pseudo.interest(FOCUS), 0);
    }

    #[test]
    fn handlers_do_not_apply_to_ancestor_classes() {
        let f = fixture();
        let mut node = Node::new(f.view);
        f.handlers.add_interest(&mut node, FOCUS, &f.registry);
        assert!(node.calls.is_empty());
        assert_eq!(node.pseudo.interest(FOCUS), 1);
        assert_eq!(f.handlers.handlers_for(f.view, FOCUS, &f.registry).count(), 0);
        assert_eq!(f.handlers.handlers_for(f.field, BLUR, &f.registry).count(), 1);
    }

    #[test]
    fn unrelated_pseudo_classes_do_not_subscribe() {
        let f = fixture();
        let mut node = Node::new(f.field);
        f.handlers.add_interest(&mut node, PRESSED, &f.registry);
        assert!(node.calls.is_empty());
        assert_eq!(node.pseudo.watched().as_slice(), &[PRESSED]);
    }

    #[test]
    fn set_interest_applies_differences() {
        let f = fixture();
        let mut node = Node::new(f.field);

        let both = IdSet::from_ids([FOCUS, BLUR]);
        f.handlers.set_interest(&mut node, &both, &f.registry);
        f.handlers.set_interest(&mut node, &both, &f.registry);
        assert_eq!(node.calls, vec![true]);
        assert_eq!(node.pseudo.subscription_count(f.focus), 2);

        f.handlers
            .set_interest(&mut node, &IdSet::from_ids([BLUR]), &f.registry);
        assert_eq!(node.pseudo.subscription_count(f.focus), 1);

        f.handlers.set_interest(&mut node, &IdSet::default(), &f.registry);
        assert_eq!(node.calls, vec![true, false]);
        assert!(node.pseudo.watched().is_empty());
    }

    #[test]
    fn release_all_pairs_every_subscription() {
        let f = fixture();
        let mut node = Node::new(f.field);
        f.handlers.add_interest(&mut node, FOCUS, &f.registry);
        f.handlers
            .set_interest(&mut node, &IdSet::from_ids([BLUR]), &f.registry);
        assert_eq!(node.listeners, 2);

        f.handlers.release_all(&mut node);
        assert_eq!(node.calls, vec![true, false]);
        assert_eq!(node.listeners, 0);
        assert!(node.pseudo.is_idle());
        assert_eq!(node.pseudo.interest(FOCUS), 0);

        f.handlers.release_all(&mut node);
        assert_eq!(node.calls.len(), 2);
    }

    #[test]
    fn active_set_is_sorted_and_unique() {
        let mut state = PseudoClassState::new();
        assert!(state.activate(PRESSED));
        assert!(state.activate(FOCUS));
        assert!(!state.activate(FOCUS));
        assert_eq!(state.active(), &[FOCUS, PRESSED]);
        assert!(state.deactivate(PRESSED));
        assert!(!state.deactivate(PRESSED));
        assert!(state.is_active(FOCUS));
        assert!(!state.is_active(BLUR));
    }
}
