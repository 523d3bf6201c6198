// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selector inputs and selector predicates for style matching.
//!
//! Selectors are single-node predicates (no combinators) over a
//! [`SelectorInputs`] snapshot: the node's class chain, its style classes and
//! its active pseudo-classes.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::iter::FromIterator;

use canopy_property::NodeClassId;

/// Bucketed selector specificity: `(pseudos, classes, type)`.
///
/// Fields are ordered highest-weight-first so that derived `Ord` is the CSS
/// lexicographic ordering.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Specificity(pub u32, pub u32, pub u32);

/// A style class (`.primary`), interned by the application.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(pub u32);

/// A pseudo-class (`:focus`, `:highlighted`), interned by the application.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PseudoClassId(pub u32);

/// An owned, sorted, deduplicated set of IDs.
///
/// Membership is O(log n), subset checks are a merge walk.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IdSet<T>(Box<[T]>);

impl<T> Default for IdSet<T> {
    fn default() -> Self {
        Self(Vec::new().into_boxed_slice())
    }
}

impl<T> IdSet<T>
where
    T: Copy + Ord,
{
    /// Constructs a set from an iterator, sorting and deduplicating.
    #[must_use]
    pub fn from_ids(iter: impl IntoIterator<Item = T>) -> Self {
        let mut ids: Vec<T> = iter.into_iter().collect();
        ids.sort();
        ids.dedup();
        Self(ids.into_boxed_slice())
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of IDs in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the set as a sorted slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    /// Returns `true` if this set contains the given ID.
    #[must_use]
    pub fn contains(&self, id: T) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    /// Returns `true` if every ID of this set is in the sorted slice `other`.
    #[must_use]
    pub fn is_subset_of_slice(&self, other: &[T]) -> bool {
        is_subset(self.as_slice(), other)
    }
}

impl<T> FromIterator<T> for IdSet<T>
where
    T: Copy + Ord,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_ids(iter)
    }
}

/// A borrowed snapshot of selector inputs for a single node.
///
/// `classes` and `pseudos` must be sorted and deduplicated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SelectorInputs<'a> {
    /// The node's class followed by its ancestors.
    pub type_chain: &'a [NodeClassId],
    /// Sorted, unique style classes.
    pub classes: &'a [ClassId],
    /// Sorted, unique active pseudo-classes.
    pub pseudos: &'a [PseudoClassId],
}

impl SelectorInputs<'static> {
    /// Inputs with no type, classes or pseudo-classes.
    pub const EMPTY: Self = Self {
        type_chain: &[],
        classes: &[],
        pseudos: &[],
    };
}

impl<'a> SelectorInputs<'a> {
    /// Constructs selector inputs from borrowed slices.
    ///
    /// # Panics (debug only)
    ///
    /// Panics in debug builds if `classes` or `pseudos` are not sorted and
    /// deduplicated.
    #[must_use]
    pub fn new(
        type_chain: &'a [NodeClassId],
        classes: &'a [ClassId],
        pseudos: &'a [PseudoClassId],
    ) -> Self {
        debug_assert!(
            is_sorted_unique(classes),
            "`classes` must be sorted and unique"
        );
        debug_assert!(
            is_sorted_unique(pseudos),
            "`pseudos` must be sorted and unique"
        );
        Self {
            type_chain,
            classes,
            pseudos,
        }
    }
}

/// A selector predicate over [`SelectorInputs`].
///
/// ```rust
/// use canopy_property::NodeClassId;
/// use canopy_style::{IdSet, PseudoClassId, Selector, SelectorInputs};
///
/// const FOCUS: PseudoClassId = PseudoClassId(1);
/// let text_field = NodeClassId::new(2);
/// let chain = [text_field, NodeClassId::new(1), NodeClassId::new(0)];
///
/// let focused = Selector::for_type(NodeClassId::new(1)).with_pseudos([FOCUS]);
/// assert!(!focused.matches(&SelectorInputs::new(&chain, &[], &[])));
/// assert!(focused.matches(&SelectorInputs::new(&chain, &[], &[FOCUS])));
/// assert!(focused.matches_ignoring_pseudos(&SelectorInputs::new(&chain, &[], &[])));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Selector {
    /// Required node class; subclasses match too.
    pub type_tag: Option<NodeClassId>,
    /// Required style classes.
    pub required_classes: IdSet<ClassId>,
    /// Required pseudo-classes.
    pub required_pseudos: IdSet<PseudoClassId>,
}

impl Selector {
    /// A selector matching every node.
    #[must_use]
    pub fn universal() -> Self {
        Self::default()
    }

    /// A selector matching nodes of `class` and its subclasses.
    #[must_use]
    pub fn for_type(class: NodeClassId) -> Self {
        Self {
            type_tag: Some(class),
            ..Self::default()
        }
    }

    /// Adds required style classes.
    #[must_use]
    pub fn with_classes(mut self, classes: impl IntoIterator<Item = ClassId>) -> Self {
        self.required_classes = self
            .required_classes
            .as_slice()
            .iter()
            .copied()
            .chain(classes)
            .collect();
        self
    }

    /// Adds required pseudo-classes.
    #[must_use]
    pub fn with_pseudos(mut self, pseudos: impl IntoIterator<Item = PseudoClassId>) -> Self {
        self.required_pseudos = self
            .required_pseudos
            .as_slice()
            .iter()
            .copied()
            .chain(pseudos)
            .collect();
        self
    }

    /// Returns `true` if this selector matches the given inputs.
    #[must_use]
    pub fn matches(&self, inputs: &SelectorInputs<'_>) -> bool {
        self.matches_ignoring_pseudos(inputs)
            && self.required_pseudos.is_subset_of_slice(inputs.pseudos)
    }

    /// Returns `true` if the selector would match once its pseudo-classes
    /// were active.
    ///
    /// Such a selector makes the node interested in those pseudo-classes.
    #[must_use]
    pub fn matches_ignoring_pseudos(&self, inputs: &SelectorInputs<'_>) -> bool {
        if let Some(required) = self.type_tag
            && !inputs.type_chain.contains(&required)
        {
            return false;
        }
        self.required_classes.is_subset_of_slice(inputs.classes)
    }

    /// Returns a bucketed specificity score.
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        let type_score = u32::from(self.type_tag.is_some());
        let classes = u32::try_from(self.required_classes.len()).unwrap_or(u32::MAX);
        let pseudos = u32::try_from(self.required_pseudos.len()).unwrap_or(u32::MAX);
        Specificity(pseudos, classes, type_score)
    }
}

fn is_sorted_unique<T: Ord>(slice: &[T]) -> bool {
    slice
        .windows(2)
        .all(|w| w[0].cmp(&w[1]) == core::cmp::Ordering::Less)
}

fn is_subset<T: Ord>(needles: &[T], haystack: &[T]) -> bool {
    if needles.is_empty() {
        return true;
    }
    if haystack.is_empty() {
        return false;
    }

    let mut i = 0;
    let mut j = 0;
    while i < needles.len() && j < haystack.len() {
        match needles[i].cmp(&haystack[j]) {
            core::cmp::Ordering::Less => return false,
            core::cmp::Ordering::Equal => {
                i += 1;
                j += 1;
            }
            core::cmp::Ordering::Greater => j += 1,
        }
    }
    i == needles.len()
}
