// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Applying style sheets to nodes.

use alloc::vec::Vec;

use canopy_property::{PropertyChange, PropertyRegistry};

use crate::cascade::{RuleKey, StyleValues};
use crate::selector::{IdSet, PseudoClassId, SelectorInputs};
use crate::stylesheet::{StyleRule, StyleSheet};

/// The outcome of restyling one node.
#[derive(Debug, Default)]
pub struct Restyle {
    /// Effective value changes, in property order.
    pub changes: Vec<PropertyChange>,
    /// Pseudo-classes whose activation could change which rules match.
    ///
    /// The node should watch these (see
    /// [`PseudoClassHandlers::set_interest`](crate::PseudoClassHandlers::set_interest)).
    pub pseudo_interest: IdSet<PseudoClassId>,
}

/// An ordered set of style sheets applied to a tree of nodes.
///
/// Later sheets win ties against earlier ones only through their rules'
/// priorities; origin and specificity are compared first.
#[derive(Clone, Debug, Default)]
pub struct StyleScope {
    sheets: Vec<StyleSheet>,
    /// IDs of removed sheets whose contributions restyling still drops.
    ///
    /// One entry per removed sheet, until [`StyleScope::prune_retired`]
    /// finds no node holding that sheet's rules.
    retired: Vec<u32>,
}

impl StyleScope {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sheet.
    pub fn add_sheet(&mut self, sheet: StyleSheet) {
        self.sheets.push(sheet);
    }

    /// Removes a sheet by ID. Returns `true` if it was present.
    ///
    /// Nodes keep the sheet's contributions until they are restyled.
    pub fn remove_sheet(&mut self, id: u32) -> bool {
        let before = self.sheets.len();
        self.sheets.retain(|sheet| sheet.id() != id);
        let removed = self.sheets.len() != before;
        if removed {
            self.retired.push(id);
        }
        removed
    }

    /// Returns the sheets in application order.
    #[must_use]
    pub fn sheets(&self) -> &[StyleSheet] {
        &self.sheets
    }

    /// Returns every rule matching `inputs`.
    pub fn matching_rules<'s>(
        &'s self,
        inputs: &'s SelectorInputs<'_>,
    ) -> impl Iterator<Item = &'s StyleRule> + 's {
        self.sheets
            .iter()
            .flat_map(StyleSheet::rules)
            .filter(|rule| rule.selector().matches(inputs))
    }

    /// Re-evaluates which rules apply to a node and updates its style values.
    ///
    /// Rules that no longer match are removed and newly matching rules are
    /// pushed in a single batch, so every affected property has its final
    /// value before this returns. Contributions from rules that are not in
    /// this scope (for example pushed directly by an embedder) are kept.
    pub fn restyle<K: Copy + Eq + core::fmt::Debug + 'static>(
        &self,
        values: &mut StyleValues<K>,
        inputs: &SelectorInputs<'_>,
        registry: &PropertyRegistry,
    ) -> Restyle {
        self.restyle_owning(values, inputs, registry, |key| self.owns(key))
    }

    /// Restyles a node that moves from `previous` to this scope.
    ///
    /// Contributions of `previous` that this scope does not re-apply are
    /// dropped in the same batch, so each property changes at most once.
    pub fn restyle_replacing<K: Copy + Eq + core::fmt::Debug + 'static>(
        &self,
        previous: &Self,
        values: &mut StyleValues<K>,
        inputs: &SelectorInputs<'_>,
        registry: &PropertyRegistry,
    ) -> Restyle {
        self.restyle_owning(values, inputs, registry, |key| {
            self.owns(key) || previous.owns(key)
        })
    }

    /// Drops every contribution this scope made to `values`.
    ///
    /// Contributions from other sources are kept.
    pub fn release<K: Copy + Eq + core::fmt::Debug + 'static>(
        &self,
        values: &mut StyleValues<K>,
        registry: &PropertyRegistry,
    ) -> Vec<PropertyChange> {
        let owned: Vec<RuleKey> = values
            .rules()
            .into_iter()
            .filter(|key| self.owns(*key))
            .collect();
        values.apply_batch(&owned, Vec::new(), registry)
    }

    /// Forgets removed sheets whose rules none of `nodes` still holds.
    ///
    /// `nodes` must cover every node this scope styles; usually this runs
    /// after restyling all of them. Returns the number of forgotten sheets.
    pub fn prune_retired<'v, K: Copy + Eq + core::fmt::Debug + 'static>(
        &mut self,
        nodes: impl IntoIterator<Item = &'v StyleValues<K>>,
    ) -> usize {
        if self.retired.is_empty() {
            return 0;
        }
        let mut held: Vec<u32> = nodes
            .into_iter()
            .flat_map(|values| values.rules().into_iter().map(|key| key.source))
            .collect();
        held.sort_unstable();
        held.dedup();
        let before = self.retired.len();
        self.retired.retain(|source| held.binary_search(source).is_ok());
        before - self.retired.len()
    }

    /// Returns the number of removed sheets not yet pruned.
    #[must_use]
    pub fn retired_len(&self) -> usize {
        self.retired.len()
    }

    fn restyle_owning<K: Copy + Eq + core::fmt::Debug + 'static>(
        &self,
        values: &mut StyleValues<K>,
        inputs: &SelectorInputs<'_>,
        registry: &PropertyRegistry,
        owned: impl Fn(RuleKey) -> bool,
    ) -> Restyle {
        let matched: Vec<&StyleRule> = self.matching_rules(inputs).collect();
        let applied = values.rules();

        let stale: Vec<RuleKey> = applied
            .iter()
            .copied()
            .filter(|key| owned(*key) && !matched.iter().any(|rule| rule.key() == *key))
            .collect();
        let fresh = matched
            .iter()
            .filter(|rule| applied.binary_search(&rule.key()).is_err())
            .flat_map(|rule| {
                rule.declarations().iter().map(|declaration| {
                    (
                        rule.key(),
                        rule.priority(),
                        declaration.property,
                        declaration.value.clone(),
                    )
                })
            })
            .collect();

        let changes = values.apply_batch(&stale, fresh, registry);
        tracing::trace!(
            owner = ?values.owner(),
            matched = matched.len(),
            removed = stale.len(),
            changed = changes.len(),
            "restyled"
        );
        Restyle {
            changes,
            pseudo_interest: self.pseudo_interest(inputs),
        }
    }

    /// Returns the pseudo-classes that rules would require of a node that
    /// otherwise matches them.
    #[must_use]
    pub fn pseudo_interest(&self, inputs: &SelectorInputs<'_>) -> IdSet<PseudoClassId> {
        self.sheets
            .iter()
            .flat_map(StyleSheet::rules)
            .map(StyleRule::selector)
            .filter(|selector| selector.matches_ignoring_pseudos(inputs))
            .flat_map(|selector| selector.required_pseudos.as_slice().iter().copied())
            .collect()
    }

    fn owns(&self, key: RuleKey) -> bool {
        self.sheets.iter().any(|sheet| sheet.id() == key.source)
            || self.retired.contains(&key.source)
    }
}
