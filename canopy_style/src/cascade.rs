// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node style values with cascade reversion.
//!
//! [`StyleValues`] is a node's style object. For each CSS property it keeps
//! an optional local value and every value currently contributed by a style
//! rule, keyed by [`RuleKey`] and ranked by [`Priority`]. The effective value
//! is:
//!
//! **Local → highest-priority contribution → class default**
//!
//! Removing a rule drops its contributions, so the property falls back to the
//! next-ranked rule or, if none remain, to the default.

use alloc::sync::Arc;
use alloc::vec::Vec;
use smallvec::SmallVec;

use canopy_property::{
    ChangedNode, ClassLayout, ErasedValue, PropertyChange, PropertyError, PropertyId,
    PropertyRegistration, PropertyRegistry, PropertyValue, RawValue,
};

use crate::css::{CssProperty, CssPropertyTable};
use crate::error::CascadeError;
use crate::selector::Specificity;

/// The origin/strength of a style source.
///
/// Higher origins win over lower ones regardless of selector specificity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StyleOrigin {
    /// Low-precedence base styling (e.g. control defaults).
    Base = 0,
    /// Rule-based styling (style sheets).
    Sheet = 1,
    /// High-precedence overrides (e.g. an inline `style` attribute).
    Override = 2,
}

/// The rank of a contribution: origin, then specificity, then rule order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority {
    /// Source strength.
    pub origin: StyleOrigin,
    /// Selector specificity.
    pub specificity: Specificity,
    /// Position of the rule within its source.
    pub order: u32,
}

impl Priority {
    /// Creates a priority.
    #[must_use]
    pub const fn new(origin: StyleOrigin, specificity: Specificity, order: u32) -> Self {
        Self {
            origin,
            specificity,
            order,
        }
    }
}

/// Identifies the style rule a contribution came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleKey {
    /// The source (sheet) the rule belongs to.
    pub source: u32,
    /// The rule's index within the source.
    pub index: u32,
}

impl RuleKey {
    /// Creates a rule key.
    #[must_use]
    pub const fn new(source: u32, index: u32) -> Self {
        Self { source, index }
    }
}

#[derive(Clone, Debug)]
struct Contribution {
    rule: RuleKey,
    priority: Priority,
    /// Push sequence; breaks priority ties in favor of the latest push.
    seq: u64,
    value: ErasedValue,
}

#[derive(Clone, Debug, Default)]
struct StyleSlot {
    local: Option<ErasedValue>,
    contributions: SmallVec<[Contribution; 2]>,
}

impl StyleSlot {
    fn winner(&self) -> Option<&ErasedValue> {
        self.local.as_ref().or_else(|| {
            self.contributions
                .iter()
                .max_by_key(|c| (c.priority, c.seq))
                .map(|c| &c.value)
        })
    }

    fn is_empty(&self) -> bool {
        self.local.is_none() && self.contributions.is_empty()
    }
}

/// A node's style object.
///
/// # Example
///
/// ```rust
/// use canopy_property::{PropertyMetadataBuilder, PropertyRegistry, RawValue, string_converter};
/// use canopy_style::{
///     CssPropertyOptions, CssPropertyTable, Priority, RuleKey, Specificity, StyleOrigin,
///     StyleValues,
/// };
///
/// let mut registry = PropertyRegistry::new();
/// let style_class = registry.register_class("Style", None).unwrap();
/// let mut table = CssPropertyTable::new(style_class);
/// let tint = table
///     .register(
///         &mut registry,
///         CssPropertyOptions::aliased("tint", "tint"),
///         PropertyMetadataBuilder::new(String::from("none"))
///             .converter(string_converter)
///             .build(),
///     )
///     .unwrap();
///
/// let mut style = StyleValues::new(1_u32, registry.class_layout(style_class).unwrap());
/// let low = Priority::new(StyleOrigin::Sheet, Specificity(0, 0, 1), 0);
/// let high = Priority::new(StyleOrigin::Sheet, Specificity(0, 1, 0), 1);
/// let (a, b) = (RuleKey::new(0, 0), RuleKey::new(0, 1));
///
/// style.apply_declaration(a, "tint", &RawValue::from("red"), low, &table, &registry).unwrap();
/// style.apply_declaration(b, "tint", &RawValue::from("blue"), high, &table, &registry).unwrap();
/// assert_eq!(style.get(tint), "blue");
///
/// style.remove_rule(b, &registry);
/// assert_eq!(style.get(tint), "red");
/// style.remove_rule(a, &registry);
/// assert_eq!(style.get(tint), "none");
/// ```
#[derive(Debug)]
pub struct StyleValues<K> {
    /// Sorted by [`PropertyId`].
    slots: SmallVec<[(PropertyId, StyleSlot); 8]>,
    layout: Arc<ClassLayout>,
    owner: K,
    next_seq: u64,
}

impl<K: Copy + Eq + core::fmt::Debug + 'static> StyleValues<K> {
    /// Creates an empty style object for the layout's style class.
    #[must_use]
    pub fn new(owner: K, layout: Arc<ClassLayout>) -> Self {
        Self {
            slots: SmallVec::new(),
            layout,
            owner,
            next_seq: 0,
        }
    }

    /// Returns the owning node's key.
    #[must_use]
    #[inline]
    pub fn owner(&self) -> K {
        self.owner
    }

    /// Returns the style class layout.
    #[must_use]
    #[inline]
    pub fn layout(&self) -> &Arc<ClassLayout> {
        &self.layout
    }

    /// Returns `true` if no local values or contributions are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    fn find(&self, id: PropertyId) -> Result<usize, usize> {
        self.slots.binary_search_by_key(&id, |(pid, _)| *pid)
    }

    fn slot_mut(&mut self, id: PropertyId) -> &mut StyleSlot {
        let idx = match self.find(id) {
            Ok(idx) => idx,
            Err(idx) => {
                self.slots.insert(idx, (id, StyleSlot::default()));
                idx
            }
        };
        &mut self.slots[idx].1
    }

    fn prune(&mut self, id: PropertyId) {
        if let Ok(idx) = self.find(id)
            && self.slots[idx].1.is_empty()
        {
            self.slots.remove(idx);
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Returns the effective value, or `None` if the style class does not
    /// carry the property.
    #[must_use]
    pub fn get_erased(&self, id: PropertyId) -> Option<&ErasedValue> {
        self.find(id)
            .ok()
            .and_then(|idx| self.slots[idx].1.winner())
            .or_else(|| self.layout.slot(id).map(|slot| self.layout.default_at(slot)))
    }

    /// Returns the effective value.
    ///
    /// # Panics
    ///
    /// Panics if the style class does not carry the property.
    #[must_use]
    pub fn get<T: PropertyValue>(&self, property: CssProperty<T>) -> &T {
        match self.get_erased(property.id()).and_then(ErasedValue::downcast_ref) {
            Some(value) => value,
            None => panic!(
                "css property `{}` is not carried by style class `{}`",
                property.css_name(),
                self.layout.class_name()
            ),
        }
    }

    /// Returns the local value, if one is set.
    #[must_use]
    pub fn get_local<T: PropertyValue>(&self, property: CssProperty<T>) -> Option<&T> {
        self.find(property.id())
            .ok()
            .and_then(|idx| self.slots[idx].1.local.as_ref())
            .and_then(ErasedValue::downcast_ref)
    }

    /// Returns the number of rules currently contributing to a property.
    #[must_use]
    pub fn contribution_count(&self, id: PropertyId) -> usize {
        self.find(id)
            .map(|idx| self.slots[idx].1.contributions.len())
            .unwrap_or(0)
    }

    /// Returns every rule with at least one contribution, sorted.
    #[must_use]
    pub fn rules(&self) -> Vec<RuleKey> {
        let mut rules: Vec<RuleKey> = self
            .slots
            .iter()
            .flat_map(|(_, slot)| slot.contributions.iter().map(|c| c.rule))
            .collect();
        rules.sort();
        rules.dedup();
        rules
    }

    /// Returns `true` if `rule` contributes to any property.
    #[must_use]
    pub fn has_rule(&self, rule: RuleKey) -> bool {
        self.slots
            .iter()
            .any(|(_, slot)| slot.contributions.iter().any(|c| c.rule == rule))
    }

    // =========================================================================
    // Local values
    // =========================================================================

    /// Sets a local value, which outranks every rule.
    pub fn set_local<T: PropertyValue>(
        &mut self,
        property: CssProperty<T>,
        value: T,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, CascadeError> {
        self.set_local_erased(property.id(), ErasedValue::new(value), registry)
    }

    /// Converts and sets a local value.
    pub fn set_local_raw(
        &mut self,
        id: PropertyId,
        raw: &RawValue,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, CascadeError> {
        let registration = self.registration(id, registry)?;
        let value = registration
            .convert(raw)
            .ok_or(PropertyError::NoConverter(registration.name()))??;
        self.set_local_erased(id, value, registry)
    }

    /// Sets a type-erased local value.
    pub fn set_local_erased(
        &mut self,
        id: PropertyId,
        value: ErasedValue,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, CascadeError> {
        let registration = self.registration(id, registry)?;
        let value = checked(registration, value)?;
        let old = self.effective(id);
        self.slot_mut(id).local = Some(value);
        Ok(self.report(registration, id, old))
    }

    /// Removes the local value, falling back to the cascade.
    pub fn clear_local(&mut self, id: PropertyId, registry: &PropertyRegistry) -> Option<PropertyChange> {
        let registration = registry.get(id)?;
        let idx = self.find(id).ok()?;
        let old = self.effective(id);
        self.slots[idx].1.local.take()?;
        self.prune(id);
        self.report(registration, id, old)
    }

    // =========================================================================
    // Cascade contributions
    // =========================================================================

    /// Records a typed contribution from `rule`.
    ///
    /// A rule contributes at most one value per property; pushing again
    /// replaces its previous contribution.
    pub fn push<T: PropertyValue>(
        &mut self,
        rule: RuleKey,
        priority: Priority,
        property: CssProperty<T>,
        value: T,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, CascadeError> {
        self.push_erased(rule, priority, property.id(), ErasedValue::new(value), registry)
    }

    /// Records a type-erased contribution from `rule`.
    pub fn push_erased(
        &mut self,
        rule: RuleKey,
        priority: Priority,
        id: PropertyId,
        value: ErasedValue,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, CascadeError> {
        let registration = self.registration(id, registry)?;
        let value = checked(registration, value)?;
        let old = self.effective(id);
        self.insert_contribution(rule, priority, id, value);
        Ok(self.report(registration, id, old))
    }

    /// Converts and records one `css-name: value` declaration from the
    /// external cascade engine.
    ///
    /// Unknown CSS names and rejected values are logged and returned as
    /// errors; nothing is stored for them.
    pub fn apply_declaration(
        &mut self,
        rule: RuleKey,
        css_name: &str,
        raw: &RawValue,
        priority: Priority,
        table: &CssPropertyTable,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, CascadeError> {
        let Some(id) = table.by_css_name(css_name) else {
            tracing::warn!(owner = ?self.owner, ?rule, css_name, "unknown css property");
            return Err(CascadeError::UnknownCssProperty {
                css_name: css_name.into(),
            });
        };
        let registration = self.registration(id, registry)?;
        let value = match registration.convert(raw) {
            Some(Ok(value)) => value,
            Some(Err(err)) => {
                tracing::warn!(owner = ?self.owner, ?rule, css_name, %err, "invalid css value");
                return Err(err.into());
            }
            None => return Err(PropertyError::NoConverter(registration.name()).into()),
        };
        self.push_erased(rule, priority, id, value, registry)
    }

    /// Drops every contribution of `rule`, reverting each affected property
    /// to its next-ranked value.
    ///
    /// Returns the resulting changes in property order.
    pub fn remove_rule(&mut self, rule: RuleKey, registry: &PropertyRegistry) -> Vec<PropertyChange> {
        self.apply_batch(&[rule], Vec::new(), registry)
    }

    /// Removes `stale` rules and records `fresh` contributions as one step.
    ///
    /// Each property is compared once, before and after the whole batch, so
    /// a property handed from one rule to another reports a single change.
    pub fn apply_batch(
        &mut self,
        stale: &[RuleKey],
        fresh: Vec<(RuleKey, Priority, PropertyId, ErasedValue)>,
        registry: &PropertyRegistry,
    ) -> Vec<PropertyChange> {
        let mut touched: Vec<(PropertyId, Option<ErasedValue>)> = Vec::new();
        let snapshot = |this: &Self, id: PropertyId, touched: &mut Vec<_>| {
            if !touched.iter().any(|(t, _)| *t == id) {
                touched.push((id, this.effective(id)));
            }
        };

        for (id, slot) in &self.slots {
            if slot.contributions.iter().any(|c| stale.contains(&c.rule)) {
                snapshot(self, *id, &mut touched);
            }
        }
        let mut accepted = Vec::with_capacity(fresh.len());
        for (rule, priority, id, value) in fresh {
            let result = self
                .registration(id, registry)
                .and_then(|registration| checked(registration, value));
            match result {
                Ok(value) => {
                    snapshot(self, id, &mut touched);
                    accepted.push((rule, priority, id, value));
                }
                Err(err) => {
                    tracing::warn!(owner = ?self.owner, ?rule, %err, "skipped style declaration");
                }
            }
        }

        for (_, slot) in &mut self.slots {
            slot.contributions.retain(|c| !stale.contains(&c.rule));
        }
        self.slots.retain(|(_, slot)| !slot.is_empty());
        for (rule, priority, id, value) in accepted {
            self.insert_contribution(rule, priority, id, value);
        }

        touched.sort_by_key(|(id, _)| *id);
        touched
            .into_iter()
            .filter_map(|(id, old)| {
                let registration = registry.get(id)?;
                self.report(registration, id, old)
            })
            .collect()
    }

    /// Drops all local values and contributions (node detached or destroyed).
    pub fn reset(&mut self, registry: &PropertyRegistry) -> Vec<PropertyChange> {
        let old: Vec<_> = self
            .slots
            .iter()
            .map(|(id, slot)| (*id, slot.winner().cloned()))
            .collect();
        self.slots.clear();
        old.into_iter()
            .filter_map(|(id, old)| self.report(registry.get(id)?, id, old))
            .collect()
    }

    fn insert_contribution(
        &mut self,
        rule: RuleKey,
        priority: Priority,
        id: PropertyId,
        value: ErasedValue,
    ) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let contribution = Contribution {
            rule,
            priority,
            seq,
            value,
        };
        let slot = self.slot_mut(id);
        match slot.contributions.iter_mut().find(|c| c.rule == rule) {
            Some(existing) => *existing = contribution,
            None => slot.contributions.push(contribution),
        }
    }

    fn effective(&self, id: PropertyId) -> Option<ErasedValue> {
        self.get_erased(id).cloned()
    }

    fn registration<'r>(
        &self,
        id: PropertyId,
        registry: &'r PropertyRegistry,
    ) -> Result<&'r PropertyRegistration, CascadeError> {
        let registration = registry
            .get(id)
            .ok_or_else(|| PropertyError::UnknownProperty(alloc::format!("{id}")))?;
        if !self.layout.contains(id) {
            return Err(PropertyError::NotOnClass {
                class: self.layout.class_name(),
                name: registration.name(),
            }
            .into());
        }
        Ok(registration)
    }

    fn report(
        &self,
        registration: &PropertyRegistration,
        id: PropertyId,
        old: Option<ErasedValue>,
    ) -> Option<PropertyChange> {
        let old = old?;
        let new = self.effective(id)?;
        if registration.values_equal(&old, &new) {
            return None;
        }
        registration.notify_changed(ChangedNode::new(&self.owner), &old, &new);
        tracing::debug!(
            owner = ?self.owner,
            property = registration.name(),
            ?old,
            ?new,
            "style value changed"
        );
        Some(PropertyChange {
            property: id,
            name: registration.name(),
            invalidates: registration.invalidates(),
            old,
            new,
        })
    }
}

fn checked(
    registration: &PropertyRegistration,
    value: ErasedValue,
) -> Result<ErasedValue, CascadeError> {
    if value.type_id() != registration.type_id() {
        return Err(PropertyError::TypeMismatch {
            name: registration.name(),
            declared: registration.type_name(),
        }
        .into());
    }
    Ok(registration.coerce(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::CssPropertyOptions;
    use alloc::string::String;
    use alloc::vec;
    use canopy_property::{PropertyMetadataBuilder, parse_int, string_converter};
    use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    struct Fixture {
        registry: PropertyRegistry,
        table: CssPropertyTable,
        tint: CssProperty<String>,
        size: CssProperty<i64>,
        calls: Arc<AtomicUsize>,
    }

    fn fixture() -> Fixture {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let mut registry = PropertyRegistry::new();
        let style = registry.register_class("Style", None).unwrap();
        let mut table = CssPropertyTable::new(style);
        let tint = table
            .register(
                &mut registry,
                CssPropertyOptions::aliased("tint", "tint"),
                PropertyMetadataBuilder::new(String::from("none"))
                    .converter(string_converter)
                    .equality_comparer(|a: &String, b: &String| a.eq_ignore_ascii_case(b))
                    .on_changed(move |_, _, _| {
                        seen.fetch_add(1, Ordering::SeqCst);
                    })
                    .build(),
            )
            .unwrap();
        let size = table
            .register(
                &mut registry,
                CssPropertyOptions::aliased("fontSize", "font-size"),
                PropertyMetadataBuilder::new(12_i64).converter(parse_int).build(),
            )
            .unwrap();
        Fixture {
            registry,
            table,
            tint,
            size,
            calls,
        }
    }

    fn values(f: &Fixture) -> StyleValues<u32> {
        StyleValues::new(
            1,
            f.registry.class_layout(f.table.style_class()).unwrap(),
        )
    }

    fn priority(order: u32) -> Priority {
        Priority::new(StyleOrigin::Sheet, Specificity::default(), order)
    }

    const A: RuleKey = RuleKey::new(0, 0);
    const B: RuleKey = RuleKey::new(0, 1);

    #[test]
    fn removing_rules_reverts_in_priority_order() {
        let f = fixture();
        let mut style = values(&f);
        style
            .push(A, priority(1), f.tint, String::from("red"), &f.registry)
            .unwrap();
        style
            .push(B, priority(2), f.tint, String::from("blue"), &f.registry)
            .unwrap();
        assert_eq!(style.get(f.tint), "blue");

        let changes = style.remove_rule(B, &f.registry);
        assert_eq!(changes.len(), 1);
        assert_eq!(style.get(f.tint), "red");

        style.remove_rule(A, &f.registry);
        assert_eq!(style.get(f.tint), "none");
        assert!(style.is_empty());
    }

    #[test]
    fn lower_priority_push_does_not_change_winner() {
        let f = fixture();
        let mut style = values(&f);
        style
            .push(B, priority(2), f.tint, String::from("blue"), &f.registry)
            .unwrap();
        let change = style
            .push(A, priority(1), f.tint, String::from("red"), &f.registry)
            .unwrap();
        assert!(change.is_none());
        assert_eq!(style.get(f.tint), "blue");
        assert_eq!(style.contribution_count(f.tint.id()), 2);
    }

    #[test]
    fn equal_priorities_favor_latest_push() {
        let f = fixture();
        let mut style = values(&f);
        style
            .push(A, priority(0), f.tint, String::from("red"), &f.registry)
            .unwrap();
        style
            .push(B, priority(0), f.tint, String::from("blue"), &f.registry)
            .unwrap();
        assert_eq!(style.get(f.tint), "blue");
    }

    #[test]
    fn comparer_suppresses_redundant_cascade_writes() {
        let f = fixture();
        let mut style = values(&f);
        style
            .push(A, priority(1), f.tint, String::from("red"), &f.registry)
            .unwrap();
        let change = style
            .push(B, priority(2), f.tint, String::from("RED"), &f.registry)
            .unwrap();
        assert!(change.is_none());
        assert_eq!(f.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn local_values_outrank_rules() {
        let f = fixture();
        let mut style = values(&f);
        style
            .push(A, priority(5), f.tint, String::from("red"), &f.registry)
            .unwrap();
        style
            .set_local(f.tint, String::from("green"), &f.registry)
            .unwrap();
        assert_eq!(style.get(f.tint), "green");
        assert_eq!(style.get_local(f.tint).map(String::as_str), Some("green"));

        style.remove_rule(A, &f.registry);
        assert_eq!(style.get(f.tint), "green");

        style.clear_local(f.tint.id(), &f.registry).unwrap();
        assert_eq!(style.get(f.tint), "none");
    }

    #[test]
    fn declarations_are_converted() {
        let f = fixture();
        let mut style = values(&f);
        style
            .apply_declaration(
                A,
                "font-size",
                &RawValue::from("18px"),
                priority(0),
                &f.table,
                &f.registry,
            )
            .unwrap();
        assert_eq!(*style.get(f.size), 18);
    }

    #[test]
    fn bad_declarations_leave_values_alone() {
        let f = fixture();
        let mut style = values(&f);
        style.push(A, priority(0), f.size, 14, &f.registry).unwrap();

        let err = style
            .apply_declaration(
                B,
                "font-size",
                &RawValue::from("large"),
                priority(1),
                &f.table,
                &f.registry,
            )
            .unwrap_err();
        assert!(matches!(err, CascadeError::Validation(_)));

        let err = style
            .apply_declaration(
                B,
                "font-sise",
                &RawValue::from("20"),
                priority(1),
                &f.table,
                &f.registry,
            )
            .unwrap_err();
        assert_eq!(
            err,
            CascadeError::UnknownCssProperty {
                css_name: String::from("font-sise"),
            }
        );
        assert_eq!(*style.get(f.size), 14);
        assert!(!style.has_rule(B));
    }

    #[test]
    fn batches_report_each_property_once() {
        let f = fixture();
        let mut style = values(&f);
        style
            .push(A, priority(0), f.tint, String::from("red"), &f.registry)
            .unwrap();
        let before = f.calls.load(Ordering::SeqCst);

        let changes = style.apply_batch(
            &[A],
            vec![(
                B,
                priority(0),
                f.tint.id(),
                ErasedValue::new(String::from("blue")),
            )],
            &f.registry,
        );
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].old_as::<String>().map(String::as_str), Some("red"));
        assert_eq!(changes[0].new_as::<String>().map(String::as_str), Some("blue"));
        assert_eq!(f.calls.load(Ordering::SeqCst), before + 1);
        assert_eq!(style.rules(), vec![B]);
    }

    #[test]
    fn reset_reverts_everything() {
        let f = fixture();
        let mut style = values(&f);
        style.push(A, priority(0), f.size, 30, &f.registry).unwrap();
        style
            .set_local(f.tint, String::from("teal"), &f.registry)
            .unwrap();
        let changes = style.reset(&f.registry);
        assert_eq!(changes.len(), 2);
        assert_eq!(*style.get(f.size), 12);
        assert!(style.is_empty());
    }

    #[test]
    fn type_mismatch_is_rejected() {
        let f = fixture();
        let mut style = values(&f);
        let err = style
            .push_erased(A, priority(0), f.size.id(), ErasedValue::new(1.5_f64), &f.registry)
            .unwrap_err();
        assert!(matches!(
            err,
            CascadeError::Property(PropertyError::TypeMismatch { name: "fontSize", .. })
        ));
    }

    #[test]
    fn changed_callback_sees_the_owning_node() {
        let owner = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&owner);
        let mut registry = PropertyRegistry::new();
        let style = registry.register_class("Style", None).unwrap();
        let mut table = CssPropertyTable::new(style);
        let size = table
            .register(
                &mut registry,
                CssPropertyOptions::aliased("fontSize", "font-size"),
                PropertyMetadataBuilder::new(12_i64)
                    .converter(parse_int)
                    .on_changed(move |node, _, _| {
                        let key = node.key::<u32>().unwrap_or_default();
                        seen.store(key, Ordering::SeqCst);
                    })
                    .build(),
            )
            .unwrap();
        let mut values = StyleValues::new(9_u32, registry.class_layout(style).unwrap());

        values.push(A, priority(0), size, 14, &registry).unwrap();
        assert_eq!(owner.load(Ordering::SeqCst), 9);
    }
}
