// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-class value layouts.

use alloc::vec::Vec;

use crate::id::{NodeClassId, PropertyId};
use crate::value::ErasedValue;

/// The fixed set of property slots carried by nodes of one class.
///
/// Built by [`PropertyRegistry::class_layout`](crate::PropertyRegistry::class_layout)
/// and shared (behind an `Arc`) by every node of the class. Slot lookup by
/// [`PropertyId`] is a single index.
#[derive(Debug)]
pub struct ClassLayout {
    class: NodeClassId,
    class_name: &'static str,
    slots: Vec<PropertyId>,
    slot_of: Vec<Option<u16>>,
    defaults: Vec<ErasedValue>,
}

impl ClassLayout {
    pub(crate) fn new(
        class: NodeClassId,
        class_name: &'static str,
        property_count: usize,
        slots: Vec<PropertyId>,
        defaults: Vec<ErasedValue>,
    ) -> Self {
        let mut slot_of = alloc::vec![None; property_count];
        for (slot, id) in slots.iter().enumerate() {
            if let (Some(entry), Ok(slot)) =
                (slot_of.get_mut(usize::from(id.index())), u16::try_from(slot))
            {
                *entry = Some(slot);
            }
        }
        Self {
            class,
            class_name,
            slots,
            slot_of,
            defaults,
        }
    }

    /// Returns the class this layout was built for.
    #[must_use]
    #[inline]
    pub fn class(&self) -> NodeClassId {
        self.class
    }

    /// Returns the name of the class this layout was built for.
    #[must_use]
    #[inline]
    pub fn class_name(&self) -> &'static str {
        self.class_name
    }

    /// Returns the number of slots.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the class carries no properties.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the slot holding `id`, if the class carries it.
    #[must_use]
    #[inline]
    pub fn slot(&self, id: PropertyId) -> Option<usize> {
        self.slot_of
            .get(usize::from(id.index()))
            .copied()
            .flatten()
            .map(usize::from)
    }

    /// Returns `true` if the class carries `id`.
    #[must_use]
    pub fn contains(&self, id: PropertyId) -> bool {
        self.slot(id).is_some()
    }

    /// Returns the property stored in `slot`.
    #[must_use]
    pub fn property_at(&self, slot: usize) -> Option<PropertyId> {
        self.slots.get(slot).copied()
    }

    /// Returns the default for `slot`, including class refinements.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range.
    #[must_use]
    pub fn default_at(&self, slot: usize) -> &ErasedValue {
        &self.defaults[slot]
    }

    /// Iterates the carried properties in slot order.
    pub fn properties(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.slots.iter().copied()
    }
}
