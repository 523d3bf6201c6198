// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node property storage.
//!
//! [`PropertyStore`] holds the explicitly assigned values of one node. Which
//! properties the node carries, and their defaults, come from the node's
//! shared [`ClassLayout`].
//!
//! # Implementation
//!
//! Assigned values live in a sorted `SmallVec` searched by [`PropertyId`].
//! Most nodes assign only a handful of their properties, so the first eight
//! are stored inline.
//!
//! # Change semantics
//!
//! Every write goes through the same steps: coerce, compare against the
//! current effective value with the property's equality comparer, store, and
//! only if the value differs run the changed callback and report a
//! [`PropertyChange`]. Writing an equal value is therefore silent.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use smallvec::SmallVec;

use crate::convert::RawValue;
use crate::error::PropertyError;
use crate::id::{Property, PropertyId};
use crate::layout::ClassLayout;
use crate::metadata::{ChangedNode, Invalidation};
use crate::registry::{PropertyRegistration, PropertyRegistry};
use crate::value::{ErasedValue, PropertyValue};

/// Most nodes assign fewer than 8 properties.
const INLINE_CAPACITY: usize = 8;

/// A change to a node's effective value.
#[derive(Clone, Debug)]
pub struct PropertyChange {
    /// The changed property.
    pub property: PropertyId,
    /// Its name.
    pub name: &'static str,
    /// What the change invalidates.
    pub invalidates: Invalidation,
    /// The previous effective value.
    pub old: ErasedValue,
    /// The new effective value.
    pub new: ErasedValue,
}

impl PropertyChange {
    /// Returns the previous value as `T`.
    #[must_use]
    pub fn old_as<T: 'static>(&self) -> Option<&T> {
        self.old.downcast_ref()
    }

    /// Returns the new value as `T`.
    #[must_use]
    pub fn new_as<T: 'static>(&self) -> Option<&T> {
        self.new.downcast_ref()
    }
}

/// Per-node storage for assigned property values.
///
/// # Example
///
/// ```rust
/// use canopy_property::{PropertyMetadataBuilder, PropertyRegistry, PropertyStore, parse_int};
///
/// let mut registry = PropertyRegistry::new();
/// let view = registry.register_class("View", None).unwrap();
/// let max_length = registry
///     .register(
///         view,
///         "maxLength",
///         PropertyMetadataBuilder::new(f64::INFINITY)
///             .converter(|raw| parse_int(raw).map(|v| v as f64))
///             .build(),
///     )
///     .unwrap();
///
/// let mut store = PropertyStore::new(1_u32, registry.class_layout(view).unwrap());
/// assert!(store.get(max_length).is_infinite());
///
/// let change = store.set_raw(max_length, &"7".into(), &registry).unwrap();
/// assert!(change.is_some());
/// assert_eq!(*store.get(max_length), 7.0);
///
/// // Equal writes are silent.
/// assert!(store.set(max_length, 7.0, &registry).unwrap().is_none());
///
/// // Clearing reverts to the default.
/// assert!(store.clear(max_length.id(), &registry).is_some());
/// assert!(store.get(max_length).is_infinite());
/// ```
#[derive(Debug)]
pub struct PropertyStore<K> {
    /// Assigned values, sorted by [`PropertyId`].
    entries: SmallVec<[(PropertyId, ErasedValue); INLINE_CAPACITY]>,
    layout: Arc<ClassLayout>,
    owner: K,
}

impl<K: Copy + Eq + core::fmt::Debug + 'static> PropertyStore<K> {
    /// Creates an empty store for a node of the layout's class.
    #[must_use]
    pub fn new(owner: K, layout: Arc<ClassLayout>) -> Self {
        Self {
            entries: SmallVec::new(),
            layout,
            owner,
        }
    }

    /// Returns the owner key of this store.
    #[must_use]
    #[inline]
    pub fn owner(&self) -> K {
        self.owner
    }

    /// Returns the node's class layout.
    #[must_use]
    #[inline]
    pub fn layout(&self) -> &Arc<ClassLayout> {
        &self.layout
    }

    /// Returns `true` if no properties have assigned values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of properties with assigned values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the property IDs that have assigned values, in ID order.
    pub fn property_ids(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    #[inline]
    fn find_entry(&self, id: PropertyId) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&id, |(pid, _)| *pid)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Returns the assigned value, if any.
    #[must_use]
    pub fn get_local_erased(&self, id: PropertyId) -> Option<&ErasedValue> {
        self.find_entry(id).ok().map(|idx| &self.entries[idx].1)
    }

    /// Returns the class default for a carried property.
    #[must_use]
    pub fn default_erased(&self, id: PropertyId) -> Option<&ErasedValue> {
        self.layout.slot(id).map(|slot| self.layout.default_at(slot))
    }

    /// Returns the effective value (assigned, else class default).
    ///
    /// Returns `None` if the node's class does not carry the property.
    #[must_use]
    pub fn get_erased(&self, id: PropertyId) -> Option<&ErasedValue> {
        self.get_local_erased(id)
            .or_else(|| self.default_erased(id))
    }

    /// Returns the assigned value, if any.
    #[must_use]
    pub fn get_local<T: PropertyValue>(&self, property: Property<T>) -> Option<&T> {
        self.get_local_erased(property.id())
            .and_then(ErasedValue::downcast_ref)
    }

    /// Returns `true` if the property has an assigned value.
    #[must_use]
    #[inline]
    pub fn has_local(&self, id: PropertyId) -> bool {
        self.find_entry(id).is_ok()
    }

    /// Returns the effective value.
    ///
    /// # Errors
    ///
    /// Fails if the node's class does not carry the property or the handle's
    /// type does not match the declaration.
    pub fn try_get<'a, T: PropertyValue>(
        &'a self,
        property: Property<T>,
        registry: &PropertyRegistry,
    ) -> Result<&'a T, PropertyError> {
        let registration = self.registration(property.id(), registry)?;
        check_type::<T>(registration)?;
        self.get_erased(property.id())
            .and_then(ErasedValue::downcast_ref)
            .ok_or(PropertyError::NotOnClass {
                class: self.layout.class_name(),
                name: registration.name(),
            })
    }

    /// Returns the effective value.
    ///
    /// # Panics
    ///
    /// Panics if the node's class does not carry the property or the handle's
    /// type does not match the declaration. Use [`try_get`](Self::try_get) for
    /// handles that did not come from this node's schema.
    #[must_use]
    pub fn get<T: PropertyValue>(&self, property: Property<T>) -> &T {
        match self
            .get_erased(property.id())
            .and_then(ErasedValue::downcast_ref)
        {
            Some(value) => value,
            None => panic!(
                "{:?} is not a `{}` property of class `{}`",
                property.id(),
                core::any::type_name::<T>(),
                self.layout.class_name()
            ),
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Assigns a typed value.
    ///
    /// Returns the change, or `None` if the effective value is unchanged.
    pub fn set<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        value: T,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, PropertyError> {
        self.set_erased(property.id(), ErasedValue::new(value), registry)
    }

    /// Converts and assigns a raw value.
    ///
    /// On a conversion failure nothing is stored and no callback runs.
    pub fn set_raw<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        raw: &RawValue,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, PropertyError> {
        self.set_raw_erased(property.id(), raw, registry)
    }

    /// Converts and assigns a raw value by ID.
    pub fn set_raw_erased(
        &mut self,
        id: PropertyId,
        raw: &RawValue,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, PropertyError> {
        let registration = self.registration(id, registry)?;
        let value = registration
            .convert(raw)
            .ok_or(PropertyError::NoConverter(registration.name()))??;
        self.set_erased(id, value, registry)
    }

    /// Assigns a type-erased value by ID.
    pub fn set_erased(
        &mut self,
        id: PropertyId,
        value: ErasedValue,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, PropertyError> {
        let registration = self.registration(id, registry)?;
        if value.type_id() != registration.type_id() {
            return Err(PropertyError::TypeMismatch {
                name: registration.name(),
                declared: registration.type_name(),
            });
        }
        let value = registration.coerce(value);
        let old = self.get_erased(id).cloned();

        match self.find_entry(id) {
            Ok(idx) => self.entries[idx].1 = value.clone(),
            Err(idx) => self.entries.insert(idx, (id, value.clone())),
        }

        Ok(old.and_then(|old| self.report(registration, id, old, value)))
    }

    /// Removes the assigned value, reverting to the class default.
    ///
    /// Returns the change, or `None` if nothing was assigned or the default
    /// equals the removed value.
    pub fn clear(&mut self, id: PropertyId, registry: &PropertyRegistry) -> Option<PropertyChange> {
        let idx = self.find_entry(id).ok()?;
        let (_, old) = self.entries.remove(idx);
        let registration = registry.get(id)?;
        let new = self.default_erased(id)?.clone();
        self.report(registration, id, old, new)
    }

    /// Removes every assigned value.
    ///
    /// Returns the changes in property order.
    pub fn reset(&mut self, registry: &PropertyRegistry) -> Vec<PropertyChange> {
        let ids: Vec<_> = self.property_ids().collect();
        ids.into_iter()
            .filter_map(|id| self.clear(id, registry))
            .collect()
    }

    fn registration<'r>(
        &self,
        id: PropertyId,
        registry: &'r PropertyRegistry,
    ) -> Result<&'r PropertyRegistration, PropertyError> {
        let registration = registry.get(id).ok_or_else(|| {
            PropertyError::UnknownProperty(alloc::format!("{id}"))
        })?;
        if !self.layout.contains(id) {
            return Err(PropertyError::NotOnClass {
                class: self.layout.class_name(),
                name: registration.name(),
            });
        }
        Ok(registration)
    }

    fn report(
        &self,
        registration: &PropertyRegistration,
        id: PropertyId,
        old: ErasedValue,
        new: ErasedValue,
    ) -> Option<PropertyChange> {
        if registration.values_equal(&old, &new) {
            return None;
        }
        registration.notify_changed(ChangedNode::new(&self.owner), &old, &new);
        tracing::debug!(
            owner = ?self.owner,
            property = registration.name(),
            ?old,
            ?new,
            "property changed"
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

fn check_type<T: 'static>(registration: &PropertyRegistration) -> Result<(), PropertyError> {
    if registration.type_id() == TypeId::of::<T>() {
        Ok(())
    } else {
        Err(PropertyError::TypeMismatch {
            name: registration.name(),
            declared: registration.type_name(),
        })
    }
}

impl<K: Copy> Clone for PropertyStore<K> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            layout: Arc::clone(&self.layout),
            owner: self.owner,
        }
    }
}
