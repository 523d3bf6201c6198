// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property host traits.
//!
//! [`PropertyHost`] is implemented by node types that own a [`PropertyStore`].
//! [`PropertyHostExt`] adds typed, raw and by-name access on top, plus
//! inheritance resolution through [`walk_inherited`].

use crate::convert::RawValue;
use crate::error::PropertyError;
use crate::id::{Property, PropertyId};
use crate::registry::PropertyRegistry;
use crate::store::{PropertyChange, PropertyStore};
use crate::value::PropertyValue;

/// A lookup mechanism for walking parent chains for inheritance.
///
/// Given a node key, returns its [`PropertyStore`] and its parent key.
pub trait ParentLookup<'a, K: Copy + Eq + 'a> {
    /// Looks up the store and parent key for `key`.
    fn lookup(&self, key: K) -> Option<(&'a PropertyStore<K>, Option<K>)>;
}

impl<'a, K, F> ParentLookup<'a, K> for F
where
    K: Copy + Eq + 'a,
    F: Fn(K) -> Option<(&'a PropertyStore<K>, Option<K>)>,
{
    #[inline]
    fn lookup(&self, key: K) -> Option<(&'a PropertyStore<K>, Option<K>)> {
        self(key)
    }
}

/// Walks the parent chain looking for an assigned value.
///
/// Returns the first ancestor's assigned value, or `None` if no ancestor
/// assigns the property.
pub fn walk_inherited<'a, K, T, F>(
    mut current_key: Option<K>,
    property: Property<T>,
    store_lookup: &F,
) -> Option<&'a T>
where
    K: Copy + Eq + core::fmt::Debug + 'static,
    T: PropertyValue,
    F: ParentLookup<'a, K> + ?Sized,
{
    while let Some(key) = current_key {
        let (store, parent) = store_lookup.lookup(key)?;
        if let Some(value) = store.get_local(property) {
            return Some(value);
        }
        current_key = parent;
    }
    None
}

/// A node that owns a [`PropertyStore`].
///
/// # Example
///
/// ```rust
/// use canopy_property::{PropertyHost, PropertyStore};
///
/// struct Label {
///     key: u32,
///     parent: Option<u32>,
///     store: PropertyStore<u32>,
/// }
///
/// impl PropertyHost<u32> for Label {
///     fn property_store(&self) -> &PropertyStore<u32> {
///         &self.store
///     }
///
///     fn property_store_mut(&mut self) -> &mut PropertyStore<u32> {
///         &mut self.store
///     }
///
///     fn key(&self) -> u32 {
///         self.key
///     }
///
///     fn parent_key(&self) -> Option<u32> {
///         self.parent
///     }
/// }
/// ```
pub trait PropertyHost<K: Copy + Eq> {
    /// Returns the node's property store.
    fn property_store(&self) -> &PropertyStore<K>;

    /// Returns the node's property store mutably.
    fn property_store_mut(&mut self) -> &mut PropertyStore<K>;

    /// Returns the key that identifies this node.
    fn key(&self) -> K;

    /// Returns the parent's key, if this node has a parent.
    fn parent_key(&self) -> Option<K>;
}

/// Convenience access for [`PropertyHost`]s.
pub trait PropertyHostExt<K: Copy + Eq + core::fmt::Debug + 'static>: PropertyHost<K> {
    /// Returns the effective value.
    ///
    /// # Panics
    ///
    /// Panics if the node's class does not carry the property.
    fn get_value<T: PropertyValue>(&self, property: Property<T>) -> &T {
        self.property_store().get(property)
    }

    /// Assigns a typed value.
    fn set_value<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        value: T,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, PropertyError> {
        self.property_store_mut().set(property, value, registry)
    }

    /// Converts and assigns a raw value.
    fn set_raw_value<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        raw: &RawValue,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, PropertyError> {
        self.property_store_mut().set_raw(property, raw, registry)
    }

    /// Looks a property up by name on the node's class and assigns a raw value.
    fn set_by_name(
        &mut self,
        name: &str,
        raw: &RawValue,
        registry: &PropertyRegistry,
    ) -> Result<Option<PropertyChange>, PropertyError> {
        let id = property_by_name(self.property_store(), name, registry)?;
        self.property_store_mut().set_raw_erased(id, raw, registry)
    }

    /// Removes the assigned value, reverting to the default.
    fn clear_value(&mut self, id: PropertyId, registry: &PropertyRegistry) -> Option<PropertyChange> {
        self.property_store_mut().clear(id, registry)
    }

    /// Resolves a value with inheritance: own assignment, then the nearest
    /// ancestor's assignment for inheriting properties, then the class default.
    fn get_inherited<'a, T, F>(
        &'a self,
        property: Property<T>,
        registry: &PropertyRegistry,
        store_lookup: &F,
    ) -> &'a T
    where
        K: 'a,
        T: PropertyValue,
        F: ParentLookup<'a, K> + ?Sized,
    {
        let store = self.property_store();
        if let Some(value) = store.get_local(property) {
            return value;
        }
        if registry.get(property.id()).is_some_and(|r| r.inherits())
            && let Some(value) = walk_inherited(self.parent_key(), property, store_lookup)
        {
            return value;
        }
        store.get(property)
    }
}

impl<K: Copy + Eq + core::fmt::Debug + 'static, H: PropertyHost<K> + ?Sized> PropertyHostExt<K> for H {}

/// Resolves `name` against the store's class.
pub(crate) fn property_by_name<K: Copy + Eq + core::fmt::Debug + 'static>(
    store: &PropertyStore<K>,
    name: &str,
    registry: &PropertyRegistry,
) -> Result<PropertyId, PropertyError> {
    registry
        .by_name(store.layout().class(), name)
        .ok_or_else(|| PropertyError::UnknownProperty(name.into()))
}
