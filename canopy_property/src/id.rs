// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property and node class identification types.
//!
//! [`PropertyId`] identifies a declared property at runtime, [`Property<T>`]
//! is the typed handle handed out at declaration time, and [`NodeClassId`]
//! identifies a node class in the registry's class hierarchy.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

/// A runtime property identifier.
///
/// Property IDs are dense: the registry hands them out in declaration order
/// starting at zero, which lets class layouts index by ID directly.
///
/// # Example
///
/// ```rust
/// use canopy_property::PropertyId;
///
/// let id = PropertyId::new(42);
/// assert_eq!(id.index(), 42);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyId(u16);

impl PropertyId {
    /// Creates a new property ID from the given index.
    ///
    /// This is typically called by [`PropertyRegistry::register`](crate::PropertyRegistry::register)
    /// rather than directly.
    #[must_use]
    #[inline]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the underlying index of this property ID.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyId").field(&self.0).finish()
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyId({})", self.0)
    }
}

/// A type-safe property handle.
///
/// The phantom type ties the handle to the value type the property was
/// declared with, so typed reads and writes are checked at compile time:
///
/// ```rust
/// use canopy_property::{PropertyMetadataBuilder, PropertyRegistry};
///
/// let mut registry = PropertyRegistry::new();
/// let view = registry.register_class("View", None).unwrap();
/// let hint = registry
///     .register(view, "hint", PropertyMetadataBuilder::new(String::new()).build())
///     .unwrap();
///
/// // store.set(hint, 3, &registry); // Would not compile: `hint` holds a `String`.
/// # let _ = hint;
/// ```
pub struct Property<T> {
    id: PropertyId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Property<T> {
    /// Creates a typed handle from a property ID.
    ///
    /// The caller must make sure the ID was declared with value type `T`;
    /// a mismatch is reported as [`PropertyError::TypeMismatch`](crate::PropertyError::TypeMismatch)
    /// on access.
    #[must_use]
    #[inline]
    pub const fn from_id(id: PropertyId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// Returns the underlying property ID.
    #[must_use]
    #[inline]
    pub const fn id(self) -> PropertyId {
        self.id
    }
}

impl<T> Copy for Property<T> {}

impl<T> Clone for Property<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Property<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Property<T> {}

impl<T> Hash for Property<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("id", &self.id)
            .field("type", &core::any::type_name::<T>())
            .finish()
    }
}

/// Identifies a node class (`View`, `TextBase`, `EditableTextBase`, ...).
///
/// Classes form a single-inheritance tree inside a
/// [`PropertyRegistry`](crate::PropertyRegistry); a node of a class carries
/// every property declared on the class and on its ancestors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeClassId(u16);

impl NodeClassId {
    /// Creates a class ID from its registry index.
    #[must_use]
    #[inline]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the registry index of this class.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::String;

    #[test]
    fn property_id_basics() {
        let id = PropertyId::new(42);
        assert_eq!(id.index(), 42);
        assert_eq!(id, PropertyId::new(42));
        assert_ne!(id, PropertyId::new(43));
    }

    #[test]
    fn property_id_formatting() {
        let id = PropertyId::new(7);
        assert_eq!(format!("{:?}", id), "PropertyId(7)");
        assert_eq!(format!("{}", id), "PropertyId(7)");
    }

    #[test]
    fn typed_handles_share_ids() {
        let id = PropertyId::new(1);
        let as_bool: Property<bool> = Property::from_id(id);
        let as_text: Property<String> = Property::from_id(id);
        assert_eq!(as_bool.id(), as_text.id());
    }

    #[test]
    fn property_debug_names_value_type() {
        let prop: Property<bool> = Property::from_id(PropertyId::new(3));
        let debug = format!("{:?}", prop);
        assert!(debug.contains("bool"), "debug output was {debug}");
    }

    #[test]
    fn handles_stay_two_bytes() {
        use core::mem::size_of;
        assert_eq!(size_of::<PropertyId>(), 2);
        assert_eq!(size_of::<Property<String>>(), 2);
        assert_eq!(size_of::<NodeClassId>(), 2);
    }
}
