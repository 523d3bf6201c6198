// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type-erased property value storage.
//!
//! [`ErasedValue`] lets one value table hold slots of many different property
//! types. [`PropertyValue`] is the bound every property value type satisfies.

use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

/// Bound for types that can be stored in a property slot.
///
/// Values are cloned out of shared defaults, compared for change suppression,
/// printed in diagnostics, and kept in process-wide schemas, hence the
/// `Send + Sync` requirement.
pub trait PropertyValue: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {}

impl<T> PropertyValue for T where T: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {}

/// A type-erased property value.
///
/// # Example
///
/// ```rust
/// use canopy_property::ErasedValue;
///
/// let value = ErasedValue::new(true);
/// assert!(value.is::<bool>());
/// assert_eq!(value.downcast_ref::<bool>(), Some(&true));
/// assert_eq!(format!("{value:?}"), "true");
/// ```
pub struct ErasedValue {
    inner: Box<dyn ErasedValueTrait>,
    type_id: TypeId,
}

impl ErasedValue {
    /// Wraps a concrete value.
    #[must_use]
    pub fn new<T: PropertyValue>(value: T) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            inner: Box::new(value),
        }
    }

    /// Returns the [`TypeId`] of the contained value.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns `true` if the contained value is of type `T`.
    #[must_use]
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Attempts to downcast to a reference of type `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        if self.is::<T>() {
            self.inner.as_any().downcast_ref()
        } else {
            None
        }
    }

    /// Consumes the wrapper and returns the concrete value, if it is a `T`.
    pub fn downcast<T: PropertyValue>(self) -> Result<T, Self> {
        match self.downcast_ref::<T>() {
            Some(value) => Ok(value.clone()),
            None => Err(self),
        }
    }
}

impl Clone for ErasedValue {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_boxed(),
            type_id: self.type_id,
        }
    }
}

/// Formats as the contained value.
impl fmt::Debug for ErasedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt_value(f)
    }
}

trait ErasedValueTrait: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn clone_boxed(&self) -> Box<dyn ErasedValueTrait>;
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<T: PropertyValue> ErasedValueTrait for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn ErasedValueTrait> {
        Box::new(self.clone())
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::String;

    #[test]
    fn downcast_checks_type() {
        let value = ErasedValue::new(42_i64);
        assert!(value.is::<i64>());
        assert!(!value.is::<f64>());
        assert_eq!(value.downcast_ref::<i64>(), Some(&42));
        assert_eq!(value.downcast_ref::<f64>(), None);
    }

    #[test]
    fn clone_is_deep() {
        let value = ErasedValue::new(String::from("hint"));
        let cloned = value.clone();
        assert_eq!(
            cloned.downcast_ref::<String>().map(String::as_str),
            Some("hint")
        );
        assert_eq!(value.type_id(), cloned.type_id());
    }

    #[test]
    fn downcast_by_value() {
        let value = ErasedValue::new(f64::INFINITY);
        assert_eq!(value.clone().downcast::<f64>().ok(), Some(f64::INFINITY));
        assert!(value.downcast::<bool>().is_err());
    }

    #[test]
    fn debug_shows_the_value() {
        let value = ErasedValue::new(Some(String::from("email")));
        assert_eq!(format!("{:?}", value), "Some(\"email\")");
    }
}
