// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property descriptors.
//!
//! [`PropertyMetadata`] is the immutable description of one attribute: its
//! default value, the converter applied to raw input, the equality comparer
//! used to suppress redundant changes, and the callbacks run on change.
//! [`PropertyMetadataBuilder`] constructs it.

use alloc::boxed::Box;
use core::any::Any;

use crate::convert::{Converter, RawValue};
use crate::error::ValidationError;
use crate::value::PropertyValue;

bitflags::bitflags! {
    /// What a change to a property invalidates on its node.
    ///
    /// Reported with every change so the caller can schedule layout, paint,
    /// restyle or a native sync.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Invalidation: u8 {
        /// Measured size or position may change.
        const LAYOUT = 1;
        /// Only the rendering changes.
        const PAINT = 1 << 1;
        /// Style rules may match differently.
        const STYLE = 1 << 2;
        /// The native widget must be updated.
        const NATIVE = 1 << 3;
    }
}

/// The node whose property changed, identified by the key its store was
/// created with.
///
/// ```rust
/// use canopy_property::ChangedNode;
///
/// let key = 7_u32;
/// let node = ChangedNode::new(&key);
/// assert_eq!(node.key::<u32>(), Some(7));
/// assert_eq!(node.key::<u64>(), None);
/// ```
#[derive(Copy, Clone, Debug)]
pub struct ChangedNode<'a> {
    key: &'a dyn Any,
}

impl<'a> ChangedNode<'a> {
    /// Wraps a node key.
    #[must_use]
    pub fn new<K: Any>(key: &'a K) -> Self {
        Self { key }
    }

    /// Returns the node key if it has type `K`.
    #[must_use]
    pub fn key<K: Any + Copy>(self) -> Option<K> {
        self.key.downcast_ref::<K>().copied()
    }
}

/// Callback invoked with `(node, old, new)` after the effective value changed.
pub type PropertyChangedCallback<T> = Box<dyn Fn(ChangedNode<'_>, &T, &T) + Send + Sync>;

/// Callback adjusting a converted value before it is compared and stored.
pub type CoerceValueCallback<T> = Box<dyn Fn(T) -> T + Send + Sync>;

/// Equality used for change suppression.
pub type EqualityComparer<T> = Box<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// Metadata for a declared property.
///
/// # Example
///
/// ```rust
/// use canopy_property::{Invalidation, PropertyMetadataBuilder, RawValue, boolean_converter};
///
/// let metadata = PropertyMetadataBuilder::new(true)
///     .converter(boolean_converter)
///     .invalidates(Invalidation::NATIVE)
///     .build();
///
/// assert_eq!(metadata.default_value(), &true);
/// assert_eq!(metadata.convert(&RawValue::from("FALSE")), Some(Ok(false)));
/// ```
pub struct PropertyMetadata<T: PropertyValue> {
    default_value: T,
    inherits: bool,
    invalidates: Invalidation,
    converter: Option<Converter<T>>,
    equality_comparer: Option<EqualityComparer<T>>,
    changed_callback: Option<PropertyChangedCallback<T>>,
    coerce_callback: Option<CoerceValueCallback<T>>,
}

impl<T: PropertyValue> PropertyMetadata<T> {
    /// Creates metadata with the given default and nothing else.
    #[must_use]
    pub fn new(default_value: T) -> Self {
        PropertyMetadataBuilder::new(default_value).build()
    }

    /// Returns the default value.
    #[must_use]
    #[inline]
    pub fn default_value(&self) -> &T {
        &self.default_value
    }

    /// Returns whether the value is inherited from the parent node when unset.
    #[must_use]
    #[inline]
    pub fn inherits(&self) -> bool {
        self.inherits
    }

    /// Returns what a change to this property invalidates.
    #[must_use]
    #[inline]
    pub fn invalidates(&self) -> Invalidation {
        self.invalidates
    }

    /// Runs the converter, or returns `None` if the property has none.
    pub fn convert(&self, raw: &RawValue) -> Option<Result<T, ValidationError>> {
        self.converter.as_ref().map(|convert| convert(raw))
    }

    /// Compares two values with the property's equality comparer.
    ///
    /// Falls back to `PartialEq` when no comparer was declared.
    #[must_use]
    #[inline]
    pub fn values_equal(&self, a: &T, b: &T) -> bool {
        match &self.equality_comparer {
            Some(equals) => equals(a, b),
            None => a == b,
        }
    }

    /// Invokes the changed callback if one is set.
    #[inline]
    pub fn on_changed(&self, node: ChangedNode<'_>, old_value: &T, new_value: &T) {
        if let Some(callback) = &self.changed_callback {
            callback(node, old_value, new_value);
        }
    }

    /// Coerces a value using the coerce callback if one is set.
    #[inline]
    pub fn coerce(&self, value: T) -> T {
        match &self.coerce_callback {
            Some(coerce) => coerce(value),
            None => value,
        }
    }

    /// Returns whether a converter is set.
    #[must_use]
    pub fn has_converter(&self) -> bool {
        self.converter.is_some()
    }

    /// Returns whether a changed callback is set.
    #[must_use]
    pub fn has_changed_callback(&self) -> bool {
        self.changed_callback.is_some()
    }
}

impl<T: PropertyValue> core::fmt::Debug for PropertyMetadata<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropertyMetadata")
            .field("default_value", &self.default_value)
            .field("inherits", &self.inherits)
            .field("invalidates", &self.invalidates)
            .field("has_converter", &self.converter.is_some())
            .field("has_equality_comparer", &self.equality_comparer.is_some())
            .field("has_changed_callback", &self.changed_callback.is_some())
            .field("has_coerce_callback", &self.coerce_callback.is_some())
            .finish()
    }
}

/// Builder for [`PropertyMetadata`].
///
/// ```rust
/// use canopy_property::{PropertyMetadataBuilder, parse_int};
///
/// let max_length = PropertyMetadataBuilder::new(f64::INFINITY)
///     .converter(|raw| parse_int(raw).map(|v| v as f64))
///     .coerce(|v: f64| v.max(0.0))
///     .build();
///
/// assert!(max_length.default_value().is_infinite());
/// ```
pub struct PropertyMetadataBuilder<T: PropertyValue> {
    default_value: T,
    inherits: bool,
    invalidates: Invalidation,
    converter: Option<Converter<T>>,
    equality_comparer: Option<EqualityComparer<T>>,
    changed_callback: Option<PropertyChangedCallback<T>>,
    coerce_callback: Option<CoerceValueCallback<T>>,
}

impl<T: PropertyValue> core::fmt::Debug for PropertyMetadataBuilder<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropertyMetadataBuilder")
            .field("default_value", &self.default_value)
            .field("inherits", &self.inherits)
            .field("invalidates", &self.invalidates)
            .field("has_converter", &self.converter.is_some())
            .field("has_equality_comparer", &self.equality_comparer.is_some())
            .field("has_changed_callback", &self.changed_callback.is_some())
            .field("has_coerce_callback", &self.coerce_callback.is_some())
            .finish()
    }
}

impl<T: PropertyValue> PropertyMetadataBuilder<T> {
    /// Creates a builder with the given default value.
    ///
    /// The default is stored as-is; it never passes through the converter.
    #[must_use]
    pub fn new(default_value: T) -> Self {
        Self {
            default_value,
            inherits: false,
            invalidates: Invalidation::empty(),
            converter: None,
            equality_comparer: None,
            changed_callback: None,
            coerce_callback: None,
        }
    }

    /// Sets whether unset values are looked up on the parent node.
    #[must_use]
    pub fn inherits(mut self, inherits: bool) -> Self {
        self.inherits = inherits;
        self
    }

    /// Sets what a change to this property invalidates.
    #[must_use]
    pub fn invalidates(mut self, invalidates: Invalidation) -> Self {
        self.invalidates = invalidates;
        self
    }

    /// Sets the converter applied to raw input.
    #[must_use]
    pub fn converter<F>(mut self, converter: F) -> Self
    where
        F: Fn(&RawValue) -> Result<T, ValidationError> + Send + Sync + 'static,
    {
        self.converter = Some(Box::new(converter));
        self
    }

    /// Replaces `PartialEq` as the change-suppression comparer.
    #[must_use]
    pub fn equality_comparer<F>(mut self, equals: F) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        self.equality_comparer = Some(Box::new(equals));
        self
    }

    /// Sets a callback invoked with `(node, old, new)` after each effective
    /// change.
    #[must_use]
    pub fn on_changed<F>(mut self, callback: F) -> Self
    where
        F: Fn(ChangedNode<'_>, &T, &T) + Send + Sync + 'static,
    {
        self.changed_callback = Some(Box::new(callback));
        self
    }

    /// Sets a callback adjusting values before they are compared and stored.
    #[must_use]
    pub fn coerce<F>(mut self, callback: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.coerce_callback = Some(Box::new(callback));
        self
    }

    /// Builds the [`PropertyMetadata`].
    #[must_use]
    pub fn build(self) -> PropertyMetadata<T> {
        PropertyMetadata {
            default_value: self.default_value,
            inherits: self.inherits,
            invalidates: self.invalidates,
            converter: self.converter,
            equality_comparer: self.equality_comparer,
            changed_callback: self.changed_callback,
            coerce_callback: self.coerce_callback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::boolean_converter;
    use alloc::format;
    use alloc::string::String;
    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn metadata_defaults() {
        let metadata = PropertyMetadata::new(String::new());
        assert_eq!(metadata.default_value(), "");
        assert!(!metadata.inherits());
        assert!(metadata.invalidates().is_empty());
        assert!(!metadata.has_converter());
        assert!(metadata.convert(&RawValue::from("x")).is_none());
    }

    #[test]
    fn custom_comparer_replaces_partial_eq() {
        let metadata = PropertyMetadataBuilder::new(String::new())
            .equality_comparer(|a: &String, b: &String| a.eq_ignore_ascii_case(b))
            .build();
        assert!(metadata.values_equal(&String::from("Go"), &String::from("GO")));
        assert!(!metadata.values_equal(&String::from("go"), &String::from("send")));
    }

    #[test]
    fn converter_runs_on_raw_values() {
        let metadata = PropertyMetadataBuilder::new(false)
            .converter(boolean_converter)
            .build();
        assert_eq!(metadata.convert(&RawValue::from("true")), Some(Ok(true)));
        assert!(matches!(
            metadata.convert(&RawValue::from("maybe")),
            Some(Err(_))
        ));
    }

    #[test]
    fn coerce_and_changed_callback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let metadata = PropertyMetadataBuilder::new(0_i64)
            .coerce(|v| v.max(0))
            .on_changed(move |node, old, new| {
                assert!(old != new, "callback only sees real changes");
                assert_eq!(node.key::<u32>(), Some(3));
                seen.fetch_add(1, Ordering::SeqCst);
            })
            .build();

        assert_eq!(metadata.coerce(-3), 0);
        metadata.on_changed(ChangedNode::new(&3_u32), &0, &4);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn metadata_debug() {
        let metadata = PropertyMetadataBuilder::new(42_i64)
            .invalidates(Invalidation::LAYOUT)
            .build();
        let debug = format!("{:?}", metadata);
        assert!(debug.contains("PropertyMetadata"), "{debug}");
        assert!(debug.contains("42"), "{debug}");
        assert!(debug.contains("LAYOUT"), "{debug}");
    }
}
