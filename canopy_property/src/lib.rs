// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Property: typed, validated node properties.
//!
//! This crate is the bottom layer of Canopy's attribute system. A node class
//! declares its properties once; each node then stores only the values that
//! were explicitly assigned to it.
//!
//! ## Core Concepts
//!
//! - [`PropertyRegistry`] holds the node class hierarchy and every declared
//!   property. A property declared on a class is carried by all subclasses,
//!   which may refine its default with [`PropertyRegistry::override_default`].
//! - [`PropertyMetadata`] describes one property: default, converter,
//!   equality comparer, coerce and changed callbacks, and what a change
//!   [`Invalidation`]s.
//! - [`PropertyStore`] holds one node's assigned values on top of its class's
//!   shared [`ClassLayout`].
//! - Raw input ([`RawValue`]) passes through a converter. Keyword properties
//!   use [`make_validator`] and [`make_parser`]; see also [`boolean_converter`]
//!   and [`parse_int`].
//!
//! ## Change Notification
//!
//! A write whose value equals the current effective value (under the
//! property's comparer) is silent. Any other write runs the changed callback
//! exactly once and returns a [`PropertyChange`].
//!
//! ## Quick Start
//!
//! ```rust
//! use canopy_property::{
//!     Invalidation, PropertyMetadataBuilder, PropertyRegistry, PropertyStore, RawValue,
//!     boolean_converter,
//! };
//!
//! let mut registry = PropertyRegistry::new();
//! let view = registry.register_class("View", None).unwrap();
//! let editable = registry
//!     .register(
//!         view,
//!         "editable",
//!         PropertyMetadataBuilder::new(true)
//!             .converter(boolean_converter)
//!             .invalidates(Invalidation::NATIVE)
//!             .build(),
//!     )
//!     .unwrap();
//!
//! let mut store = PropertyStore::new(0_u32, registry.class_layout(view).unwrap());
//! let change = store
//!     .set_raw(editable, &RawValue::from("false"), &registry)
//!     .unwrap()
//!     .unwrap();
//! assert!(change.invalidates.contains(Invalidation::NATIVE));
//! assert!(!*store.get(editable));
//!
//! // Invalid input is rejected and the old value kept.
//! assert!(store.set_raw(editable, &RawValue::from("sometimes"), &registry).is_err());
//! assert!(!*store.get(editable));
//! ```
//!
//! ## Inheritance
//!
//! [`PropertyHostExt::get_inherited`] resolves properties declared with
//! `inherits(true)` by walking the parent chain. Style resolution lives in
//! `canopy_style`.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod convert;
mod error;
mod id;
mod layout;
mod metadata;
mod object;
mod registry;
mod store;
mod value;

pub use convert::{
    Converter, Keyword, RawValue, Validator, boolean_converter, make_parser, make_validator,
    optional, parse_int, string_converter,
};
pub use error::{Expected, PropertyError, RegistrationError, ValidationError};
pub use id::{NodeClassId, Property, PropertyId};
pub use layout::ClassLayout;
pub use metadata::{
    ChangedNode, CoerceValueCallback, EqualityComparer, Invalidation, PropertyChangedCallback,
    PropertyMetadata, PropertyMetadataBuilder,
};
pub use object::{ParentLookup, PropertyHost, PropertyHostExt, walk_inherited};
pub use registry::{PropertyRegistration, PropertyRegistry};
pub use store::{PropertyChange, PropertyStore};
pub use value::{ErasedValue, PropertyValue};
