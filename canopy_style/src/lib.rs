// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Style: CSS-backed properties, cascade reversion and pseudo-classes.
//!
//! This crate sits on top of `canopy_property` and adds the pieces a styled
//! node needs:
//!
//! - [`CssPropertyTable`] declares CSS properties on a style class, each with
//!   a kebab-case CSS name and either a node-level alias or no node accessor
//!   at all ([`NodeAccessor::StyleOnly`]).
//! - [`StyleValues`] is a node's style object. It keeps every value pushed by
//!   a style rule, ranked by [`Priority`], so that removing a rule reverts the
//!   property to the next-ranked value or to its default.
//! - [`StyleSheet`] and [`StyleScope`] decide which rules apply to a node and
//!   apply them synchronously with [`StyleScope::restyle`].
//! - [`PseudoClassHandlers`] and [`PseudoClassState`] track pseudo-classes
//!   such as `:focus`, subscribing a node's handlers when styling becomes
//!   interested in them and unsubscribing when it no longer is.
//!
//! ## Value Resolution
//!
//! For a CSS property on a node:
//!
//! **Local value → highest-priority rule → style class default**
//!
//! Priorities compare [`StyleOrigin`] first, then selector [`Specificity`],
//! then rule order. Equal priorities favor the most recent push.
//!
//! ## Example
//!
//! ```rust
//! use canopy_property::{PropertyMetadataBuilder, PropertyRegistry, RawValue, string_converter};
//! use canopy_style::{
//!     CssPropertyOptions, CssPropertyTable, PseudoClassId, Selector, SelectorInputs,
//!     StyleScope, StyleSheetBuilder, StyleValues,
//! };
//!
//! const FOCUS: PseudoClassId = PseudoClassId(0);
//!
//! let mut registry = PropertyRegistry::new();
//! let style = registry.register_class("Style", None).unwrap();
//! let field = registry.register_class("TextField", None).unwrap();
//! let mut table = CssPropertyTable::new(style);
//! let border = table
//!     .register(
//!         &mut registry,
//!         CssPropertyOptions::aliased("borderColor", "border-color"),
//!         PropertyMetadataBuilder::new(String::from("black"))
//!             .converter(string_converter)
//!             .build(),
//!     )
//!     .unwrap();
//!
//! let sheet = StyleSheetBuilder::new(&table, &registry)
//!     .rule(
//!         Selector::for_type(field).with_pseudos([FOCUS]),
//!         [("border-color", RawValue::from("blue"))],
//!     )
//!     .build();
//! let mut scope = StyleScope::new();
//! scope.add_sheet(sheet);
//!
//! let mut values = StyleValues::new(1_u32, registry.class_layout(style).unwrap());
//! let chain = [field];
//!
//! let idle = scope.restyle(&mut values, &SelectorInputs::new(&chain, &[], &[]), &registry);
//! assert_eq!(idle.pseudo_interest.as_slice(), &[FOCUS]);
//! assert_eq!(values.get(border), "black");
//!
//! scope.restyle(&mut values, &SelectorInputs::new(&chain, &[], &[FOCUS]), &registry);
//! assert_eq!(values.get(border), "blue");
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod cascade;
mod css;
mod error;
mod pseudo;
mod scope;
mod selector;
mod stylesheet;

pub use cascade::{Priority, RuleKey, StyleOrigin, StyleValues};
pub use css::{CssProperty, CssPropertyOptions, CssPropertyTable, NodeAccessor};
pub use error::CascadeError;
pub use pseudo::{
    HandlerId, PseudoClassHandler, PseudoClassHandlers, PseudoClassHost, PseudoClassState,
};
pub use scope::{Restyle, StyleScope};
pub use selector::{ClassId, IdSet, PseudoClassId, Selector, SelectorInputs, Specificity};
pub use stylesheet::{Declaration, Diagnostic, StyleRule, StyleSheet, StyleSheetBuilder};
