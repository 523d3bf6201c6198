// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Editable Text: the shared base of text input nodes.
//!
//! [`EditableTextBase`] carries the attribute surface of a text field:
//!
//! - `text`, inherited from the `TextBase` class.
//! - `keyboardType`, `returnKeyType` and `autocapitalizationType`, validated
//!   against their keyword sets.
//! - `editable`, `autocorrect`, `hint` and `maxLength`.
//! - `updateTextTrigger`, which decides whether native edits reach `text`
//!   immediately or when the field loses focus.
//! - The CSS properties `color` (also settable on the node) and
//!   `placeholderColor` (style object only).
//!
//! Attribute input is converted and validated before it is stored; rejected
//! input leaves the previous value in place. Properties that affect the
//! platform widget are forwarded to a [`NativeBridge`].
//!
//! The `:focus` and `:blur` pseudo-classes are followed only while styling is
//! interested in them. The node then listens to `focus` and `blur` events and
//! restyles on each transition; [`EditableTextBase::destroy`] removes those
//! listeners again.
//!
//! ## Example
//!
//! ```rust
//! use canopy_editable_text::{EditableTextBase, FOCUS, FOCUS_EVENT, EventData, schema};
//! use canopy_property::RawValue;
//! use canopy_style::{Selector, StyleScope, StyleSheetBuilder};
//!
//! let schema = schema();
//! let sheet = StyleSheetBuilder::new(&schema.css, &schema.registry)
//!     .rule(
//!         Selector::for_type(schema.classes.editable_text_base).with_pseudos([FOCUS]),
//!         [("color", RawValue::from("red"))],
//!     )
//!     .build();
//! let mut scope = StyleScope::new();
//! scope.add_sheet(sheet);
//!
//! let mut field = EditableTextBase::new(1);
//! field.set_style_scope(Some(scope));
//! assert_eq!(field.color(), None);
//!
//! field.deliver_event(&EventData::new(FOCUS_EVENT));
//! assert_eq!(field.color().map(|c| c.to_rgba8().r), Some(255));
//!
//! field.destroy();
//! assert_eq!(field.listener_count(FOCUS_EVENT), 0);
//! ```

mod color;
mod editable_text;
mod events;
mod keywords;
mod native;
mod schema;

pub use color::Color;
pub use editable_text::EditableTextBase;
pub use events::{
    BLUR_EVENT, EventData, EventListeners, EventSubsystem, FOCUS_EVENT, Listener,
    TEXT_CHANGE_EVENT,
};
pub use keywords::{
    AutocapitalizationType, InputType, KeyboardType, ReturnKeyType, UpdateTextTrigger,
};
pub use native::{NativeBridge, NullBridge};
pub use schema::{BLUR, Classes, EditableTextSchema, FOCUS, Properties, initialize, schema};
