// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;

use canopy_property::ErasedValue;

use crate::keywords::InputType;

/// The platform widget behind an editable text node.
///
/// The node calls into the bridge with validated values only. The bridge
/// reports user interaction back through
/// [`EditableTextBase::deliver_event`](crate::EditableTextBase::deliver_event)
/// and
/// [`EditableTextBase::native_text_changed`](crate::EditableTextBase::native_text_changed).
pub trait NativeBridge: fmt::Debug {
    /// A property that affects the native widget changed.
    fn property_changed(&mut self, name: &'static str, value: &ErasedValue);

    /// Hides the soft keyboard.
    fn dismiss_soft_input(&mut self);

    /// Applies the input type derived from `keyboardType`.
    fn set_input_type(&mut self, input_type: InputType);
}

/// A bridge for nodes without a native widget. Every call is ignored.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullBridge;

impl NativeBridge for NullBridge {
    fn property_changed(&mut self, _name: &'static str, _value: &ErasedValue) {}

    fn dismiss_soft_input(&mut self) {}

    fn set_input_type(&mut self, _input_type: InputType) {}
}
