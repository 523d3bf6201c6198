// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The process-wide editable-text schema.
//!
//! Classes, properties and pseudo-class handlers are declared once, the first
//! time [`schema`] or [`initialize`] runs, and are read-only afterwards.

use std::sync::{Arc, OnceLock};

use canopy_property::{
    ClassLayout, Invalidation, NodeClassId, Property, PropertyMetadata, PropertyMetadataBuilder,
    PropertyRegistry, RawValue, RegistrationError, ValidationError, boolean_converter, make_parser,
    make_validator, optional, parse_int, string_converter,
};
use canopy_style::{
    CssProperty, CssPropertyOptions, CssPropertyTable, HandlerId, PseudoClassHandlers,
    PseudoClassId,
};

use crate::color::Color;
use crate::editable_text::{EditableTextBase, focus_state_handler};
use crate::keywords::{AutocapitalizationType, KeyboardType, ReturnKeyType, UpdateTextTrigger};

/// The `:focus` pseudo-class.
pub const FOCUS: PseudoClassId = PseudoClassId(0);
/// The `:blur` pseudo-class, active after the field lost focus.
pub const BLUR: PseudoClassId = PseudoClassId(1);

/// The node classes of the schema.
#[derive(Copy, Clone, Debug)]
pub struct Classes {
    /// Root of the node hierarchy.
    pub view: NodeClassId,
    /// Nodes that display text.
    pub text_base: NodeClassId,
    /// Nodes whose text the user can edit.
    pub editable_text_base: NodeClassId,
    /// The style object class carrying CSS properties.
    pub style: NodeClassId,
}

/// Handles to every declared property.
#[derive(Copy, Clone, Debug)]
pub struct Properties {
    /// `text`, declared on `TextBase`.
    pub text: Property<String>,
    /// `keyboardType`; unset means plain text.
    pub keyboard_type: Property<Option<KeyboardType>>,
    /// `returnKeyType`; unset leaves the platform's label.
    pub return_key_type: Property<Option<ReturnKeyType>>,
    /// `autocapitalizationType`.
    pub autocapitalization_type: Property<AutocapitalizationType>,
    /// `editable`.
    pub editable: Property<bool>,
    /// `autocorrect`; unset defers to the platform.
    pub autocorrect: Property<Option<bool>>,
    /// `hint`.
    pub hint: Property<String>,
    /// `maxLength`; infinite when unset.
    pub max_length: Property<f64>,
    /// `updateTextTrigger`.
    pub update_text_trigger: Property<UpdateTextTrigger>,
    /// `color`, aliased on the node.
    pub color: CssProperty<Option<Color>>,
    /// `placeholderColor`, reachable through the style object only.
    pub placeholder_color: CssProperty<Option<Color>>,
}

/// Everything declared for editable text nodes.
#[derive(Debug)]
pub struct EditableTextSchema {
    /// Node classes and their properties.
    pub registry: PropertyRegistry,
    /// CSS properties of the style class.
    pub css: CssPropertyTable,
    /// Pseudo-class handlers.
    pub handlers: PseudoClassHandlers<EditableTextBase>,
    /// Class IDs.
    pub classes: Classes,
    /// Property handles.
    pub properties: Properties,
    /// The handler serving `:focus` and `:blur`.
    pub focus_handler: HandlerId,
    node_layout: Arc<ClassLayout>,
    style_layout: Arc<ClassLayout>,
}

impl EditableTextSchema {
    /// Declares the schema into a fresh registry.
    pub fn declare() -> Result<Self, RegistrationError> {
        let mut registry = PropertyRegistry::new();
        let view = registry.register_class("View", None)?;
        let text_base = registry.register_class("TextBase", Some(view))?;
        let editable_text_base = registry.register_class("EditableTextBase", Some(text_base))?;
        let style = registry.register_class("Style", None)?;

        let text = registry.register(
            text_base,
            "text",
            PropertyMetadataBuilder::new(String::new())
                .converter(string_converter)
                .invalidates(Invalidation::LAYOUT | Invalidation::NATIVE)
                .build(),
        )?;

        let native = Invalidation::NATIVE;
        let keyboard_type = registry.register(
            editable_text_base,
            "keyboardType",
            PropertyMetadataBuilder::new(None)
                .converter(optional(make_parser(make_validator(KeyboardType::ALL))))
                .invalidates(native)
                .build(),
        )?;
        let return_key_type = registry.register(
            editable_text_base,
            "returnKeyType",
            PropertyMetadataBuilder::new(None)
                .converter(optional(make_parser(make_validator(ReturnKeyType::ALL))))
                .invalidates(native)
                .build(),
        )?;
        let autocapitalization_type = registry.register(
            editable_text_base,
            "autocapitalizationType",
            PropertyMetadataBuilder::new(AutocapitalizationType::Sentences)
                .converter(make_parser(make_validator(AutocapitalizationType::ALL)))
                .invalidates(native)
                .build(),
        )?;
        let editable = registry.register(
            editable_text_base,
            "editable",
            PropertyMetadataBuilder::new(true)
                .converter(boolean_converter)
                .invalidates(native)
                .build(),
        )?;
        let autocorrect = registry.register(
            editable_text_base,
            "autocorrect",
            PropertyMetadataBuilder::new(None)
                .converter(optional(boolean_converter))
                .invalidates(native)
                .build(),
        )?;
        let hint = registry.register(
            editable_text_base,
            "hint",
            PropertyMetadataBuilder::new(String::new())
                .converter(string_converter)
                .invalidates(native)
                .build(),
        )?;
        let max_length = registry.register(
            editable_text_base,
            "maxLength",
            PropertyMetadataBuilder::new(f64::INFINITY)
                .converter(max_length_converter)
                .invalidates(native)
                .build(),
        )?;
        let update_text_trigger = registry.register(
            editable_text_base,
            "updateTextTrigger",
            PropertyMetadataBuilder::new(UpdateTextTrigger::TextChanged)
                .converter(make_parser(make_validator(UpdateTextTrigger::ALL)))
                .build(),
        )?;

        let mut css = CssPropertyTable::new(style);
        let color = css.register(
            &mut registry,
            CssPropertyOptions::aliased("color", "color"),
            color_metadata(),
        )?;
        let placeholder_color = css.register(
            &mut registry,
            CssPropertyOptions::style_only("placeholderColor", "placeholder-color"),
            color_metadata(),
        )?;

        let mut handlers = PseudoClassHandlers::new();
        let focus_handler = handlers.register(
            editable_text_base,
            "textBaseFocusState",
            [FOCUS, BLUR],
            focus_state_handler,
        );

        let node_layout = registry.class_layout(editable_text_base)?;
        let style_layout = registry.class_layout(style)?;
        tracing::debug!(properties = registry.len(), "declared editable text schema");

        Ok(Self {
            registry,
            css,
            handlers,
            classes: Classes {
                view,
                text_base,
                editable_text_base,
                style,
            },
            properties: Properties {
                text,
                keyboard_type,
                return_key_type,
                autocapitalization_type,
                editable,
                autocorrect,
                hint,
                max_length,
                update_text_trigger,
                color,
                placeholder_color,
            },
            focus_handler,
            node_layout,
            style_layout,
        })
    }

    /// Returns the shared value layout of `EditableTextBase` nodes.
    #[must_use]
    pub fn node_layout(&self) -> &Arc<ClassLayout> {
        &self.node_layout
    }

    /// Returns the shared value layout of their style objects.
    #[must_use]
    pub fn style_layout(&self) -> &Arc<ClassLayout> {
        &self.style_layout
    }
}

fn max_length_converter(raw: &RawValue) -> Result<f64, ValidationError> {
    parse_int(raw).map(|length| length as f64)
}

fn color_metadata() -> PropertyMetadata<Option<Color>> {
    PropertyMetadataBuilder::new(None)
        .converter(optional(Color::convert))
        .equality_comparer(|a: &Option<Color>, b: &Option<Color>| match (a, b) {
            (Some(a), Some(b)) => Color::equals(a, b),
            (None, None) => true,
            _ => false,
        })
        .invalidates(Invalidation::PAINT | Invalidation::NATIVE)
        .build()
}

static SCHEMA: OnceLock<EditableTextSchema> = OnceLock::new();

/// Returns the schema, declaring it on first use.
///
/// # Panics
///
/// Panics if declaration fails. Declarations are static, so this is a
/// programming error that surfaces at startup.
pub fn schema() -> &'static EditableTextSchema {
    SCHEMA.get_or_init(declare_or_panic)
}

/// Declares the schema explicitly, e.g. during application startup.
///
/// Returns [`RegistrationError::AlreadyInitialized`] if the schema was
/// already declared, either by an earlier call or by [`schema`].
///
/// # Panics
///
/// Panics if declaration fails, like [`schema`].
pub fn initialize() -> Result<&'static EditableTextSchema, RegistrationError> {
    let mut declared_here = false;
    let schema = SCHEMA.get_or_init(|| {
        declared_here = true;
        declare_or_panic()
    });
    if declared_here {
        Ok(schema)
    } else {
        Err(RegistrationError::AlreadyInitialized("EditableTextBase"))
    }
}

fn declare_or_panic() -> EditableTextSchema {
    match EditableTextSchema::declare() {
        Ok(schema) => schema,
        Err(err) => panic!("failed to declare the editable text schema: {err}"),
    }
}
