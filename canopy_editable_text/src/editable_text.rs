// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The editable text base node.

use std::mem;
use std::slice;

use smallvec::SmallVec;

use canopy_property::{
    ErasedValue, Invalidation, NodeClassId, Property, PropertyChange, PropertyError, PropertyHost,
    PropertyHostExt, PropertyId, PropertyStore, PropertyValue, RawValue,
};
use canopy_style::{
    CascadeError, ClassId, CssProperty, IdSet, NodeAccessor, Priority, PseudoClassHost,
    PseudoClassId, PseudoClassState, RuleKey, SelectorInputs, StyleScope, StyleValues,
};

use crate::color::Color;
use crate::events::{
    BLUR_EVENT, EventData, EventListeners, EventSubsystem, FOCUS_EVENT, Listener,
};
use crate::keywords::{AutocapitalizationType, KeyboardType, ReturnKeyType, UpdateTextTrigger};
use crate::native::{NativeBridge, NullBridge};
use crate::schema::{BLUR, FOCUS, schema};

const FOCUS_LISTENER: &str = "textBaseFocus";
const BLUR_LISTENER: &str = "textBaseBlur";

/// A text input node: the shared base of single- and multi-line fields.
///
/// The node owns its property values, its style object and its pseudo-class
/// state. Platform work goes through a [`NativeBridge`] and event wiring
/// through an [`EventSubsystem`].
///
/// # Example
///
/// ```rust
/// use canopy_editable_text::{EditableTextBase, KeyboardType};
///
/// let mut field = EditableTextBase::new(1);
/// field.set_attribute("keyboardType", "email").unwrap();
/// assert_eq!(field.keyboard_type(), Some(KeyboardType::Email));
///
/// assert!(field.set_attribute("keyboardType", "bogus").is_err());
/// assert_eq!(field.keyboard_type(), Some(KeyboardType::Email));
/// ```
#[derive(Debug)]
pub struct EditableTextBase {
    key: u32,
    class: NodeClassId,
    store: PropertyStore<u32>,
    style: StyleValues<u32>,
    pseudo: PseudoClassState,
    /// Sorted, unique.
    style_classes: Vec<ClassId>,
    visual_state: Option<PseudoClassId>,
    /// Native text waiting for blur, and whether it was truncated.
    pending_text: Option<(String, bool)>,
    scope: Option<StyleScope>,
    events: Box<dyn EventSubsystem<EditableTextBase>>,
    bridge: Box<dyn NativeBridge>,
}

impl EditableTextBase {
    /// Creates a detached node with in-process event listeners.
    #[must_use]
    pub fn new(key: u32) -> Self {
        Self::with_collaborators(key, Box::new(EventListeners::new()), Box::new(NullBridge))
    }

    /// Creates a node wired to the given event subsystem and native widget.
    #[must_use]
    pub fn with_collaborators(
        key: u32,
        events: Box<dyn EventSubsystem<Self>>,
        bridge: Box<dyn NativeBridge>,
    ) -> Self {
        let schema = schema();
        Self {
            key,
            class: schema.classes.editable_text_base,
            store: PropertyStore::new(key, schema.node_layout().clone()),
            style: StyleValues::new(key, schema.style_layout().clone()),
            pseudo: PseudoClassState::new(),
            style_classes: Vec::new(),
            visual_state: None,
            pending_text: None,
            scope: None,
            events,
            bridge,
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns a property's effective value.
    #[must_use]
    pub fn get<T: PropertyValue>(&self, property: Property<T>) -> &T {
        self.store.get(property)
    }

    /// Assigns a property.
    ///
    /// Returns the change, or `None` if the value is unchanged.
    pub fn set<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        value: T,
    ) -> Result<Option<PropertyChange>, PropertyError> {
        let change = self.set_value(property, value, &schema().registry)?;
        self.forward(change.as_slice());
        Ok(change)
    }

    /// Converts and assigns a property.
    ///
    /// A rejected value leaves the property unchanged.
    pub fn set_raw<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        raw: impl Into<RawValue>,
    ) -> Result<Option<PropertyChange>, PropertyError> {
        let change = self.set_raw_value(property, &raw.into(), &schema().registry)?;
        self.forward(change.as_slice());
        Ok(change)
    }

    /// Unsets a property, reverting it to its default.
    pub fn clear(&mut self, id: PropertyId) -> Option<PropertyChange> {
        let change = self.clear_value(id, &schema().registry);
        self.forward(change.as_slice());
        change
    }

    /// Assigns an attribute by name, as declarative markup does.
    ///
    /// Names of aliased CSS properties (`color`) set a local value on the
    /// style object. CSS properties without a node accessor
    /// (`placeholderColor`) are rejected with [`CascadeError::StyleOnly`].
    pub fn set_attribute(
        &mut self,
        name: &str,
        raw: impl Into<RawValue>,
    ) -> Result<Option<PropertyChange>, CascadeError> {
        let schema = schema();
        let raw = raw.into();
        let result = match schema.css.by_name(name) {
            Some((id, NodeAccessor::StyleOnly)) => Err(CascadeError::StyleOnly {
                name: schema.registry.name(id).unwrap_or_default(),
            }),
            Some((id, NodeAccessor::Alias)) => {
                self.style.set_local_raw(id, &raw, &schema.registry)
            }
            None => self
                .set_by_name(name, &raw, &schema.registry)
                .map_err(CascadeError::from),
        };
        match result {
            Ok(change) => {
                self.forward(change.as_slice());
                Ok(change)
            }
            Err(err) => {
                tracing::debug!(key = self.key, name, %raw, %err, "rejected attribute");
                Err(err)
            }
        }
    }

    /// Returns an attribute's effective value by name.
    ///
    /// Style-only CSS properties are not visible here; read them through
    /// [`style`](Self::style).
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&ErasedValue> {
        let schema = schema();
        match schema.css.by_name(name) {
            Some((id, NodeAccessor::Alias)) => self.style.get_erased(id),
            Some((_, NodeAccessor::StyleOnly)) => None,
            None => schema
                .registry
                .by_name(self.class, name)
                .and_then(|id| self.store.get_erased(id)),
        }
    }

    /// Returns `text`.
    #[must_use]
    pub fn text(&self) -> &str {
        self.get::<String>(schema().properties.text)
    }

    /// Returns `keyboardType`.
    #[must_use]
    pub fn keyboard_type(&self) -> Option<KeyboardType> {
        *self.get(schema().properties.keyboard_type)
    }

    /// Returns `returnKeyType`.
    #[must_use]
    pub fn return_key_type(&self) -> Option<ReturnKeyType> {
        *self.get(schema().properties.return_key_type)
    }

    /// Returns `autocapitalizationType`.
    #[must_use]
    pub fn autocapitalization_type(&self) -> AutocapitalizationType {
        *self.get(schema().properties.autocapitalization_type)
    }

    /// Returns `editable`.
    #[must_use]
    pub fn editable(&self) -> bool {
        *self.get(schema().properties.editable)
    }

    /// Returns `autocorrect`, or `None` when the platform decides.
    #[must_use]
    pub fn autocorrect(&self) -> Option<bool> {
        *self.get(schema().properties.autocorrect)
    }

    /// Returns `hint`.
    #[must_use]
    pub fn hint(&self) -> &str {
        self.get::<String>(schema().properties.hint)
    }

    /// Returns `maxLength`.
    #[must_use]
    pub fn max_length(&self) -> f64 {
        *self.get(schema().properties.max_length)
    }

    /// Returns `updateTextTrigger`.
    #[must_use]
    pub fn update_text_trigger(&self) -> UpdateTextTrigger {
        *self.get(schema().properties.update_text_trigger)
    }

    /// Returns the effective `color`.
    #[must_use]
    pub fn color(&self) -> Option<Color> {
        *self.style.get(schema().properties.color)
    }

    /// Sets `color` locally on the style object.
    pub fn set_color(&mut self, color: Option<Color>) -> Result<Option<PropertyChange>, CascadeError> {
        self.set_style(schema().properties.color, color)
    }

    // =========================================================================
    // Style
    // =========================================================================

    /// Returns the style object.
    #[must_use]
    pub fn style(&self) -> &StyleValues<u32> {
        &self.style
    }

    /// Sets a local value on the style object, outranking every rule.
    pub fn set_style<T: PropertyValue>(
        &mut self,
        property: CssProperty<T>,
        value: T,
    ) -> Result<Option<PropertyChange>, CascadeError> {
        let change = self.style.set_local(property, value, &schema().registry)?;
        self.forward(change.as_slice());
        Ok(change)
    }

    /// Removes a local style value, falling back to the cascade.
    pub fn clear_style(&mut self, id: PropertyId) -> Option<PropertyChange> {
        let change = self.style.clear_local(id, &schema().registry);
        self.forward(change.as_slice());
        change
    }

    /// Records a declaration pushed by an external cascade engine.
    pub fn apply_declaration(
        &mut self,
        rule: RuleKey,
        css_name: &str,
        raw: &RawValue,
        priority: Priority,
    ) -> Result<Option<PropertyChange>, CascadeError> {
        let schema = schema();
        let change =
            self.style
                .apply_declaration(rule, css_name, raw, priority, &schema.css, &schema.registry)?;
        self.forward(change.as_slice());
        Ok(change)
    }

    /// Drops a rule's declarations, reverting to the next-ranked values.
    pub fn remove_rule(&mut self, rule: RuleKey) -> Vec<PropertyChange> {
        let changes = self.style.remove_rule(rule, &schema().registry);
        self.forward(&changes);
        changes
    }

    /// Attaches the node to a style scope, or detaches it with `None`, and
    /// restyles.
    ///
    /// Replacing a scope drops the rules of the previous one that the new
    /// one does not apply. Detaching drops every rule contribution; local
    /// style values stay.
    pub fn set_style_scope(&mut self, scope: Option<StyleScope>) -> Vec<PropertyChange> {
        let previous = mem::replace(&mut self.scope, scope);
        if self.scope.is_some() {
            return self.restyle_from(previous.as_ref());
        }
        let schema = schema();
        let stale = self.style.rules();
        let changes = self.style.apply_batch(&stale, Vec::new(), &schema.registry);
        schema
            .handlers
            .set_interest(self, &IdSet::default(), &schema.registry);
        self.forward(&changes);
        changes
    }

    /// Replaces the node's style classes and restyles.
    pub fn set_style_classes(
        &mut self,
        classes: impl IntoIterator<Item = ClassId>,
    ) -> Vec<PropertyChange> {
        let mut classes: Vec<ClassId> = classes.into_iter().collect();
        classes.sort();
        classes.dedup();
        self.style_classes = classes;
        self.restyle()
    }

    /// Re-applies the style scope to this node.
    ///
    /// Every affected property has its final value when this returns.
    pub fn restyle(&mut self) -> Vec<PropertyChange> {
        self.restyle_from(None)
    }

    fn restyle_from(&mut self, previous: Option<&StyleScope>) -> Vec<PropertyChange> {
        let Some(mut scope) = self.scope.take() else {
            return Vec::new();
        };
        let schema = schema();
        let chain: SmallVec<[NodeClassId; 4]> = schema.registry.ancestry(self.class).collect();
        let inputs = SelectorInputs::new(&chain, &self.style_classes, self.pseudo.active());
        let result = match previous {
            Some(previous) => {
                scope.restyle_replacing(previous, &mut self.style, &inputs, &schema.registry)
            }
            None => scope.restyle(&mut self.style, &inputs, &schema.registry),
        };
        // The scope styles only this node.
        scope.prune_retired([&self.style]);
        self.scope = Some(scope);

        schema
            .handlers
            .set_interest(self, &result.pseudo_interest, &schema.registry);
        self.forward(&result.changes);
        result.changes
    }

    // =========================================================================
    // Visual state and events
    // =========================================================================

    /// Returns the current visual state pseudo-class.
    #[must_use]
    pub fn visual_state(&self) -> Option<PseudoClassId> {
        self.visual_state
    }

    /// Replaces the visual state pseudo-class and restyles.
    pub fn go_to_visual_state(&mut self, state: PseudoClassId) -> Vec<PropertyChange> {
        if self.visual_state == Some(state) {
            return Vec::new();
        }
        if let Some(previous) = self.visual_state.replace(state) {
            self.pseudo.deactivate(previous);
        }
        self.pseudo.activate(state);
        tracing::trace!(key = self.key, ?state, "visual state");
        self.restyle()
    }

    /// Subscribes a listener. Returns `false` if it was already subscribed.
    pub fn on(&mut self, event: &'static str, listener: Listener<Self>) -> bool {
        self.events.subscribe(event, listener)
    }

    /// Unsubscribes a listener by name.
    pub fn off(&mut self, event: &str, name: &str) -> bool {
        self.events.unsubscribe(event, name)
    }

    /// Returns how many listeners `event` has.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.events.listener_count(event)
    }

    /// Delivers an event raised by the native widget.
    ///
    /// A blur commits text held back by [`UpdateTextTrigger::FocusLost`]
    /// before listeners run.
    pub fn deliver_event(&mut self, event: &EventData) {
        if event.event_name == BLUR_EVENT
            && let Some((text, truncated)) = self.pending_text.take()
        {
            self.commit_text(text, truncated);
        }
        for listener in self.events.listeners(event.event_name) {
            (listener.callback)(self, event);
        }
    }

    /// Handles an edit made in the native widget.
    ///
    /// The text is cut to `maxLength` characters and committed to `text`
    /// according to `updateTextTrigger`. Listeners of `textChange` see every
    /// edit.
    pub fn native_text_changed(&mut self, text: &str) {
        let committed = self.truncate_to_max_length(text);
        let truncated = committed.len() != text.len();
        match self.update_text_trigger() {
            UpdateTextTrigger::TextChanged => self.commit_text(committed.clone(), truncated),
            UpdateTextTrigger::FocusLost => self.pending_text = Some((committed.clone(), truncated)),
        }
        self.deliver_event(&EventData::text_change(committed));
    }

    /// Hides the soft keyboard.
    pub fn dismiss_soft_input(&mut self) {
        self.bridge.dismiss_soft_input();
    }

    /// Releases every subscription and resets all values.
    ///
    /// Every pseudo-class handler subscription is matched by an
    /// unsubscription, so no listeners remain.
    pub fn destroy(&mut self) {
        let schema = schema();
        schema.handlers.release_all(self);
        self.scope = None;
        self.style.reset(&schema.registry);
        self.store.reset(&schema.registry);
        self.pseudo = PseudoClassState::new();
        self.visual_state = None;
        self.pending_text = None;
        tracing::debug!(key = self.key, "destroyed editable text node");
    }

    fn truncate_to_max_length(&self, text: &str) -> String {
        let max_length = self.max_length();
        if !max_length.is_finite() || max_length < 0.0 {
            return text.to_owned();
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "float to integer casts saturate"
        )]
        let limit = max_length as usize;
        text.chars().take(limit).collect()
    }

    /// Stores native text. Only truncated text is pushed back to the widget.
    fn commit_text(&mut self, text: String, truncated: bool) {
        let schema = schema();
        let result = self.set_value(schema.properties.text, text, &schema.registry);
        self.finish_commit(result, truncated);
    }

    fn finish_commit(
        &mut self,
        result: Result<Option<PropertyChange>, PropertyError>,
        truncated: bool,
    ) {
        match result {
            Ok(Some(change)) if truncated => self.forward(slice::from_ref(&change)),
            Ok(_) => {}
            Err(err) => tracing::warn!(key = self.key, %err, "failed to commit native text"),
        }
    }

    fn forward(&mut self, changes: &[PropertyChange]) {
        let keyboard_type = schema().properties.keyboard_type.id();
        for change in changes
            .iter()
            .filter(|change| change.invalidates.contains(Invalidation::NATIVE))
        {
            if change.property == keyboard_type {
                let keyboard = change
                    .new_as::<Option<KeyboardType>>()
                    .copied()
                    .flatten();
                self.bridge
                    .set_input_type(KeyboardType::input_type(keyboard));
            } else {
                self.bridge.property_changed(change.name, &change.new);
            }
        }
    }
}

impl PropertyHost<u32> for EditableTextBase {
    fn property_store(&self) -> &PropertyStore<u32> {
        &self.store
    }

    fn property_store_mut(&mut self) -> &mut PropertyStore<u32> {
        &mut self.store
    }

    fn key(&self) -> u32 {
        self.key
    }

    /// None of the node's properties inherit, so it is never linked to a
    /// parent.
    fn parent_key(&self) -> Option<u32> {
        None
    }
}

impl PseudoClassHost for EditableTextBase {
    fn node_class(&self) -> NodeClassId {
        self.class
    }

    fn pseudo_state(&self) -> &PseudoClassState {
        &self.pseudo
    }

    fn pseudo_state_mut(&mut self) -> &mut PseudoClassState {
        &mut self.pseudo
    }
}

fn on_focus(node: &mut EditableTextBase, _: &EventData) {
    node.go_to_visual_state(FOCUS);
}

fn on_blur(node: &mut EditableTextBase, _: &EventData) {
    node.go_to_visual_state(BLUR);
}

/// Starts or stops following focus changes, for the `:focus` and `:blur`
/// pseudo-classes.
///
/// Unsubscribing also forgets the current visual state: focus changes that
/// happen while nobody listens are never seen, so a later subscription must
/// start from the unfocused state. No restyle happens here, since this runs
/// while styling updates its interest.
pub(crate) fn focus_state_handler(node: &mut EditableTextBase, subscribe: bool) {
    if subscribe {
        node.events
            .subscribe(FOCUS_EVENT, Listener::new(FOCUS_LISTENER, on_focus));
        node.events
            .subscribe(BLUR_EVENT, Listener::new(BLUR_LISTENER, on_blur));
    } else {
        node.events.unsubscribe(FOCUS_EVENT, FOCUS_LISTENER);
        node.events.unsubscribe(BLUR_EVENT, BLUR_LISTENER);
        if let Some(state) = node.visual_state.take() {
            node.pseudo.deactivate(state);
            tracing::trace!(key = node.key, ?state, "visual state cleared");
        }
    }
}
