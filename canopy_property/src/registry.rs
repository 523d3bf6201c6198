// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node classes and property declarations.
//!
//! [`PropertyRegistry`] owns the class hierarchy and every declared property.
//! It is populated once while the toolkit's node classes are declared and is
//! read-only afterwards; nodes only ever borrow it.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use hashbrown::HashMap;

use crate::convert::RawValue;
use crate::error::{RegistrationError, ValidationError};
use crate::id::{NodeClassId, Property, PropertyId};
use crate::layout::ClassLayout;
use crate::metadata::{ChangedNode, Invalidation, PropertyMetadata};
use crate::value::{ErasedValue, PropertyValue};

/// A registration entry for a property.
///
/// Besides name and type information, the entry exposes the property's
/// metadata through type-erased operations. Layers that handle values by
/// [`PropertyId`] (by-name access, style cascades) use these.
pub struct PropertyRegistration {
    name: &'static str,
    class: NodeClassId,
    type_id: TypeId,
    type_name: &'static str,
    metadata: Box<dyn ErasedMetadata>,
}

impl PropertyRegistration {
    /// Returns the property name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the class that declared the property.
    #[must_use]
    #[inline]
    pub fn class(&self) -> NodeClassId {
        self.class
    }

    /// Returns the [`TypeId`] of the property's value type.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the name of the property's value type.
    #[must_use]
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns what a change to this property invalidates.
    #[must_use]
    pub fn invalidates(&self) -> Invalidation {
        self.metadata.invalidates()
    }

    /// Returns whether unset values are looked up on the parent node.
    #[must_use]
    pub fn inherits(&self) -> bool {
        self.metadata.inherits()
    }

    /// Returns a copy of the declared default.
    #[must_use]
    pub fn default_value(&self) -> ErasedValue {
        self.metadata.default_erased()
    }

    /// Converts a raw value, or returns `None` if the property has no converter.
    ///
    /// Errors carry the property name.
    pub fn convert(&self, raw: &RawValue) -> Option<Result<ErasedValue, ValidationError>> {
        self.metadata
            .convert_erased(raw)
            .map(|result| result.map_err(|err| err.for_property(self.name)))
    }

    /// Applies the coerce callback. Values of another type pass through.
    #[must_use]
    pub fn coerce(&self, value: ErasedValue) -> ErasedValue {
        self.metadata.coerce_erased(value)
    }

    /// Compares two values with the property's equality comparer.
    ///
    /// Values of another type never compare equal.
    #[must_use]
    pub fn values_equal(&self, a: &ErasedValue, b: &ErasedValue) -> bool {
        self.metadata.values_equal_erased(a, b)
    }

    /// Runs the changed callback with `(node, old, new)`.
    pub fn notify_changed(&self, node: ChangedNode<'_>, old: &ErasedValue, new: &ErasedValue) {
        self.metadata.notify_erased(node, old, new);
    }
}

impl core::fmt::Debug for PropertyRegistration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropertyRegistration")
            .field("name", &self.name)
            .field("class", &self.class)
            .field("type_name", &self.type_name)
            .field("inherits", &self.inherits())
            .field("invalidates", &self.invalidates())
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct ClassEntry {
    name: &'static str,
    parent: Option<NodeClassId>,
    own: HashMap<&'static str, PropertyId>,
    /// In declaration order.
    own_order: Vec<PropertyId>,
    default_overrides: Vec<(PropertyId, ErasedValue)>,
}

/// The class hierarchy and every declared property.
///
/// # Example
///
/// ```rust
/// use canopy_property::{PropertyMetadataBuilder, PropertyRegistry};
///
/// let mut registry = PropertyRegistry::new();
/// let view = registry.register_class("View", None).unwrap();
/// let text_base = registry.register_class("TextBase", Some(view)).unwrap();
///
/// let hint = registry
///     .register(text_base, "hint", PropertyMetadataBuilder::new(String::new()).build())
///     .unwrap();
///
/// assert_eq!(registry.by_name(text_base, "hint"), Some(hint.id()));
/// assert_eq!(registry.by_name(view, "hint"), None);
///
/// // Declaring the same name twice on a class is a registration error.
/// assert!(registry
///     .register(text_base, "hint", PropertyMetadataBuilder::new(String::new()).build())
///     .is_err());
/// ```
#[derive(Default)]
pub struct PropertyRegistry {
    properties: Vec<PropertyRegistration>,
    classes: Vec<ClassEntry>,
    classes_by_name: HashMap<&'static str, NodeClassId>,
}

impl PropertyRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Classes
    // =========================================================================

    /// Declares a node class, optionally deriving from `parent`.
    pub fn register_class(
        &mut self,
        name: &'static str,
        parent: Option<NodeClassId>,
    ) -> Result<NodeClassId, RegistrationError> {
        if self.classes_by_name.contains_key(name) {
            return Err(RegistrationError::DuplicateClass { name });
        }
        if let Some(parent) = parent {
            self.class_entry(parent)?;
        }
        let index =
            u16::try_from(self.classes.len()).map_err(|_| RegistrationError::TooMany("classes"))?;
        let id = NodeClassId::new(index);
        self.classes.push(ClassEntry {
            name,
            parent,
            own: HashMap::new(),
            own_order: Vec::new(),
            default_overrides: Vec::new(),
        });
        self.classes_by_name.insert(name, id);
        Ok(id)
    }

    /// Looks up a class by name.
    #[must_use]
    pub fn class_by_name(&self, name: &str) -> Option<NodeClassId> {
        self.classes_by_name.get(name).copied()
    }

    /// Returns the name of a class.
    #[must_use]
    pub fn class_name(&self, class: NodeClassId) -> Option<&'static str> {
        self.classes.get(usize::from(class.index())).map(|c| c.name)
    }

    /// Returns the parent of a class.
    #[must_use]
    pub fn class_parent(&self, class: NodeClassId) -> Option<NodeClassId> {
        self.classes
            .get(usize::from(class.index()))
            .and_then(|c| c.parent)
    }

    /// Iterates `class` and then each of its ancestors, nearest first.
    pub fn ancestry(&self, class: NodeClassId) -> impl Iterator<Item = NodeClassId> + '_ {
        let start = self
            .classes
            .get(usize::from(class.index()))
            .map(|_| class);
        core::iter::successors(start, |c| self.class_parent(*c))
    }

    /// Returns `true` if `class` is `ancestor` or derives from it.
    #[must_use]
    pub fn is_subclass_of(&self, class: NodeClassId, ancestor: NodeClassId) -> bool {
        self.ancestry(class).any(|c| c == ancestor)
    }

    fn class_entry(&self, class: NodeClassId) -> Result<&ClassEntry, RegistrationError> {
        self.classes
            .get(usize::from(class.index()))
            .ok_or(RegistrationError::UnknownClass(class))
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Declares a property on `class`.
    ///
    /// The property is carried by every node of `class` and of its subclasses.
    /// Fails if `class`, one of its ancestors, or one of its subclasses already
    /// declares a property with the same name.
    pub fn register<T: PropertyValue>(
        &mut self,
        class: NodeClassId,
        name: &'static str,
        metadata: PropertyMetadata<T>,
    ) -> Result<Property<T>, RegistrationError> {
        self.class_entry(class)?;
        if let Some(existing) = self.by_name(class, name) {
            let owner = self.properties[usize::from(existing.index())].class;
            return Err(RegistrationError::DuplicateProperty {
                class: self.class_name(owner).unwrap_or_default(),
                name,
            });
        }
        for (index, entry) in self.classes.iter().enumerate() {
            if entry.own.contains_key(name) {
                let other = NodeClassId::new(u16::try_from(index).unwrap_or(u16::MAX));
                if self.is_subclass_of(other, class) {
                    return Err(RegistrationError::DuplicateProperty {
                        class: entry.name,
                        name,
                    });
                }
            }
        }
        let index = u16::try_from(self.properties.len())
            .ok()
            .filter(|index| *index < u16::MAX)
            .ok_or(RegistrationError::TooMany("properties"))?;
        let id = PropertyId::new(index);

        self.properties.push(PropertyRegistration {
            name,
            class,
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
            metadata: Box::new(metadata),
        });
        let entry = &mut self.classes[usize::from(class.index())];
        entry.own.insert(name, id);
        entry.own_order.push(id);
        Ok(Property::from_id(id))
    }

    /// Refines the default of an inherited property for `class` and its subclasses.
    pub fn override_default<T: PropertyValue>(
        &mut self,
        class: NodeClassId,
        property: Property<T>,
        value: T,
    ) -> Result<(), RegistrationError> {
        let class_name = self.class_entry(class)?.name;
        let registration = self
            .get(property.id())
            .ok_or(RegistrationError::NotInherited {
                class: class_name,
                name: "<unregistered>",
            })?;
        let name = registration.name;
        if !self.is_subclass_of(class, registration.class) {
            return Err(RegistrationError::NotInherited {
                class: class_name,
                name,
            });
        }
        if registration.type_id != TypeId::of::<T>() {
            return Err(RegistrationError::DefaultTypeMismatch {
                name,
                expected: registration.type_name,
            });
        }
        let overrides = &mut self.classes[usize::from(class.index())].default_overrides;
        let value = ErasedValue::new(value);
        match overrides.iter_mut().find(|(id, _)| *id == property.id()) {
            Some(entry) => entry.1 = value,
            None => overrides.push((property.id(), value)),
        }
        Ok(())
    }

    /// Builds the fixed value layout for nodes of `class`.
    ///
    /// Slots are ordered root class first, each class's properties in
    /// declaration order. Defaults include the nearest refinement.
    pub fn class_layout(&self, class: NodeClassId) -> Result<Arc<ClassLayout>, RegistrationError> {
        let entry = self.class_entry(class)?;
        let mut chain: Vec<&ClassEntry> = self
            .ancestry(class)
            .map(|c| &self.classes[usize::from(c.index())])
            .collect();
        chain.reverse();

        let mut slots = Vec::new();
        let mut defaults = Vec::new();
        for ancestor in &chain {
            for id in &ancestor.own_order {
                let refined = self
                    .ancestry(class)
                    .flat_map(|c| self.classes[usize::from(c.index())].default_overrides.iter())
                    .find(|(pid, _)| pid == id)
                    .map(|(_, value)| value.clone());
                let default = match refined {
                    Some(value) => value,
                    None => self.properties[usize::from(id.index())].default_value(),
                };
                slots.push(*id);
                defaults.push(default);
            }
        }
        Ok(Arc::new(ClassLayout::new(
            class,
            entry.name,
            self.properties.len(),
            slots,
            defaults,
        )))
    }

    /// Returns the number of registered properties.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if no properties are registered.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Looks up a property carried by `class` (declared on it or an ancestor).
    #[must_use]
    pub fn by_name(&self, class: NodeClassId, name: &str) -> Option<PropertyId> {
        self.ancestry(class)
            .find_map(|c| self.classes[usize::from(c.index())].own.get(name).copied())
    }

    /// Returns the name of a property.
    #[must_use]
    pub fn name(&self, id: PropertyId) -> Option<&'static str> {
        self.get(id).map(|r| r.name)
    }

    /// Returns the registration for a property.
    #[must_use]
    pub fn get(&self, id: PropertyId) -> Option<&PropertyRegistration> {
        self.properties.get(usize::from(id.index()))
    }

    /// Returns the metadata for a typed property.
    ///
    /// Returns `None` if the property is not registered or the type doesn't match.
    #[must_use]
    pub fn get_metadata<T: PropertyValue>(
        &self,
        property: Property<T>,
    ) -> Option<&PropertyMetadata<T>> {
        self.get(property.id())
            .and_then(|r| r.metadata.as_any().downcast_ref())
    }

    /// Returns an iterator over all registered properties.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &PropertyRegistration)> {
        self.properties.iter().enumerate().map(|(i, r)| {
            #[expect(clippy::cast_possible_truncation, reason = "index < len < u16::MAX")]
            let id = PropertyId::new(i as u16);
            (id, r)
        })
    }
}

impl core::fmt::Debug for PropertyRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("count", &self.properties.len())
            .field(
                "classes",
                &self.classes.iter().map(|c| c.name).collect::<Vec<_>>(),
            )
            .field(
                "properties",
                &self.properties.iter().map(|p| p.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Type-erased metadata for heterogeneous storage.
trait ErasedMetadata: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn invalidates(&self) -> Invalidation;
    fn inherits(&self) -> bool;
    fn default_erased(&self) -> ErasedValue;
    fn convert_erased(&self, raw: &RawValue) -> Option<Result<ErasedValue, ValidationError>>;
    fn coerce_erased(&self, value: ErasedValue) -> ErasedValue;
    fn values_equal_erased(&self, a: &ErasedValue, b: &ErasedValue) -> bool;
    fn notify_erased(&self, node: ChangedNode<'_>, old: &ErasedValue, new: &ErasedValue);
}

impl<T: PropertyValue> ErasedMetadata for PropertyMetadata<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn invalidates(&self) -> Invalidation {
        Self::invalidates(self)
    }

    fn inherits(&self) -> bool {
        Self::inherits(self)
    }

    fn default_erased(&self) -> ErasedValue {
        ErasedValue::new(self.default_value().clone())
    }

    fn convert_erased(&self, raw: &RawValue) -> Option<Result<ErasedValue, ValidationError>> {
        self.convert(raw).map(|result| result.map(ErasedValue::new))
    }

    fn coerce_erased(&self, value: ErasedValue) -> ErasedValue {
        match value.downcast::<T>() {
            Ok(value) => ErasedValue::new(self.coerce(value)),
            Err(other) => other,
        }
    }

    fn values_equal_erased(&self, a: &ErasedValue, b: &ErasedValue) -> bool {
        match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
            (Some(a), Some(b)) => self.values_equal(a, b),
            _ => false,
        }
    }

    fn notify_erased(&self, node: ChangedNode<'_>, old: &ErasedValue, new: &ErasedValue) {
        if let (Some(old), Some(new)) = (old.downcast_ref::<T>(), new.downcast_ref::<T>()) {
            self.on_changed(node, old, new);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::boolean_converter;
    use crate::metadata::PropertyMetadataBuilder;
    use alloc::string::String;
    use alloc::{format, vec, vec::Vec};

    fn classes(registry: &mut PropertyRegistry) -> (NodeClassId, NodeClassId, NodeClassId) {
        let view = registry.register_class("View", None).unwrap();
        let text = registry.register_class("TextBase", Some(view)).unwrap();
        let editable = registry
            .register_class("EditableTextBase", Some(text))
            .unwrap();
        (view, text, editable)
    }

    #[test]
    fn registry_new() {
        let registry = PropertyRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn class_hierarchy() {
        let mut registry = PropertyRegistry::new();
        let (view, text, editable) = classes(&mut registry);

        assert_eq!(registry.class_parent(editable), Some(text));
        assert_eq!(registry.class_by_name("TextBase"), Some(text));
        assert!(registry.is_subclass_of(editable, view));
        assert!(registry.is_subclass_of(view, view));
        assert!(!registry.is_subclass_of(view, editable));
        let chain: Vec<_> = registry.ancestry(editable).collect();
        assert_eq!(chain, vec![editable, text, view]);
    }

    #[test]
    fn duplicate_class_is_rejected() {
        let mut registry = PropertyRegistry::new();
        registry.register_class("View", None).unwrap();
        assert_eq!(
            registry.register_class("View", None),
            Err(RegistrationError::DuplicateClass { name: "View" })
        );
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let mut registry = PropertyRegistry::new();
        assert_eq!(
            registry.register_class("Orphan", Some(NodeClassId::new(9))),
            Err(RegistrationError::UnknownClass(NodeClassId::new(9)))
        );
    }

    #[test]
    fn subclasses_see_ancestor_properties() {
        let mut registry = PropertyRegistry::new();
        let (view, text, editable) = classes(&mut registry);
        let hint = registry
            .register(
                text,
                "hint",
                PropertyMetadataBuilder::new(String::new()).build(),
            )
            .unwrap();

        assert_eq!(registry.by_name(editable, "hint"), Some(hint.id()));
        assert_eq!(registry.by_name(view, "hint"), None);
        assert_eq!(registry.name(hint.id()), Some("hint"));
        assert_eq!(registry.get(hint.id()).map(|r| r.class()), Some(text));
    }

    #[test]
    fn duplicate_name_on_same_class() {
        let mut registry = PropertyRegistry::new();
        let (_, _, editable) = classes(&mut registry);
        registry
            .register(editable, "editable", PropertyMetadata::new(true))
            .unwrap();
        let err = registry
            .register(editable, "editable", PropertyMetadata::new(true))
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateProperty {
                class: "EditableTextBase",
                name: "editable",
            }
        );
    }

    #[test]
    fn redeclaring_across_the_hierarchy_is_rejected() {
        let mut registry = PropertyRegistry::new();
        let (view, text, editable) = classes(&mut registry);
        registry
            .register(text, "text", PropertyMetadata::new(String::new()))
            .unwrap();

        // Below the owner.
        assert!(
            registry
                .register(editable, "text", PropertyMetadata::new(String::new()))
                .is_err()
        );
        // Above the owner.
        assert!(
            registry
                .register(view, "text", PropertyMetadata::new(String::new()))
                .is_err()
        );
    }

    #[test]
    fn sibling_classes_may_share_names() {
        let mut registry = PropertyRegistry::new();
        let (view, _, _) = classes(&mut registry);
        let button = registry.register_class("Button", Some(view)).unwrap();
        let label = registry.register_class("Label", Some(view)).unwrap();
        registry
            .register(button, "text", PropertyMetadata::new(String::new()))
            .unwrap();
        assert!(
            registry
                .register(label, "text", PropertyMetadata::new(String::new()))
                .is_ok()
        );
    }

    #[test]
    fn override_default_rules() {
        let mut registry = PropertyRegistry::new();
        let (view, text, editable) = classes(&mut registry);
        let editable_prop = registry
            .register(text, "editable", PropertyMetadata::new(false))
            .unwrap();

        assert!(
            registry
                .override_default(editable, editable_prop, true)
                .is_ok()
        );
        assert_eq!(
            registry.override_default(view, editable_prop, true),
            Err(RegistrationError::NotInherited {
                class: "View",
                name: "editable",
            })
        );
    }

    #[test]
    fn layouts_apply_refined_defaults() {
        let mut registry = PropertyRegistry::new();
        let (view, text, editable) = classes(&mut registry);
        let visible = registry
            .register(view, "visible", PropertyMetadata::new(true))
            .unwrap();
        let editable_prop = registry
            .register(text, "editable", PropertyMetadata::new(false))
            .unwrap();
        registry
            .override_default(editable, editable_prop, true)
            .unwrap();

        let text_layout = registry.class_layout(text).unwrap();
        let editable_layout = registry.class_layout(editable).unwrap();
        assert_eq!(text_layout.len(), 2);
        assert_eq!(editable_layout.slot(visible.id()), Some(0));
        assert_eq!(editable_layout.slot(editable_prop.id()), Some(1));

        let slot = text_layout.slot(editable_prop.id()).unwrap();
        assert_eq!(text_layout.default_at(slot).downcast_ref(), Some(&false));
        let slot = editable_layout.slot(editable_prop.id()).unwrap();
        assert_eq!(editable_layout.default_at(slot).downcast_ref(), Some(&true));
    }

    #[test]
    fn erased_operations_use_metadata() {
        let mut registry = PropertyRegistry::new();
        let (view, _, _) = classes(&mut registry);
        let flag = registry
            .register(
                view,
                "flag",
                PropertyMetadataBuilder::new(false)
                    .converter(boolean_converter)
                    .build(),
            )
            .unwrap();
        let registration = registry.get(flag.id()).unwrap();

        let converted = registration
            .convert(&RawValue::from("True"))
            .unwrap()
            .unwrap();
        assert_eq!(converted.downcast_ref(), Some(&true));

        let err = registration
            .convert(&RawValue::from("yes"))
            .unwrap()
            .unwrap_err();
        assert_eq!(err.property, Some("flag"));

        assert!(registration.values_equal(&ErasedValue::new(true), &converted));
        assert!(!registration.values_equal(&ErasedValue::new(1_i64), &converted));
    }

    #[test]
    fn get_metadata_checks_type() {
        let mut registry = PropertyRegistry::new();
        let (view, _, _) = classes(&mut registry);
        let flag = registry
            .register(view, "flag", PropertyMetadata::new(false))
            .unwrap();
        assert!(registry.get_metadata(flag).is_some());
        let wrong: Property<i64> = Property::from_id(flag.id());
        assert!(registry.get_metadata(wrong).is_none());
    }

    #[test]
    fn registry_debug() {
        let mut registry = PropertyRegistry::new();
        let (view, _, _) = classes(&mut registry);
        registry
            .register(view, "visible", PropertyMetadata::new(true))
            .unwrap();
        let debug = format!("{:?}", registry);
        assert!(debug.contains("PropertyRegistry"), "{debug}");
        assert!(debug.contains("visible"), "{debug}");
        assert!(debug.contains("EditableTextBase"), "{debug}");
    }
}
