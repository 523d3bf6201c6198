// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CSS-backed property declarations.
//!
//! A CSS property is an ordinary property declared on a style class (so its
//! values live in the node's [`StyleValues`](crate::StyleValues), not in the
//! node's own store), plus a kebab-case CSS name used by style sheets and an
//! optional node-level alias.

use hashbrown::HashMap;

use canopy_property::{
    NodeClassId, Property, PropertyId, PropertyMetadata, PropertyRegistry, PropertyValue,
    RegistrationError,
};

/// Whether a CSS property is also reachable from the node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeAccessor {
    /// Writes to the node under the property's programmatic name are
    /// forwarded to the style object.
    Alias,
    /// Only reachable through the style object.
    StyleOnly,
}

/// Names and accessor policy for a CSS property.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CssPropertyOptions {
    /// Programmatic name, e.g. `placeholderColor`.
    pub name: &'static str,
    /// CSS name, e.g. `placeholder-color`.
    pub css_name: &'static str,
    /// Node-level access policy.
    pub node_accessor: NodeAccessor,
}

impl CssPropertyOptions {
    /// Options for a property with a node-level alias.
    #[must_use]
    pub const fn aliased(name: &'static str, css_name: &'static str) -> Self {
        Self {
            name,
            css_name,
            node_accessor: NodeAccessor::Alias,
        }
    }

    /// Options for a property reachable only through the style object.
    #[must_use]
    pub const fn style_only(name: &'static str, css_name: &'static str) -> Self {
        Self {
            name,
            css_name,
            node_accessor: NodeAccessor::StyleOnly,
        }
    }
}

/// A typed handle to a CSS-backed property.
#[derive(Debug)]
pub struct CssProperty<T> {
    property: Property<T>,
    css_name: &'static str,
    node_accessor: NodeAccessor,
}

impl<T> CssProperty<T> {
    /// Returns the underlying property handle.
    #[must_use]
    #[inline]
    pub fn property(self) -> Property<T> {
        self.property
    }

    /// Returns the property ID.
    #[must_use]
    #[inline]
    pub fn id(self) -> PropertyId {
        self.property.id()
    }

    /// Returns the CSS name.
    #[must_use]
    #[inline]
    pub fn css_name(self) -> &'static str {
        self.css_name
    }

    /// Returns the node-level access policy.
    #[must_use]
    #[inline]
    pub fn node_accessor(self) -> NodeAccessor {
        self.node_accessor
    }
}

impl<T> Copy for CssProperty<T> {}

impl<T> Clone for CssProperty<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for CssProperty<T> {
    fn eq(&self, other: &Self) -> bool {
        self.property == other.property
    }
}

impl<T> Eq for CssProperty<T> {}

#[derive(Copy, Clone, Debug)]
struct CssEntry {
    id: PropertyId,
    css_name: &'static str,
    name: &'static str,
    node_accessor: NodeAccessor,
}

/// The CSS properties of one style class, indexed by CSS name and alias.
///
/// # Example
///
/// ```rust
/// use canopy_property::{PropertyMetadata, PropertyRegistry};
/// use canopy_style::{CssPropertyOptions, CssPropertyTable};
///
/// let mut registry = PropertyRegistry::new();
/// let style = registry.register_class("Style", None).unwrap();
/// let mut table = CssPropertyTable::new(style);
///
/// let placeholder = table
///     .register(
///         &mut registry,
///         CssPropertyOptions::style_only("placeholderColor", "placeholder-color"),
///         PropertyMetadata::new(None::<u32>),
///     )
///     .unwrap();
///
/// assert_eq!(table.by_css_name("placeholder-color"), Some(placeholder.id()));
/// assert_eq!(table.by_alias("placeholderColor"), None);
/// ```
#[derive(Debug)]
pub struct CssPropertyTable {
    style_class: NodeClassId,
    entries: alloc::vec::Vec<CssEntry>,
    by_css_name: HashMap<&'static str, usize>,
    by_alias: HashMap<&'static str, usize>,
}

impl CssPropertyTable {
    /// Creates an empty table for properties declared on `style_class`.
    #[must_use]
    pub fn new(style_class: NodeClassId) -> Self {
        Self {
            style_class,
            entries: alloc::vec::Vec::new(),
            by_css_name: HashMap::new(),
            by_alias: HashMap::new(),
        }
    }

    /// Returns the style class the properties are declared on.
    #[must_use]
    #[inline]
    pub fn style_class(&self) -> NodeClassId {
        self.style_class
    }

    /// Declares a CSS property.
    ///
    /// The CSS name and (for aliased properties) the programmatic name must
    /// be unique within the table.
    pub fn register<T: PropertyValue>(
        &mut self,
        registry: &mut PropertyRegistry,
        options: CssPropertyOptions,
        metadata: PropertyMetadata<T>,
    ) -> Result<CssProperty<T>, RegistrationError> {
        if self.by_css_name.contains_key(options.css_name) {
            return Err(RegistrationError::DuplicateAlias {
                kind: "css property",
                name: options.css_name,
            });
        }
        if options.node_accessor == NodeAccessor::Alias && self.by_alias.contains_key(options.name)
        {
            return Err(RegistrationError::DuplicateAlias {
                kind: "node alias",
                name: options.name,
            });
        }
        let property = registry.register(self.style_class, options.name, metadata)?;

        let index = self.entries.len();
        self.entries.push(CssEntry {
            id: property.id(),
            css_name: options.css_name,
            name: options.name,
            node_accessor: options.node_accessor,
        });
        self.by_css_name.insert(options.css_name, index);
        if options.node_accessor == NodeAccessor::Alias {
            self.by_alias.insert(options.name, index);
        }
        Ok(CssProperty {
            property,
            css_name: options.css_name,
            node_accessor: options.node_accessor,
        })
    }

    /// Looks a property up by CSS name.
    #[must_use]
    pub fn by_css_name(&self, css_name: &str) -> Option<PropertyId> {
        self.by_css_name
            .get(css_name)
            .map(|index| self.entries[*index].id)
    }

    /// Looks up a property reachable from the node under `name`.
    #[must_use]
    pub fn by_alias(&self, name: &str) -> Option<PropertyId> {
        self.by_alias.get(name).map(|index| self.entries[*index].id)
    }

    /// Looks a property up by programmatic name, regardless of accessor policy.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<(PropertyId, NodeAccessor)> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| (entry.id, entry.node_accessor))
    }

    /// Returns the CSS name of a property.
    #[must_use]
    pub fn css_name_of(&self, id: PropertyId) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.css_name)
    }

    /// Returns the number of CSS properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no CSS properties are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;

    fn table() -> (PropertyRegistry, CssPropertyTable) {
        let mut registry = PropertyRegistry::new();
        let style = registry.register_class("Style", None).unwrap();
        (registry, CssPropertyTable::new(style))
    }

    #[test]
    fn aliased_properties_are_reachable_from_the_node() {
        let (mut registry, mut table) = table();
        let color = table
            .register(
                &mut registry,
                CssPropertyOptions::aliased("color", "color"),
                PropertyMetadata::new(String::new()),
            )
            .unwrap();
        assert_eq!(table.by_alias("color"), Some(color.id()));
        assert_eq!(table.by_name("color"), Some((color.id(), NodeAccessor::Alias)));
        assert_eq!(table.css_name_of(color.id()), Some("color"));
    }

    #[test]
    fn style_only_properties_have_no_alias() {
        let (mut registry, mut table) = table();
        let placeholder = table
            .register(
                &mut registry,
                CssPropertyOptions::style_only("placeholderColor", "placeholder-color"),
                PropertyMetadata::new(String::new()),
            )
            .unwrap();
        assert_eq!(placeholder.node_accessor(), NodeAccessor::StyleOnly);
        assert_eq!(table.by_alias("placeholderColor"), None);
        assert_eq!(
            table.by_name("placeholderColor"),
            Some((placeholder.id(), NodeAccessor::StyleOnly))
        );
    }

    #[test]
    fn duplicate_css_names_are_rejected() {
        let (mut registry, mut table) = table();
        table
            .register(
                &mut registry,
                CssPropertyOptions::aliased("color", "color"),
                PropertyMetadata::new(0_u32),
            )
            .unwrap();
        let err = table
            .register(
                &mut registry,
                CssPropertyOptions::aliased("foreground", "color"),
                PropertyMetadata::new(0_u32),
            )
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateAlias {
                kind: "css property",
                name: "color",
            }
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn duplicate_programmatic_names_are_rejected_by_the_registry() {
        let (mut registry, mut table) = table();
        table
            .register(
                &mut registry,
                CssPropertyOptions::style_only("tint", "tint"),
                PropertyMetadata::new(0_u32),
            )
            .unwrap();
        assert!(matches!(
            table.register(
                &mut registry,
                CssPropertyOptions::style_only("tint", "tint-color"),
                PropertyMetadata::new(0_u32),
            ),
            Err(RegistrationError::DuplicateProperty { name: "tint", .. })
        ));
    }
}
