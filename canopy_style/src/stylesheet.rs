// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rule-based style selection.
//!
//! A [`StyleSheet`] is a collection of [`StyleRule`]s. Each rule combines a
//! [`Selector`] with declarations that were converted to typed values when
//! the sheet was built. Declarations that could not be converted are dropped
//! from the rule and kept as [`StyleSheet::diagnostics`].

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, Ordering};

use canopy_property::{ErasedValue, PropertyError, PropertyId, PropertyRegistry, RawValue};

use crate::cascade::{Priority, RuleKey, StyleOrigin};
use crate::css::CssPropertyTable;
use crate::error::CascadeError;
use crate::selector::Selector;

static NEXT_SHEET: AtomicU32 = AtomicU32::new(0);

/// A converted `css-name: value` pair.
#[derive(Clone, Debug)]
pub struct Declaration {
    /// The declared property.
    pub property: PropertyId,
    /// The CSS name as written.
    pub css_name: &'static str,
    /// The converted value.
    pub value: ErasedValue,
}

/// A single rule in a [`StyleSheet`].
#[derive(Clone, Debug)]
pub struct StyleRule {
    key: RuleKey,
    selector: Selector,
    declarations: Vec<Declaration>,
    priority: Priority,
}

impl StyleRule {
    /// Returns the rule's key.
    #[must_use]
    pub fn key(&self) -> RuleKey {
        self.key
    }

    /// Returns the selector.
    #[must_use]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Returns the converted declarations.
    #[must_use]
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Returns the rule's cascade priority.
    #[must_use]
    pub fn priority(&self) -> Priority {
        self.priority
    }
}

/// A rejected declaration, kept for reporting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// The rule the declaration belonged to.
    pub rule: RuleKey,
    /// Why it was rejected.
    pub error: CascadeError,
}

#[derive(Debug, Default)]
struct StyleSheetData {
    id: u32,
    origin: Option<StyleOrigin>,
    rules: Vec<StyleRule>,
    diagnostics: Vec<Diagnostic>,
}

/// A collection of style rules.
///
/// `StyleSheet` is immutable after creation and cheap to clone. Use
/// [`StyleSheetBuilder`] to construct instances.
#[derive(Clone, Debug, Default)]
pub struct StyleSheet {
    inner: Rc<StyleSheetData>,
}

impl StyleSheet {
    /// Returns the sheet's source ID, shared by all its [`RuleKey`]s.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.inner.id
    }

    /// Returns the sheet's origin.
    #[must_use]
    pub fn origin(&self) -> StyleOrigin {
        self.inner.origin.unwrap_or(StyleOrigin::Sheet)
    }

    /// Returns the number of rules in this sheet.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.rules.len()
    }

    /// Returns `true` if this sheet has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.rules.is_empty()
    }

    /// Returns an iterator over rules, in source order.
    pub fn rules(&self) -> impl Iterator<Item = &StyleRule> + '_ {
        self.inner.rules.iter()
    }

    /// Returns the rule with the given key.
    #[must_use]
    pub fn rule(&self, key: RuleKey) -> Option<&StyleRule> {
        if key.source != self.inner.id {
            return None;
        }
        self.inner.rules.iter().find(|rule| rule.key == key)
    }

    /// Returns the declarations rejected while building the sheet.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.inner.diagnostics
    }
}

/// Builder for constructing [`StyleSheet`] instances.
///
/// # Example
///
/// ```rust
/// use canopy_property::{PropertyMetadataBuilder, PropertyRegistry, RawValue, parse_int};
/// use canopy_style::{CssPropertyOptions, CssPropertyTable, Selector, StyleSheetBuilder};
///
/// let mut registry = PropertyRegistry::new();
/// let style = registry.register_class("Style", None).unwrap();
/// let mut table = CssPropertyTable::new(style);
/// table
///     .register(
///         &mut registry,
///         CssPropertyOptions::aliased("fontSize", "font-size"),
///         PropertyMetadataBuilder::new(12_i64).converter(parse_int).build(),
///     )
///     .unwrap();
///
/// let sheet = StyleSheetBuilder::new(&table, &registry)
///     .rule(
///         Selector::universal(),
///         [
///             ("font-size", RawValue::from("14")),
///             ("font-sise", RawValue::from("9")),
///         ],
///     )
///     .build();
///
/// assert_eq!(sheet.len(), 1);
/// assert_eq!(sheet.rules().next().unwrap().declarations().len(), 1);
/// assert_eq!(sheet.diagnostics().len(), 1);
/// ```
#[derive(Debug)]
pub struct StyleSheetBuilder<'a> {
    table: &'a CssPropertyTable,
    registry: &'a PropertyRegistry,
    id: u32,
    origin: StyleOrigin,
    rules: Vec<StyleRule>,
    diagnostics: Vec<Diagnostic>,
    next_order: u32,
}

impl<'a> StyleSheetBuilder<'a> {
    /// Creates a new empty builder for a sheet of [`StyleOrigin::Sheet`].
    #[must_use]
    pub fn new(table: &'a CssPropertyTable, registry: &'a PropertyRegistry) -> Self {
        Self {
            table,
            registry,
            id: NEXT_SHEET.fetch_add(1, Ordering::Relaxed),
            origin: StyleOrigin::Sheet,
            rules: Vec::new(),
            diagnostics: Vec::new(),
            next_order: 0,
        }
    }

    /// Sets the origin of every rule in the sheet.
    #[must_use]
    pub fn origin(mut self, origin: StyleOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Adds a rule, converting each declaration.
    ///
    /// Declarations with an unknown CSS name or an invalid value are logged,
    /// recorded as diagnostics and left out of the rule.
    #[must_use]
    pub fn rule<'d>(
        mut self,
        selector: Selector,
        declarations: impl IntoIterator<Item = (&'d str, RawValue)>,
    ) -> Self {
        let order = self.next_order;
        self.next_order = self.next_order.saturating_add(1);
        let key = RuleKey::new(self.id, order);

        let mut converted = Vec::new();
        for (css_name, raw) in declarations {
            match self.convert(css_name, &raw) {
                Ok(declaration) => converted.push(declaration),
                Err(error) => {
                    tracing::warn!(?key, css_name, %raw, %error, "rejected style declaration");
                    self.diagnostics.push(Diagnostic { rule: key, error });
                }
            }
        }

        let priority = Priority::new(self.origin, selector.specificity(), order);
        self.rules.push(StyleRule {
            key,
            selector,
            declarations: converted,
            priority,
        });
        self
    }

    fn convert(&self, css_name: &str, raw: &RawValue) -> Result<Declaration, CascadeError> {
        let Some(property) = self.table.by_css_name(css_name) else {
            return Err(CascadeError::UnknownCssProperty {
                css_name: css_name.into(),
            });
        };
        let registration = self
            .registry
            .get(property)
            .ok_or_else(|| PropertyError::UnknownProperty(css_name.into()))?;
        let value = registration
            .convert(raw)
            .ok_or(PropertyError::NoConverter(registration.name()))??;
        Ok(Declaration {
            property,
            css_name: self.table.css_name_of(property).unwrap_or_default(),
            value,
        })
    }

    /// Builds the stylesheet.
    #[must_use]
    pub fn build(self) -> StyleSheet {
        StyleSheet {
            inner: Rc::new(StyleSheetData {
                id: self.id,
                origin: Some(self.origin),
                rules: self.rules,
                diagnostics: self.diagnostics,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::CssPropertyOptions;
    use crate::selector::{ClassId, Specificity};
    use canopy_property::{PropertyMetadataBuilder, boolean_converter, parse_int};

    fn table() -> (PropertyRegistry, CssPropertyTable) {
        let mut registry = PropertyRegistry::new();
        let style = registry.register_class("Style", None).unwrap();
        let mut table = CssPropertyTable::new(style);
        table
            .register(
                &mut registry,
                CssPropertyOptions::aliased("fontSize", "font-size"),
                PropertyMetadataBuilder::new(12_i64).converter(parse_int).build(),
            )
            .unwrap();
        table
            .register(
                &mut registry,
                CssPropertyOptions::aliased("visible", "visible"),
                PropertyMetadataBuilder::new(true)
                    .converter(boolean_converter)
                    .build(),
            )
            .unwrap();
        (registry, table)
    }

    #[test]
    fn rules_get_keys_and_priorities_in_order() {
        let (registry, table) = table();
        let sheet = StyleSheetBuilder::new(&table, &registry)
            .rule(Selector::universal(), [("font-size", RawValue::from("10"))])
            .rule(
                Selector::universal().with_classes([ClassId(1)]),
                [("visible", RawValue::from("false"))],
            )
            .build();

        let rules: Vec<_> = sheet.rules().collect();
        assert_eq!(rules[0].key(), RuleKey::new(sheet.id(), 0));
        assert_eq!(rules[1].key(), RuleKey::new(sheet.id(), 1));
        assert_eq!(
            rules[1].priority(),
            Priority::new(StyleOrigin::Sheet, Specificity(0, 1, 0), 1)
        );
        assert_eq!(
            rules[1].declarations()[0].value.downcast_ref::<bool>(),
            Some(&false)
        );
        assert!(sheet.rule(RuleKey::new(sheet.id(), 1)).is_some());
        assert!(sheet.rule(RuleKey::new(sheet.id().wrapping_add(1), 1)).is_none());
    }

    #[test]
    fn sheets_get_distinct_ids() {
        let (registry, table) = table();
        let a = StyleSheetBuilder::new(&table, &registry).build();
        let b = StyleSheetBuilder::new(&table, &registry).build();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn invalid_declarations_become_diagnostics() {
        let (registry, table) = table();
        let sheet = StyleSheetBuilder::new(&table, &registry)
            .origin(StyleOrigin::Override)
            .rule(
                Selector::universal(),
                [
                    ("visible", RawValue::from("sometimes")),
                    ("font-size", RawValue::from("20")),
                    ("colour", RawValue::from("red")),
                ],
            )
            .build();

        assert_eq!(sheet.origin(), StyleOrigin::Override);
        let rule = sheet.rules().next().unwrap();
        assert_eq!(rule.declarations().len(), 1);
        assert_eq!(rule.declarations()[0].css_name, "font-size");

        let diagnostics = sheet.diagnostics();
        assert_eq!(diagnostics.len(), 2);
        assert!(matches!(diagnostics[0].error, CascadeError::Validation(_)));
        assert!(matches!(
            diagnostics[1].error,
            CascadeError::UnknownCssProperty { .. }
        ));
    }
}
