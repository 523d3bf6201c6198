// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy for property declaration and property access.
//!
//! - [`ValidationError`]: a raw value is outside the declared set or type.
//!   The write is rejected and the previous value is kept.
//! - [`RegistrationError`]: a schema declaration is inconsistent. These occur
//!   while classes and properties are declared and are meant to halt startup.
//! - [`PropertyError`]: any per-attribute failure at runtime. Never fatal to
//!   the rest of the node.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// What a converter was willing to accept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expected {
    /// One of a fixed set of keywords.
    Keywords(Vec<&'static str>),
    /// `true` or `false`.
    Boolean,
    /// An integer, optionally followed by non-digit characters.
    Integer,
    /// Text.
    Text,
    /// A converter-specific description, e.g. `"a CSS color"`.
    Custom(&'static str),
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keywords(keywords) => {
                f.write_str("one of ")?;
                for (i, keyword) in keywords.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "`{keyword}`")?;
                }
                Ok(())
            }
            Self::Boolean => f.write_str("`true` or `false`"),
            Self::Integer => f.write_str("an integer"),
            Self::Text => f.write_str("text"),
            Self::Custom(description) => f.write_str(description),
        }
    }
}

/// A raw value was rejected by a property's converter.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid value `{rejected}`{}; expected {expected}", ForProperty(.property))]
pub struct ValidationError {
    /// The property the value was written to, once known.
    pub property: Option<&'static str>,
    /// The rejected input, as text.
    pub rejected: String,
    /// The accepted set.
    pub expected: Expected,
}

impl ValidationError {
    /// Creates an error for a value rejected by a converter.
    #[must_use]
    pub fn new(rejected: impl Into<String>, expected: Expected) -> Self {
        Self {
            property: None,
            rejected: rejected.into(),
            expected,
        }
    }

    /// Attaches the name of the property being written.
    #[must_use]
    pub fn for_property(mut self, name: &'static str) -> Self {
        self.property = Some(name);
        self
    }
}

struct ForProperty<'a>(&'a Option<&'static str>);

impl fmt::Display for ForProperty<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(name) => write!(f, " for `{name}`"),
            None => Ok(()),
        }
    }
}

/// A schema declaration error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// The class (or one of its ancestors) already declares a property with this name.
    #[error("property `{name}` is already registered on class `{class}`")]
    DuplicateProperty {
        /// Name of the class that owns the existing declaration.
        class: &'static str,
        /// The duplicated property name.
        name: &'static str,
    },
    /// A class with this name already exists.
    #[error("node class `{name}` is already registered")]
    DuplicateClass {
        /// The duplicated class name.
        name: &'static str,
    },
    /// A secondary name (such as a CSS name) is already taken.
    #[error("{kind} `{name}` is already registered")]
    DuplicateAlias {
        /// What kind of name collided, e.g. `"css property"`.
        kind: &'static str,
        /// The duplicated name.
        name: &'static str,
    },
    /// The class ID is not known to this registry.
    #[error("unknown node class {0:?}")]
    UnknownClass(crate::NodeClassId),
    /// A default refinement names a property the class does not carry.
    #[error("class `{class}` does not carry property `{name}`")]
    NotInherited {
        /// The refining class.
        class: &'static str,
        /// The property name.
        name: &'static str,
    },
    /// The refined default does not have the property's value type.
    #[error("default for `{name}` does not have the declared type `{expected}`")]
    DefaultTypeMismatch {
        /// The property name.
        name: &'static str,
        /// The declared value type.
        expected: &'static str,
    },
    /// The 16-bit ID space is exhausted.
    #[error("too many {0} registered")]
    TooMany(&'static str),
    /// A process-wide schema was initialized twice.
    #[error("schema `{0}` is already initialized")]
    AlreadyInitialized(&'static str),
}

/// A per-attribute runtime failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// The value failed conversion or validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// No property with this name is declared.
    #[error("unknown property `{0}`")]
    UnknownProperty(String),
    /// The property exists but is not carried by the node's class.
    #[error("property `{name}` is not declared on class `{class}`")]
    NotOnClass {
        /// The node's class.
        class: &'static str,
        /// The property name.
        name: &'static str,
    },
    /// The typed handle does not match the declared value type.
    #[error("property `{name}` holds `{declared}`, not the requested type")]
    TypeMismatch {
        /// The property name.
        name: &'static str,
        /// The declared value type.
        declared: &'static str,
    },
    /// A raw value was written to a property declared without a converter.
    #[error("property `{0}` has no value converter")]
    NoConverter(&'static str),
}
