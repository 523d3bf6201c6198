// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

use canopy_property::{PropertyError, ValidationError};

/// A style-level failure for a single declaration or access.
///
/// None of these abort a cascade: the offending declaration is skipped and
/// the remaining ones still apply.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CascadeError {
    /// A declaration names a CSS property that was never declared.
    #[error("unknown css property `{css_name}`")]
    UnknownCssProperty {
        /// The CSS name as written.
        css_name: String,
    },
    /// The property has no node-level accessor and must be set through the
    /// style object.
    #[error("`{name}` is only accessible through the style object")]
    StyleOnly {
        /// The property name.
        name: &'static str,
    },
    /// The declared value was rejected by the property's converter.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Any other per-property failure.
    #[error(transparent)]
    Property(PropertyError),
}

/// Validation failures surface as [`CascadeError::Validation`].
impl From<PropertyError> for CascadeError {
    fn from(err: PropertyError) -> Self {
        match err {
            PropertyError::Validation(err) => Self::Validation(err),
            other => Self::Property(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use canopy_property::Expected;

    #[test]
    fn messages() {
        let err = CascadeError::UnknownCssProperty {
            css_name: "placeholder-colour".into(),
        };
        assert_eq!(err.to_string(), "unknown css property `placeholder-colour`");

        let err = CascadeError::StyleOnly {
            name: "placeholderColor",
        };
        assert_eq!(
            err.to_string(),
            "`placeholderColor` is only accessible through the style object"
        );

        let err: CascadeError = ValidationError::new("blurple", Expected::Custom("a css color"))
            .for_property("color")
            .into();
        assert_eq!(
            err.to_string(),
            "invalid value `blurple` for `color`; expected a css color"
        );
    }

    #[test]
    fn property_validation_is_flattened() {
        let err: CascadeError =
            PropertyError::Validation(ValidationError::new("x", Expected::Integer)).into();
        assert!(matches!(err, CascadeError::Validation(_)));

        let err: CascadeError = PropertyError::NoConverter("hint").into();
        assert_eq!(err, CascadeError::Property(PropertyError::NoConverter("hint")));
    }
}
