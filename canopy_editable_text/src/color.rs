// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;

use canopy_property::{Expected, RawValue, ValidationError};
use peniko::color::{self, Rgba8, Srgb};

/// A CSS color value.
///
/// Two colors are equal when they have the same 8-bit RGBA components, so
/// a style that re-declares a color in another notation (`#f00` after `red`)
/// is not a change.
#[derive(Copy, Clone)]
pub struct Color(peniko::Color);

impl Color {
    /// Creates a color from 8-bit sRGB components.
    #[must_use]
    pub const fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(peniko::Color::from_rgba8(r, g, b, a))
    }

    /// Parses any CSS color syntax.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        color::parse_color(text.trim())
            .map(|parsed| Self(parsed.to_alpha_color::<Srgb>()))
            .map_err(|_| ValidationError::new(text, Expected::Custom("a css color")))
    }

    /// Converts attribute input: CSS text, or an integer in `0xAARRGGBB` form.
    pub fn convert(raw: &RawValue) -> Result<Self, ValidationError> {
        match raw {
            RawValue::Text(text) => Self::parse(text),
            RawValue::Int(argb) => u32::try_from(*argb)
                .map(|argb| {
                    let [a, r, g, b] = argb.to_be_bytes();
                    Self::from_rgba8(r, g, b, a)
                })
                .map_err(|_| ValidationError::new(raw.to_string(), Expected::Custom("a css color"))),
            RawValue::Bool(_) | RawValue::Number(_) => Err(ValidationError::new(
                raw.to_string(),
                Expected::Custom("a css color"),
            )),
        }
    }

    /// Compares two colors by their 8-bit components.
    #[must_use]
    pub fn equals(a: &Self, b: &Self) -> bool {
        a.to_rgba8() == b.to_rgba8()
    }

    /// Returns the 8-bit components.
    #[must_use]
    pub fn to_rgba8(self) -> Rgba8 {
        self.0.to_rgba8()
    }

    /// Returns the underlying color.
    #[must_use]
    pub fn to_peniko(self) -> peniko::Color {
        self.0
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        Self::equals(self, other)
    }
}

impl From<peniko::Color> for Color {
    fn from(color: peniko::Color) -> Self {
        Self(color)
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Rgba8 { r, g, b, a } = self.to_rgba8();
        write!(f, "Color(#{r:02x}{g:02x}{b:02x}{a:02x})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notations_compare_equal() {
        let named = Color::parse("red").unwrap();
        let hex = Color::parse(" #ff0000 ").unwrap();
        assert_eq!(named, hex);
        assert_eq!(named, Color::from_rgba8(255, 0, 0, 255));
        assert_ne!(named, Color::parse("#fe0000").unwrap());
    }

    #[test]
    fn integers_are_argb() {
        let color = Color::convert(&RawValue::Int(0x80_00_ff_00)).unwrap();
        assert_eq!(color, Color::from_rgba8(0, 255, 0, 128));
        assert!(Color::convert(&RawValue::Int(-1)).is_err());
    }

    #[test]
    fn rejects_garbage() {
        let err = Color::convert(&RawValue::from("blurple")).unwrap_err();
        assert_eq!(err.rejected, "blurple");
        assert!(Color::convert(&RawValue::Bool(true)).is_err());
    }

    #[test]
    fn debug_shows_hex() {
        assert_eq!(
            format!("{:?}", Color::from_rgba8(0x12, 0x34, 0x56, 0xff)),
            "Color(#123456ff)"
        );
    }
}
