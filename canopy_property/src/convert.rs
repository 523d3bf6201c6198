// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Value converters and validators.
//!
//! Markup, style sheets and native callbacks deliver attribute values as
//! loosely-typed [`RawValue`]s. A [`Converter`] turns one into the property's
//! value type or rejects it with a [`ValidationError`]. All converters here
//! are pure.
//!
//! Keyword properties are built in two steps, a [`Validator`] naming the
//! accepted keywords and a parser wrapping it:
//!
//! ```rust
//! use canopy_property::{Keyword, RawValue, make_parser, make_validator};
//!
//! #[derive(Copy, Clone, Debug, PartialEq, Eq)]
//! enum ReturnKey { Done, Next }
//!
//! impl Keyword for ReturnKey {
//!     fn keyword(self) -> &'static str {
//!         match self {
//!             Self::Done => "done",
//!             Self::Next => "next",
//!         }
//!     }
//! }
//!
//! let parse = make_parser(make_validator(&[ReturnKey::Done, ReturnKey::Next]));
//! assert_eq!(parse(&RawValue::from("Next")), Ok(ReturnKey::Next));
//! assert!(parse(&RawValue::from("later")).is_err());
//! ```

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use core::fmt;

use crate::error::{Expected, ValidationError};

/// A boxed converter from raw input to a typed value.
pub type Converter<T> = Box<dyn Fn(&RawValue) -> Result<T, ValidationError> + Send + Sync>;

/// A loosely-typed attribute value as delivered by markup, CSS or a native bridge.
#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    /// A string value.
    Text(String),
    /// A native boolean.
    Bool(bool),
    /// A native integer.
    Int(i64),
    /// A native floating point number.
    Number(f64),
}

impl RawValue {
    /// Returns the text, if this is a [`RawValue::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Serializes the value the way it would be written in markup.
impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// A closed set of keyword values, such as an enum of keyboard types.
pub trait Keyword: Copy + Eq + Send + Sync + 'static {
    /// The keyword as written in markup and CSS.
    fn keyword(self) -> &'static str;
}

/// Checks raw text against a fixed set of keywords.
///
/// Matching is ASCII case-insensitive.
#[derive(Clone, Debug)]
pub struct Validator<T: 'static> {
    allowed: &'static [T],
}

impl<T: Keyword> Validator<T> {
    /// Returns the keyword value matching `text`, if it is allowed.
    #[must_use]
    pub fn check(&self, text: &str) -> Option<T> {
        self.allowed
            .iter()
            .copied()
            .find(|value| value.keyword().eq_ignore_ascii_case(text))
    }

    /// Returns the accepted keywords, in declaration order.
    #[must_use]
    pub fn expected(&self) -> Expected {
        Expected::Keywords(self.allowed.iter().map(|value| value.keyword()).collect())
    }
}

/// Creates a validator accepting exactly `allowed`.
#[must_use]
pub fn make_validator<T: Keyword>(allowed: &'static [T]) -> Validator<T> {
    Validator { allowed }
}

/// Wraps a validator into a converter.
///
/// Text that matches an allowed keyword converts to that value; any other
/// input, including non-text raw values, fails with the allowed set.
pub fn make_parser<T: Keyword>(
    validator: Validator<T>,
) -> impl Fn(&RawValue) -> Result<T, ValidationError> + Send + Sync + 'static {
    move |raw| {
        raw.as_text()
            .and_then(|text| validator.check(text.trim()))
            .ok_or_else(|| ValidationError::new(raw.to_string(), validator.expected()))
    }
}

/// Converts `"true"`/`"false"` (any case) or a native boolean.
pub fn boolean_converter(raw: &RawValue) -> Result<bool, ValidationError> {
    match raw {
        RawValue::Bool(value) => Ok(*value),
        RawValue::Text(text) if text.trim().eq_ignore_ascii_case("true") => Ok(true),
        RawValue::Text(text) if text.trim().eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(ValidationError::new(raw.to_string(), Expected::Boolean)),
    }
}

/// Converts a leading integer.
///
/// Text is parsed as optional whitespace, an optional sign and one or more
/// decimal digits; anything after the digits is ignored, so `"12px"` is 12.
/// Native numbers truncate toward zero. Booleans, non-finite numbers and text
/// without leading digits are rejected.
pub fn parse_int(raw: &RawValue) -> Result<i64, ValidationError> {
    let reject = || ValidationError::new(raw.to_string(), Expected::Integer);
    match raw {
        RawValue::Int(value) => Ok(*value),
        RawValue::Number(value) if value.is_finite() => {
            if *value <= -9.223_372_036_854_775e18 || *value >= 9.223_372_036_854_775e18 {
                return Err(reject());
            }
            // `as` truncates toward zero.
            #[expect(clippy::cast_possible_truncation, reason = "range checked above")]
            let value = *value as i64;
            Ok(value)
        }
        RawValue::Text(text) => {
            let text = text.trim_start();
            let (negative, digits) = match text.as_bytes().first() {
                Some(b'-') => (true, &text[1..]),
                Some(b'+') => (false, &text[1..]),
                _ => (false, text),
            };
            let end = digits
                .bytes()
                .position(|b| !b.is_ascii_digit())
                .unwrap_or(digits.len());
            if end == 0 {
                return Err(reject());
            }
            // Accumulate toward the sign so `i64::MIN` fits.
            let mut value: i64 = 0;
            for digit in digits[..end].bytes() {
                let digit = i64::from(digit - b'0');
                value = value
                    .checked_mul(10)
                    .and_then(|v| {
                        if negative {
                            v.checked_sub(digit)
                        } else {
                            v.checked_add(digit)
                        }
                    })
                    .ok_or_else(reject)?;
            }
            Ok(value)
        }
        RawValue::Number(_) | RawValue::Bool(_) => Err(reject()),
    }
}

/// Accepts any raw value as text.
pub fn string_converter(raw: &RawValue) -> Result<String, ValidationError> {
    Ok(match raw {
        RawValue::Text(text) => text.clone(),
        other => other.to_string(),
    })
}

/// Lifts a converter into one producing `Some(value)`.
///
/// Used for properties whose default is "unset" (`None`), such as a property
/// that defers to the platform until assigned.
pub fn optional<T, F>(
    converter: F,
) -> impl Fn(&RawValue) -> Result<Option<T>, ValidationError> + Send + Sync + 'static
where
    F: Fn(&RawValue) -> Result<T, ValidationError> + Send + Sync + 'static,
{
    move |raw| converter(raw).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    enum Capitalization {
        None,
        Words,
        Sentences,
    }

    impl Keyword for Capitalization {
        fn keyword(self) -> &'static str {
            match self {
                Self::None => "none",
                Self::Words => "words",
                Self::Sentences => "sentences",
            }
        }
    }

    const ALL: &[Capitalization] = &[
        Capitalization::None,
        Capitalization::Words,
        Capitalization::Sentences,
    ];

    #[test]
    fn validator_is_case_insensitive() {
        let validator = make_validator(ALL);
        assert_eq!(validator.check("WORDS"), Some(Capitalization::Words));
        assert_eq!(validator.check("letters"), None);
    }

    #[test]
    fn parser_names_allowed_set_on_failure() {
        let parse = make_parser(make_validator(ALL));
        let err = parse(&RawValue::from("shout")).unwrap_err();
        assert_eq!(err.rejected, "shout");
        assert_eq!(
            err.expected,
            Expected::Keywords(vec!["none", "words", "sentences"])
        );
        assert!(parse(&RawValue::Bool(true)).is_err());
    }

    #[test]
    fn boolean_accepts_literals_and_natives() {
        assert_eq!(boolean_converter(&"TRUE".into()), Ok(true));
        assert_eq!(boolean_converter(&"false".into()), Ok(false));
        assert_eq!(boolean_converter(&RawValue::Bool(true)), Ok(true));
        assert!(boolean_converter(&"yes".into()).is_err());
        assert!(boolean_converter(&RawValue::Int(1)).is_err());
    }

    #[test]
    fn parse_int_reads_leading_digits() {
        assert_eq!(parse_int(&"7".into()), Ok(7));
        assert_eq!(parse_int(&"  -12px".into()), Ok(-12));
        assert_eq!(parse_int(&"+3.9".into()), Ok(3));
        assert_eq!(parse_int(&RawValue::Number(7.9)), Ok(7));
        assert_eq!(parse_int(&RawValue::Number(-7.9)), Ok(-7));
        assert_eq!(parse_int(&RawValue::Int(40)), Ok(40));
        assert_eq!(parse_int(&"-9223372036854775808".into()), Ok(i64::MIN));
        assert_eq!(parse_int(&"9223372036854775807".into()), Ok(i64::MAX));
    }

    #[test]
    fn parse_int_rejects_non_numeric() {
        assert!(parse_int(&"abc".into()).is_err());
        assert!(parse_int(&"-".into()).is_err());
        assert!(parse_int(&"".into()).is_err());
        assert!(parse_int(&RawValue::Number(f64::INFINITY)).is_err());
        assert!(parse_int(&RawValue::Number(f64::NAN)).is_err());
        assert!(parse_int(&RawValue::Bool(true)).is_err());
        assert!(parse_int(&"99999999999999999999".into()).is_err());
    }

    #[test]
    fn string_converter_serializes_natives() {
        assert_eq!(string_converter(&RawValue::Int(5)).as_deref(), Ok("5"));
        assert_eq!(string_converter(&"Name".into()).as_deref(), Ok("Name"));
    }

    #[test]
    fn optional_wraps_success() {
        let parse = optional(boolean_converter);
        assert_eq!(parse(&"true".into()), Ok(Some(true)));
        assert!(parse(&"nope".into()).is_err());
    }
}
