// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyword-valued attributes.

use canopy_property::Keyword;

bitflags::bitflags! {
    /// Native input type bits handed to [`NativeBridge::set_input_type`].
    ///
    /// The low nibble is the input class; the remaining bits are the class's
    /// variation and flags.
    ///
    /// [`NativeBridge::set_input_type`]: crate::NativeBridge::set_input_type
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct InputType: i32 {
        /// Free text.
        const CLASS_TEXT = 0x1;
        /// Numbers.
        const CLASS_NUMBER = 0x2;
        /// Phone numbers.
        const CLASS_PHONE = 0x3;
        /// Dates and times.
        const CLASS_DATETIME = 0x4;
        /// Text that is a URI.
        const TEXT_VARIATION_URI = 0x10;
        /// Text that is an e-mail address.
        const TEXT_VARIATION_EMAIL_ADDRESS = 0x20;
        /// Numbers may be negative.
        const NUMBER_FLAG_SIGNED = 0x1000;
        /// Numbers may have a fractional part.
        const NUMBER_FLAG_DECIMAL = 0x2000;
    }
}

/// The soft keyboard layout requested by `keyboardType`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyboardType {
    /// Date and time entry.
    Datetime,
    /// Phone pad.
    Phone,
    /// Signed decimal numbers.
    Number,
    /// URL entry.
    Url,
    /// E-mail address entry.
    Email,
    /// Whole numbers.
    Integer,
}

impl KeyboardType {
    /// Every keyword, in declaration order.
    pub const ALL: &'static [Self] = &[
        Self::Datetime,
        Self::Phone,
        Self::Number,
        Self::Url,
        Self::Email,
        Self::Integer,
    ];

    /// Returns the native input type for an optional keyboard type.
    ///
    /// `None` is plain text.
    #[must_use]
    pub fn input_type(keyboard: Option<Self>) -> InputType {
        match keyboard {
            None => InputType::CLASS_TEXT,
            Some(Self::Datetime) => InputType::CLASS_DATETIME,
            Some(Self::Phone) => InputType::CLASS_PHONE,
            Some(Self::Number) => {
                InputType::CLASS_NUMBER
                    | InputType::NUMBER_FLAG_SIGNED
                    | InputType::NUMBER_FLAG_DECIMAL
            }
            Some(Self::Url) => InputType::CLASS_TEXT | InputType::TEXT_VARIATION_URI,
            Some(Self::Email) => InputType::CLASS_TEXT | InputType::TEXT_VARIATION_EMAIL_ADDRESS,
            Some(Self::Integer) => InputType::CLASS_NUMBER,
        }
    }
}

impl Keyword for KeyboardType {
    fn keyword(self) -> &'static str {
        match self {
            Self::Datetime => "datetime",
            Self::Phone => "phone",
            Self::Number => "number",
            Self::Url => "url",
            Self::Email => "email",
            Self::Integer => "integer",
        }
    }
}

/// The label of the soft keyboard's return key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReturnKeyType {
    /// "Done".
    Done,
    /// "Next".
    Next,
    /// "Go".
    Go,
    /// "Search".
    Search,
    /// "Send".
    Send,
}

impl ReturnKeyType {
    /// Every keyword, in declaration order.
    pub const ALL: &'static [Self] = &[Self::Done, Self::Next, Self::Go, Self::Search, Self::Send];
}

impl Keyword for ReturnKeyType {
    fn keyword(self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Next => "next",
            Self::Go => "go",
            Self::Search => "search",
            Self::Send => "send",
        }
    }
}

/// Automatic capitalization of typed text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum AutocapitalizationType {
    /// No automatic capitalization.
    None,
    /// The first letter of every word.
    Words,
    /// The first letter of every sentence.
    #[default]
    Sentences,
    /// Every letter.
    AllCharacters,
}

impl AutocapitalizationType {
    /// Every keyword, in declaration order.
    pub const ALL: &'static [Self] = &[
        Self::None,
        Self::Words,
        Self::Sentences,
        Self::AllCharacters,
    ];
}

impl Keyword for AutocapitalizationType {
    fn keyword(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Words => "words",
            Self::Sentences => "sentences",
            Self::AllCharacters => "allcharacters",
        }
    }
}

/// When edits made in the native widget are committed to `text`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum UpdateTextTrigger {
    /// When the field loses focus.
    FocusLost,
    /// On every edit.
    #[default]
    TextChanged,
}

impl UpdateTextTrigger {
    /// Every keyword, in declaration order.
    pub const ALL: &'static [Self] = &[Self::FocusLost, Self::TextChanged];
}

impl Keyword for UpdateTextTrigger {
    fn keyword(self) -> &'static str {
        match self {
            Self::FocusLost => "focusLost",
            Self::TextChanged => "textChanged",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_property::{RawValue, make_parser, make_validator};

    #[test]
    fn keywords_match_markup_spelling() {
        let parse = make_parser(make_validator(UpdateTextTrigger::ALL));
        assert_eq!(
            parse(&RawValue::from("focusLost")),
            Ok(UpdateTextTrigger::FocusLost)
        );
        assert_eq!(
            parse(&RawValue::from("TEXTCHANGED")),
            Ok(UpdateTextTrigger::TextChanged)
        );

        let parse = make_parser(make_validator(AutocapitalizationType::ALL));
        assert_eq!(
            parse(&RawValue::from("allcharacters")),
            Ok(AutocapitalizationType::AllCharacters)
        );
        assert!(parse(&RawValue::from("all-characters")).is_err());
    }

    #[test]
    fn input_types() {
        assert_eq!(KeyboardType::input_type(None), InputType::CLASS_TEXT);
        assert_eq!(KeyboardType::input_type(Some(KeyboardType::Email)).bits(), 0x21);
        assert_eq!(KeyboardType::input_type(Some(KeyboardType::Number)).bits(), 0x3002);
        assert_eq!(KeyboardType::input_type(Some(KeyboardType::Integer)).bits(), 0x2);
    }
}
