//! Legacy formatting codes.
//!
//! A code is the section sign followed by one character: `§0`-`§f` are
//! colors, `§k`-`§o` are formats (obfuscated, bold, strikethrough,
//! underline, italic) and `§r` resets. Colors and reset clear any active
//! formats; formats stack on top of the current color.

use std::fmt;

/// The character that starts every formatting code.
pub const COLOR_CHAR: char = '§';

/// Code characters in ordinal order: colors, formats, then reset.
pub const CODE_CHARS: [char; 22] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f',
    'k', 'l', 'm', 'n', 'o', 'r',
];

/// One formatting code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatCode {
    /// `§0` to `§f`.
    Color(char),
    /// `§k` to `§o`.
    Format(char),
    /// `§r`.
    Reset,
}

impl FormatCode {
    /// Parses a code character. Case-insensitive.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            c @ ('0'..='9' | 'a'..='f') => Some(Self::Color(c)),
            c @ 'k'..='o' => Some(Self::Format(c)),
            'r' => Some(Self::Reset),
            _ => None,
        }
    }

    /// The code's ordinal in [`CODE_CHARS`].
    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        CODE_CHARS.get(ordinal).copied().and_then(Self::from_char)
    }

    pub fn code_char(self) -> char {
        match self {
            Self::Color(c) | Self::Format(c) => c,
            Self::Reset => 'r',
        }
    }

    pub fn is_format(self) -> bool {
        matches!(self, Self::Format(_))
    }
}

impl fmt::Display for FormatCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{COLOR_CHAR}{}", self.code_char())
    }
}

/// The code `text` starts with, if any.
pub fn leading_code(text: &str) -> Option<FormatCode> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(COLOR_CHAR), Some(c)) => FormatCode::from_char(c),
        _ => None,
    }
}

/// The codes still in effect at the end of `text`, as a string that
/// reapplies them.
///
/// Scans backwards collecting formats until the nearest color or reset.
pub fn last_colors(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut codes = Vec::new();

    for index in (0..chars.len().saturating_sub(1)).rev() {
        if chars[index] != COLOR_CHAR {
            continue;
        }
        if let Some(code) = FormatCode::from_char(chars[index + 1]) {
            codes.push(code);
            if !code.is_format() {
                break;
            }
        }
    }

    codes.iter().rev().map(ToString::to_string).collect()
}
