//! Splitting a line into a team prefix and suffix.
//!
//! A sidebar line is rendered as `prefix + entry name + suffix`, and the
//! entry name is an invisible formatting code. Prefix and suffix each have
//! a length limit, so a long line is cut in two without breaking a
//! formatting code and with its active colors carried over.

use tallyboard_protocol::format::{self, COLOR_CHAR, FormatCode};

/// Splits `line` into `(prefix, suffix)`, each at most `max` characters.
///
/// - A line that fits is all prefix.
/// - The cut moves back one character rather than separating `§` from its
///   code.
/// - The suffix starts with the prefix's active codes (`§r` if none),
///   unless it opens with a color or reset of its own.
/// - If a half still exceeds `max`, both are hard-truncated.
pub fn split_line(line: &str, max: usize) -> (String, String) {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= max {
        return (line.to_string(), String::new());
    }

    let cut = if max > 0 && chars[max - 1] == COLOR_CHAR {
        max - 1
    } else {
        max
    };
    let prefix: String = chars[..cut].iter().collect();
    let rest: String = chars[cut..].iter().collect();

    let carry_colors = format::leading_code(&rest).is_none_or(FormatCode::is_format);
    let suffix = if carry_colors {
        let colors = format::last_colors(&prefix);
        let colors = if colors.is_empty() {
            FormatCode::Reset.to_string()
        } else {
            colors
        };
        colors + &rest
    } else {
        rest
    };

    if prefix.chars().count() > max || suffix.chars().count() > max {
        (truncate(&prefix, max), truncate(&suffix, max))
    } else {
        (prefix, suffix)
    }
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
