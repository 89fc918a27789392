// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Terminal color codes.
//!
//! Every constant is a complete ANSI escape sequence that can be embedded in a message or passed
//! as a color override. [`END`] resets all attributes.
//!
//! ```
//! use lineforth::color;
//!
//! let warning = format!("{}careful{}", color::YELLOW, color::END);
//! assert_eq!(color::strip(&warning), "careful");
//! ```

use std::borrow::Cow;
use std::sync::LazyLock;

use colored::Color;
use regex::Regex;

use crate::Error;

/// Resets every color and attribute.
pub const END: &str = "\x1b[0m";

pub const DEFAULT: &str = "\x1b[39m";
pub const BLACK: &str = "\x1b[30m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const MAGENTA: &str = "\x1b[35m";
pub const CYAN: &str = "\x1b[36m";
pub const GREY: &str = "\x1b[37m";

/// Bright foreground colors.
pub mod bright {
    pub const BLACK: &str = "\x1b[90m";
    pub const RED: &str = "\x1b[91m";
    pub const GREEN: &str = "\x1b[92m";
    pub const YELLOW: &str = "\x1b[93m";
    pub const BLUE: &str = "\x1b[94m";
    pub const MAGENTA: &str = "\x1b[95m";
    pub const CYAN: &str = "\x1b[96m";
    pub const GREY: &str = "\x1b[97m";
}

/// 24-bit foreground colors.
pub mod pure {
    pub const BLACK: &str = "\x1b[38;2;0;0;0m";
    pub const RED: &str = "\x1b[38;2;255;0;0m";
    pub const GREEN: &str = "\x1b[38;2;0;255;0m";
    pub const BLUE: &str = "\x1b[38;2;0;0;255m";
    pub const WHITE: &str = "\x1b[38;2;255;255;255m";
}

/// Background colors.
pub mod bg {
    pub const DEFAULT: &str = "\x1b[49m";
    pub const BLACK: &str = "\x1b[40m";
    pub const RED: &str = "\x1b[41m";
    pub const GREEN: &str = "\x1b[42m";
    pub const YELLOW: &str = "\x1b[43m";
    pub const BLUE: &str = "\x1b[44m";
    pub const MAGENTA: &str = "\x1b[45m";
    pub const CYAN: &str = "\x1b[46m";
    pub const GREY: &str = "\x1b[47m";

    /// Bright background colors.
    pub mod bright {
        pub const BLACK: &str = "\x1b[100m";
        pub const RED: &str = "\x1b[101m";
        pub const GREEN: &str = "\x1b[102m";
        pub const YELLOW: &str = "\x1b[103m";
        pub const BLUE: &str = "\x1b[104m";
        pub const MAGENTA: &str = "\x1b[105m";
        pub const CYAN: &str = "\x1b[106m";
        pub const GREY: &str = "\x1b[107m";
    }

    /// 24-bit background colors.
    pub mod pure {
        pub const BLACK: &str = "\x1b[48;2;0;0;0m";
        pub const RED: &str = "\x1b[48;2;255;0;0m";
        pub const GREEN: &str = "\x1b[48;2;0;255;0m";
        pub const BLUE: &str = "\x1b[48;2;0;0;255m";
        pub const WHITE: &str = "\x1b[48;2;255;255;255m";
    }
}

/// Text attributes.
pub mod attr {
    pub const BOLD: &str = "\x1b[1m";
    pub const FAINT: &str = "\x1b[2m";
    pub const ITALIC: &str = "\x1b[3m";
    pub const UNDERLINE: &str = "\x1b[4m";
    pub const REVERSE: &str = "\x1b[7m";
    pub const CROSSED: &str = "\x1b[9m";
    pub const FRAME: &str = "\x1b[51m";
    pub const ENCIRCLE: &str = "\x1b[52m";
}

static ESCAPE_SEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    // constant pattern, always valid
    Regex::new(r"\x1b\[[\d;]*[A-Za-z]").unwrap()
});

/// A 24-bit foreground color.
pub fn rgb(r: u8, g: u8, b: u8) -> String {
    format!("\x1b[38;2;{r};{g};{b}m")
}

/// A 24-bit foreground color from a hex triple, with or without the leading `#`.
///
/// # Errors
///
/// Return [`Error::InvalidColor`] if the input is not exactly six hex digits.
///
/// ```
/// assert_eq!(lineforth::color::hex("#088888").unwrap(), "\x1b[38;2;8;136;136m");
/// assert!(lineforth::color::hex("08888").is_err());
/// ```
pub fn hex(value: &str) -> Result<String, Error> {
    let digits = value.strip_prefix('#').unwrap_or(value);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidColor(value.to_string()));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| Error::InvalidColor(value.to_string()))
    };
    Ok(rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// The foreground escape sequence for a [`colored`] color.
///
/// A [`Color::TrueColor`] always yields a 24-bit sequence, whatever the terminal reports.
pub fn fg(color: Color) -> String {
    match color {
        Color::TrueColor { r, g, b } => rgb(r, g, b),
        named => format!("\x1b[{}m", named.to_fg_str()),
    }
}

/// The background escape sequence for a [`colored`] color.
pub fn bg(color: Color) -> String {
    match color {
        Color::TrueColor { r, g, b } => format!("\x1b[48;2;{r};{g};{b}m"),
        named => format!("\x1b[{}m", named.to_bg_str()),
    }
}

/// Keep only the well-formed escape sequences of `value`, in order.
///
/// Color overrides go through this so that garbled or concatenated input never leaks plain text
/// into the color slot of a layout.
///
/// ```
/// use lineforth::color;
///
/// let garbled = format!(" \t{} \t", color::BLACK);
/// assert_eq!(color::sanitize(&garbled), color::BLACK);
/// ```
pub fn sanitize(value: &str) -> String {
    ESCAPE_SEQUENCE
        .find_iter(value)
        .map(|m| m.as_str())
        .collect()
}

/// Remove every escape sequence from `value`, leaving the surrounding text untouched.
pub fn strip(value: &str) -> Cow<'_, str> {
    ESCAPE_SEQUENCE.replace_all(value, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_and_rgb_agree() {
        assert_eq!(hex("ff0000").unwrap(), pure::RED);
        assert_eq!(hex("#FFFFFF").unwrap(), pure::WHITE);
        assert_eq!(rgb(0, 0, 255), pure::BLUE);
    }

    #[test]
    fn test_hex_rejects_malformed() {
        for value in ["", "#", "12345", "1234567", "gg0000", "#12 456"] {
            assert!(
                matches!(hex(value), Err(Error::InvalidColor(_))),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_colored_bridge() {
        assert_eq!(fg(Color::Red), RED);
        assert_eq!(bg(Color::Green), bg::GREEN);
        assert_eq!(fg(Color::BrightCyan), bright::CYAN);
        assert_eq!(fg(Color::TrueColor { r: 1, g: 2, b: 3 }), rgb(1, 2, 3));
        assert_eq!(
            fg(Color::TrueColor { r: 255, g: 0, b: 0 }),
            pure::RED,
            "24-bit colors never degrade to the 16-color palette"
        );
        assert_eq!(bg(Color::TrueColor { r: 0, g: 255, b: 0 }), bg::pure::GREEN);
    }

    #[test]
    fn test_sanitize_keeps_only_sequences() {
        assert_eq!(sanitize("not a color"), "");
        assert_eq!(
            sanitize(&format!("{}x{}y", attr::BOLD, bg::pure::RED)),
            format!("{}{}", attr::BOLD, bg::pure::RED)
        );
        // a truncated sequence is not a sequence
        assert_eq!(sanitize("\x1b[31"), "");
    }

    #[test]
    fn test_strip_preserves_text() {
        let message = format!("This {GREEN}is a message with{} colors{END}", bg::GREEN);
        assert_eq!(strip(&message), "This is a message with colors");
        assert_eq!(strip("\t plain \r"), "\t plain \r");
    }
}
