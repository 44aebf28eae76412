//! Hex color parsing for slide backgrounds and text.

use std::fmt;
use std::str::FromStr;

use image::Rgb;

/// An opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Build a color from its channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// The color as an `image` pixel.
    #[must_use]
    pub fn to_pixel(self) -> Rgb<u8> {
        Rgb([self.r, self.g, self.b])
    }
}

impl FromStr for Color {
    type Err = String;

    /// Parse `#RRGGBB` or `#RGB`. The leading `#` is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("Unsupported color '{s}'. Expected #RRGGBB or #RGB"));
        }

        let channel = |i: usize, len: usize| {
            u8::from_str_radix(&hex[i..i + len], 16)
                .map_err(|e| format!("Unsupported color '{s}': {e}"))
        };

        match hex.len() {
            6 => Ok(Self::rgb(channel(0, 2)?, channel(2, 2)?, channel(4, 2)?)),
            // #abc expands to #aabbcc
            3 => Ok(Self::rgb(channel(0, 1)? * 17, channel(1, 1)? * 17, channel(2, 1)? * 17)),
            _ => Err(format!("Unsupported color '{s}'. Expected #RRGGBB or #RGB")),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
