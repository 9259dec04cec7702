//! RGBA colors for the built-in color functions.
//!
//! Supported input forms:
//!
//! - **Hex**: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`
//! - **Channels**: numbers (`0`-`255`) or percentages (`0%`-`100%`)
//!
//! Opaque colors print as `#rrggbb`; translucent ones as
//! `rgba(r, g, b, a)`.

use std::fmt;

use thiserror::Error;

/// Error returned when color parsing fails.
#[derive(Error, Clone, Debug, PartialEq)]
#[error("{message}")]
pub struct ColorParseError {
    pub message: String,
}

impl ColorParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An sRGB color with alpha.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// 0.0 = transparent, 1.0 = opaque.
    pub a: f32,
}

impl Rgba {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r,
            g,
            b,
            a: a.clamp(0.0, 1.0),
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self::rgba(self.r, self.g, self.b, a)
    }

    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    /// Parses `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`.
    pub fn parse_hex(input: &str) -> Result<Self, ColorParseError> {
        let hex = input
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::new(format!("expected `#` in color `{input}`")))?;
        let digits = hex
            .chars()
            .map(hex_digit)
            .collect::<Result<Vec<u8>, _>>()?;

        match digits.as_slice() {
            [r, g, b] => Ok(Self::rgb(r * 17, g * 17, b * 17)),
            [r, g, b, a] => Ok(Self::rgba(r * 17, g * 17, b * 17, f32::from(a * 17) / 255.0)),
            [r1, r2, g1, g2, b1, b2] => Ok(Self::rgb(r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2)),
            [r1, r2, g1, g2, b1, b2, a1, a2] => Ok(Self::rgba(
                r1 * 16 + r2,
                g1 * 16 + g2,
                b1 * 16 + b2,
                f32::from(a1 * 16 + a2) / 255.0,
            )),
            _ => Err(ColorParseError::new(format!(
                "invalid hex color length: {}",
                digits.len()
            ))),
        }
    }

    /// `#rrggbb`, ignoring alpha.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            return f.write_str(&self.to_hex());
        }
        // Three decimals is enough to survive a round trip through one byte.
        let alpha = (self.a * 1000.0).round() / 1000.0;
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
    }
}

/// Converts a channel value to a byte, rounding and clamping.
pub fn channel_from_number(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Converts a `0%`-`100%` channel to a byte.
pub fn channel_from_percentage(percent: f64) -> u8 {
    channel_from_number(percent * 255.0 / 100.0)
}

fn hex_digit(c: char) -> Result<u8, ColorParseError> {
    c.to_digit(16)
        .map(|d| d as u8)
        .ok_or_else(|| ColorParseError::new(format!("invalid hex digit: {c}")))
}
