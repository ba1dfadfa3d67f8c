use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Linear RGBA color, each channel in `0.0..=1.0`
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
pub struct Color4 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Error parsing a `#RRGGBB` or `#RRGGBBAA` color
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(String);

impl Color4 {
    pub const BLACK: Self = Self::rgb(0., 0., 0.);
    pub const WHITE: Self = Self::rgb(1., 1., 1.);
    pub const RED: Self = Self::rgb(1., 0., 0.);
    pub const GREEN: Self = Self::rgb(0., 1., 0.);
    pub const BLUE: Self = Self::rgb(0., 0., 1.);
    pub const YELLOW: Self = Self::rgb(1., 1., 0.);
    pub const MAGENTA: Self = Self::rgb(1., 0., 1.);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.)
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA`; the leading `#` is optional
    pub fn from_hex(hex: &str) -> Result<Self, ParseColorError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
            return Err(ParseColorError(hex.to_string()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map(|v| f32::from(v) / 255.)
                .map_err(|_| ParseColorError(hex.to_string()))
        };

        let a = if digits.len() == 8 { channel(6)? } else { 1. };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// `#RRGGBBAA`
    pub fn to_hex(&self) -> String {
        let byte = |c: f32| (c.clamp(0., 1.) * 255.).round() as u8;
        format!(
            "#{:02X}{:02X}{:02X}{:02X}",
            byte(self.r),
            byte(self.g),
            byte(self.b),
            byte(self.a)
        )
    }
}

impl Default for Color4 {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for Color4 {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Color4 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid hex color {:?}", self.0)
    }
}

impl std::error::Error for ParseColorError {}
