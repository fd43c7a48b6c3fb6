use std::{fmt, str::FromStr};

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::MapError;

/// Per-map settings, fixed once a renderer is built.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapOptions {
    /// Percentage scale of the map; 100 is the baseline zoom.
    pub size_factor: f64,
    /// Multiplier on the 64px icon footprint.
    pub icon_scale: f64,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            size_factor: 100.0,
            icon_scale: 1.0,
        }
    }
}

impl MapOptions {
    pub fn with_size_factor(mut self, size_factor: f64) -> Self {
        self.size_factor = size_factor;
        self
    }

    pub fn with_icon_scale(mut self, icon_scale: f64) -> Self {
        self.icon_scale = icon_scale;
        self
    }

    pub fn validate(&self) -> Result<(), MapError> {
        if !(self.size_factor.is_finite() && self.size_factor > 0.0) {
            return Err(MapError::InvalidOptions(format!(
                "size factor must be positive, got {}",
                self.size_factor
            )));
        }
        if !(self.icon_scale.is_finite() && self.icon_scale > 0.0) {
            return Err(MapError::InvalidOptions(format!(
                "icon scale must be positive, got {}",
                self.icon_scale
            )));
        }
        Ok(())
    }
}

/// Paint settings for a single label. Every field can be overridden on its
/// own; omitted fields in a layout file keep their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextStyle {
    /// Font size in pixels (em height).
    pub size: f32,
    pub stroke_width: f32,
    pub stroke_style: Color,
    pub fill_style: Color,
    pub italic: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 18.0,
            stroke_width: 1.0,
            stroke_style: Color::BLACK,
            fill_style: Color::WHITE,
            italic: false,
        }
    }
}

impl TextStyle {
    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_stroke_width(mut self, stroke_width: f32) -> Self {
        self.stroke_width = stroke_width;
        self
    }

    pub fn with_stroke_style(mut self, stroke_style: Color) -> Self {
        self.stroke_style = stroke_style;
        self
    }

    pub fn with_fill_style(mut self, fill_style: Color) -> Self {
        self.fill_style = fill_style;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }
}

/// An sRGB colour with straight alpha.
///
/// Parses CSS-style names and `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`
/// hex strings, and serializes back to `#rrggbbaa`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// This colour with its alpha scaled by `coverage` (0.0..=1.0).
    pub fn to_rgba(self, coverage: f32) -> Rgba<u8> {
        let alpha = (f32::from(self.a) * coverage.clamp(0.0, 1.0)).round() as u8;
        Rgba([self.r, self.g, self.b, alpha])
    }

    fn named(name: &str) -> Option<Self> {
        Some(match name {
            "black" => Color::BLACK,
            "white" => Color::WHITE,
            "transparent" => Color::TRANSPARENT,
            "red" => Color::rgb(255, 0, 0),
            "lime" => Color::rgb(0, 255, 0),
            "green" => Color::rgb(0, 128, 0),
            "blue" => Color::rgb(0, 0, 255),
            "yellow" => Color::rgb(255, 255, 0),
            "orange" => Color::rgb(255, 165, 0),
            "purple" => Color::rgb(128, 0, 128),
            "cyan" | "aqua" => Color::rgb(0, 255, 255),
            "magenta" | "fuchsia" => Color::rgb(255, 0, 255),
            "gray" | "grey" => Color::rgb(128, 128, 128),
            "silver" => Color::rgb(192, 192, 192),
            "brown" => Color::rgb(165, 42, 42),
            "gold" => Color::rgb(255, 215, 0),
            _ => return None,
        })
    }
}

impl FromStr for Color {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_ascii_lowercase();
        if let Some(color) = Color::named(&trimmed) {
            return Ok(color);
        }
        let invalid = || MapError::InvalidColor(s.to_string());
        let hex = trimmed.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).map(|v| v * 17);
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
        let channels = match hex.len() {
            3 => [nibble(0), nibble(1), nibble(2), Ok(255)],
            4 => [nibble(0), nibble(1), nibble(2), nibble(3)],
            6 => [byte(0), byte(2), byte(4), Ok(255)],
            8 => [byte(0), byte(2), byte(4), byte(6)],
            _ => return Err(invalid()),
        };
        let [r, g, b, a] = channels;
        match (r, g, b, a) {
            (Ok(r), Ok(g), Ok(b), Ok(a)) => Ok(Color::rgba(r, g, b, a)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = MapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}
