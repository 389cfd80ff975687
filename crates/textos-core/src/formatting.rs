//! Formatting settings.
//!
//! Font sizes are stored in print points and converted to device units for layout math.
//! Every setter reports whether the value actually changed so the caller can decide whether a
//! re-pagination is needed.

use crate::geometry::points_to_device;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default font family.
pub const DEFAULT_FONT_FAMILY: &str = "Segoe UI";
/// Default font size in points.
pub const DEFAULT_FONT_SIZE_PT: u32 = 12;
/// Default line-height multiplier.
pub const DEFAULT_LINE_HEIGHT: f64 = 1.5;
/// Smallest accepted line-height multiplier.
pub const MIN_LINE_HEIGHT: f64 = 0.1;

/// An opaque RGB color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// White.
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);

    /// Build a color from its channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Error returned when a color string is not `#rrggbb` (or `rrggbb`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color '{0}': expected #rrggbb")]
pub struct ColorParseError(pub String);

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(ColorParseError(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| ColorParseError(s.to_string()))
        };
        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

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
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// The font inputs the width estimator needs.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    /// Font family name.
    pub family: String,
    /// Font size in device units.
    pub size: f64,
}

impl FontSpec {
    /// Create a font spec from a family and a size in device units.
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }
}

/// Round a line-height multiplier to one decimal, clamped to [`MIN_LINE_HEIGHT`].
pub fn round_line_height(value: f64) -> f64 {
    if !value.is_finite() {
        return DEFAULT_LINE_HEIGHT;
    }
    ((value * 10.0).round() / 10.0).max(MIN_LINE_HEIGHT)
}

fn deserialize_line_height<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(round_line_height)
}

/// Document formatting: font, colors and line height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattingSettings {
    font_family: String,
    font_size: u32,
    text_color: Color,
    background_color: Color,
    #[serde(deserialize_with = "deserialize_line_height")]
    line_height: f64,
}

impl Default for FormattingSettings {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE_PT,
            text_color: Color::BLACK,
            background_color: Color::WHITE,
            line_height: DEFAULT_LINE_HEIGHT,
        }
    }
}

impl FormattingSettings {
    /// Create settings with the given font, size (points) and line-height multiplier.
    pub fn new(font_family: impl Into<String>, font_size: u32, line_height: f64) -> Self {
        Self {
            font_family: font_family.into(),
            font_size: font_size.max(1),
            line_height: round_line_height(line_height),
            ..Self::default()
        }
    }

    /// Font family name.
    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    /// Font size in points.
    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    /// Font size in device units.
    pub fn font_size_device(&self) -> f64 {
        points_to_device(f64::from(self.font_size))
    }

    /// Text color.
    pub fn text_color(&self) -> Color {
        self.text_color
    }

    /// Page background color.
    pub fn background_color(&self) -> Color {
        self.background_color
    }

    /// Line-height multiplier (one decimal).
    pub fn line_height(&self) -> f64 {
        self.line_height
    }

    /// Height of one rendered line in device units.
    pub fn line_height_device(&self) -> f64 {
        self.font_size_device() * self.line_height
    }

    /// The font inputs for width estimation.
    pub fn font_spec(&self) -> FontSpec {
        FontSpec::new(self.font_family.clone(), self.font_size_device())
    }

    /// Set the font family. Returns `true` if it changed.
    pub fn set_font_family(&mut self, family: impl Into<String>) -> bool {
        let family = family.into();
        if self.font_family == family {
            return false;
        }
        self.font_family = family;
        true
    }

    /// Set the font size in points (at least 1). Returns `true` if it changed.
    pub fn set_font_size(&mut self, points: u32) -> bool {
        let points = points.max(1);
        if self.font_size == points {
            return false;
        }
        self.font_size = points;
        true
    }

    /// Set the text color. Returns `true` if it changed.
    pub fn set_text_color(&mut self, color: Color) -> bool {
        if self.text_color == color {
            return false;
        }
        self.text_color = color;
        true
    }

    /// Set the background color. Returns `true` if it changed.
    pub fn set_background_color(&mut self, color: Color) -> bool {
        if self.background_color == color {
            return false;
        }
        self.background_color = color;
        true
    }

    /// Set the line-height multiplier, rounded to one decimal. Returns `true` if it changed.
    pub fn set_line_height(&mut self, multiplier: f64) -> bool {
        let rounded = round_line_height(multiplier);
        if self.line_height == rounded {
            return false;
        }
        self.line_height = rounded;
        true
    }

    /// Whether switching from `self` to `other` changes page layout.
    ///
    /// Colors never affect layout.
    pub fn affects_layout(&self, other: &Self) -> bool {
        self.font_family != other.font_family
            || self.font_size != other.font_size
            || self.line_height != other.line_height
    }
}
