//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which turns percentages and levels into concrete numbers) and the
//! [`backend`](super::backend) (which does the actual pixel work). A mock
//! backend can record them without touching a single pixel.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`BlurLevel`]: Ordinal intensity shared by blur and color filters.
//! - [`FilterKind`]: Which color filter to apply; unknown names fall back to [`FilterKind::AutoFilter`].
//! - [`Rectangle`] / [`Point`]: Derived pixel geometry.
//! - [`ResizeParams`], [`BlurParams`], [`FilterOp`], [`CompositeParams`]: One per codec mutation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Discrete intensity for blur and color filters, in increasing order.
///
/// The discriminant is the level's numeric weight: blur uses it directly as
/// the Gaussian sigma, color filters use a tenth of it as their amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlurLevel {
    Light = 1,
    Medium = 3,
    Hard = 5,
    Full = 10,
}

impl BlurLevel {
    pub const ALL: [BlurLevel; 4] = [Self::Light, Self::Medium, Self::Hard, Self::Full];

    pub fn weight(self) -> u32 {
        self as u32
    }
}

impl FromStr for BlurLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            "full" => Ok(Self::Full),
            other => Err(format!(
                "unknown level '{other}' (expected light, medium, hard or full)"
            )),
        }
    }
}

/// Which color filter to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    Grayscale,
    Sepia,
    ColorInvert,
    Lightness,
    OilPaint,
    /// Fixed stylized (Kodachrome-like) grade. Also the fallback for unknown names.
    AutoFilter,
}

impl FilterKind {
    /// Lenient lookup: anything unrecognized resolves to [`FilterKind::AutoFilter`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "grayscale" | "greyscale" => Self::Grayscale,
            "sepia" => Self::Sepia,
            "color-invert" | "invert" => Self::ColorInvert,
            "lightness" => Self::Lightness,
            "oil-paint" | "oilpaint" => Self::OilPaint,
            _ => Self::AutoFilter,
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::ColorInvert => "color-invert",
            Self::Lightness => "lightness",
            Self::OilPaint => "oil-paint",
            Self::AutoFilter => "auto-filter",
        };
        f.write_str(name)
    }
}

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Intersection with a `width` x `height` canvas anchored at the origin.
    ///
    /// Returns `None` when nothing of the rectangle lies on the canvas.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<Rectangle> {
        let right = self.x.saturating_add(self.width).min(width);
        let bottom = self.y.saturating_add(self.height).min(height);
        if self.x >= right || self.y >= bottom {
            return None;
        }
        Some(Rectangle::new(self.x, self.y, right - self.x, bottom - self.y))
    }
}

/// Pixel position; may be negative or past the canvas, compositing clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

/// Parameters for an exact resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,
}

/// Parameters for a Gaussian blur.
///
/// `region: None` blurs the whole image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurParams {
    pub sigma: f32,
    pub region: Option<Rectangle>,
}

/// A single color-filter mutation with its resolved intensity.
///
/// Amounts are in `0.0..=1.0`; `0.0` leaves the image as it was for the
/// blend-style filters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    Grayscale { amount: f32 },
    Sepia { amount: f32 },
    Invert,
    OilPaint { levels: u32, brush_size: u32 },
    Lighten { amount: f32 },
    Stylize,
}

impl FilterOp {
    /// Oil paint with the codec's customary strength.
    pub fn oil_paint() -> Self {
        Self::OilPaint {
            levels: 10,
            brush_size: 15,
        }
    }
}

/// Parameters for drawing one image over another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeParams {
    pub position: Point,
    pub opacity: f32,
}
