//! Pure calculation functions for image geometry and filter intensities.
//!
//! All functions here are pure and testable without any I/O or images.
//! Rounding rules are fixed and deliberate:
//!
//! - Scale dimensions and overlay positions round to nearest (halves away from zero).
//! - Blur slice sizes and tile counts truncate.

use super::params::{BlurLevel, FilterKind, FilterOp, Point, Rectangle};
use thiserror::Error;

/// A percentage outside `(0, 100]` was supplied for a region axis.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("{axis} percentage must be greater than 0 and at most 100, got {value}")]
pub struct PercentError {
    pub axis: Axis,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Horizontal => f.write_str("horizontal"),
            Self::Vertical => f.write_str("vertical"),
        }
    }
}

/// Calculate the target dimensions for fitting an image into `max_width`.
///
/// Returns `None` when no resize is needed: `max_width <= 0` means "no
/// limit", and images already narrow enough are left alone.
///
/// # Examples
/// ```
/// # use picforge::imaging::calculate_scale_dimensions;
/// // 1920x1080 into 384 → 384x216
/// assert_eq!(calculate_scale_dimensions((1920, 1080), 384), Some((384, 216)));
///
/// // Already narrow enough
/// assert_eq!(calculate_scale_dimensions((300, 200), 384), None);
/// ```
pub fn calculate_scale_dimensions(source: (u32, u32), max_width: i32) -> Option<(u32, u32)> {
    let (width, height) = source;

    if max_width <= 0 || width <= max_width as u32 {
        return None;
    }

    let aspect = width as f64 / max_width as f64;
    let new_width = (width as f64 / aspect).round() as u32;
    let new_height = (height as f64 / aspect).round() as u32;

    // Very wide, very short images must not collapse to zero rows
    Some((new_width, new_height.max(1)))
}

fn check_percent(axis: Axis, value: f64) -> Result<f64, PercentError> {
    if value.is_finite() && value > 0.0 && value <= 100.0 {
        Ok(value)
    } else {
        Err(PercentError { axis, value })
    }
}

/// Map percentage tile sizes onto the last tile of the image.
///
/// The image is partitioned into `100 / percent` tiles along each axis; the
/// returned rectangle is the bottom-right full tile. Slice sizes and tile
/// counts truncate, so the rectangle never leaves the image.
///
/// # Examples
/// ```
/// # use picforge::imaging::{Rectangle, calculate_percent_region};
/// // 1000x800 at 25% → 250x200 tiles, fourth tile starts at (750, 600)
/// assert_eq!(
///     calculate_percent_region((1000, 800), 25.0, 25.0).unwrap(),
///     Rectangle::new(750, 600, 250, 200),
/// );
/// ```
pub fn calculate_percent_region(
    source: (u32, u32),
    horizontal_percent: f64,
    vertical_percent: f64,
) -> Result<Rectangle, PercentError> {
    let (width, height) = source;
    let h_pct = check_percent(Axis::Horizontal, horizontal_percent)?;
    let v_pct = check_percent(Axis::Vertical, vertical_percent)?;

    let slice_width = (width as f64 * h_pct / 100.0).floor() as u32;
    let slice_height = (height as f64 * v_pct / 100.0).floor() as u32;

    // Tiles before the last one
    let fill_h = (100.0 / h_pct).floor() as u32 - 1;
    let fill_v = (100.0 / v_pct).floor() as u32 - 1;

    Ok(Rectangle::new(
        slice_width * fill_h,
        slice_height * fill_v,
        slice_width,
        slice_height,
    ))
}

/// Gaussian sigma for a blur level: the level's weight, used as-is.
pub fn blur_sigma(level: BlurLevel) -> f32 {
    level.weight() as f32
}

/// Intensity amount for the blend-style color filters: a tenth of the level.
///
/// No level means `0.0`.
pub fn filter_amount(level: Option<BlurLevel>) -> f32 {
    level.map_or(0.0, |l| l.weight() as f32 / 10.0)
}

/// Resolve a filter request into the concrete codec mutation.
pub fn plan_filter(kind: FilterKind, level: Option<BlurLevel>) -> FilterOp {
    let amount = filter_amount(level);
    match kind {
        FilterKind::Grayscale => FilterOp::Grayscale { amount },
        FilterKind::Sepia => FilterOp::Sepia { amount },
        FilterKind::Lightness => FilterOp::Lighten { amount },
        FilterKind::ColorInvert => FilterOp::Invert,
        FilterKind::OilPaint => FilterOp::oil_paint(),
        FilterKind::AutoFilter => FilterOp::Stylize,
    }
}

/// Position of an overlay given as percentages of the base image size.
///
/// Percentages are not restricted; out-of-canvas positions are clipped later
/// by the compositor.
pub fn calculate_overlay_position(base: (u32, u32), perc_x: f64, perc_y: f64) -> Point {
    let (width, height) = base;
    Point {
        x: (width as f64 * perc_x / 100.0).round() as i64,
        y: (height as f64 * perc_y / 100.0).round() as i64,
    }
}
