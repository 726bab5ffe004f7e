//! Shared test utilities for the picforge test suite.
//!
//! Synthetic images are generated in memory, so no fixture files are needed:
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let png = png_bytes(64, 48);
//! let img = decode_any(&png);
//! assert_eq!((img.width(), img.height()), (64, 48));
//! ```

use image::{DynamicImage, Rgba, RgbaImage};
use std::io::Cursor;

// =========================================================================
// Synthetic images
// =========================================================================

/// A gradient image with a distinct value in every channel.
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    }))
}

/// A single-color image.
pub fn solid_image(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
}

/// Vertical black/white stripes, one pixel wide. Any blur visibly changes them.
pub fn striped_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, _| {
        if x % 2 == 0 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    }))
}

// =========================================================================
// Encoding helpers, independent of any backend under test
// =========================================================================

/// Encode with the `image` crate directly.
pub fn encode_as(img: &DynamicImage, format: image::ImageFormat) -> Vec<u8> {
    let mut out = Vec::new();
    let img = match format {
        image::ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => DynamicImage::ImageRgba8(img.to_rgba8()),
    };
    img.write_to(&mut Cursor::new(&mut out), format).unwrap();
    out
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_as(&gradient_image(width, height), image::ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_as(&gradient_image(width, height), image::ImageFormat::Jpeg)
}

/// Decode whatever the bytes are. Panics if they are not an image.
pub fn decode_any(bytes: &[u8]) -> DynamicImage {
    image::load_from_memory(bytes).unwrap()
}

/// Deterministic bytes that match no image signature.
pub fn noise_bytes(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x1234_5678;
    let mut out = vec![0x13, 0x37];
    while out.len() < len {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        out.push((state >> 24) as u8);
    }
    out
}
