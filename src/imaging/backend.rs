//! Image codec backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the boundary to the pixel engine: format
//! detection, decode, encode, and the in-place mutations every operation is
//! built from (resize, blur, color filters, compose-over).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Operations are written against the trait so tests can substitute a
//! recording mock.

use super::format::{DecodeSettings, EncodeSettings, ImageFormat};
use super::params::{BlurParams, CompositeParams, FilterOp, ResizeParams};
use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to decode {format} image: {reason}")]
    Decode { format: ImageFormat, reason: String },
    #[error("Failed to encode {format} image: {reason}")]
    Encode { format: ImageFormat, reason: String },
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Width and height of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl From<Dimensions> for (u32, u32) {
    fn from(d: Dimensions) -> Self {
        (d.width, d.height)
    }
}

/// A decoded image, owned by the operation that decoded it.
///
/// Mutations happen in place; the buffer is dropped once encoded.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    image: DynamicImage,
}

impl PixelBuffer {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width(),
            height: self.height(),
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut DynamicImage {
        &mut self.image
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }
}

/// Trait for image codec backends.
///
/// Detection is infallible (`None` for anything unsupported); everything else
/// reports failures as [`BackendError`].
pub trait ImageBackend: Sync {
    /// Sniff the format from magic bytes. `None` if unsupported or unrecognizable.
    fn detect_format(&self, bytes: &[u8]) -> Option<ImageFormat>;

    /// Decode bytes already known to be in `format`.
    fn decode(
        &self,
        bytes: &[u8],
        format: ImageFormat,
        settings: &DecodeSettings,
    ) -> Result<PixelBuffer, BackendError>;

    /// Serialize a buffer.
    fn encode(
        &self,
        buffer: &PixelBuffer,
        settings: &EncodeSettings,
    ) -> Result<Vec<u8>, BackendError>;

    /// Resize to exactly the requested dimensions.
    fn resize(&self, buffer: &mut PixelBuffer, params: &ResizeParams) -> Result<(), BackendError>;

    /// Gaussian blur, optionally limited to a region.
    fn gaussian_blur(
        &self,
        buffer: &mut PixelBuffer,
        params: &BlurParams,
    ) -> Result<(), BackendError>;

    /// Apply one color filter.
    fn apply_filter(&self, buffer: &mut PixelBuffer, op: &FilterOp) -> Result<(), BackendError>;

    /// Draw `overlay` onto `base`. Overhang is clipped.
    fn compose_over(
        &self,
        base: &mut PixelBuffer,
        overlay: &PixelBuffer,
        params: &CompositeParams,
    ) -> Result<(), BackendError>;
}
