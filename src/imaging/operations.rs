//! High-level image operations.
//!
//! These functions combine calculations with backend execution. Every
//! byte-in operation follows the same path:
//!
//! ```text
//! bytes → detect format → decode → mutate (params from calculations) → encode
//! ```
//!
//! Detection happens before any decode or geometry, so unsupported input
//! always fails with [`OperationError::InvalidImageFormat`]. The decoded
//! buffer lives only for the duration of the call and is released on every
//! exit path, error or not.
//!
//! Output is encoded with the session's [`CodecSettings`]; QR codes are the
//! exception and are always PNG.

use super::backend::{BackendError, ImageBackend, PixelBuffer};
use super::calculations::{
    PercentError, blur_sigma, calculate_overlay_position, calculate_percent_region,
    calculate_scale_dimensions, plan_filter,
};
use super::format::{CodecSettings, ImageFormat};
use super::params::{BlurLevel, BlurParams, CompositeParams, FilterKind, Rectangle, ResizeParams};
use crate::qr::{self, QrError};
use crate::transport::{self, TransportError};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum OperationError {
    #[error("Invalid file format. Only accepts BMP, PNG, JPG, GIF and WEBP")]
    InvalidImageFormat,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid percentage: {0}")]
    InvalidPercentage(#[from] PercentError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Qr(#[from] QrError),
}

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, OperationError>;

/// Detect and decode, rejecting empty or unrecognized content.
fn load(backend: &impl ImageBackend, codec: &CodecSettings, bytes: &[u8]) -> Result<PixelBuffer> {
    let format = detect(backend, bytes)?;
    Ok(backend.decode(bytes, format, &codec.decode)?)
}

fn detect(backend: &impl ImageBackend, bytes: &[u8]) -> Result<ImageFormat> {
    if bytes.is_empty() {
        return Err(OperationError::InvalidInput(
            "image content is empty".to_string(),
        ));
    }
    backend
        .detect_format(bytes)
        .ok_or(OperationError::InvalidImageFormat)
}

fn decode_base64_input(text: &str) -> Result<Vec<u8>> {
    transport::decode_base64(text).map_err(|e| OperationError::InvalidInput(e.to_string()))
}

/// Encode a decoded buffer with the session codec.
pub fn encode_buffer(
    backend: &impl ImageBackend,
    codec: &CodecSettings,
    buffer: &PixelBuffer,
) -> Result<Vec<u8>> {
    Ok(backend.encode(buffer, &codec.encode)?)
}

/// Encode a decoded buffer with the session codec, as base64 text.
pub fn encode_buffer_base64(
    backend: &impl ImageBackend,
    codec: &CodecSettings,
    buffer: &PixelBuffer,
) -> Result<String> {
    encode_buffer(backend, codec, buffer).map(|bytes| transport::encode_base64(&bytes))
}

// =============================================================================
// Blur
// =============================================================================

/// Blur an explicit pixel rectangle.
///
/// The rectangle is clipped to the image by the backend.
pub fn blur_region(
    backend: &impl ImageBackend,
    codec: &CodecSettings,
    bytes: &[u8],
    region: Rectangle,
    level: BlurLevel,
) -> Result<Vec<u8>> {
    let mut buffer = load(backend, codec, bytes)?;
    blur_buffer(backend, &mut buffer, region, level)?;
    encode_buffer(backend, codec, &buffer)
}

fn blur_buffer(
    backend: &impl ImageBackend,
    buffer: &mut PixelBuffer,
    region: Rectangle,
    level: BlurLevel,
) -> Result<()> {
    let sigma = blur_sigma(level);
    debug!(?region, ?level, sigma, "Blurring region");
    backend.gaussian_blur(
        buffer,
        &BlurParams {
            sigma,
            region: Some(region),
        },
    )?;
    Ok(())
}

/// Blur the last percentage-sized tile of the image.
///
/// See [`calculate_percent_region`] for how the tile is chosen.
pub fn blur_percent(
    backend: &impl ImageBackend,
    codec: &CodecSettings,
    bytes: &[u8],
    horizontal_percent: f64,
    vertical_percent: f64,
    level: BlurLevel,
) -> Result<Vec<u8>> {
    let mut buffer = load(backend, codec, bytes)?;
    let region = calculate_percent_region(
        buffer.dimensions().into(),
        horizontal_percent,
        vertical_percent,
    )?;
    blur_buffer(backend, &mut buffer, region, level)?;
    encode_buffer(backend, codec, &buffer)
}

// =============================================================================
// Watermark
// =============================================================================

/// Draw `overlay` onto the image, positioned by percentages of the image size.
///
/// Both inputs are format-checked before either is decoded.
pub fn watermark(
    backend: &impl ImageBackend,
    codec: &CodecSettings,
    bytes: &[u8],
    overlay: &[u8],
    x_percent: f64,
    y_percent: f64,
) -> Result<Vec<u8>> {
    let base_format = detect(backend, bytes)?;
    let overlay_format = detect(backend, overlay)?;

    let mut base = backend.decode(bytes, base_format, &codec.decode)?;
    let mark = backend.decode(overlay, overlay_format, &codec.decode)?;

    let position = calculate_overlay_position(base.dimensions().into(), x_percent, y_percent);
    debug!(
        ?position,
        overlay_width = mark.width(),
        overlay_height = mark.height(),
        "Compositing watermark"
    );
    backend.compose_over(
        &mut base,
        &mark,
        &CompositeParams {
            position,
            opacity: 1.0,
        },
    )?;
    encode_buffer(backend, codec, &base)
}

/// Base64 flavour of [`watermark`].
///
/// Blank input on either side is not an error: the result is `Ok(None)`.
pub fn watermark_base64(
    backend: &impl ImageBackend,
    codec: &CodecSettings,
    image_base64: &str,
    overlay_base64: &str,
    x_percent: f64,
    y_percent: f64,
) -> Result<Option<String>> {
    if image_base64.trim().is_empty() || overlay_base64.trim().is_empty() {
        debug!("Blank base64 watermark input, nothing to render");
        return Ok(None);
    }

    let bytes = decode_base64_input(image_base64)?;
    let overlay = decode_base64_input(overlay_base64)?;
    let rendered = watermark(backend, codec, &bytes, &overlay, x_percent, y_percent)?;
    Ok(Some(transport::encode_base64(&rendered)))
}

// =============================================================================
// Color filters
// =============================================================================

/// Apply one color filter. `level` only matters for grayscale, sepia and lightness.
pub fn apply_filter(
    backend: &impl ImageBackend,
    codec: &CodecSettings,
    bytes: &[u8],
    kind: FilterKind,
    level: Option<BlurLevel>,
) -> Result<Vec<u8>> {
    let mut buffer = load(backend, codec, bytes)?;
    let op = plan_filter(kind, level);
    debug!(%kind, ?op, "Applying filter");
    backend.apply_filter(&mut buffer, &op)?;
    encode_buffer(backend, codec, &buffer)
}

// =============================================================================
// Scale
// =============================================================================

/// Shrink a buffer in place to at most `max_width`, keeping its aspect ratio.
///
/// `max_width <= 0` or an already narrow image leaves the buffer untouched.
pub fn scale(backend: &impl ImageBackend, buffer: &mut PixelBuffer, max_width: i32) -> Result<()> {
    let source = buffer.dimensions();
    let Some((width, height)) = calculate_scale_dimensions(source.into(), max_width) else {
        debug!(
            width = source.width,
            max_width, "Image within max width, skipping resize"
        );
        return Ok(());
    };

    debug!(
        orig_w = source.width,
        orig_h = source.height,
        new_width = width,
        new_height = height,
        "Scaling image to max width"
    );
    backend.resize(buffer, &ResizeParams { width, height })?;
    Ok(())
}

pub fn scale_to_binary(
    backend: &impl ImageBackend,
    codec: &CodecSettings,
    bytes: &[u8],
    max_width: i32,
) -> Result<Vec<u8>> {
    let mut buffer = load(backend, codec, bytes)?;
    scale(backend, &mut buffer, max_width)?;
    encode_buffer(backend, codec, &buffer)
}

pub fn scale_to_base64(
    backend: &impl ImageBackend,
    codec: &CodecSettings,
    bytes: &[u8],
    max_width: i32,
) -> Result<String> {
    scale_to_binary(backend, codec, bytes, max_width).map(|out| transport::encode_base64(&out))
}

/// Scale an image supplied as base64 text, returning raw bytes.
pub fn scale_base64_to_binary(
    backend: &impl ImageBackend,
    codec: &CodecSettings,
    image_base64: &str,
    max_width: i32,
) -> Result<Vec<u8>> {
    let bytes = decode_base64_input(image_base64)?;
    scale_to_binary(backend, codec, &bytes, max_width)
}

pub fn scale_file_to_binary(
    backend: &impl ImageBackend,
    codec: &CodecSettings,
    path: &Path,
    max_width: i32,
) -> Result<Vec<u8>> {
    let bytes = transport::read_file(path)?;
    scale_to_binary(backend, codec, &bytes, max_width)
}

pub fn scale_file_to_base64(
    backend: &impl ImageBackend,
    codec: &CodecSettings,
    path: &Path,
    max_width: i32,
) -> Result<String> {
    scale_file_to_binary(backend, codec, path, max_width).map(|out| transport::encode_base64(&out))
}

/// Download and scale. The timeout bounds the whole request.
pub fn scale_url_to_binary(
    backend: &impl ImageBackend,
    codec: &CodecSettings,
    url: &str,
    max_width: i32,
    timeout: Duration,
) -> Result<Vec<u8>> {
    let bytes = transport::fetch_url(url, timeout)?;
    scale_to_binary(backend, codec, &bytes, max_width)
}

pub fn scale_url_to_base64(
    backend: &impl ImageBackend,
    codec: &CodecSettings,
    url: &str,
    max_width: i32,
    timeout: Duration,
) -> Result<String> {
    scale_url_to_binary(backend, codec, url, max_width, timeout)
        .map(|out| transport::encode_base64(&out))
}

// =============================================================================
// QR codes
// =============================================================================

/// Render `text` as a PNG QR code, `pixels_per_module` pixels per module.
pub fn render_qr_binary(
    backend: &impl ImageBackend,
    text: &str,
    pixels_per_module: u32,
) -> Result<Vec<u8>> {
    let matrix = qr::generate_matrix(text)?;
    let bitmap = qr::render_bitmap(&matrix, pixels_per_module)?;
    info!(
        modules = matrix.module_count(),
        pixels_per_module,
        side = bitmap.width(),
        "Rendered QR code"
    );
    encode_buffer(
        backend,
        &CodecSettings::for_format(ImageFormat::Png),
        &bitmap,
    )
}

/// [`render_qr_binary`] as base64 text.
pub fn render_qr(backend: &impl ImageBackend, text: &str, pixels_per_module: u32) -> Result<String> {
    render_qr_binary(backend, text, pixels_per_module).map(|out| transport::encode_base64(&out))
}

// =============================================================================
// Saving
// =============================================================================

/// Decode base64 text and write the raw bytes.
pub fn save_base64_to_file(path: &Path, image_base64: &str) -> Result<()> {
    let bytes = decode_base64_input(image_base64)?;
    transport::write_bytes(path, &bytes)?;
    Ok(())
}

pub fn save_binary_to_file(path: &Path, bytes: &[u8]) -> Result<()> {
    transport::write_bytes(path, bytes)?;
    Ok(())
}
