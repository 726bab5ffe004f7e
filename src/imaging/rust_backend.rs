//! Pure Rust codec backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Detect | `image::guess_format` (magic bytes), narrowed to BMP/PNG/JPG/GIF/WebP |
//! | Decode | `ImageReader::with_format` + EXIF orientation unless metadata is ignored |
//! | Encode → JPG | `JpegEncoder::new_with_quality` |
//! | Encode → PNG/BMP/GIF/WebP | `DynamicImage::write_to` (WebP is lossless) |
//! | Resize | `resize_exact` with `Lanczos3` |
//! | Gaussian blur | `DynamicImage::blur`, region via `crop_imm` + `imageops::replace` |
//! | Grayscale / sepia / lightness / stylize | color matrices below |
//! | Invert | `DynamicImage::invert` |
//! | Oil paint | intensity-histogram brush below |
//! | Compose-over | `imageops::overlay` (clips overhang) |
//!
//! Color matrices work on normalized RGB and leave alpha untouched. The
//! blend-style filters interpolate between identity (`amount = 0`) and the
//! full effect (`amount = 1`).

use super::backend::{BackendError, ImageBackend, PixelBuffer};
use super::format::{DecodeSettings, EncodeSettings, ImageFormat};
use super::params::{BlurParams, CompositeParams, FilterOp, ResizeParams};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageReader, RgbaImage};
use std::borrow::Cow;
use std::io::Cursor;
use tracing::debug;

/// Pure Rust backend using the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

// BT.709 luma weights
const LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// 3x3 RGB transform plus per-channel offset, on values in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ColorMatrix {
    rows: [[f32; 3]; 3],
    offset: [f32; 3],
}

impl ColorMatrix {
    const IDENTITY: ColorMatrix = ColorMatrix {
        rows: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        offset: [0.0; 3],
    };

    const GRAYSCALE: ColorMatrix = ColorMatrix {
        rows: [LUMA, LUMA, LUMA],
        offset: [0.0; 3],
    };

    const SEPIA: ColorMatrix = ColorMatrix {
        rows: [
            [0.393, 0.769, 0.189],
            [0.349, 0.686, 0.168],
            [0.272, 0.534, 0.131],
        ],
        offset: [0.0; 3],
    };

    const KODACHROME: ColorMatrix = ColorMatrix {
        rows: [
            [0.729_702_3, 0.0, 0.0],
            [0.0, 0.610_957_7, 0.0],
            [0.0, 0.0, 0.597_218],
        ],
        offset: [0.105, 0.145, 0.155],
    };

    /// Interpolate from identity towards `self` by `amount` (clamped to 0..=1).
    fn with_amount(self, amount: f32) -> ColorMatrix {
        let t = amount.clamp(0.0, 1.0);
        let mut out = Self::IDENTITY;
        for (r, row) in out.rows.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = *cell * (1.0 - t) + self.rows[r][c] * t;
            }
            out.offset[r] = self.offset[r] * t;
        }
        out
    }

    /// Uniform brightness shift: `amount = 1` is identity, `0` is black.
    fn lightness(amount: f32) -> ColorMatrix {
        let shift = amount - 1.0;
        ColorMatrix {
            offset: [shift; 3],
            ..Self::IDENTITY
        }
    }

    fn transform(&self, rgb: [f32; 3]) -> [f32; 3] {
        let mut out = [0.0; 3];
        for (i, row) in self.rows.iter().enumerate() {
            out[i] = row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2] + self.offset[i];
        }
        out
    }
}

fn saturate(rgb: [f32; 3], factor: f32) -> [f32; 3] {
    let luma = LUMA[0] * rgb[0] + LUMA[1] * rgb[1] + LUMA[2] * rgb[2];
    rgb.map(|c| luma + (c - luma) * factor)
}

fn contrast(rgb: [f32; 3], factor: f32) -> [f32; 3] {
    rgb.map(|c| (c - 0.5) * factor + 0.5)
}

/// Run `f` over every pixel's normalized RGB, keeping alpha.
fn map_rgb(buffer: &mut PixelBuffer, f: impl Fn([f32; 3]) -> [f32; 3]) {
    let mut rgba = buffer.image().to_rgba8();
    for pixel in rgba.pixels_mut() {
        let rgb = [pixel[0], pixel[1], pixel[2]].map(|c| c as f32 / 255.0);
        let out = f(rgb);
        for (channel, value) in pixel.0.iter_mut().zip(out) {
            *channel = (value * 255.0).round().clamp(0.0, 255.0) as u8;
        }
    }
    *buffer = PixelBuffer::new(DynamicImage::ImageRgba8(rgba));
}

/// Posterizing brush: each pixel takes the mean color of the most common
/// intensity bucket within its neighbourhood.
fn oil_paint(source: &RgbaImage, levels: u32, brush_size: u32) -> RgbaImage {
    let levels = levels.max(1) as usize;
    let radius = (brush_size / 2) as i64;
    let (width, height) = source.dimensions();
    let mut counts = vec![0u32; levels];
    let mut sums = vec![[0u32; 3]; levels];

    RgbaImage::from_fn(width, height, |x, y| {
        counts.iter_mut().for_each(|c| *c = 0);
        sums.iter_mut().for_each(|s| *s = [0; 3]);

        let x0 = (x as i64 - radius).max(0) as u32;
        let y0 = (y as i64 - radius).max(0) as u32;
        let x1 = (x as i64 + radius).min(width as i64 - 1) as u32;
        let y1 = (y as i64 + radius).min(height as i64 - 1) as u32;

        for ny in y0..=y1 {
            for nx in x0..=x1 {
                let p = source.get_pixel(nx, ny);
                let intensity = (p[0] as usize + p[1] as usize + p[2] as usize) / 3;
                let bucket = intensity * (levels - 1) / 255;
                counts[bucket] += 1;
                for c in 0..3 {
                    sums[bucket][c] += p[c] as u32;
                }
            }
        }

        let (best, &count) = counts
            .iter()
            .enumerate()
            .max_by_key(|&(_, c)| c)
            .unwrap_or((0, &1));
        let count = count.max(1);
        let alpha = source.get_pixel(x, y)[3];
        image::Rgba([
            (sums[best][0] / count) as u8,
            (sums[best][1] / count) as u8,
            (sums[best][2] / count) as u8,
            alpha,
        ])
    })
}

fn encode_failed(format: ImageFormat) -> impl Fn(image::ImageError) -> BackendError {
    move |e| BackendError::Encode {
        format,
        reason: e.to_string(),
    }
}

fn decode_failed(format: ImageFormat) -> impl Fn(image::ImageError) -> BackendError {
    move |e| BackendError::Decode {
        format,
        reason: e.to_string(),
    }
}

impl ImageBackend for RustBackend {
    fn detect_format(&self, bytes: &[u8]) -> Option<ImageFormat> {
        image::guess_format(bytes)
            .ok()
            .and_then(ImageFormat::from_detected)
    }

    fn decode(
        &self,
        bytes: &[u8],
        format: ImageFormat,
        settings: &DecodeSettings,
    ) -> Result<PixelBuffer, BackendError> {
        let mut decoder = ImageReader::with_format(Cursor::new(bytes), format.to_image_format())
            .into_decoder()
            .map_err(decode_failed(format))?;

        let orientation = if settings.ignore_metadata {
            None
        } else {
            // Missing or unreadable EXIF is not an error, just no rotation
            decoder.orientation().ok()
        };

        let mut img = DynamicImage::from_decoder(decoder).map_err(decode_failed(format))?;
        if let Some(orientation) = orientation {
            img.apply_orientation(orientation);
        }

        debug!(%format, width = img.width(), height = img.height(), "Decoded image");
        Ok(PixelBuffer::new(img))
    }

    fn encode(
        &self,
        buffer: &PixelBuffer,
        settings: &EncodeSettings,
    ) -> Result<Vec<u8>, BackendError> {
        let format = settings.format;
        let mut out = Vec::new();

        match format {
            ImageFormat::Jpg => {
                let quality = settings.quality.unwrap_or_default().value() as u8;
                // JPEG has no alpha channel
                let rgb = DynamicImage::ImageRgb8(buffer.image().to_rgb8());
                rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality))
                    .map_err(encode_failed(format))?;
            }
            ImageFormat::Png => {
                buffer
                    .image()
                    .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
                    .map_err(encode_failed(format))?;
            }
            ImageFormat::Bmp | ImageFormat::Gif | ImageFormat::WebP => {
                // These encoders only take 8-bit RGB(A)
                let rgba = DynamicImage::ImageRgba8(buffer.image().to_rgba8());
                rgba.write_to(&mut Cursor::new(&mut out), format.to_image_format())
                    .map_err(encode_failed(format))?;
            }
        }

        debug!(%format, bytes = out.len(), "Encoded image");
        Ok(out)
    }

    fn resize(&self, buffer: &mut PixelBuffer, params: &ResizeParams) -> Result<(), BackendError> {
        if params.width == 0 || params.height == 0 {
            return Err(BackendError::ProcessingFailed(format!(
                "Cannot resize to {}x{}",
                params.width, params.height
            )));
        }
        let resized = buffer
            .image()
            .resize_exact(params.width, params.height, FilterType::Lanczos3);
        *buffer = PixelBuffer::new(resized);
        Ok(())
    }

    fn gaussian_blur(
        &self,
        buffer: &mut PixelBuffer,
        params: &BlurParams,
    ) -> Result<(), BackendError> {
        let Some(region) = params.region else {
            let blurred = buffer.image().blur(params.sigma);
            *buffer = PixelBuffer::new(blurred);
            return Ok(());
        };

        let Some(r) = region.clip_to(buffer.width(), buffer.height()) else {
            debug!(?region, "Blur region outside image, nothing to do");
            return Ok(());
        };

        let blurred = buffer
            .image()
            .crop_imm(r.x, r.y, r.width, r.height)
            .blur(params.sigma);
        image::imageops::replace(buffer.image_mut(), &blurred, r.x as i64, r.y as i64);
        Ok(())
    }

    fn apply_filter(&self, buffer: &mut PixelBuffer, op: &FilterOp) -> Result<(), BackendError> {
        match *op {
            FilterOp::Grayscale { amount } => {
                let m = ColorMatrix::GRAYSCALE.with_amount(amount);
                map_rgb(buffer, |rgb| m.transform(rgb));
            }
            FilterOp::Sepia { amount } => {
                let m = ColorMatrix::SEPIA.with_amount(amount);
                map_rgb(buffer, |rgb| m.transform(rgb));
            }
            FilterOp::Lighten { amount } => {
                let m = ColorMatrix::lightness(amount);
                map_rgb(buffer, |rgb| m.transform(rgb));
            }
            FilterOp::Stylize => {
                let m = ColorMatrix::KODACHROME;
                map_rgb(buffer, |rgb| contrast(saturate(m.transform(rgb), 1.2), 1.35));
            }
            FilterOp::Invert => buffer.image_mut().invert(),
            FilterOp::OilPaint { levels, brush_size } => {
                let painted = oil_paint(&buffer.image().to_rgba8(), levels, brush_size);
                *buffer = PixelBuffer::new(DynamicImage::ImageRgba8(painted));
            }
        }
        Ok(())
    }

    fn compose_over(
        &self,
        base: &mut PixelBuffer,
        overlay: &PixelBuffer,
        params: &CompositeParams,
    ) -> Result<(), BackendError> {
        let opacity = params.opacity.clamp(0.0, 1.0);
        let top: Cow<'_, DynamicImage> = if opacity >= 1.0 {
            Cow::Borrowed(overlay.image())
        } else {
            let mut rgba = overlay.image().to_rgba8();
            for pixel in rgba.pixels_mut() {
                pixel[3] = (pixel[3] as f32 * opacity).round() as u8;
            }
            Cow::Owned(DynamicImage::ImageRgba8(rgba))
        };

        image::imageops::overlay(
            base.image_mut(),
            top.as_ref(),
            params.position.x,
            params.position.y,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::format::CodecSettings;
    use crate::imaging::params::{Point, Quality, Rectangle};
    use crate::test_helpers::*;
    use image::GenericImageView;

    fn buffer(img: DynamicImage) -> PixelBuffer {
        PixelBuffer::new(img)
    }

    fn rgba_at(buffer: &PixelBuffer, x: u32, y: u32) -> [u8; 4] {
        buffer.image().get_pixel(x, y).0
    }

    const KEEP_METADATA: DecodeSettings = DecodeSettings {
        ignore_metadata: false,
    };

    // =========================================================================
    // detect / decode / encode
    // =========================================================================

    #[test]
    fn detects_all_supported_formats() {
        let backend = RustBackend::new();
        let img = buffer(gradient_image(16, 12));
        for format in ImageFormat::ALL {
            let bytes = backend
                .encode(&img, &CodecSettings::for_format(format).encode)
                .unwrap();
            assert_eq!(backend.detect_format(&bytes), Some(format), "{format}");
        }
    }

    #[test]
    fn detect_rejects_noise_and_unsupported_formats() {
        let backend = RustBackend::new();
        assert_eq!(backend.detect_format(&noise_bytes(256)), None);
        assert_eq!(backend.detect_format(&[]), None);
        // Little-endian TIFF signature: recognizable, but not supported here
        assert_eq!(backend.detect_format(b"II*\0\x08\0\0\0\0\0"), None);
    }

    #[test]
    fn decode_png_preserves_dimensions() {
        let backend = RustBackend::new();
        let decoded = backend
            .decode(&png_bytes(200, 150), ImageFormat::Png, &KEEP_METADATA)
            .unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 150));
    }

    #[test]
    fn decode_corrupt_bytes_errors() {
        let backend = RustBackend::new();
        let mut bytes = png_bytes(20, 20);
        bytes.truncate(40);
        let err = backend
            .decode(&bytes, ImageFormat::Png, &KEEP_METADATA)
            .unwrap_err();
        assert!(matches!(
            err,
            BackendError::Decode {
                format: ImageFormat::Png,
                ..
            }
        ));
    }

    #[test]
    fn png_round_trip_is_lossless() {
        let backend = RustBackend::new();
        let original = buffer(gradient_image(33, 17));
        let bytes = backend
            .encode(&original, &CodecSettings::for_format(ImageFormat::Png).encode)
            .unwrap();
        let decoded = backend
            .decode(&bytes, ImageFormat::Png, &KEEP_METADATA)
            .unwrap();
        assert_eq!(decoded.image().to_rgba8(), original.image().to_rgba8());
    }

    #[test]
    fn jpeg_round_trip_preserves_dimensions() {
        let backend = RustBackend::new();
        let original = buffer(gradient_image(64, 40));
        let bytes = backend
            .encode(&original, &CodecSettings::for_format(ImageFormat::Jpg).encode)
            .unwrap();
        let decoded = backend
            .decode(
                &bytes,
                ImageFormat::Jpg,
                &DecodeSettings {
                    ignore_metadata: true,
                },
            )
            .unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 40));
    }

    #[test]
    fn jpeg_quality_affects_size() {
        let backend = RustBackend::new();
        let img = buffer(gradient_image(128, 128));
        let low = backend
            .encode(
                &img,
                &EncodeSettings {
                    format: ImageFormat::Jpg,
                    quality: Some(Quality::new(10)),
                },
            )
            .unwrap();
        let high = backend
            .encode(
                &img,
                &EncodeSettings {
                    format: ImageFormat::Jpg,
                    quality: Some(Quality::new(95)),
                },
            )
            .unwrap();
        assert!(low.len() < high.len());
    }

    // =========================================================================
    // resize / blur
    // =========================================================================

    #[test]
    fn jpeg_input_reencodes_to_every_format() {
        let backend = RustBackend::new();
        let decoded = backend
            .decode(&jpeg_bytes(48, 32), ImageFormat::Jpg, &KEEP_METADATA)
            .unwrap();
        for format in ImageFormat::ALL {
            let bytes = backend
                .encode(&decoded, &CodecSettings::for_format(format).encode)
                .unwrap();
            let reread = decode_any(&bytes);
            assert_eq!((reread.width(), reread.height()), (48, 32), "{format}");
        }
    }

    #[test]
    fn resize_exact_dimensions() {
        let backend = RustBackend::new();
        let mut img = buffer(gradient_image(400, 300));
        backend
            .resize(
                &mut img,
                &ResizeParams {
                    width: 200,
                    height: 151,
                },
            )
            .unwrap();
        assert_eq!((img.width(), img.height()), (200, 151));
    }

    #[test]
    fn resize_to_zero_errors() {
        let backend = RustBackend::new();
        let mut img = buffer(gradient_image(4, 4));
        let result = backend.resize(
            &mut img,
            &ResizeParams {
                width: 0,
                height: 4,
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn blur_region_leaves_outside_untouched() {
        let backend = RustBackend::new();
        let original = buffer(striped_image(40, 20));
        let mut img = original.clone();

        backend
            .gaussian_blur(
                &mut img,
                &BlurParams {
                    sigma: 3.0,
                    region: Some(Rectangle::new(20, 0, 20, 20)),
                },
            )
            .unwrap();

        for y in 0..20 {
            for x in 0..20 {
                assert_eq!(rgba_at(&img, x, y), rgba_at(&original, x, y));
            }
        }
        // Stripes inside the region are smeared towards gray
        let inside = rgba_at(&img, 30, 10);
        assert!(inside[0] > 20 && inside[0] < 235, "{inside:?}");
    }

    #[test]
    fn blur_region_outside_image_is_noop() {
        let backend = RustBackend::new();
        let original = buffer(striped_image(10, 10));
        let mut img = original.clone();
        backend
            .gaussian_blur(
                &mut img,
                &BlurParams {
                    sigma: 2.0,
                    region: Some(Rectangle::new(50, 50, 10, 10)),
                },
            )
            .unwrap();
        assert_eq!(img.image().to_rgba8(), original.image().to_rgba8());
    }

    #[test]
    fn blur_whole_image() {
        let backend = RustBackend::new();
        let mut img = buffer(striped_image(30, 10));
        backend
            .gaussian_blur(
                &mut img,
                &BlurParams {
                    sigma: 2.0,
                    region: None,
                },
            )
            .unwrap();
        assert_eq!((img.width(), img.height()), (30, 10));
        let p = rgba_at(&img, 15, 5);
        assert!(p[0] > 20 && p[0] < 235, "{p:?}");
    }

    // =========================================================================
    // color filters
    // =========================================================================

    #[test]
    fn full_grayscale_equalizes_channels() {
        let backend = RustBackend::new();
        let mut img = buffer(solid_image(4, 4, [200, 40, 90, 255]));
        backend
            .apply_filter(&mut img, &FilterOp::Grayscale { amount: 1.0 })
            .unwrap();
        let [r, g, b, a] = rgba_at(&img, 1, 1);
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(a, 255);
    }

    #[test]
    fn zero_amount_grayscale_is_identity() {
        let backend = RustBackend::new();
        let original = buffer(gradient_image(8, 8));
        let mut img = original.clone();
        backend
            .apply_filter(&mut img, &FilterOp::Grayscale { amount: 0.0 })
            .unwrap();
        assert_eq!(img.image().to_rgba8(), original.image().to_rgba8());
    }

    #[test]
    fn sepia_warms_white() {
        let backend = RustBackend::new();
        let mut img = buffer(solid_image(2, 2, [255, 255, 255, 255]));
        backend
            .apply_filter(&mut img, &FilterOp::Sepia { amount: 1.0 })
            .unwrap();
        assert_eq!(rgba_at(&img, 0, 0), [255, 255, 239, 255]);
    }

    #[test]
    fn invert_flips_channels_and_keeps_alpha() {
        let backend = RustBackend::new();
        let mut img = buffer(solid_image(2, 2, [10, 20, 30, 128]));
        backend.apply_filter(&mut img, &FilterOp::Invert).unwrap();
        assert_eq!(rgba_at(&img, 1, 1), [245, 235, 225, 128]);
    }

    #[test]
    fn lighten_amount_one_is_identity_and_zero_is_black() {
        let backend = RustBackend::new();
        let mut img = buffer(solid_image(2, 2, [120, 60, 30, 255]));
        backend
            .apply_filter(&mut img, &FilterOp::Lighten { amount: 1.0 })
            .unwrap();
        assert_eq!(rgba_at(&img, 0, 0), [120, 60, 30, 255]);

        backend
            .apply_filter(&mut img, &FilterOp::Lighten { amount: 0.0 })
            .unwrap();
        assert_eq!(rgba_at(&img, 0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn stylize_changes_colors_but_not_size() {
        let backend = RustBackend::new();
        let mut img = buffer(solid_image(6, 5, [128, 128, 128, 255]));
        backend.apply_filter(&mut img, &FilterOp::Stylize).unwrap();
        assert_eq!((img.width(), img.height()), (6, 5));
        assert_ne!(rgba_at(&img, 0, 0), [128, 128, 128, 255]);
    }

    #[test]
    fn oil_paint_keeps_flat_color() {
        let backend = RustBackend::new();
        let mut img = buffer(solid_image(12, 9, [90, 140, 200, 255]));
        backend.apply_filter(&mut img, &FilterOp::oil_paint()).unwrap();
        assert_eq!((img.width(), img.height()), (12, 9));
        assert_eq!(rgba_at(&img, 6, 4), [90, 140, 200, 255]);
    }

    #[test]
    fn oil_paint_smooths_stripes_into_one_color_per_neighbourhood() {
        let backend = RustBackend::new();
        let mut img = buffer(striped_image(9, 9));
        backend
            .apply_filter(
                &mut img,
                &FilterOp::OilPaint {
                    levels: 4,
                    brush_size: 3,
                },
            )
            .unwrap();
        let p = rgba_at(&img, 4, 4);
        assert!(p == [0, 0, 0, 255] || p == [255, 255, 255, 255], "{p:?}");
    }

    // =========================================================================
    // compose
    // =========================================================================

    #[test]
    fn compose_clips_overhang() {
        let backend = RustBackend::new();
        let mut base = buffer(solid_image(10, 10, [255, 255, 255, 255]));
        let overlay = buffer(solid_image(4, 4, [255, 0, 0, 255]));
        backend
            .compose_over(
                &mut base,
                &overlay,
                &CompositeParams {
                    position: Point { x: 8, y: 8 },
                    opacity: 1.0,
                },
            )
            .unwrap();
        assert_eq!((base.width(), base.height()), (10, 10));
        assert_eq!(rgba_at(&base, 9, 9), [255, 0, 0, 255]);
        assert_eq!(rgba_at(&base, 7, 7), [255, 255, 255, 255]);
    }

    #[test]
    fn compose_at_origin_covers_top_left() {
        let backend = RustBackend::new();
        let mut base = buffer(solid_image(10, 10, [0, 0, 0, 255]));
        let overlay = buffer(solid_image(3, 2, [0, 255, 0, 255]));
        backend
            .compose_over(
                &mut base,
                &overlay,
                &CompositeParams {
                    position: Point { x: 0, y: 0 },
                    opacity: 1.0,
                },
            )
            .unwrap();
        assert_eq!(rgba_at(&base, 0, 0), [0, 255, 0, 255]);
        assert_eq!(rgba_at(&base, 2, 1), [0, 255, 0, 255]);
        assert_eq!(rgba_at(&base, 3, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn compose_with_partial_opacity_blends() {
        let backend = RustBackend::new();
        let mut base = buffer(solid_image(2, 2, [0, 0, 0, 255]));
        let overlay = buffer(solid_image(2, 2, [255, 255, 255, 255]));
        backend
            .compose_over(
                &mut base,
                &overlay,
                &CompositeParams {
                    position: Point { x: 0, y: 0 },
                    opacity: 0.5,
                },
            )
            .unwrap();
        let [r, ..] = rgba_at(&base, 0, 0);
        assert!(r > 100 && r < 155, "{r}");
    }

    #[test]
    fn compose_negative_position_does_not_panic() {
        let backend = RustBackend::new();
        let mut base = buffer(solid_image(5, 5, [0, 0, 0, 255]));
        let overlay = buffer(solid_image(4, 4, [9, 9, 9, 255]));
        backend
            .compose_over(
                &mut base,
                &overlay,
                &CompositeParams {
                    position: Point { x: -2, y: -2 },
                    opacity: 1.0,
                },
            )
            .unwrap();
        assert_eq!(rgba_at(&base, 1, 1), [9, 9, 9, 255]);
        assert_eq!(rgba_at(&base, 2, 2), [0, 0, 0, 255]);
    }
}
