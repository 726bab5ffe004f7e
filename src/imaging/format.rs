//! Output format selection and codec settings.
//!
//! A session picks one [`ImageFormat`] up front; [`CodecSettings::for_format`]
//! turns it into the encode/decode pair every operation in that session uses.
//! The mapping is a closed table, one arm per format:
//!
//! | Format | Encode | Decode |
//! |---|---|---|
//! | Jpg | quality 90 | ignore embedded metadata |
//! | Png | lossless defaults | honour metadata |
//! | Bmp | defaults | honour metadata |
//! | Gif | defaults | honour metadata |
//! | WebP | lossless defaults | honour metadata |

use super::params::Quality;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Supported image formats, for both input detection and output encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpg,
    #[default]
    Png,
    Bmp,
    Gif,
    WebP,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 5] = [Self::Bmp, Self::Png, Self::Jpg, Self::Gif, Self::WebP];

    /// Lenient lookup by name or extension. Unknown names resolve to [`ImageFormat::Png`].
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|reason: String| {
            warn!("{reason}, falling back to png");
            Self::default()
        })
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Gif => "gif",
            Self::WebP => "webp",
        }
    }

    /// Map a detected `image` crate format onto the supported set.
    pub fn from_detected(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Jpeg => Some(Self::Jpg),
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Bmp => Some(Self::Bmp),
            image::ImageFormat::Gif => Some(Self::Gif),
            image::ImageFormat::WebP => Some(Self::WebP),
            _ => None,
        }
    }

    pub fn to_image_format(self) -> image::ImageFormat {
        match self {
            Self::Jpg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
            Self::Bmp => image::ImageFormat::Bmp,
            Self::Gif => image::ImageFormat::Gif,
            Self::WebP => image::ImageFormat::WebP,
        }
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "png" => Ok(Self::Png),
            "bmp" => Ok(Self::Bmp),
            "gif" => Ok(Self::Gif),
            "webp" => Ok(Self::WebP),
            other => Err(format!(
                "unknown image format '{other}' (expected jpg, png, bmp, gif or webp)"
            )),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// How to encode a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSettings {
    pub format: ImageFormat,
    /// Only set for lossy formats.
    pub quality: Option<Quality>,
}

/// How to decode incoming bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeSettings {
    /// Skip embedded metadata (EXIF orientation) on decode.
    pub ignore_metadata: bool,
}

/// Encode/decode pair for one session. Never mutated after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecSettings {
    pub encode: EncodeSettings,
    pub decode: DecodeSettings,
}

impl CodecSettings {
    pub fn for_format(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Jpg => Self {
                encode: EncodeSettings {
                    format,
                    quality: Some(Quality::default()),
                },
                decode: DecodeSettings {
                    ignore_metadata: true,
                },
            },
            ImageFormat::Png | ImageFormat::Bmp | ImageFormat::Gif | ImageFormat::WebP => Self {
                encode: EncodeSettings {
                    format,
                    quality: None,
                },
                decode: DecodeSettings {
                    ignore_metadata: false,
                },
            },
        }
    }

    pub fn format(&self) -> ImageFormat {
        self.encode.format
    }
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self::for_format(ImageFormat::default())
    }
}
