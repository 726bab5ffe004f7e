//! Engine configuration module.
//!
//! Handles loading, validating, and merging `picforge.toml`. Stock defaults
//! are serialized to TOML first, then the user file is merged on top, so a
//! config file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! format = "png"            # jpg | png | bmp | gif | webp
//!
//! [scale]
//! max_width = 0             # 0 = keep original width
//!
//! [qr]
//! pixels_per_module = 5     # 1-100
//!
//! [transport]
//! timeout_secs = 30         # URL download timeout
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{CodecSettings, ImageFormat};
use crate::qr::DEFAULT_PIXELS_PER_MODULE;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Largest accepted QR scale.
pub const MAX_PIXELS_PER_MODULE: u32 = 100;

/// Engine configuration loaded from `picforge.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Output encoding.
    pub output: OutputConfig,
    /// Default scaling limit.
    pub scale: ScaleConfig,
    /// QR rendering.
    pub qr: QrConfig,
    /// URL downloads.
    pub transport: TransportConfig,
}

impl EngineConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.qr.pixels_per_module == 0 || self.qr.pixels_per_module > MAX_PIXELS_PER_MODULE {
            return Err(ConfigError::Validation(format!(
                "qr.pixels_per_module must be 1-{MAX_PIXELS_PER_MODULE}"
            )));
        }
        if self.transport.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "transport.timeout_secs must be greater than 0".into(),
            ));
        }
        if self.scale.max_width < 0 {
            return Err(ConfigError::Validation(
                "scale.max_width must be 0 (no limit) or positive".into(),
            ));
        }
        Ok(())
    }

    /// Codec settings for the configured output format.
    pub fn codec(&self) -> CodecSettings {
        CodecSettings::for_format(self.output.format)
    }

    /// Replace the QR scale for one invocation, holding it to the same range
    /// as the config file.
    pub fn override_pixels_per_module(
        &mut self,
        pixels_per_module: u32,
    ) -> Result<(), ConfigError> {
        let mut candidate = self.clone();
        candidate.qr.pixels_per_module = pixels_per_module;
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.transport.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Format every output image is encoded in (QR codes are always PNG).
    /// Unrecognized names fall back to png.
    #[serde(deserialize_with = "lenient_format")]
    pub format: ImageFormat,
}

fn lenient_format<'de, D>(deserializer: D) -> Result<ImageFormat, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    Ok(ImageFormat::from_name(&name))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScaleConfig {
    /// Maximum output width in pixels. `0` keeps the original width.
    pub max_width: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QrConfig {
    /// Pixels per QR module (quiet zone included in the module count).
    pub pixels_per_module: u32,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            pixels_per_module: DEFAULT_PIXELS_PER_MODULE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransportConfig {
    /// Timeout for URL downloads, in seconds.
    pub timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(EngineConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<EngineConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: EngineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults if it is missing.
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `picforge.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# picforge configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Format every output image is encoded in: jpg, png, bmp, gif or webp.
# Unrecognized names fall back to png.
# jpg is encoded at quality 90 and ignores embedded metadata on decode.
# QR codes are always PNG.
format = "png"

# ---------------------------------------------------------------------------
# Scaling
# ---------------------------------------------------------------------------
[scale]
# Maximum output width in pixels for the scale command. Images that are
# already narrower are left alone. 0 keeps the original width.
max_width = 0

# ---------------------------------------------------------------------------
# QR codes
# ---------------------------------------------------------------------------
[qr]
# Pixel size of one QR module (1-100). The bitmap side is
# (modules + 8 quiet-zone modules) * pixels_per_module.
pixels_per_module = 5

# ---------------------------------------------------------------------------
# Transport
# ---------------------------------------------------------------------------
[transport]
# Timeout for downloading images from a URL, in seconds.
timeout_secs = 30
"##
}
