//! QR code generation.
//!
//! Two steps, kept apart so the module matrix can be inspected on its own:
//!
//! 1. [`generate_matrix`]: text → module matrix at error-correction level Q
//!    (about 25% recovery), via the `qrcode` crate. The matrix includes the
//!    standard 4-module quiet zone on every side.
//! 2. [`render_bitmap`]: matrix → grayscale bitmap, each module drawn as a
//!    `pixels_per_module` square.
//!
//! The bitmap side is therefore always `module_count * pixels_per_module`,
//! whatever QR version the text needs.

use crate::imaging::PixelBuffer;
use image::{DynamicImage, GrayImage, Luma};
use qrcode::{Color, EcLevel, QrCode};
use thiserror::Error;
use tracing::debug;

/// Quiet-zone width in modules, per the QR standard.
pub const QUIET_ZONE: usize = 4;

/// Default scale when none is configured.
pub const DEFAULT_PIXELS_PER_MODULE: u32 = 5;

/// Largest bitmap [`render_bitmap`] will allocate, in pixels.
pub const MAX_BITMAP_PIXELS: u64 = 100_000_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QrError {
    #[error("QR encode error: {0}")]
    Encode(String),
    #[error("pixels per module must be at least 1")]
    ZeroModuleSize,
    #[error("QR bitmap of {modules} modules at {pixels_per_module}px per module is too large")]
    TooLarge {
        modules: usize,
        pixels_per_module: u32,
    },
}

/// Square module matrix, quiet zone included. `true` is a dark module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    modules: Vec<bool>,
    module_count: usize,
}

impl QrMatrix {
    /// Modules per side, quiet zone included.
    pub fn module_count(&self) -> usize {
        self.module_count
    }

    /// Whether the module at `(x, y)` is dark. `None` outside the matrix.
    pub fn is_dark(&self, x: usize, y: usize) -> Option<bool> {
        if x >= self.module_count || y >= self.module_count {
            return None;
        }
        self.modules.get(y * self.module_count + x).copied()
    }
}

/// Encode `text` into a module matrix at error-correction level Q.
pub fn generate_matrix(text: &str) -> Result<QrMatrix, QrError> {
    let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::Q)
        .map_err(|e| QrError::Encode(e.to_string()))?;
    let symbol_width = code.width();
    let module_count = symbol_width + 2 * QUIET_ZONE;

    let mut modules = vec![false; module_count * module_count];
    for (i, color) in code.to_colors().iter().enumerate() {
        if *color == Color::Dark {
            let x = i % symbol_width + QUIET_ZONE;
            let y = i / symbol_width + QUIET_ZONE;
            modules[y * module_count + x] = true;
        }
    }

    debug!(
        symbol_width,
        module_count,
        version = ?code.version(),
        "Generated QR matrix"
    );
    Ok(QrMatrix {
        modules,
        module_count,
    })
}

/// Draw a matrix as black-on-white, `pixels_per_module` pixels per module.
pub fn render_bitmap(matrix: &QrMatrix, pixels_per_module: u32) -> Result<PixelBuffer, QrError> {
    if pixels_per_module == 0 {
        return Err(QrError::ZeroModuleSize);
    }
    let too_large = || QrError::TooLarge {
        modules: matrix.module_count,
        pixels_per_module,
    };
    let side = u32::try_from(matrix.module_count)
        .ok()
        .and_then(|m| m.checked_mul(pixels_per_module))
        .ok_or_else(too_large)?;
    if u64::from(side) * u64::from(side) > MAX_BITMAP_PIXELS {
        return Err(too_large());
    }

    let img = GrayImage::from_fn(side, side, |x, y| {
        let mx = (x / pixels_per_module) as usize;
        let my = (y / pixels_per_module) as usize;
        if matrix.is_dark(mx, my) == Some(true) {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    });

    Ok(PixelBuffer::new(DynamicImage::ImageLuma8(img)))
}
