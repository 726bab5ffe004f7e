//! Image processing in pure Rust, on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Detect / decode / encode** | `image` (BMP, PNG, JPG, GIF, WebP) |
//! | **Scale** | `resize_exact` with Lanczos3 |
//! | **Blur** | Gaussian blur, whole image or a clipped region |
//! | **Filters** | color matrices, invert, oil paint |
//! | **Watermark** | `imageops::overlay` |
//!
//! The module is split into:
//! - **Format**: [`ImageFormat`] → [`CodecSettings`] mapping
//! - **Calculations**: Pure functions for geometry and intensities (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod format;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, PixelBuffer};
pub use calculations::{
    Axis, PercentError, blur_sigma, calculate_overlay_position, calculate_percent_region,
    calculate_scale_dimensions, filter_amount, plan_filter,
};
pub use format::{CodecSettings, DecodeSettings, EncodeSettings, ImageFormat};
pub use operations::OperationError;
pub use params::{
    BlurLevel, BlurParams, CompositeParams, FilterKind, FilterOp, Point, Quality, Rectangle,
    ResizeParams,
};
pub use rust_backend::RustBackend;
