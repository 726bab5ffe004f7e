//! # Picforge
//!
//! Image transformation primitives: region blur, watermarks, color filters,
//! aspect-preserving scaling and QR code rendering. Input arrives as raw
//! bytes, base64 text, a file path or a URL; output leaves as bytes or base64
//! in whichever format the session is configured for.
//!
//! # Architecture: Detect → Decode → Mutate → Encode
//!
//! Every byte-in operation runs the same short pipeline:
//!
//! ```text
//! bytes ─▶ detect format ─▶ decode ─▶ mutate ─▶ encode ─▶ bytes / base64
//!               │                        ▲
//!               └─ InvalidImageFormat    └─ parameters from pure calculations
//! ```
//!
//! Geometry and intensities (scale dimensions, blur tiles, watermark
//! positions, filter amounts) are pure functions with no pixel access, so
//! they are unit tested in isolation. Pixel work goes through the
//! [`imaging::ImageBackend`] trait; operation tests swap in a recording mock
//! and assert the exact parameters the backend would have received.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Formats, calculations, the backend trait, `RustBackend`, and the exposed operations |
//! | [`qr`] | Text → QR module matrix → grayscale bitmap |
//! | [`transport`] | Base64, file, and URL byte movement |
//! | [`config`] | `picforge.toml` loading, merging, and validation |
//!
//! # Design Decisions
//!
//! ## One Output Format Per Session
//!
//! The output format is chosen once (config file or `--format`) and carried as
//! [`imaging::CodecSettings`]. Every operation encodes with it, except QR codes,
//! which are always PNG so their hard edges survive.
//!
//! ## Detection Before Anything Else
//!
//! Content that is not BMP, PNG, JPG, GIF or WebP is rejected before any
//! decode or geometry. Callers get one stable error for "not an image" no
//! matter which operation they called.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling, blur and compositing use the `image` crate and QR
//! encoding uses `qrcode`. No system libraries are needed.

pub mod config;
pub mod imaging;
pub mod qr;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_helpers;
