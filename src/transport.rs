//! Byte transport: base64 text, files, and URL downloads.
//!
//! Thin adapters with no image knowledge. Failures are surfaced as-is and
//! never retried here.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid base64 content: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

fn io_error(path: &Path) -> impl Fn(std::io::Error) -> TransportError + '_ {
    move |source| TransportError::Io {
        path: path.display().to_string(),
        source,
    }
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64. Surrounding whitespace is ignored.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, TransportError> {
    Ok(STANDARD.decode(text.trim())?)
}

pub fn read_file(path: &Path) -> Result<Vec<u8>, TransportError> {
    fs::read(path).map_err(io_error(path))
}

pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), TransportError> {
    fs::write(path, bytes).map_err(io_error(path))?;
    debug!(path = %path.display(), bytes = bytes.len(), "Wrote file");
    Ok(())
}

pub fn write_text(path: &Path, text: &str) -> Result<(), TransportError> {
    write_bytes(path, text.as_bytes())
}

/// Download a URL's body. Non-2xx statuses are errors.
pub fn fetch_url(url: &str, timeout: Duration) -> Result<Vec<u8>, TransportError> {
    let http_error = |source| TransportError::Http {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(http_error)?;
    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(http_error)?;
    let bytes = response.bytes().map_err(http_error)?;

    debug!(url, bytes = bytes.len(), "Fetched URL");
    Ok(bytes.to_vec())
}
