//! Error types for template decoding, storage and position marking.

use thiserror::Error;

/// Errors that can occur while turning a selected file into a template image.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The text is not a `data:<mime>;base64,<payload>` URL.
    #[error("Malformed data URL: {0}")]
    MalformedDataUrl(String),

    /// Base64 payload could not be decoded
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Raster decoding failed (PNG, JPG, ...)
    #[error("Failed to decode image: {0}")]
    Raster(#[from] image::ImageError),

    /// SVG parsing failed
    #[error("Failed to parse SVG: {0}")]
    Svg(#[from] resvg::usvg::Error),

    /// The SVG parsed but could not be rasterized at its intrinsic size.
    #[error("Cannot rasterize SVG at {width}x{height}")]
    Rasterize { width: u32, height: u32 },

    /// I/O error when reading the picked file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a [`crate::storage::KeyValueStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// Record could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error in the file-backed store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing would exceed the store's capacity.
    #[error("Storage quota exceeded: {needed} bytes needed, {quota} bytes available")]
    QuotaExceeded { needed: usize, quota: usize },

    /// The storage backend is missing or rejected the operation (localStorage in WASM)
    #[error("Storage error: {0}")]
    Backend(String),
}

/// Errors raised by the position marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PositionError {
    /// Marking a position requires a visible template.
    #[error("No certificate template is loaded")]
    NoTemplate,
}
