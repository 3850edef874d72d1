//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the operations the engine needs from
//! an image library: identify, decode (from a file or from bytes), and
//! encode a finished surface.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests substitute [`tests::MockBackend`] to observe calls and to
//! hold an encode in flight.

use super::params::EncodeParams;
use super::raster::Image;
use image::RgbaImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image backends.
///
/// `Send + Sync` so one backend can be shared by the session, background
/// preview threads and the export pipeline.
pub trait ImageBackend: Send + Sync {
    /// Get image dimensions without a full decode.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode an image file.
    fn decode_file(&self, path: &Path) -> Result<Image, BackendError>;

    /// Decode an in-memory encoded image (e.g. an upload).
    fn decode_bytes(&self, bytes: &[u8]) -> Result<Image, BackendError>;

    /// Encode a finished surface.
    fn encode(&self, surface: &RgbaImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError>;
}
