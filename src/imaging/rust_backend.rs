//! Pure Rust image backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` with format sniffing |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (alpha flattened) |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{EncodeParams, ExportFormat};
use super::raster::Image;
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
///
/// The `"avif"` feature only enables the AVIF *encoder*, so AVIF is never an
/// accepted upload format even though `reading_enabled()` claims otherwise.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of photo file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Backend using the `image` crate ecosystem.
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

fn into_image(decoded: DynamicImage) -> Result<Image, BackendError> {
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(BackendError::ProcessingFailed(
            "Decoded image has zero size".into(),
        ));
    }
    Ok(Image::from_rgba(decoded.into_rgba8()))
}

/// Encode as JPEG. JPEG has no alpha channel, so the surface is flattened to RGB.
fn encode_jpeg(surface: &RgbaImage, quality: u32) -> Result<Vec<u8>, BackendError> {
    let rgb = DynamicImage::ImageRgba8(surface.clone()).into_rgb8();
    let mut bytes = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, quality as u8);
    DynamicImage::ImageRgb8(rgb)
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))?;
    Ok(bytes)
}

/// Encode as AVIF using rav1e (speed=6 for reasonable throughput).
fn encode_avif(surface: &RgbaImage, quality: u32) -> Result<Vec<u8>, BackendError> {
    let mut bytes = Vec::new();
    let encoder =
        image::codecs::avif::AvifEncoder::new_with_speed_quality(&mut bytes, 6, quality as u8);
    DynamicImage::ImageRgba8(surface.clone())
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("AVIF encode failed: {}", e)))?;
    Ok(bytes)
}

fn encode_png(surface: &RgbaImage) -> Result<Vec<u8>, BackendError> {
    let mut bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut bytes);
    DynamicImage::ImageRgba8(surface.clone())
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("PNG encode failed: {}", e)))?;
    Ok(bytes)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn decode_file(&self, path: &Path) -> Result<Image, BackendError> {
        let decoded = ImageReader::open(path)
            .map_err(BackendError::Io)?
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .decode()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!(
                    "Failed to decode {}: {}",
                    path.display(),
                    e
                ))
            })?;
        into_image(decoded)
    }

    fn decode_bytes(&self, bytes: &[u8]) -> Result<Image, BackendError> {
        let decoded = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .decode()
            .map_err(|e| BackendError::ProcessingFailed(format!("Failed to decode upload: {}", e)))?;
        into_image(decoded)
    }

    fn encode(&self, surface: &RgbaImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
        let quality = params.quality.value();
        match params.format {
            ExportFormat::Jpeg => encode_jpeg(surface, quality),
            ExportFormat::Avif => encode_avif(surface, quality),
            ExportFormat::Png => encode_png(surface),
        }
    }
}
