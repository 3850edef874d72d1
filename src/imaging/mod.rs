//! Pixel work: decode, crop, draw, text, encode.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify / decode** | `image::image_dimensions`, `image::ImageReader` |
//! | **Crop** | `image::imageops::crop_imm` with clamp-and-continue bounds |
//! | **Stretch** | `image::imageops::resize` (Lanczos3 export, Triangle preview) |
//! | **Text** | `ab_glyph` coverage masks + `image::imageops::blur` shadow |
//! | **Encode** | JPEG (default), AVIF (rav1e), PNG for preview dumps |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for sizing math (unit testable)
//! - **Parameters**: Data structures describing draws and encodes
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Raster / crop / draw / text**: the pixel operations the compositor calls

pub mod backend;
mod calculations;
pub mod crop;
pub mod draw;
mod params;
pub mod raster;
pub mod rust_backend;
pub mod text;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    aspect_matches, clamp_span, frame_font_size, preview_dimensions, preview_scale,
    shrink_to_fit, span_overlaps, text_top_below,
};
pub use crop::{CropError, crop};
pub use params::{
    EncodeParams, ExportFormat, Quality, RenderStyle, ShadowParams, TextStyle,
};
pub use raster::Image;
pub use rust_backend::RustBackend;
pub use text::TextError;
