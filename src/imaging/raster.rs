//! The decoded raster shared between components.

use super::backend::Dimensions;
use crate::geometry::{Rect, SourceSpace};
use image::RgbaImage;
use std::fmt;
use std::sync::Arc;

/// Immutable decoded RGBA image.
///
/// Cloning is cheap: all clones share one pixel buffer. Consumers hold a
/// reference to whatever the decoder produced and never copy pixels.
#[derive(Clone)]
pub struct Image {
    pixels: Arc<RgbaImage>,
}

impl Image {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    pub fn natural_width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn natural_height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.natural_width(),
            height: self.natural_height(),
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// The full-image rectangle in its own (source) space.
    pub fn bounds(&self) -> Rect<SourceSpace> {
        Rect::from_parts(
            0.0,
            0.0,
            f64::from(self.natural_width()),
            f64::from(self.natural_height()),
        )
    }

    /// Whether two handles point at the same decoded buffer.
    pub fn shares_pixels_with(&self, other: &Image) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.natural_width())
            .field("height", &self.natural_height())
            .finish()
    }
}
