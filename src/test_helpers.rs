//! Shared test utilities for the poster-forge test suite.
//!
//! Synthetic images are generated in code so tests never depend on fixture
//! files; fonts are the one exception and are probed from the system.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let template = template_image();          // 1200x1800, vertical gradient
//! let photo = gradient_image(800, 600);
//! let backend = mock_with_template(&template);
//!
//! let Some(font) = system_font() else { return };
//! assert_region_color(&surface, 0, 0, 10, 10, BLUE);
//! ```

use ab_glyph::FontArc;
use image::{Rgba, RgbaImage};

use crate::config::PosterConfig;
use crate::imaging::backend::tests::MockBackend;
use crate::imaging::{Image, text};

pub const TEMPLATE_PATH: &str = "/assets/template.png";
pub const RED: Rgba<u8> = Rgba([220, 30, 30, 255]);
pub const BLUE: Rgba<u8> = Rgba([20, 40, 200, 255]);

// =========================================================================
// Synthetic images
// =========================================================================

pub fn solid_image(width: u32, height: u32, color: Rgba<u8>) -> Image {
    Image::from_rgba(RgbaImage::from_pixel(width, height, color))
}

/// Every pixel distinct enough that a misplaced copy shows up.
pub fn gradient_image(width: u32, height: u32) -> Image {
    Image::from_rgba(RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x / 256 + y / 256) * 40 % 256) as u8, 255])
    }))
}

/// 1200x1800 template with a blue-to-dark vertical ramp.
pub fn template_image() -> Image {
    Image::from_rgba(RgbaImage::from_fn(1200, 1800, |_, y| {
        let v = (y * 200 / 1800) as u8;
        Rgba([20, 40, 200 - v, 255])
    }))
}

/// Mock backend serving [`template_image`]-like data at [`TEMPLATE_PATH`].
pub fn mock_with_template(template: &Image) -> MockBackend {
    MockBackend::with_file(TEMPLATE_PATH, template.clone())
}

/// Stock config pointed at [`TEMPLATE_PATH`].
pub fn test_config() -> PosterConfig {
    let mut config = PosterConfig::default();
    config.template.path = TEMPLATE_PATH.into();
    config
}

// =========================================================================
// Fonts
// =========================================================================

/// First usable system font, or `None` on machines without one.
///
/// Tests that rasterize glyphs return early on `None`.
pub fn system_font() -> Option<FontArc> {
    text::resolve_font(None).ok().flatten()
}

// =========================================================================
// Pixel assertions
// =========================================================================

/// Assert every pixel in the region equals `color`. Panics with the first miss.
pub fn assert_region_color(
    surface: &RgbaImage,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    color: Rgba<u8>,
) {
    for py in y..y + height {
        for px in x..x + width {
            let got = *surface.get_pixel(px, py);
            assert_eq!(got, color, "pixel ({px}, {py}) is {got:?}, expected {color:?}");
        }
    }
}

/// Bounding box `(x0, y0, x1, y1)` (inclusive) of pixels that differ from `base`.
pub fn changed_bounds(base: &RgbaImage, after: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    assert_eq!(base.dimensions(), after.dimensions());
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, p) in after.enumerate_pixels() {
        if p == base.get_pixel(x, y) {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bounds
}
