//! Surface drawing primitives: stretch-blit and coverage-mask blending.
//!
//! Surfaces are straight-alpha RGBA8. Every draw is clipped to the surface,
//! so destinations may start at negative coordinates or run past the edge
//! (free placement does both routinely).

use image::imageops::{self, FilterType};
use image::{GrayImage, Rgba, RgbaImage};

/// Destination rectangle snapped to whole surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Whether any part of this rect lands on a `width x height` surface.
    pub fn intersects(&self, width: u32, height: u32) -> bool {
        self.x < i64::from(width)
            && self.y < i64::from(height)
            && self.x + i64::from(self.width) > 0
            && self.y + i64::from(self.height) > 0
    }
}

/// Resample `src` to exactly `dest.width x dest.height` (non-uniform stretch)
/// and alpha-blend it onto `surface` at `(dest.x, dest.y)`.
///
/// Only the visible part of the destination is resampled, so a huge
/// free-placed photo hanging off the surface costs no more than one that fits.
pub fn draw_stretched(surface: &mut RgbaImage, src: &RgbaImage, dest: PixelRect, filter: FilterType) {
    if dest.width == 0 || dest.height == 0 || !dest.intersects(surface.width(), surface.height()) {
        return;
    }
    if src.dimensions() == (dest.width, dest.height) {
        imageops::overlay(surface, src, dest.x, dest.y);
        return;
    }

    // Visible window of the destination, in destination-local pixels.
    let vis_x0 = (-dest.x).max(0) as u32;
    let vis_y0 = (-dest.y).max(0) as u32;
    let vis_x1 = (i64::from(surface.width()) - dest.x).min(i64::from(dest.width)) as u32;
    let vis_y1 = (i64::from(surface.height()) - dest.y).min(i64::from(dest.height)) as u32;

    let full_area = u64::from(dest.width) * u64::from(dest.height);
    let visible_area = u64::from(vis_x1 - vis_x0) * u64::from(vis_y1 - vis_y0);
    if visible_area * 2 >= full_area {
        let resized = imageops::resize(src, dest.width, dest.height, filter);
        imageops::overlay(surface, &resized, dest.x, dest.y);
        return;
    }

    // Mostly off-surface: map each visible destination pixel back to the source.
    let sx = f64::from(src.width()) / f64::from(dest.width);
    let sy = f64::from(src.height()) / f64::from(dest.height);
    for ly in vis_y0..vis_y1 {
        let src_y = ((f64::from(ly) + 0.5) * sy).floor().min(f64::from(src.height() - 1)) as u32;
        let out_y = (dest.y + i64::from(ly)) as u32;
        for lx in vis_x0..vis_x1 {
            let src_x =
                ((f64::from(lx) + 0.5) * sx).floor().min(f64::from(src.width() - 1)) as u32;
            let out_x = (dest.x + i64::from(lx)) as u32;
            let px = *src.get_pixel(src_x, src_y);
            let dst = surface.get_pixel_mut(out_x, out_y);
            *dst = blend_over(*dst, px, 1.0);
        }
    }
}

/// Paint `color` through a coverage `mask` whose top-left lands at `(x, y)`.
///
/// `opacity` multiplies the color's own alpha and the mask coverage.
pub fn fill_mask(surface: &mut RgbaImage, mask: &GrayImage, x: i64, y: i64, color: Rgba<u8>, opacity: f32) {
    let (sw, sh) = (i64::from(surface.width()), i64::from(surface.height()));
    for (mx, my, coverage) in mask.enumerate_pixels() {
        let c = coverage[0];
        if c == 0 {
            continue;
        }
        let px = x + i64::from(mx);
        let py = y + i64::from(my);
        if px < 0 || py < 0 || px >= sw || py >= sh {
            continue;
        }
        let alpha = opacity * f32::from(c) / 255.0;
        let dst = surface.get_pixel_mut(px as u32, py as u32);
        *dst = blend_over(*dst, color, alpha);
    }
}

/// Straight-alpha source-over: `src` (scaled by `opacity`) over `dst`.
pub fn blend_over(dst: Rgba<u8>, src: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let opacity = opacity.clamp(0.0, 1.0);
    let sa = f32::from(src[3]) / 255.0 * opacity;
    if sa <= 0.0 {
        return dst;
    }
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let sc = f32::from(src[i]);
        let dc = f32::from(dst[i]);
        let c = (sc * sa + dc * da * (1.0 - sa)) / out_a;
        out[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba(out)
}
