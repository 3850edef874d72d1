//! Exact-dimension cropping.
//!
//! [`crop`] copies a pixel rectangle out of a decoded photo into a new
//! [`Image`] whose natural size equals the rectangle. Downstream placement
//! code relies on that equality, so it is the one hard postcondition here.
//!
//! Rectangles that poke outside the source are clamped, not rejected: a rect
//! larger than the photo is first shrunk uniformly about its center, then slid
//! back inside. Both steps keep the aspect, so a frame-locked selection stays
//! frame-shaped. A rect that misses the photo entirely is an error.

use super::calculations::{clamp_span, shrink_to_fit, snap_rect, span_overlaps};
use super::raster::Image;
use crate::geometry::{Rect, SourceSpace};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CropError {
    #[error("crop rectangle {rect} does not overlap the {width}x{height} source")]
    OutOfBounds {
        rect: String,
        width: u32,
        height: u32,
    },
}

/// Crop `rect` out of `source`.
///
/// `rotation_degrees` is accepted for callers that track a rotation control;
/// it is currently a pass-through.
pub fn crop(
    source: &Image,
    rect: &Rect<SourceSpace>,
    rotation_degrees: f64,
) -> Result<Image, CropError> {
    if rotation_degrees != 0.0 {
        debug!(rotation_degrees, "crop rotation ignored");
    }

    let (src_w, src_h) = (source.natural_width(), source.natural_height());
    let (limit_w, limit_h) = (i64::from(src_w), i64::from(src_h));
    let out_of_bounds = || CropError::OutOfBounds {
        rect: rect.to_string(),
        width: src_w,
        height: src_h,
    };

    let (x, y, w, h) = snap_rect(rect.x, rect.y, rect.width, rect.height);
    if !span_overlaps(x, w, limit_w) || !span_overlaps(y, h, limit_h) {
        return Err(out_of_bounds());
    }

    // shrink about the requested center
    let (fw, fh) = shrink_to_fit(w, h, limit_w, limit_h);
    let (cx, cw) = clamp_span(x + (w - fw) / 2, fw, limit_w);
    let (cy, ch) = clamp_span(y + (h - fh) / 2, fh, limit_h);
    if cw == 0 || ch == 0 {
        return Err(out_of_bounds());
    }
    if (cx, cy, cw, ch) != (x, y, w, h) {
        warn!(
            requested = %rect,
            x = cx,
            y = cy,
            width = cw,
            height = ch,
            "crop rectangle clamped to source bounds"
        );
    }

    let cropped =
        image::imageops::crop_imm(source.pixels(), cx as u32, cy as u32, cw as u32, ch as u32)
            .to_image();
    Ok(Image::from_rgba(cropped))
}
