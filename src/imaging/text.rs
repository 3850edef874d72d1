//! Name text rasterization with a drop shadow.
//!
//! Glyphs are laid out on one line with kerning, rasterized into a coverage
//! mask with `ab_glyph`, and painted twice: once as a blurred, tinted shadow
//! and once in the fill color. Sizes are CSS-style em sizes, converted to
//! `ab_glyph`'s height-based scale with the font's units-per-em.
//!
//! Font discovery: an explicit path from config wins; otherwise a short list
//! of common system font locations is probed.

use super::draw::fill_mask;
use super::params::{ShadowParams, TextStyle};
use ab_glyph::{Font, FontArc, Glyph, PxScale, ScaleFont, point};
use image::{GrayImage, Luma, RgbaImage};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum TextError {
    #[error("IO error reading font {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid font file {0}")]
    InvalidFont(PathBuf),
    #[error("no font available to draw text")]
    NoFont,
}

/// Bold sans faces first, since the name is drawn at weight 700.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
];

pub fn load_font(path: &Path) -> Result<FontArc, TextError> {
    let data = std::fs::read(path).map_err(|source| TextError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    FontArc::try_from_vec(data).map_err(|_| TextError::InvalidFont(path.to_path_buf()))
}

/// Load the configured font, or the first usable system font when none is configured.
///
/// Returns `Ok(None)` when nothing is configured and no system font is found;
/// text drawing then fails only if there is text to draw.
pub fn resolve_font(configured: Option<&Path>) -> Result<Option<FontArc>, TextError> {
    if let Some(path) = configured {
        return load_font(path).map(Some);
    }
    for candidate in SYSTEM_FONT_CANDIDATES {
        let path = Path::new(candidate);
        if !path.exists() {
            continue;
        }
        if let Ok(font) = load_font(path) {
            debug!(font = %path.display(), "using system font");
            return Ok(Some(font));
        }
    }
    Ok(None)
}

/// Convert a CSS em size in pixels to `ab_glyph`'s ascent-to-descent scale.
fn em_scale(font: &FontArc, em_px: f32) -> PxScale {
    let upem = font.units_per_em().unwrap_or(1000.0);
    PxScale::from(em_px * font.height_unscaled() / upem)
}

/// A single line of text laid out at the origin.
struct Line {
    glyphs: Vec<Glyph>,
    width: f32,
    height: f32,
}

fn layout_line(font: &FontArc, text: &str, em_px: f32) -> Line {
    let scale = em_scale(font, em_px);
    let scaled = font.as_scaled(scale);
    let ascent = scaled.ascent();

    let mut glyphs = Vec::with_capacity(text.len());
    let mut caret = 0.0f32;
    let mut previous = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        glyphs.push(id.with_scale_and_position(scale, point(caret, ascent)));
        caret += scaled.h_advance(id);
        previous = Some(id);
    }

    Line {
        glyphs,
        width: caret,
        height: scaled.ascent() - scaled.descent(),
    }
}

/// Measured size of `text` at `em_px`: `(width, height)`.
pub fn measure(font: &FontArc, text: &str, em_px: f32) -> (f32, f32) {
    let line = layout_line(font, text, em_px);
    (line.width, line.height)
}

/// Rasterize the line into a coverage mask with `pad` pixels of margin on every side.
fn coverage_mask(font: &FontArc, line: &Line, pad: u32) -> GrayImage {
    let width = line.width.ceil().max(1.0) as u32 + 2 * pad;
    let height = line.height.ceil().max(1.0) as u32 + 2 * pad;
    let mut mask = GrayImage::new(width, height);

    for glyph in &line.glyphs {
        let Some(outlined) = font.outline_glyph(glyph.clone()) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        let left = bounds.min.x as i64 + i64::from(pad);
        let top = bounds.min.y as i64 + i64::from(pad);
        outlined.draw(|gx, gy, c| {
            let px = left + i64::from(gx);
            let py = top + i64::from(gy);
            if px < 0 || py < 0 || px >= i64::from(width) || py >= i64::from(height) {
                return;
            }
            let value = (c * 255.0).round().clamp(0.0, 255.0) as u8;
            let slot = mask.get_pixel_mut(px as u32, py as u32);
            slot[0] = slot[0].max(value);
        });
    }
    mask
}

/// Where a line of text goes: horizontally centered on `center_x`, top edge at `top`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPlacement {
    pub center_x: f64,
    pub top: f64,
    pub font_size: f64,
}

/// Draw `text` with a drop shadow onto `surface`.
///
/// Coordinates and sizes are in surface pixels; callers pre-scale for previews
/// (including `shadow.blur` and the offsets via `scale`).
pub fn draw_text(
    surface: &mut RgbaImage,
    font: &FontArc,
    text: &str,
    placement: TextPlacement,
    style: &TextStyle,
    shadow: &ShadowParams,
    scale: f64,
) {
    let em_px = placement.font_size as f32;
    if text.is_empty() || em_px <= 0.0 {
        return;
    }
    let line = layout_line(font, text, em_px);

    let sigma = shadow.sigma() * scale as f32;
    let pad = (sigma * 3.0).ceil() as u32 + 1;
    let mask = coverage_mask(font, &line, pad);

    let origin_x = (placement.center_x - f64::from(line.width) / 2.0).round() as i64 - i64::from(pad);
    let origin_y = placement.top.round() as i64 - i64::from(pad);

    if shadow.opacity > 0.0 && shadow.color[3] > 0 {
        let blurred = if sigma > 0.0 {
            image::imageops::blur(&mask, sigma)
        } else {
            mask.clone()
        };
        let sx = origin_x + (f64::from(shadow.offset_x) * scale).round() as i64;
        let sy = origin_y + (f64::from(shadow.offset_y) * scale).round() as i64;
        fill_mask(surface, &blurred, sx, sy, shadow.color, shadow.opacity);
    }
    fill_mask(surface, &mask, origin_x, origin_y, style.color, 1.0);
}

/// Total coverage in a mask; used by tests to assert that glyphs were drawn.
#[cfg(test)]
pub(crate) fn ink(mask: &GrayImage) -> u64 {
    mask.pixels().map(|Luma([v])| u64::from(*v)).sum()
}
