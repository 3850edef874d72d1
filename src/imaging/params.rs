//! Parameter types for drawing and encoding.
//!
//! These structs describe *what* to draw or encode, not *how*. Every numeric
//! constant the compositor needs (font ratios, shadow blur, encode quality)
//! lives here, built once from [`PosterConfig`](crate::config::PosterConfig)
//! and injected into the preview and export paths.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality (1–100, default 92). Clamped on construction.
//! - [`ExportFormat`] — Output container (JPEG by default, AVIF, or PNG for previews).
//! - [`EncodeParams`] — Format + quality handed to the backend.
//! - [`ShadowParams`] — Drop shadow behind the name text.
//! - [`TextStyle`] — Font sizing and placement ratios for the name layer.
//! - [`RenderStyle`] — Everything above that affects pixels, in one value.

use image::Rgba;
use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(92)
    }
}

/// Encoded output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Jpeg,
    Avif,
    /// Lossless; used for preview dumps, not offered for final export.
    Png,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Avif => "avif",
            ExportFormat::Png => "png",
        }
    }

    pub fn is_lossy(self) -> bool {
        !matches!(self, ExportFormat::Png)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParams {
    pub format: ExportFormat,
    pub quality: Quality,
}

/// Drop shadow drawn under the name text.
///
/// - `blur`: canvas-style blur size in pixels; the gaussian sigma is half of it
/// - `opacity`: multiplier on `color`'s alpha (0–1)
/// - `offset_x`, `offset_y`: shadow displacement in canonical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowParams {
    pub color: Rgba<u8>,
    pub opacity: f32,
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl ShadowParams {
    pub fn sigma(&self) -> f32 {
        self.blur / 2.0
    }
}

impl Default for ShadowParams {
    fn default() -> Self {
        Self {
            color: Rgba([0, 0, 0, 255]),
            opacity: 0.6,
            blur: 8.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

/// Sizing rules for the name layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Rgba<u8>,
    /// Fixed mode: lower bound on font size.
    pub min_size: f64,
    /// Fixed mode: font size as a fraction of the frame width.
    pub size_ratio: f64,
    /// Fixed mode: gap between frame bottom and text top, as a fraction of font size.
    pub gap_ratio: f64,
    /// Free mode: lower bound on font size.
    pub free_min_size: f64,
    /// Free mode: font size as a fraction of the canvas width.
    pub free_size_ratio: f64,
    /// Free mode: distance from canvas bottom to text bottom, as a fraction of font size.
    pub free_bottom_ratio: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: Rgba([255, 255, 255, 255]),
            min_size: 18.0,
            size_ratio: 0.07,
            gap_ratio: 0.4,
            free_min_size: 12.0,
            free_size_ratio: 0.045,
            free_bottom_ratio: 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderStyle {
    pub text: TextStyle,
    pub shadow: ShadowParams,
}
