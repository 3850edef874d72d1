//! Poster configuration module.
//!
//! Handles loading, validating, and merging `poster.toml`. Stock defaults are
//! overridden by whatever the user's file specifies; everything is optional.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [template]
//! path = "assets/template.png"  # Background template; defines canonical space
//!
//! [frame]                       # Fixed photo frame, in template pixels
//! x = 60
//! y = 560
//! width = 430
//! height = 570
//!
//! [placement]
//! mode = "fixed"                # "fixed" (frame) or "free" (drag to place)
//! initial_scale = 1.0           # Free mode: starting photo scale
//!
//! [crop]
//! aspect_tolerance = 0.01       # Allowed |selection - frame| aspect difference
//! max_zoom = 3.0                # Upper bound on the crop widget's zoom
//!
//! [text]
//! # font = "assets/Inter-Bold.ttf"  # Omit to probe system fonts
//! color = "#ffffff"
//! min_size = 18.0               # Fixed mode: font = max(min_size, frame.width * size_ratio)
//! size_ratio = 0.07
//! gap_ratio = 0.4               # Gap under the frame, as a fraction of font size
//! free_min_size = 12.0          # Free mode: font = max(free_min_size, canvas.width * free_size_ratio)
//! free_size_ratio = 0.045
//! free_bottom_ratio = 0.6       # Free mode: bottom margin, as a fraction of font size
//!
//! [text.shadow]
//! color = "#000000"
//! opacity = 0.6
//! blur = 8.0
//! offset_x = 0.0
//! offset_y = 0.0
//!
//! [preview]
//! default_container_width = 420 # Used when the host has not measured a width
//! fast_resize = true            # Triangle instead of Lanczos3 for previews
//!
//! [export]
//! format = "jpeg"               # "jpeg" or "avif"
//! quality = 92                  # 1-100
//! default_filename = "poster"   # Used when the name is empty
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{ExportFormat, Quality, RenderStyle, ShadowParams, TextStyle};
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up inside the config directory.
pub const CONFIG_FILE: &str = "poster.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Poster configuration loaded from `poster.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PosterConfig {
    /// Background template location.
    pub template: TemplateConfig,
    /// Fixed photo frame in template pixels.
    pub frame: FrameSection,
    /// Placement mode for the session.
    pub placement: PlacementSection,
    /// Crop selection rules.
    pub crop: CropSection,
    /// Name text styling.
    pub text: TextSection,
    /// Live preview settings.
    pub preview: PreviewSection,
    /// Final export settings.
    pub export: ExportSection,
}

impl PosterConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.frame;
        if !(f.width > 0.0 && f.height > 0.0 && f.width.is_finite() && f.height.is_finite()) {
            return Err(ConfigError::Validation(
                "frame.width and frame.height must be positive".into(),
            ));
        }
        if !(f.x.is_finite() && f.y.is_finite()) {
            return Err(ConfigError::Validation(
                "frame.x and frame.y must be finite".into(),
            ));
        }
        if !(self.placement.initial_scale > 0.0 && self.placement.initial_scale.is_finite()) {
            return Err(ConfigError::Validation(
                "placement.initial_scale must be positive".into(),
            ));
        }
        if !(self.crop.aspect_tolerance >= 0.0) {
            return Err(ConfigError::Validation(
                "crop.aspect_tolerance must be >= 0".into(),
            ));
        }
        if !(self.crop.max_zoom >= 1.0) {
            return Err(ConfigError::Validation(
                "crop.max_zoom must be >= 1".into(),
            ));
        }
        if self.export.quality == 0 || self.export.quality > 100 {
            return Err(ConfigError::Validation(
                "export.quality must be 1-100".into(),
            ));
        }
        if !self.export.format.is_lossy() {
            return Err(ConfigError::Validation(
                "export.format must be \"jpeg\" or \"avif\"".into(),
            ));
        }
        if self.export.default_filename.trim().is_empty() {
            return Err(ConfigError::Validation(
                "export.default_filename must not be empty".into(),
            ));
        }
        for ratio in [
            ("text.min_size", self.text.min_size),
            ("text.size_ratio", self.text.size_ratio),
            ("text.gap_ratio", self.text.gap_ratio),
            ("text.free_min_size", self.text.free_min_size),
            ("text.free_size_ratio", self.text.free_size_ratio),
            ("text.free_bottom_ratio", self.text.free_bottom_ratio),
            ("text.shadow.blur", self.text.shadow.blur),
        ] {
            if !(ratio.1 >= 0.0 && ratio.1.is_finite()) {
                return Err(ConfigError::Validation(format!("{} must be >= 0", ratio.0)));
            }
        }
        if !(0.0..=1.0).contains(&self.text.shadow.opacity) {
            return Err(ConfigError::Validation(
                "text.shadow.opacity must be 0-1".into(),
            ));
        }
        parse_hex_color(&self.text.color)
            .map_err(|e| ConfigError::Validation(format!("text.color: {e}")))?;
        parse_hex_color(&self.text.shadow.color)
            .map_err(|e| ConfigError::Validation(format!("text.shadow.color: {e}")))?;
        Ok(())
    }

    /// Collect every pixel-affecting constant into one [`RenderStyle`].
    ///
    /// Call after [`validate`](Self::validate); invalid colors fall back to
    /// the stock white text / black shadow.
    pub fn render_style(&self) -> RenderStyle {
        let defaults = RenderStyle::default();
        RenderStyle {
            text: TextStyle {
                color: parse_hex_color(&self.text.color).unwrap_or(defaults.text.color),
                min_size: self.text.min_size,
                size_ratio: self.text.size_ratio,
                gap_ratio: self.text.gap_ratio,
                free_min_size: self.text.free_min_size,
                free_size_ratio: self.text.free_size_ratio,
                free_bottom_ratio: self.text.free_bottom_ratio,
            },
            shadow: ShadowParams {
                color: parse_hex_color(&self.text.shadow.color).unwrap_or(defaults.shadow.color),
                opacity: self.text.shadow.opacity as f32,
                blur: self.text.shadow.blur as f32,
                offset_x: self.text.shadow.offset_x as f32,
                offset_y: self.text.shadow.offset_y as f32,
            },
        }
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.export.quality)
    }
}

/// Template asset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateConfig {
    /// Path to the template image, relative to the working directory.
    pub path: PathBuf,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("assets/template.png"),
        }
    }
}

/// Fixed photo frame, in template pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameSection {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for FrameSection {
    fn default() -> Self {
        Self {
            x: 60.0,
            y: 560.0,
            width: 430.0,
            height: 570.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementMode {
    /// Photo fills the configured frame.
    #[default]
    Fixed,
    /// Photo is centered, then dragged and scaled freely.
    Free,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlacementSection {
    pub mode: PlacementMode,
    /// Free mode: starting photo scale (1.0 = native photo pixels).
    pub initial_scale: f64,
}

impl Default for PlacementSection {
    fn default() -> Self {
        Self {
            mode: PlacementMode::Fixed,
            initial_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropSection {
    /// Maximum allowed difference between selection and frame aspect.
    pub aspect_tolerance: f64,
    /// Largest zoom the selection widget may report.
    pub max_zoom: f64,
}

impl Default for CropSection {
    fn default() -> Self {
        Self {
            aspect_tolerance: 0.01,
            max_zoom: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextSection {
    /// Font file; when absent, common system fonts are probed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<PathBuf>,
    /// Fill color as `#rrggbb`.
    pub color: String,
    pub min_size: f64,
    pub size_ratio: f64,
    pub gap_ratio: f64,
    pub free_min_size: f64,
    pub free_size_ratio: f64,
    pub free_bottom_ratio: f64,
    pub shadow: ShadowSection,
}

impl Default for TextSection {
    fn default() -> Self {
        let t = TextStyle::default();
        Self {
            font: None,
            color: "#ffffff".to_string(),
            min_size: t.min_size,
            size_ratio: t.size_ratio,
            gap_ratio: t.gap_ratio,
            free_min_size: t.free_min_size,
            free_size_ratio: t.free_size_ratio,
            free_bottom_ratio: t.free_bottom_ratio,
            shadow: ShadowSection::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShadowSection {
    pub color: String,
    pub opacity: f64,
    pub blur: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for ShadowSection {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            opacity: 0.6,
            blur: 8.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewSection {
    pub default_container_width: u32,
    pub fast_resize: bool,
}

impl Default for PreviewSection {
    fn default() -> Self {
        Self {
            default_container_width: 420,
            fast_resize: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSection {
    pub format: ExportFormat,
    /// Lossy encoding quality (1 = worst, 100 = best).
    pub quality: u32,
    /// Filename stem when the name field is empty.
    pub default_filename: String,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            format: ExportFormat::Jpeg,
            quality: Quality::default().value(),
            default_filename: "poster".to_string(),
        }
    }
}

/// Parse a `#rrggbb` color into opaque RGBA.
pub fn parse_hex_color(s: &str) -> Result<Rgba<u8>, String> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("invalid color {s:?}, expected #rrggbb"));
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, 255]))
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(PosterConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `poster.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `poster.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<PosterConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PosterConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `poster.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<PosterConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `poster.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Poster Forge Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Template
# ---------------------------------------------------------------------------
[template]
# Background image. Its pixel size defines the coordinate system for [frame].
path = "assets/template.png"

# ---------------------------------------------------------------------------
# Photo frame (template pixels)
# ---------------------------------------------------------------------------
# The crop selection is locked to width / height of this frame, and the
# cropped photo is stretched to fill it exactly.
[frame]
x = 60.0
y = 560.0
width = 430.0
height = 570.0

# ---------------------------------------------------------------------------
# Placement
# ---------------------------------------------------------------------------
[placement]
# "fixed": photo fills [frame].  "free": photo is centered, then dragged.
mode = "fixed"
# Free mode only: starting scale of the photo (1.0 = photo's own pixels).
initial_scale = 1.0

# ---------------------------------------------------------------------------
# Crop selection
# ---------------------------------------------------------------------------
[crop]
# Largest allowed difference between the selection's and the frame's aspect.
aspect_tolerance = 0.01
# Upper bound on the selection widget's zoom factor.
max_zoom = 3.0

# ---------------------------------------------------------------------------
# Name text
# ---------------------------------------------------------------------------
[text]
# Font file. Omit to use a bold system sans-serif.
# font = "assets/Inter-Bold.ttf"
color = "#ffffff"
# Fixed mode: font size = max(min_size, frame.width * size_ratio),
# drawn centered under the frame with a gap of font size * gap_ratio.
min_size = 18.0
size_ratio = 0.07
gap_ratio = 0.4
# Free mode: font size = max(free_min_size, canvas width * free_size_ratio),
# drawn centered at the bottom, font size * free_bottom_ratio above the edge.
free_min_size = 12.0
free_size_ratio = 0.045
free_bottom_ratio = 0.6

# Drop shadow behind the name, for legibility on any background.
[text.shadow]
color = "#000000"
opacity = 0.6
blur = 8.0
offset_x = 0.0
offset_y = 0.0

# ---------------------------------------------------------------------------
# Live preview
# ---------------------------------------------------------------------------
[preview]
# Width used when the host has not measured its container yet.
default_container_width = 420
# Faster, slightly softer resampling for previews. Export always uses Lanczos3.
fast_resize = true

# ---------------------------------------------------------------------------
# Export
# ---------------------------------------------------------------------------
[export]
# "jpeg" or "avif".
format = "jpeg"
# Lossy encoding quality (1 = worst, 100 = best).
quality = 92
# Download filename when the name is empty (extension added automatically).
default_filename = "poster"
"##
}
