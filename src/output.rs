//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Render
//!
//! ```text
//! Poster 1200x1800 jpeg
//!     Name: Ava Chen
//!     Photo: 400x530 (cropped)
//!     Saved: out/Ava_Chen.jpg (412.3 KiB)
//! ```
//!
//! ## Preview
//!
//! ```text
//! Preview 420x630 (scale 0.350)
//!     Saved: preview.png
//! ```
//!
//! ## Check
//!
//! ```text
//! Template assets/template.png
//!     Size: 1200x1800
//!     Frame: [60, 560, 430x570] (canonical)
//!     Crop aspect: 0.7544
//!     Placement: fixed
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::config::PlacementMode;
use crate::export::ExportArtifact;
use crate::imaging::{Dimensions, ExportFormat};
use crate::placement::FrameConfig;
use crate::state::PosterState;
use std::path::Path;

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte size: `812 B`, `4.0 KiB`, `1.2 MiB`.
fn format_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{bytes} B")
    } else if b < KIB * KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{:.1} MiB", b / (KIB * KIB))
    }
}

fn format_format(artifact: &ExportArtifact) -> &'static str {
    match artifact.format {
        ExportFormat::Jpeg => "jpeg",
        ExportFormat::Avif => "avif",
        ExportFormat::Png => "png",
    }
}

// ============================================================================
// Render
// ============================================================================

pub fn format_render_output(
    artifact: &ExportArtifact,
    state: &PosterState,
    saved_to: &Path,
) -> Vec<String> {
    let mut lines = vec![format!(
        "Poster {}x{} {}",
        artifact.width,
        artifact.height,
        format_format(artifact)
    )];

    let name = state.name.trim();
    if !name.is_empty() {
        lines.push(format!("{}Name: {}", indent(1), name));
    }
    match state.photo_for_render() {
        Some(photo) => {
            let origin = if state.cropped.is_some() {
                "cropped"
            } else {
                "uncropped"
            };
            lines.push(format!(
                "{}Photo: {}x{} ({})",
                indent(1),
                photo.natural_width(),
                photo.natural_height(),
                origin
            ));
        }
        None => lines.push(format!("{}Photo: none", indent(1))),
    }
    lines.push(format!(
        "{}Saved: {} ({})",
        indent(1),
        saved_to.display(),
        format_size(artifact.bytes.len())
    ));
    lines
}

pub fn print_render_output(artifact: &ExportArtifact, state: &PosterState, saved_to: &Path) {
    for line in format_render_output(artifact, state, saved_to) {
        println!("{}", line);
    }
}

// ============================================================================
// Preview
// ============================================================================

pub fn format_preview_output(size: Dimensions, scale: f64, saved_to: &Path) -> Vec<String> {
    vec![
        format!("Preview {}x{} (scale {:.3})", size.width, size.height, scale),
        format!("{}Saved: {}", indent(1), saved_to.display()),
    ]
}

pub fn print_preview_output(size: Dimensions, scale: f64, saved_to: &Path) {
    for line in format_preview_output(size, scale, saved_to) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_output(
    template_path: &Path,
    template: Dimensions,
    frame: &FrameConfig,
    mode: PlacementMode,
) -> Vec<String> {
    let mut lines = vec![
        format!("Template {}", template_path.display()),
        format!("{}Size: {}x{}", indent(1), template.width, template.height),
        format!("{}Frame: {}", indent(1), frame.rect()),
        format!("{}Crop aspect: {:.4}", indent(1), frame.crop_aspect()),
        format!(
            "{}Placement: {}",
            indent(1),
            match mode {
                PlacementMode::Fixed => "fixed",
                PlacementMode::Free => "free",
            }
        ),
    ];
    if !frame.fits_within(template) {
        lines.push(format!("{}Warning: frame extends outside the template", indent(1)));
    }
    lines
}

pub fn print_check_output(
    template_path: &Path,
    template: Dimensions,
    frame: &FrameConfig,
    mode: PlacementMode,
) {
    for line in format_check_output(template_path, template, frame, mode) {
        println!("{}", line);
    }
}
