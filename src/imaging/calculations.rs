//! Pure calculation functions for preview sizing, crop snapping and text layout.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::Dimensions;

/// Preview scale for a template shown in a container of `container_width` pixels.
///
/// Never upscales. A container width of 0 means "not yet measured" and
/// renders at native size.
///
/// # Examples
/// ```
/// # use poster_forge::imaging::preview_scale;
/// assert_eq!(preview_scale(600, 1200), 0.5);
/// assert_eq!(preview_scale(2400, 1200), 1.0);
/// assert_eq!(preview_scale(0, 1200), 1.0);
/// ```
pub fn preview_scale(container_width: u32, template_width: u32) -> f64 {
    if container_width == 0 || template_width == 0 {
        return 1.0;
    }
    (f64::from(container_width) / f64::from(template_width)).min(1.0)
}

/// Preview surface dimensions: `round(W * scale) x round(H * scale)`, at least 1x1.
pub fn preview_dimensions(template: Dimensions, scale: f64) -> Dimensions {
    Dimensions {
        width: scale_extent(template.width, scale),
        height: scale_extent(template.height, scale),
    }
}

fn scale_extent(extent: u32, scale: f64) -> u32 {
    ((f64::from(extent) * scale).round() as u32).max(1)
}

/// Snap a float rectangle to whole pixels.
///
/// Returns `(x, y, width, height)` with rounded origin and size.
pub fn snap_rect(x: f64, y: f64, width: f64, height: f64) -> (i64, i64, i64, i64) {
    (
        x.round() as i64,
        y.round() as i64,
        width.round() as i64,
        height.round() as i64,
    )
}

/// Move a span back inside `[0, limit)` when it fits, then intersect.
///
/// Returns `(start, len)`; `len` is 0 when nothing of the span overlaps.
///
/// - `(-10, 50)` in a limit of 100 → `(0, 50)` (shifted, size preserved)
/// - `(80, 50)` in a limit of 100 → `(50, 50)`
/// - `(-10, 150)` in a limit of 100 → `(0, 100)` (too big, clipped)
pub fn clamp_span(start: i64, len: i64, limit: i64) -> (i64, i64) {
    if len <= 0 || limit <= 0 {
        return (0, 0);
    }
    if len <= limit {
        let shifted = start.clamp(0, limit - len);
        return (shifted, len);
    }
    (0, limit)
}

/// Whether a span of `len` starting at `start` overlaps `[0, limit)` at all.
pub fn span_overlaps(start: i64, len: i64, limit: i64) -> bool {
    len > 0 && limit > 0 && start < limit && start + len > 0
}

/// Scale `width x height` down uniformly until it fits in `max_w x max_h`.
///
/// Sizes that already fit come back unchanged. Otherwise both sides shrink by
/// the same factor, so the aspect survives up to one pixel of rounding.
///
/// - `(430, 570)` in `300x300` → `(226, 300)`
/// - `(200, 50)` in `100x80` → `(100, 25)`
pub fn shrink_to_fit(width: i64, height: i64, max_w: i64, max_h: i64) -> (i64, i64) {
    if width <= max_w && height <= max_h {
        return (width, height);
    }
    let factor = (max_w as f64 / width as f64).min(max_h as f64 / height as f64);
    (
        ((width as f64 * factor).round() as i64).clamp(1, max_w),
        ((height as f64 * factor).round() as i64).clamp(1, max_h),
    )
}

/// Font size for the name under a fixed frame: `round(max(min, width * ratio))`.
///
/// # Examples
/// ```
/// # use poster_forge::imaging::frame_font_size;
/// // 430px frame → max(18, 30.1) → 30
/// assert_eq!(frame_font_size(430.0, 18.0, 0.07), 30.0);
/// // narrow frame falls back to the minimum
/// assert_eq!(frame_font_size(100.0, 18.0, 0.07), 18.0);
/// ```
pub fn frame_font_size(width: f64, min_size: f64, ratio: f64) -> f64 {
    min_size.max(width * ratio).round()
}

/// Top edge of the name text under the frame: `bottom + round(font * gap_ratio)`.
pub fn text_top_below(bottom: f64, font_size: f64, gap_ratio: f64) -> f64 {
    bottom + (font_size * gap_ratio).round()
}

/// Whether a selection aspect matches the frame aspect within `tolerance`.
pub fn aspect_matches(selection: f64, frame: f64, tolerance: f64) -> bool {
    (selection - frame).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // preview_scale / preview_dimensions tests
    // =========================================================================

    #[test]
    fn preview_scale_shrinks_to_container() {
        assert_eq!(preview_scale(420, 1200), 0.35);
    }

    #[test]
    fn preview_scale_never_upscales() {
        assert_eq!(preview_scale(1600, 1200), 1.0);
        assert_eq!(preview_scale(1200, 1200), 1.0);
    }

    #[test]
    fn preview_scale_unmeasured_container_is_native() {
        assert_eq!(preview_scale(0, 1200), 1.0);
    }

    #[test]
    fn preview_dimensions_round() {
        let dims = preview_dimensions(
            Dimensions {
                width: 1200,
                height: 1800,
            },
            0.35,
        );
        assert_eq!(dims, Dimensions { width: 420, height: 630 });
    }

    #[test]
    fn preview_dimensions_rounds_half_up() {
        // 1001 * 0.5 = 500.5 → 501
        let dims = preview_dimensions(
            Dimensions {
                width: 1001,
                height: 3,
            },
            0.5,
        );
        assert_eq!(dims.width, 501);
        assert_eq!(dims.height, 2);
    }

    #[test]
    fn preview_dimensions_never_zero() {
        let dims = preview_dimensions(Dimensions { width: 10, height: 1 }, 0.01);
        assert_eq!(dims, Dimensions { width: 1, height: 1 });
    }

    // =========================================================================
    // clamp_span / snap_rect tests
    // =========================================================================

    #[test]
    fn clamp_span_inside_is_unchanged() {
        assert_eq!(clamp_span(100, 400, 800), (100, 400));
    }

    #[test]
    fn clamp_span_shifts_negative_start() {
        assert_eq!(clamp_span(-10, 50, 100), (0, 50));
    }

    #[test]
    fn clamp_span_shifts_overhang() {
        assert_eq!(clamp_span(80, 50, 100), (50, 50));
    }

    #[test]
    fn clamp_span_clips_oversized() {
        assert_eq!(clamp_span(-10, 150, 100), (0, 100));
    }

    #[test]
    fn clamp_span_empty_inputs() {
        assert_eq!(clamp_span(0, 0, 100), (0, 0));
        assert_eq!(clamp_span(0, 10, 0), (0, 0));
    }

    #[test]
    fn span_overlaps_cases() {
        assert!(span_overlaps(100, 400, 800));
        assert!(span_overlaps(-10, 11, 100));
        assert!(span_overlaps(99, 50, 100));
        assert!(!span_overlaps(-10, 10, 100));
        assert!(!span_overlaps(100, 50, 100));
        assert!(!span_overlaps(5000, 400, 800));
        assert!(!span_overlaps(0, 0, 100));
    }

    #[test]
    fn shrink_to_fit_keeps_fitting_sizes() {
        assert_eq!(shrink_to_fit(400, 530, 800, 600), (400, 530));
        assert_eq!(shrink_to_fit(800, 600, 800, 600), (800, 600));
    }

    #[test]
    fn shrink_to_fit_preserves_aspect() {
        assert_eq!(shrink_to_fit(430, 570, 300, 300), (226, 300));
        assert_eq!(shrink_to_fit(200, 50, 100, 80), (100, 25));
        let (w, h) = shrink_to_fit(1720, 2280, 800, 600);
        assert_eq!(h, 600);
        assert!((w as f64 / h as f64 - 430.0 / 570.0).abs() < 0.01);
    }

    #[test]
    fn snap_rect_rounds_each_component() {
        assert_eq!(snap_rect(99.6, 50.4, 399.5, 530.2), (100, 50, 400, 530));
    }

    // =========================================================================
    // text layout tests
    // =========================================================================

    #[test]
    fn frame_font_size_scenario() {
        assert_eq!(frame_font_size(430.0, 18.0, 0.07), 30.0);
    }

    #[test]
    fn frame_font_size_minimum() {
        assert_eq!(frame_font_size(200.0, 18.0, 0.07), 18.0);
    }

    #[test]
    fn text_top_below_adds_rounded_gap() {
        // 30 * 0.4 = 12
        assert_eq!(text_top_below(1130.0, 30.0, 0.4), 1142.0);
        // 18 * 0.4 = 7.2 → 7
        assert_eq!(text_top_below(100.0, 18.0, 0.4), 107.0);
    }

    #[test]
    fn aspect_matches_within_tolerance() {
        let frame = 430.0 / 570.0;
        let selection = 400.0 / 530.0;
        assert!(aspect_matches(selection, frame, 0.01));
        assert!(!aspect_matches(4.0 / 3.0, frame, 0.01));
    }
}
