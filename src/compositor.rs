//! The one drawing routine behind both preview and export.
//!
//! Layers, bottom to top:
//!
//! 0. template, covering the whole surface
//! 1. photo, stretched into the placement's destination rect (optional)
//! 2. name line with drop shadow (skipped when the trimmed name is empty)
//!
//! All placement math happens in canonical pixels and is multiplied by one
//! uniform `scale` at draw time, so a preview is the export shrunk, not a
//! separately laid out picture. Every call draws into a freshly allocated
//! surface.

use crate::error::PosterError;
use crate::imaging::draw::{PixelRect, draw_stretched};
use crate::imaging::text::{self, TextPlacement};
use crate::imaging::{Dimensions, Image, RenderStyle, TextError, preview_dimensions};
use crate::placement::{Placement, TextEdge};
use ab_glyph::FontArc;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use tracing::debug;

/// Resampling used for the full-resolution export.
pub const EXPORT_FILTER: FilterType = FilterType::Lanczos3;

pub fn preview_filter(fast: bool) -> FilterType {
    if fast {
        FilterType::Triangle
    } else {
        EXPORT_FILTER
    }
}

/// Inputs for one composition.
#[derive(Debug, Clone, Copy)]
pub struct Layers<'a> {
    pub template: &'a Image,
    pub photo: Option<&'a Image>,
    pub placement: &'a Placement,
    pub name: &'a str,
}

/// Draws [`Layers`] with a fixed style and font.
#[derive(Clone, Copy)]
pub struct Compositor<'a> {
    pub style: &'a RenderStyle,
    pub font: Option<&'a FontArc>,
}

impl<'a> Compositor<'a> {
    pub fn new(style: &'a RenderStyle, font: Option<&'a FontArc>) -> Self {
        Self { style, font }
    }

    /// Render `layers` at `scale` (1.0 = template resolution).
    pub fn render(
        &self,
        layers: &Layers<'_>,
        scale: f64,
        filter: FilterType,
    ) -> Result<RgbaImage, PosterError> {
        let canvas = layers.template.dimensions();
        let size = preview_dimensions(canvas, scale);
        let mut surface = template_layer(layers.template, size, filter);

        if let Some(photo) = layers.photo {
            let dest = layers.placement.destination(photo.dimensions(), canvas);
            let px = PixelRect {
                x: (dest.x * scale).round() as i64,
                y: (dest.y * scale).round() as i64,
                width: (dest.width * scale).round() as u32,
                height: (dest.height * scale).round() as u32,
            };
            debug!(?px, photo = ?photo, "drawing photo layer");
            draw_stretched(&mut surface, photo.pixels(), px, filter);
        }

        let name = layers.name.trim();
        if !name.is_empty() {
            let font = self.font.ok_or(TextError::NoFont)?;
            let placement = self.text_placement(font, name, layers.placement, canvas, scale);
            debug!(text = name, font_size = placement.font_size, top = placement.top, "drawing name layer");
            text::draw_text(
                &mut surface,
                font,
                name,
                placement,
                &self.style.text,
                &self.style.shadow,
                scale,
            );
        }

        Ok(surface)
    }

    fn text_placement(
        &self,
        font: &FontArc,
        name: &str,
        placement: &Placement,
        canvas: Dimensions,
        scale: f64,
    ) -> TextPlacement {
        let anchor = placement.text_anchor(canvas, &self.style.text);
        let font_size = anchor.font_size * scale;
        let top = match anchor.edge {
            TextEdge::Top(y) => y * scale,
            TextEdge::Bottom(y) => {
                let (_, height) = text::measure(font, name, font_size as f32);
                y * scale - f64::from(height)
            }
        };
        TextPlacement {
            center_x: anchor.center_x * scale,
            top,
            font_size,
        }
    }
}

fn template_layer(template: &Image, size: Dimensions, filter: FilterType) -> RgbaImage {
    if template.dimensions() == size {
        return template.pixels().clone();
    }
    imageops::resize(template.pixels(), size.width, size.height, filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Offset;
    use crate::placement::{FrameConfig, Position};
    use crate::test_helpers::*;
    use image::Rgba;

    fn stock_fixed() -> Placement {
        Placement::Fixed(FrameConfig::new(60.0, 560.0, 430.0, 570.0).unwrap())
    }

    fn render(layers: &Layers<'_>, font: Option<&FontArc>, scale: f64) -> Result<RgbaImage, PosterError> {
        let style = RenderStyle::default();
        Compositor::new(&style, font).render(layers, scale, EXPORT_FILTER)
    }

    // =========================================================================
    // Template layer
    // =========================================================================

    #[test]
    fn template_only_is_exact_copy() {
        let template = template_image();
        let placement = stock_fixed();
        let out = render(
            &Layers {
                template: &template,
                photo: None,
                placement: &placement,
                name: "",
            },
            None,
            1.0,
        )
        .unwrap();
        assert_eq!(&out, template.pixels());
    }

    #[test]
    fn scaled_render_has_scaled_dimensions() {
        let template = template_image();
        let placement = stock_fixed();
        let out = render(
            &Layers {
                template: &template,
                photo: None,
                placement: &placement,
                name: "",
            },
            None,
            0.35,
        )
        .unwrap();
        assert_eq!(out.dimensions(), (420, 630));
    }

    #[test]
    fn whitespace_name_needs_no_font() {
        let template = template_image();
        let placement = stock_fixed();
        let out = render(
            &Layers {
                template: &template,
                photo: None,
                placement: &placement,
                name: "   ",
            },
            None,
            1.0,
        )
        .unwrap();
        assert_eq!(&out, template.pixels());
    }

    #[test]
    fn name_without_font_is_composition_error() {
        let template = template_image();
        let placement = stock_fixed();
        let err = render(
            &Layers {
                template: &template,
                photo: None,
                placement: &placement,
                name: "Ava",
            },
            None,
            1.0,
        )
        .unwrap_err();
        assert!(matches!(err, PosterError::Composition(_)));
    }

    // =========================================================================
    // Photo layer
    // =========================================================================

    #[test]
    fn fixed_photo_fills_frame_exactly() {
        let template = solid_image(1200, 1800, BLUE);
        let photo = solid_image(400, 530, RED);
        let placement = stock_fixed();
        let out = render(
            &Layers {
                template: &template,
                photo: Some(&photo),
                placement: &placement,
                name: "",
            },
            None,
            1.0,
        )
        .unwrap();

        assert_region_color(&out, 60, 560, 430, 570, RED);
        assert_eq!(
            changed_bounds(template.pixels(), &out),
            Some((60, 560, 489, 1129))
        );
    }

    #[test]
    fn free_photo_centered_with_offset() {
        let template = solid_image(1200, 1800, BLUE);
        let photo = solid_image(100, 100, RED);
        let mut pos = Position::new(2.0).unwrap();
        pos.apply_offset(Offset::new(-300.0, 100.0));
        let placement = Placement::Free(pos);
        let out = render(
            &Layers {
                template: &template,
                photo: Some(&photo),
                placement: &placement,
                name: "",
            },
            None,
            1.0,
        )
        .unwrap();

        // 200x200 centered at (600 - 300, 900 + 100)
        assert_eq!(
            changed_bounds(template.pixels(), &out),
            Some((200, 900, 399, 1099))
        );
    }

    #[test]
    fn free_photo_may_hang_off_canvas() {
        let template = solid_image(1200, 1800, BLUE);
        let photo = solid_image(100, 100, RED);
        let mut pos = Position::new(1.0).unwrap();
        pos.apply_offset(Offset::new(-640.0, 0.0));
        let placement = Placement::Free(pos);
        let out = render(
            &Layers {
                template: &template,
                photo: Some(&photo),
                placement: &placement,
                name: "",
            },
            None,
            1.0,
        )
        .unwrap();
        assert_eq!(*out.get_pixel(0, 900), RED);
        assert_eq!(*out.get_pixel(10, 900), BLUE);
    }

    #[test]
    fn preview_is_export_scaled() {
        let template = solid_image(1200, 1800, BLUE);
        let photo = solid_image(400, 530, RED);
        let placement = stock_fixed();
        let out = render(
            &Layers {
                template: &template,
                photo: Some(&photo),
                placement: &placement,
                name: "",
            },
            None,
            0.5,
        )
        .unwrap();
        assert_eq!(out.dimensions(), (600, 900));
        assert_region_color(&out, 31, 281, 213, 283, RED);
        assert_eq!(*out.get_pixel(29, 300), BLUE);
    }

    #[test]
    fn renders_are_pixel_identical() {
        let template = template_image();
        let photo = gradient_image(400, 530);
        let placement = stock_fixed();
        let layers = Layers {
            template: &template,
            photo: Some(&photo),
            placement: &placement,
            name: "",
        };
        let a = render(&layers, None, 0.35).unwrap();
        let b = render(&layers, None, 0.35).unwrap();
        assert_eq!(a, b);
    }

    // =========================================================================
    // Name layer
    // =========================================================================

    #[test]
    fn fixed_name_drawn_below_frame() {
        let Some(font) = system_font() else {
            return;
        };
        let template = solid_image(1200, 1800, BLUE);
        let photo = solid_image(400, 530, RED);
        let placement = stock_fixed();
        let with_photo = render(
            &Layers {
                template: &template,
                photo: Some(&photo),
                placement: &placement,
                name: "",
            },
            Some(&font),
            1.0,
        )
        .unwrap();
        let with_name = render(
            &Layers {
                template: &template,
                photo: Some(&photo),
                placement: &placement,
                name: "Ava Chen",
            },
            Some(&font),
            1.0,
        )
        .unwrap();

        // the shadow may reach into the frame, but the white fill must not
        let white = Rgba([255, 255, 255, 255]);
        let lit: Vec<(u32, u32)> = with_name
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == white)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!lit.is_empty());
        assert!(lit.iter().all(|(_, y)| *y >= 1130));
        let min_x = lit.iter().map(|(x, _)| *x).min().unwrap() as f64;
        let max_x = lit.iter().map(|(x, _)| *x).max().unwrap() as f64;
        assert!(((min_x + max_x) / 2.0 - 275.0).abs() < 8.0);
        assert_ne!(with_photo, with_name);
    }

    #[test]
    fn free_name_drawn_near_bottom() {
        let Some(font) = system_font() else {
            return;
        };
        let template = solid_image(1200, 1800, BLUE);
        let placement = Placement::Free(Position::new(1.0).unwrap());
        let out = render(
            &Layers {
                template: &template,
                photo: None,
                placement: &placement,
                name: "Ava",
            },
            Some(&font),
            1.0,
        )
        .unwrap();
        let (_, y0, _, y1) = changed_bounds(template.pixels(), &out).unwrap();
        assert!(y0 > 1600, "text starts at {y0}");
        assert!(y1 < 1800);
    }
}
