//! Where the photo and the name go on the template.
//!
//! Two placement modes share one compositor:
//!
//! - **Fixed**: a pre-cropped photo is stretched into a configured frame, and
//!   the name sits centered just below the frame.
//! - **Free**: the photo is centered on the canvas at a user scale and moved
//!   by an accumulated offset; the name sits centered near the bottom edge.
//!
//! Everything here is in canonical (template) pixels. The compositor scales
//! the results uniformly for previews.

use crate::config::FrameSection;
use crate::error::PosterError;
use crate::geometry::{CanonicalSpace, GeometryError, Offset, Rect, SourceSpace};
use crate::imaging::{Dimensions, TextStyle, aspect_matches, frame_font_size, text_top_below};

/// The fixed photo frame, in template pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameConfig {
    rect: Rect<CanonicalSpace>,
}

impl FrameConfig {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self, GeometryError> {
        Ok(Self {
            rect: Rect::new(x, y, width, height)?,
        })
    }

    pub fn from_section(section: &FrameSection) -> Result<Self, GeometryError> {
        Self::new(section.x, section.y, section.width, section.height)
    }

    pub fn rect(&self) -> Rect<CanonicalSpace> {
        self.rect
    }

    /// Aspect ratio the crop widget must lock to.
    pub fn crop_aspect(&self) -> f64 {
        self.rect.aspect()
    }

    /// Reject a selection whose aspect would visibly stretch in this frame.
    pub fn check_selection(
        &self,
        selection: &CropSelection,
        tolerance: f64,
    ) -> Result<(), PosterError> {
        self.check_aspect(selection.rect.aspect(), tolerance)
    }

    /// Reject any `actual` aspect that differs from the frame's by more than `tolerance`.
    pub fn check_aspect(&self, actual: f64, tolerance: f64) -> Result<(), PosterError> {
        if aspect_matches(actual, self.crop_aspect(), tolerance) {
            Ok(())
        } else {
            Err(PosterError::AspectMismatch {
                expected: self.crop_aspect(),
                actual,
            })
        }
    }

    pub fn fits_within(&self, template: Dimensions) -> bool {
        self.rect
            .within(f64::from(template.width), f64::from(template.height))
    }
}

/// A crop chosen in the selection widget: a rect in photo pixels plus the
/// widget's zoom (informational; the rect alone determines the crop).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropSelection {
    pub rect: Rect<SourceSpace>,
    pub zoom: f64,
}

impl CropSelection {
    pub fn new(rect: Rect<SourceSpace>, zoom: f64, max_zoom: f64) -> Result<Self, GeometryError> {
        if !(zoom.is_finite() && zoom >= 1.0 && zoom <= max_zoom) {
            return Err(GeometryError::InvalidZoom(zoom));
        }
        Ok(Self { rect, zoom })
    }
}

/// Free-mode photo position: offset from canvas center and uniform scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub offset: Offset,
    pub scale: f64,
}

impl Position {
    pub fn new(scale: f64) -> Result<Self, GeometryError> {
        validate_scale(scale)?;
        Ok(Self {
            offset: Offset::default(),
            scale,
        })
    }

    pub fn apply_offset(&mut self, delta: Offset) {
        self.offset = self.offset + delta;
    }

    pub fn with_scale(self, scale: f64) -> Result<Self, GeometryError> {
        validate_scale(scale)?;
        Ok(Self { scale, ..self })
    }
}

fn validate_scale(scale: f64) -> Result<(), GeometryError> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::InvalidScale(scale))
    }
}

/// Which edge of the text line the anchor's `y` refers to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextEdge {
    Top(f64),
    Bottom(f64),
}

/// Canonical-space anchor for the name line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextAnchor {
    pub center_x: f64,
    pub edge: TextEdge,
    pub font_size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Fixed(FrameConfig),
    Free(Position),
}

impl Placement {
    /// Destination rect of a `photo`-sized image on a `canvas`-sized template.
    ///
    /// Fixed mode ignores the photo size: the photo is stretched to the frame.
    pub fn destination(&self, photo: Dimensions, canvas: Dimensions) -> Rect<CanonicalSpace> {
        match self {
            Placement::Fixed(frame) => frame.rect(),
            Placement::Free(pos) => {
                let dest_w = f64::from(photo.width) * pos.scale;
                let dest_h = f64::from(photo.height) * pos.scale;
                let dest_x = f64::from(canvas.width) / 2.0 + pos.offset.dx - dest_w / 2.0;
                let dest_y = f64::from(canvas.height) / 2.0 + pos.offset.dy - dest_h / 2.0;
                Rect::from_parts(dest_x, dest_y, dest_w, dest_h)
            }
        }
    }

    pub fn text_anchor(&self, canvas: Dimensions, style: &TextStyle) -> TextAnchor {
        match self {
            Placement::Fixed(frame) => {
                let rect = frame.rect();
                let font_size = frame_font_size(rect.width, style.min_size, style.size_ratio);
                TextAnchor {
                    center_x: rect.center_x(),
                    edge: TextEdge::Top(text_top_below(rect.bottom(), font_size, style.gap_ratio)),
                    font_size,
                }
            }
            Placement::Free(_) => {
                let width = f64::from(canvas.width);
                let font_size =
                    frame_font_size(width, style.free_min_size, style.free_size_ratio);
                TextAnchor {
                    center_x: width / 2.0,
                    edge: TextEdge::Bottom(
                        f64::from(canvas.height) - font_size * style.free_bottom_ratio,
                    ),
                    font_size,
                }
            }
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, Placement::Free(_))
    }
}
