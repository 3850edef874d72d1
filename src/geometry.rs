//! Typed pixel spaces and the linear mapping between them.
//!
//! Three coordinate systems coexist in an editing session:
//!
//! | Space | Origin | Varies with |
//! |---|---|---|
//! | [`SourceSpace`] | uploaded photo's native pixels | the photo |
//! | [`CanonicalSpace`] | template's native pixels | nothing (fixed per session) |
//! | [`DisplaySpace`] | the scaled on-screen preview | layout / container width |
//!
//! Every [`Rect`], [`Point`] and [`Size`] carries its space as a type
//! parameter, so mixing spaces without going through a [`ScaleMapping`] is a
//! compile error rather than a silently misplaced photo.
//!
//! ## Stale display sizes
//!
//! A [`ScaleMapping`] must be built from the display size measured *now*.
//! Reusing one across a layout change produces wrong (but finite) results,
//! which is why nothing in the crate caches mappings.

use std::fmt;
use std::marker::PhantomData;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("{space} rect must have positive, finite size (got {width}x{height})")]
    InvalidRect {
        space: &'static str,
        width: f64,
        height: f64,
    },
    #[error("{space} rect origin must be finite")]
    NonFiniteOrigin { space: &'static str },
    #[error("zoom must be between 1 and the configured maximum (got {0})")]
    InvalidZoom(f64),
    #[error("scale must be positive and finite (got {0})")]
    InvalidScale(f64),
}

/// Marker trait for a named pixel space.
pub trait Space: Copy + Clone + fmt::Debug + PartialEq + Default + 'static {
    const NAME: &'static str;
}

/// Native pixels of the uploaded photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceSpace;

/// Native pixels of the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CanonicalSpace;

/// Pixels of the currently rendered preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplaySpace;

impl Space for SourceSpace {
    const NAME: &'static str = "source";
}

impl Space for CanonicalSpace {
    const NAME: &'static str = "canonical";
}

impl Space for DisplaySpace {
    const NAME: &'static str = "display";
}

/// Axis-aligned rectangle in space `S`. Width and height are always positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect<S: Space> {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    space: PhantomData<S>,
}

impl<S: Space> Rect<S> {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self, GeometryError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(GeometryError::NonFiniteOrigin { space: S::NAME });
        }
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(GeometryError::InvalidRect {
                space: S::NAME,
                width,
                height,
            });
        }
        Ok(Self::from_parts(x, y, width, height))
    }

    /// Build without validation. Callers guarantee positive sizes.
    pub(crate) fn from_parts(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            space: PhantomData,
        }
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Whether this rect lies entirely inside `[0, 0, width, height]`.
    pub fn within(&self, width: f64, height: f64) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.right() <= width && self.bottom() <= height
    }
}

impl<S: Space> fmt::Display for Rect<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}x{}] ({})",
            self.x,
            self.y,
            self.width,
            self.height,
            S::NAME
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<S: Space> {
    pub x: f64,
    pub y: f64,
    space: PhantomData<S>,
}

impl<S: Space> Point<S> {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            space: PhantomData,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size<S: Space> {
    pub width: f64,
    pub height: f64,
    space: PhantomData<S>,
}

impl<S: Space> Size<S> {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            space: PhantomData,
        }
    }

    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(f64::from(width), f64::from(height))
    }
}

/// Relative movement in canonical space, added into a free-placement position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

impl std::ops::Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

/// Convert a display-space value to canonical space: `v * C / D`.
///
/// `display == 0` means the display size has not been measured yet and the
/// value is returned unchanged.
pub fn to_canonical(value: f64, canonical: f64, display: f64) -> f64 {
    if display == 0.0 {
        return value;
    }
    value * canonical / display
}

/// Convert a canonical-space value to display space: `v * D / C`.
pub fn to_display(value: f64, canonical: f64, display: f64) -> f64 {
    if display == 0.0 || canonical == 0.0 {
        return value;
    }
    value * display / canonical
}

/// Per-axis linear mapping between canonical space and one display surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleMapping {
    canonical: Size<CanonicalSpace>,
    display: Size<DisplaySpace>,
}

impl ScaleMapping {
    pub fn new(canonical: Size<CanonicalSpace>, display: Size<DisplaySpace>) -> Self {
        Self { canonical, display }
    }

    pub fn canonical(&self) -> Size<CanonicalSpace> {
        self.canonical
    }

    pub fn display(&self) -> Size<DisplaySpace> {
        self.display
    }

    pub fn delta_to_canonical(&self, dx: f64, dy: f64) -> Offset {
        Offset::new(
            to_canonical(dx, self.canonical.width, self.display.width),
            to_canonical(dy, self.canonical.height, self.display.height),
        )
    }

    pub fn point_to_canonical(&self, p: Point<DisplaySpace>) -> Point<CanonicalSpace> {
        Point::new(
            to_canonical(p.x, self.canonical.width, self.display.width),
            to_canonical(p.y, self.canonical.height, self.display.height),
        )
    }

    pub fn point_to_display(&self, p: Point<CanonicalSpace>) -> Point<DisplaySpace> {
        Point::new(
            to_display(p.x, self.canonical.width, self.display.width),
            to_display(p.y, self.canonical.height, self.display.height),
        )
    }

    pub fn rect_to_display(&self, r: &Rect<CanonicalSpace>) -> Rect<DisplaySpace> {
        Rect::from_parts(
            to_display(r.x, self.canonical.width, self.display.width),
            to_display(r.y, self.canonical.height, self.display.height),
            to_display(r.width, self.canonical.width, self.display.width),
            to_display(r.height, self.canonical.height, self.display.height),
        )
    }
}
