//! # Poster Forge
//!
//! Composites an uploaded photo and a person's name onto a fixed poster
//! template, with a live scaled preview and a full-resolution export.
//!
//! # Architecture: One Compositor, Two Scales
//!
//! An editing session moves a poster through a few steps, each validated on
//! its own:
//!
//! ```text
//! 1. Load      photo file / bytes  →  decoded Image      (shared, immutable)
//! 2. Crop      Image + rect        →  exact-size Image   (fixed frame mode)
//! 3. Place     frame or drag       →  canonical rect     (template pixels)
//! 4. Preview   state × scale < 1   →  display surface    (newest render wins)
//! 5. Export    state × scale = 1   →  encoded bytes      (JPEG 92 / AVIF)
//! ```
//!
//! Preview and export call the same [`compositor`]; the preview is the export
//! shrunk by one uniform factor, never a separately laid out picture.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | Editor session: every user-facing operation, validation first, commit last |
//! | [`compositor`] | Template → photo → name layering at any scale |
//! | [`preview`] | Scaled previews, render tickets, last-writer-wins display |
//! | [`export`] | Full-resolution encode, re-entrancy guard, atomic file writes |
//! | [`placement`] | Fixed frame and free position rules, text anchors |
//! | [`drag`] | Pointer drag state machine with display → canonical deltas |
//! | [`geometry`] | Typed pixel spaces and the scale mapping between them |
//! | [`state`] | The poster value that previews and exports snapshot |
//! | [`template`] | Template asset, decoded once per session |
//! | [`config`] | `poster.toml` loading, validation, merging |
//! | [`types`] | JSON job files replayed onto a session |
//! | [`naming`] | Download filename from the name field |
//! | [`imaging`] | Decode, crop, draw, text, encode |
//! | [`output`] | CLI output formatting |
//! | [`error`] | Crate-level [`PosterError`](error::PosterError) |
//!
//! # Design Decisions
//!
//! ## Typed Coordinate Spaces
//!
//! Photo pixels, template pixels and preview pixels are three different
//! spaces. [`geometry::Rect`] carries its space as a type parameter, so a
//! display-space drag delta cannot be added to a canonical offset without
//! passing through a [`geometry::ScaleMapping`]. Mappings are built from the
//! sizes measured at the moment of use and never cached.
//!
//! ## Newest Preview Wins
//!
//! Edits arrive faster than renders finish. Each render takes a ticket from
//! an atomic counter; the display accepts a frame only if its ticket is
//! still the newest issued. Superseded renders run to completion and are
//! dropped, which is simpler than cancelling a decode half way.
//!
//! ## Clamp, Don't Reject, Crop Rects
//!
//! Selection widgets round and overshoot. A crop rect that pokes outside the
//! photo is slid back inside (keeping its size). One larger than the photo is
//! first shrunk uniformly about its center, so its aspect survives. A rect
//! with no overlap at all is an error.
//!
//! ## Aspect Is Checked, Not Trusted
//!
//! In fixed mode the cropped photo is stretched to fill the frame. A
//! selection whose aspect differs from the frame's by more than
//! `crop.aspect_tolerance` is rejected rather than silently distorted.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling and encoding use the `image` crate (Lanczos3 for
//! export, Triangle for previews, rav1e for AVIF); text is rasterized with
//! `ab_glyph`. No system libraries are needed apart from a font file.

pub mod compositor;
pub mod config;
pub mod drag;
pub mod error;
pub mod export;
pub mod geometry;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod placement;
pub mod preview;
pub mod session;
pub mod state;
pub mod template;
pub mod types;

pub use error::PosterError;
pub use session::EditorSession;

#[cfg(test)]
pub(crate) mod test_helpers;
