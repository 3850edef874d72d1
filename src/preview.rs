//! Scaled live preview and last-writer-wins display.
//!
//! A preview is the export composition at `scale = min(1, container / W)`.
//! Renders may overlap (each edit schedules one, decodes finish in any
//! order), so every render carries a [`RenderTicket`] from the
//! [`PreviewScheduler`], and the [`DisplaySurface`] only accepts a frame
//! whose ticket is still the newest issued. Older renders finish normally
//! and are then dropped.

use crate::compositor::{Compositor, preview_filter};
use crate::error::PosterError;
use crate::imaging::{Image, RenderStyle, preview_scale};
use crate::state::PosterState;
use ab_glyph::FontArc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Sequence number of one scheduled render. Higher is newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderTicket(pub u64);

#[derive(Debug, Default)]
pub struct PreviewScheduler {
    issued: AtomicU64,
}

impl PreviewScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> RenderTicket {
        RenderTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }
}

/// A finished preview.
#[derive(Debug, Clone)]
pub struct PreviewFrame {
    pub ticket: RenderTicket,
    pub image: Image,
    pub scale: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewOutcome {
    Committed(RenderTicket),
    /// A newer render was scheduled; this frame was discarded.
    Superseded(RenderTicket),
}

/// The one place a preview is shown.
#[derive(Debug)]
pub struct DisplaySurface {
    scheduler: Arc<PreviewScheduler>,
    shown: Mutex<Option<PreviewFrame>>,
}

impl DisplaySurface {
    pub fn new(scheduler: Arc<PreviewScheduler>) -> Self {
        Self {
            scheduler,
            shown: Mutex::new(None),
        }
    }

    pub fn scheduler(&self) -> &Arc<PreviewScheduler> {
        &self.scheduler
    }

    /// Show `frame` unless a newer render has been scheduled since it was.
    ///
    /// The currency check and the store happen under one lock, so two
    /// finishing renders can never interleave.
    pub fn commit(&self, frame: PreviewFrame) -> PreviewOutcome {
        let ticket = frame.ticket;
        let mut shown = self.shown.lock().unwrap_or_else(|e| e.into_inner());
        if !self.scheduler.is_current(ticket) {
            warn!(ticket = ticket.0, "preview superseded by a newer render");
            return PreviewOutcome::Superseded(ticket);
        }
        debug!(
            ticket = ticket.0,
            width = frame.image.natural_width(),
            height = frame.image.natural_height(),
            "preview committed"
        );
        *shown = Some(frame);
        PreviewOutcome::Committed(ticket)
    }

    pub fn latest(&self) -> Option<PreviewFrame> {
        self.shown.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn clear(&self) {
        *self.shown.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

/// Renders scaled previews with the shared compositor.
#[derive(Clone)]
pub struct PreviewRenderer {
    style: RenderStyle,
    font: Option<FontArc>,
    fast_resize: bool,
}

impl PreviewRenderer {
    pub fn new(style: RenderStyle, font: Option<FontArc>, fast_resize: bool) -> Self {
        Self {
            style,
            font,
            fast_resize,
        }
    }

    /// Render `state` over `template` for a container `container_width` wide.
    ///
    /// Returns the surface and the scale it was drawn at. Each call draws
    /// into a new surface, so identical inputs give identical pixels.
    pub fn render(
        &self,
        state: &PosterState,
        template: &Image,
        container_width: u32,
    ) -> Result<(Image, f64), PosterError> {
        let scale = preview_scale(container_width, template.natural_width());
        let compositor = Compositor::new(&self.style, self.font.as_ref());
        let surface = compositor.render(
            &state.layers(template),
            scale,
            preview_filter(self.fast_resize),
        )?;
        Ok((Image::from_rgba(surface), scale))
    }
}
