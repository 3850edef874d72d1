//! One poster-editing session.
//!
//! [`EditorSession`] owns the editable [`PosterState`] and wires it to the
//! template, the preview display, the drag model and the export pipeline.
//! Every mutating operation validates first and commits last, so a failed
//! call leaves the poster exactly as it was.
//!
//! Background previews ([`EditorSession::spawn_preview`]) take their ticket
//! on the calling thread, in request order, then render a snapshot on a
//! worker thread. Whichever finishes last, only the newest request is shown.

use crate::config::{PlacementMode, PosterConfig};
use crate::drag::{DragRepositionModel, PointerId};
use crate::error::PosterError;
use crate::export::{ExportArtifact, ExportPipeline, ExportSettings};
use crate::geometry::{
    CanonicalSpace, DisplaySpace, Offset, Point, Rect, ScaleMapping, Size, SourceSpace,
};
use crate::imaging::{Image, ImageBackend, crop, text};
use crate::placement::{CropSelection, FrameConfig, Placement, Position};
use crate::preview::{
    DisplaySurface, PreviewFrame, PreviewOutcome, PreviewRenderer, PreviewScheduler, RenderTicket,
};
use crate::state::PosterState;
use crate::template::TemplateAsset;
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

pub struct EditorSession {
    backend: Arc<dyn ImageBackend>,
    template: Arc<TemplateAsset>,
    frame: FrameConfig,
    initial_placement: Placement,
    aspect_tolerance: f64,
    max_zoom: f64,
    default_container_width: u32,
    state: PosterState,
    drag: DragRepositionModel,
    renderer: Arc<PreviewRenderer>,
    display: Arc<DisplaySurface>,
    exporter: Arc<ExportPipeline>,
}

impl EditorSession {
    /// Build a session from validated config.
    ///
    /// The template is identified (not decoded) to check that the frame fits;
    /// it is decoded on first preview or export.
    pub fn open(config: &PosterConfig, backend: Arc<dyn ImageBackend>) -> Result<Self, PosterError> {
        let frame = FrameConfig::from_section(&config.frame)?;
        let initial_placement = match config.placement.mode {
            PlacementMode::Fixed => Placement::Fixed(frame),
            PlacementMode::Free => Placement::Free(Position::new(config.placement.initial_scale)?),
        };
        let font = text::resolve_font(config.text.font.as_deref())?;
        if font.is_none() {
            warn!("no font found; names cannot be drawn until text.font is set");
        }

        let template = Arc::new(TemplateAsset::new(config.template.path.clone()));
        match backend.identify(template.path()) {
            Ok(dims) if !frame.fits_within(dims) => warn!(
                frame = %frame.rect(),
                width = dims.width,
                height = dims.height,
                "frame extends outside the template"
            ),
            Ok(_) => {}
            Err(e) => debug!(path = %template.path().display(), error = %e, "template not identified"),
        }

        let style = config.render_style();
        let scheduler = Arc::new(PreviewScheduler::new());
        let exporter = ExportPipeline::new(
            Arc::clone(&backend),
            style,
            font.clone(),
            ExportSettings::from_config(config),
        );

        info!(mode = ?config.placement.mode, template = %template.path().display(), "session opened");
        Ok(Self {
            backend,
            template,
            frame,
            initial_placement,
            aspect_tolerance: config.crop.aspect_tolerance,
            max_zoom: config.crop.max_zoom,
            default_container_width: config.preview.default_container_width,
            state: PosterState::new(initial_placement),
            drag: DragRepositionModel::new(),
            renderer: Arc::new(PreviewRenderer::new(style, font, config.preview.fast_resize)),
            display: Arc::new(DisplaySurface::new(scheduler)),
            exporter: Arc::new(exporter),
        })
    }

    pub fn state(&self) -> &PosterState {
        &self.state
    }

    /// A clone of the current state for work on another thread.
    pub fn snapshot(&self) -> PosterState {
        self.state.clone()
    }

    pub fn template(&self) -> &Arc<TemplateAsset> {
        &self.template
    }

    pub fn frame(&self) -> FrameConfig {
        self.frame
    }

    pub fn default_container_width(&self) -> u32 {
        self.default_container_width
    }

    pub fn exporter(&self) -> &Arc<ExportPipeline> {
        &self.exporter
    }

    // =========================================================================
    // Photo and crop
    // =========================================================================

    pub fn load_photo(&mut self, path: &Path) -> Result<(), PosterError> {
        let photo = self
            .backend
            .decode_file(path)
            .map_err(|e| PosterError::resource(format!("photo {}", path.display()), e))?;
        info!(path = %path.display(), ?photo, "photo loaded");
        self.set_uploaded(photo);
        Ok(())
    }

    pub fn load_photo_bytes(&mut self, bytes: &[u8]) -> Result<(), PosterError> {
        let photo = self
            .backend
            .decode_bytes(bytes)
            .map_err(|e| PosterError::resource("uploaded photo", e))?;
        info!(bytes = bytes.len(), ?photo, "photo loaded");
        self.set_uploaded(photo);
        Ok(())
    }

    /// A new photo invalidates the previous crop and free-mode position.
    fn set_uploaded(&mut self, photo: Image) {
        self.drag.cancel();
        self.state.uploaded = Some(photo);
        self.state.cropped = None;
        self.state.crop = None;
        if self.state.placement.is_free() {
            self.state.placement = self.initial_placement;
        }
    }

    /// Aspect ratio the crop selection must be locked to.
    pub fn crop_aspect(&self) -> f64 {
        self.frame.crop_aspect()
    }

    /// Crop the uploaded photo to `rect` (photo pixels).
    pub fn apply_crop(&mut self, rect: Rect<SourceSpace>, zoom: f64) -> Result<(), PosterError> {
        let uploaded = self
            .state
            .uploaded
            .as_ref()
            .ok_or_else(|| PosterError::InvalidState("no photo loaded".into()))?;
        let selection = CropSelection::new(rect, zoom, self.max_zoom)?;
        if let Placement::Fixed(frame) = self.state.placement {
            frame.check_selection(&selection, self.aspect_tolerance)?;
        }
        let cropped = crop(uploaded, &selection.rect, 0.0)?;
        if let Placement::Fixed(frame) = self.state.placement {
            // rounding after a shrink can still drift on tiny photos
            let dims = cropped.dimensions();
            frame.check_aspect(
                f64::from(dims.width) / f64::from(dims.height),
                self.aspect_tolerance,
            )?;
        }
        debug!(
            rect = %selection.rect,
            width = cropped.natural_width(),
            height = cropped.natural_height(),
            "crop applied"
        );
        self.state.cropped = Some(cropped);
        self.state.crop = Some(selection);
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.state.name = name.into();
    }

    // =========================================================================
    // Free placement
    // =========================================================================

    fn position_mut(&mut self) -> Result<&mut Position, PosterError> {
        match &mut self.state.placement {
            Placement::Free(pos) => Ok(pos),
            Placement::Fixed(_) => Err(PosterError::InvalidState(
                "photo position is fixed by the frame".into(),
            )),
        }
    }

    pub fn set_scale(&mut self, scale: f64) -> Result<(), PosterError> {
        let pos = self.position_mut()?;
        *pos = pos.with_scale(scale)?;
        Ok(())
    }

    /// Move the free-placed photo by a canonical-space offset.
    pub fn nudge(&mut self, delta: Offset) -> Result<(), PosterError> {
        self.position_mut()?.apply_offset(delta);
        Ok(())
    }

    pub fn begin_drag(&mut self, pointer: PointerId, at: Point<DisplaySpace>) -> Result<(), PosterError> {
        self.position_mut()?;
        self.drag.begin(pointer, at)?;
        Ok(())
    }

    /// Feed a pointer move. Returns the canonical offset applied, if any.
    ///
    /// The display-to-canonical mapping is rebuilt from the current template
    /// size and the currently shown preview on every call.
    pub fn drag_to(&mut self, pointer: PointerId, at: Point<DisplaySpace>) -> Option<Offset> {
        let mapping = self.current_mapping();
        let delta = self.drag.move_to(pointer, at, &mapping)?;
        self.position_mut().ok()?.apply_offset(delta);
        Some(delta)
    }

    pub fn end_drag(&mut self) {
        self.drag.end();
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    fn current_mapping(&self) -> ScaleMapping {
        let canonical = self
            .template
            .get()
            .map(|t| Size::<CanonicalSpace>::from_pixels(t.natural_width(), t.natural_height()))
            .unwrap_or(Size::new(0.0, 0.0));
        let display = self
            .display
            .latest()
            .map(|f| Size::<DisplaySpace>::from_pixels(f.image.natural_width(), f.image.natural_height()))
            .unwrap_or(Size::new(0.0, 0.0));
        ScaleMapping::new(canonical, display)
    }

    // =========================================================================
    // Preview
    // =========================================================================

    /// Render and show a preview on the calling thread.
    pub fn render_preview(&self, container_width: u32) -> Result<PreviewOutcome, PosterError> {
        let ticket = self.display.scheduler().issue();
        render_and_commit(
            &self.renderer,
            &self.display,
            &self.template,
            self.backend.as_ref(),
            &self.state,
            ticket,
            container_width,
        )
    }

    /// Render a preview of the current state on a worker thread.
    pub fn spawn_preview(
        &self,
        container_width: u32,
    ) -> JoinHandle<Result<PreviewOutcome, PosterError>> {
        let ticket = self.display.scheduler().issue();
        let snapshot = self.snapshot();
        let renderer = Arc::clone(&self.renderer);
        let display = Arc::clone(&self.display);
        let template = Arc::clone(&self.template);
        let backend = Arc::clone(&self.backend);
        thread::spawn(move || {
            render_and_commit(
                &renderer,
                &display,
                &template,
                backend.as_ref(),
                &snapshot,
                ticket,
                container_width,
            )
        })
    }

    pub fn latest_preview(&self) -> Option<PreviewFrame> {
        self.display.latest()
    }

    // =========================================================================
    // Export
    // =========================================================================

    pub fn export(&self) -> Result<Arc<ExportArtifact>, PosterError> {
        self.exporter.export(&self.state, &self.template)
    }

    pub fn last_export(&self) -> Option<Arc<ExportArtifact>> {
        self.exporter.last()
    }

    /// Drop the photo, crop, name and position. The template stays decoded
    /// and the last export stays available.
    pub fn reset(&mut self) {
        self.drag.cancel();
        self.state = PosterState::new(self.initial_placement);
        self.display.clear();
        info!("session reset");
    }
}

fn render_and_commit(
    renderer: &PreviewRenderer,
    display: &DisplaySurface,
    template: &TemplateAsset,
    backend: &dyn ImageBackend,
    state: &PosterState,
    ticket: RenderTicket,
    container_width: u32,
) -> Result<PreviewOutcome, PosterError> {
    let template = template.load(backend)?;
    let (image, scale) = renderer.render(state, &template, container_width)?;
    Ok(display.commit(PreviewFrame {
        ticket,
        image,
        scale,
    }))
}
