//! Full-resolution export.
//!
//! The pipeline composes at the template's native size with the same
//! compositor the preview uses, encodes, and keeps the result as the last
//! successful artifact. One export at a time: a second call while one is in
//! flight is rejected rather than queued.

use crate::compositor::{Compositor, EXPORT_FILTER};
use crate::config::PosterConfig;
use crate::error::PosterError;
use crate::imaging::{EncodeParams, ExportFormat, ImageBackend, Quality, RenderStyle};
use crate::naming::download_filename;
use crate::state::PosterState;
use crate::template::TemplateAsset;
use ab_glyph::FontArc;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    pub format: ExportFormat,
    pub quality: Quality,
    pub default_filename: String,
}

impl ExportSettings {
    pub fn from_config(config: &PosterConfig) -> Self {
        Self {
            format: config.export.format,
            quality: config.quality(),
            default_filename: config.export.default_filename.clone(),
        }
    }

    fn encode_params(&self) -> EncodeParams {
        EncodeParams {
            format: self.format,
            quality: self.quality,
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: ExportFormat::Jpeg,
            quality: Quality::default(),
            default_filename: "poster".to_string(),
        }
    }
}

/// An encoded poster ready to be saved or offered for download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub format: ExportFormat,
    pub width: u32,
    pub height: u32,
}

/// Clears the busy flag when the export finishes, however it finishes.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ExportPipeline {
    backend: Arc<dyn ImageBackend>,
    style: RenderStyle,
    font: Option<FontArc>,
    settings: ExportSettings,
    busy: AtomicBool,
    last: Mutex<Option<Arc<ExportArtifact>>>,
}

impl ExportPipeline {
    pub fn new(
        backend: Arc<dyn ImageBackend>,
        style: RenderStyle,
        font: Option<FontArc>,
        settings: ExportSettings,
    ) -> Self {
        Self {
            backend,
            style,
            font,
            settings,
            busy: AtomicBool::new(false),
            last: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Compose and encode `state` at full template resolution.
    ///
    /// Template load failures are [`PosterError::ResourceLoad`]; drawing and
    /// encoding failures are [`PosterError::Composition`]. On failure the
    /// previous artifact stays available from [`last`](Self::last).
    pub fn export(
        &self,
        state: &PosterState,
        template: &TemplateAsset,
    ) -> Result<Arc<ExportArtifact>, PosterError> {
        let _guard = BusyGuard::acquire(&self.busy)
            .ok_or_else(|| PosterError::InvalidState("export already in progress".into()))?;

        let template = template.load(self.backend.as_ref())?;

        let compositor = Compositor::new(&self.style, self.font.as_ref());
        let surface = compositor.render(&state.layers(&template), 1.0, EXPORT_FILTER)?;
        debug!(
            width = surface.width(),
            height = surface.height(),
            "export surface composed"
        );

        let bytes = self
            .backend
            .encode(&surface, &self.settings.encode_params())
            .map_err(|e| PosterError::Composition(format!("encoding failed: {e}")))?;

        let artifact = Arc::new(ExportArtifact {
            filename: download_filename(
                &state.name,
                &self.settings.default_filename,
                self.settings.format,
            ),
            bytes,
            format: self.settings.format,
            width: surface.width(),
            height: surface.height(),
        });
        info!(
            filename = %artifact.filename,
            bytes = artifact.bytes.len(),
            width = artifact.width,
            height = artifact.height,
            "export finished"
        );
        *self.last.lock().unwrap_or_else(|e| e.into_inner()) = Some(Arc::clone(&artifact));
        Ok(artifact)
    }

    /// The most recent successful export.
    pub fn last(&self) -> Option<Arc<ExportArtifact>> {
        self.last.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn clear_last(&self) {
        *self.last.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

/// Write `artifact` into `dir` under its filename.
///
/// The bytes go to a temporary file in the same directory which is then
/// renamed into place, so a reader never sees a partial poster.
pub fn write_artifact(artifact: &ExportArtifact, dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let target = dir.join(&artifact.filename);
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&artifact.bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(&target).map_err(|e| e.error)?;
    Ok(target)
}
