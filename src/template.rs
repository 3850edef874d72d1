//! The background template, decoded at most once per session.

use crate::error::PosterError;
use crate::imaging::{Image, ImageBackend};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

#[derive(Debug)]
pub struct TemplateAsset {
    path: PathBuf,
    decoded: Mutex<Option<Image>>,
}

impl TemplateAsset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            decoded: Mutex::new(None),
        }
    }

    /// Wrap an already decoded template.
    pub fn preloaded(path: impl Into<PathBuf>, image: Image) -> Self {
        Self {
            path: path.into(),
            decoded: Mutex::new(Some(image)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The decoded template, decoding it on first use.
    ///
    /// Concurrent first calls wait for one decode rather than racing. A failed
    /// decode is not cached; the next call tries again.
    pub fn load(&self, backend: &dyn ImageBackend) -> Result<Image, PosterError> {
        let mut slot = self.decoded.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(image) = slot.as_ref() {
            return Ok(image.clone());
        }
        let image = backend
            .decode_file(&self.path)
            .map_err(|e| PosterError::resource(format!("template {}", self.path.display()), e))?;
        info!(
            path = %self.path.display(),
            width = image.natural_width(),
            height = image.natural_height(),
            "template decoded"
        );
        *slot = Some(image.clone());
        Ok(image)
    }

    /// The template if it has been decoded already.
    pub fn get(&self) -> Option<Image> {
        self.decoded.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
