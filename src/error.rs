//! Crate-level error type returned by session, preview and export operations.
//!
//! Module-local errors (`BackendError`, `CropError`, `DragError`,
//! `GeometryError`, `TextError`) are converted here. Every variant leaves the
//! editor state as it was before the failed call.

use crate::drag::DragError;
use crate::geometry::GeometryError;
use crate::imaging::{BackendError, CropError, TextError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PosterError {
    /// Template or photo could not be read or decoded.
    #[error("failed to load {what}: {source}")]
    ResourceLoad {
        what: String,
        #[source]
        source: BackendError,
    },
    #[error(transparent)]
    CropBounds(#[from] CropError),
    /// Drawing or encoding the poster failed.
    #[error("composition failed: {0}")]
    Composition(String),
    /// The operation is not valid in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("crop aspect {actual:.4} does not match frame aspect {expected:.4}")]
    AspectMismatch { expected: f64, actual: f64 },
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

impl PosterError {
    pub fn resource(what: impl Into<String>, source: BackendError) -> Self {
        Self::ResourceLoad {
            what: what.into(),
            source,
        }
    }
}

impl From<DragError> for PosterError {
    fn from(err: DragError) -> Self {
        Self::InvalidState(err.to_string())
    }
}

impl From<TextError> for PosterError {
    fn from(err: TextError) -> Self {
        Self::Composition(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_load_names_the_asset() {
        let err = PosterError::resource(
            "template /assets/t.png",
            BackendError::ProcessingFailed("truncated".into()),
        );
        let msg = err.to_string();
        assert!(msg.contains("template /assets/t.png"));
        assert!(msg.contains("truncated"));
    }

    #[test]
    fn drag_error_becomes_invalid_state() {
        let err: PosterError = DragError::AlreadyDragging.into();
        assert!(matches!(err, PosterError::InvalidState(_)));
    }

    #[test]
    fn text_error_becomes_composition() {
        let err: PosterError = TextError::NoFont.into();
        assert!(matches!(err, PosterError::Composition(m) if m.contains("font")));
    }

    #[test]
    fn aspect_mismatch_message() {
        let err = PosterError::AspectMismatch {
            expected: 0.7544,
            actual: 1.0,
        };
        assert_eq!(
            err.to_string(),
            "crop aspect 1.0000 does not match frame aspect 0.7544"
        );
    }
}
