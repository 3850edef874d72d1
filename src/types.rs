//! Poster job files: one JSON document describing a complete poster.
//!
//! ```json
//! {
//!   "photo": "ava.jpg",
//!   "crop": { "x": 100, "y": 50, "width": 400, "height": 530, "zoom": 1.2 },
//!   "name": "Ava Chen",
//!   "offset": { "dx": 0, "dy": -40 },
//!   "scale": 0.8
//! }
//! ```
//!
//! Relative photo paths resolve against the job file's directory. `offset`
//! and `scale` only apply in free placement mode.

use crate::error::PosterError;
use crate::geometry::{Offset, Rect};
use crate::session::EditorSession;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PosterJob {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropSpec>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<OffsetSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

/// Crop rectangle in photo pixels, as reported by the selection widget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CropSpec {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
}

fn default_zoom() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OffsetSpec {
    pub dx: f64,
    pub dy: f64,
}

impl PosterJob {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Replay the job onto `session`, in the order an editor would:
    /// photo, crop, scale, offset, name.
    pub fn apply(&self, session: &mut EditorSession, base_dir: &Path) -> Result<(), PosterError> {
        if let Some(photo) = &self.photo {
            session.load_photo(&base_dir.join(photo))?;
        }
        if let Some(c) = self.crop {
            session.apply_crop(Rect::new(c.x, c.y, c.width, c.height)?, c.zoom)?;
        }
        if let Some(scale) = self.scale {
            session.set_scale(scale)?;
        }
        if let Some(o) = self.offset {
            session.nudge(Offset::new(o.dx, o.dy))?;
        }
        session.set_name(self.name.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlacementMode;
    use crate::placement::Placement;
    use crate::test_helpers::*;
    use std::sync::Arc;

    fn session(mode: PlacementMode) -> EditorSession {
        let backend = mock_with_template(&template_image());
        backend.add_file("/jobs/ava.jpg", gradient_image(800, 600));
        let mut config = test_config();
        config.placement.mode = mode;
        EditorSession::open(&config, Arc::new(backend)).unwrap()
    }

    #[test]
    fn parse_full_job() {
        let job = PosterJob::from_json(
            r#"{
                "photo": "ava.jpg",
                "crop": {"x": 100, "y": 50, "width": 400, "height": 530},
                "name": "Ava Chen",
                "offset": {"dx": 1.5, "dy": -2},
                "scale": 0.8
            }"#,
        )
        .unwrap();
        assert_eq!(job.photo, Some(PathBuf::from("ava.jpg")));
        assert_eq!(job.crop.unwrap().zoom, 1.0);
        assert_eq!(job.name, "Ava Chen");
        assert_eq!(job.offset, Some(OffsetSpec { dx: 1.5, dy: -2.0 }));
        assert_eq!(job.scale, Some(0.8));
    }

    #[test]
    fn empty_job_is_valid() {
        assert_eq!(PosterJob::from_json("{}").unwrap(), PosterJob::default());
    }

    #[test]
    fn unknown_field_rejected() {
        assert!(PosterJob::from_json(r#"{"nmae": "x"}"#).is_err());
    }

    #[test]
    fn apply_fixed_job() {
        let mut session = session(PlacementMode::Fixed);
        let job = PosterJob {
            photo: Some("ava.jpg".into()),
            crop: Some(CropSpec {
                x: 100.0,
                y: 50.0,
                width: 400.0,
                height: 530.0,
                zoom: 1.0,
            }),
            name: "Ava".into(),
            ..PosterJob::default()
        };
        job.apply(&mut session, Path::new("/jobs")).unwrap();
        let state = session.state();
        assert_eq!(state.cropped.as_ref().unwrap().natural_height(), 530);
        assert_eq!(state.name, "Ava");
    }

    #[test]
    fn apply_free_job_moves_photo() {
        let mut session = session(PlacementMode::Free);
        let job = PosterJob {
            photo: Some("ava.jpg".into()),
            offset: Some(OffsetSpec { dx: 10.0, dy: 20.0 }),
            scale: Some(0.5),
            ..PosterJob::default()
        };
        job.apply(&mut session, Path::new("/jobs")).unwrap();
        let Placement::Free(pos) = session.state().placement else {
            panic!("expected free placement");
        };
        assert_eq!(pos.scale, 0.5);
        assert_eq!(pos.offset, Offset::new(10.0, 20.0));
    }

    #[test]
    fn offset_in_fixed_mode_is_error() {
        let mut session = session(PlacementMode::Fixed);
        let job = PosterJob {
            offset: Some(OffsetSpec { dx: 1.0, dy: 1.0 }),
            ..PosterJob::default()
        };
        let err = job.apply(&mut session, Path::new("/jobs")).unwrap_err();
        assert!(matches!(err, PosterError::InvalidState(_)));
    }
}
