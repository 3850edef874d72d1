//! The editable poster: photo, crop, placement and name.
//!
//! [`PosterState`] is a plain value. Background previews and exports work on
//! a clone (a snapshot); images inside are `Arc`-shared, so a snapshot costs
//! a few pointer copies.

use crate::compositor::Layers;
use crate::imaging::Image;
use crate::placement::{CropSelection, Placement};

#[derive(Debug, Clone)]
pub struct PosterState {
    /// Photo as uploaded, before any crop.
    pub uploaded: Option<Image>,
    /// Result of the last applied crop; dimensions equal `crop.rect`.
    pub cropped: Option<Image>,
    pub crop: Option<CropSelection>,
    pub placement: Placement,
    pub name: String,
}

impl PosterState {
    pub fn new(placement: Placement) -> Self {
        Self {
            uploaded: None,
            cropped: None,
            crop: None,
            placement,
            name: String::new(),
        }
    }

    /// Photo to draw: the crop in fixed mode; in free mode the crop if one was
    /// applied, otherwise the uploaded photo.
    pub fn photo_for_render(&self) -> Option<&Image> {
        match self.placement {
            Placement::Fixed(_) => self.cropped.as_ref(),
            Placement::Free(_) => self.cropped.as_ref().or(self.uploaded.as_ref()),
        }
    }

    pub fn layers<'a>(&'a self, template: &'a Image) -> Layers<'a> {
        Layers {
            template,
            photo: self.photo_for_render(),
            placement: &self.placement,
            name: &self.name,
        }
    }
}
