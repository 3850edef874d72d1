//! Pointer-driven repositioning of a free-placed photo.
//!
//! The model is an explicit two-state machine:
//!
//! ```text
//!            begin(p, pt)                 move_to(p, pt, mapping) -> Some(offset)
//!   Idle ───────────────────▶ Dragging{p, last} ◀──────────┐
//!    ▲                            │  └──────────────────────┘
//!    └──── end() / cancel() ──────┘
//! ```
//!
//! Only one pointer may drive the photo at a time. Deltas are measured in
//! display pixels and converted to canonical pixels with a [`ScaleMapping`]
//! the caller builds from the sizes measured at the time of the move, so a
//! layout change mid-drag never skews the result.

use crate::geometry::{DisplaySpace, Offset, Point, ScaleMapping};
use thiserror::Error;
use tracing::debug;

/// Identifies one pointer (mouse, a touch contact, a pen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerId(pub u64);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragError {
    #[error("a drag is already in progress")]
    AlreadyDragging,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        pointer: PointerId,
        last: Point<DisplaySpace>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DragRepositionModel {
    state: DragState,
}

impl DragRepositionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Start a drag. Rejected without any state change while a drag is active,
    /// whichever pointer owns it.
    pub fn begin(&mut self, pointer: PointerId, at: Point<DisplaySpace>) -> Result<(), DragError> {
        if self.is_dragging() {
            return Err(DragError::AlreadyDragging);
        }
        debug!(pointer = pointer.0, x = at.x, y = at.y, "drag started");
        self.state = DragState::Dragging { pointer, last: at };
        Ok(())
    }

    /// Move the owning pointer to `to`.
    ///
    /// Returns the canonical-space delta since the previous anchor and moves
    /// the anchor. `None` when idle or when `pointer` does not own the drag.
    pub fn move_to(
        &mut self,
        pointer: PointerId,
        to: Point<DisplaySpace>,
        mapping: &ScaleMapping,
    ) -> Option<Offset> {
        let DragState::Dragging { pointer: owner, last } = self.state else {
            return None;
        };
        if owner != pointer {
            return None;
        }
        let delta = mapping.delta_to_canonical(to.x - last.x, to.y - last.y);
        self.state = DragState::Dragging { pointer, last: to };
        Some(delta)
    }

    pub fn end(&mut self) {
        if self.is_dragging() {
            debug!("drag ended");
        }
        self.state = DragState::Idle;
    }

    /// Abandon the drag (pointer lost, window blurred). Offsets already
    /// applied are kept.
    pub fn cancel(&mut self) {
        if self.is_dragging() {
            debug!("drag cancelled");
        }
        self.state = DragState::Idle;
    }
}
