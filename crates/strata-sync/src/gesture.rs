#![forbid(unsafe_code)]

//! Raw pane gestures.
//!
//! A [`Gesture`] is what a pane emits when the user interacts with it
//! directly: pixel-space input, not yet translated into the depth domain.
//! The synchronizers own the translation; panes never compute depth values
//! themselves.

use serde::{Deserialize, Serialize};
use strata_core::ZoomAnchor;

/// A user interaction originating in one pane, in that pane's pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Gesture {
    /// Wheel or drag pan by a vertical pixel delta. Positive scrolls deeper.
    ScrollBy { delta_px: f64 },
    /// Pointer moved to (or clicked at) a vertical pixel coordinate.
    PointerMoved { y_px: f64 },
    /// Pointer left the pane; the cursor indicator clears everywhere.
    PointerLeft,
    /// Drag-select between two vertical pixel coordinates, in either order.
    DragSelect { start_y_px: f64, end_y_px: f64 },
    /// Clear the selection.
    ClearSelection,
    /// Zoom to `factor`, holding `anchor` fixed on-screen.
    Zoom { factor: f64, anchor: ZoomAnchor },
}

impl Gesture {
    /// Which synchronizer handles this gesture.
    pub fn kind(&self) -> GestureKind {
        match self {
            Self::ScrollBy { .. } => GestureKind::Scroll,
            Self::PointerMoved { .. } | Self::PointerLeft => GestureKind::Cursor,
            Self::DragSelect { .. } | Self::ClearSelection => GestureKind::Selection,
            Self::Zoom { .. } => GestureKind::Zoom,
        }
    }
}

/// Gesture categories, one per synchronizer plus zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureKind {
    Scroll,
    Cursor,
    Selection,
    Zoom,
}
