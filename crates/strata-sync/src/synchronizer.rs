#![forbid(unsafe_code)]

//! Gesture mediators.
//!
//! The three synchronizers translate one pane's raw pixel-space gestures into
//! depth-domain mutations, using that pane's [`CoordinateTransform`]. They
//! are stateless: all state lives in the store, and the delivery half of each
//! mediator is the typed [`PaneAdapter`](crate::adapter::PaneAdapter)
//! callback for its field. No synchronizer re-enters a gesture path while an
//! echoed broadcast is processed; the store's single-in-flight rule makes
//! that structural rather than guarded.

use strata_core::{CoordinateTransform, DepthRange};

use crate::store::Mutation;

/// Everything a synchronizer needs to know about the originating pane:
/// its current transform and the total data bounds.
#[derive(Debug, Clone, Copy)]
pub struct PaneContext {
    pub transform: CoordinateTransform,
    pub total: DepthRange,
}

/// Wheel/drag pan → viewport mutation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollSynchronizer;

impl ScrollSynchronizer {
    /// Convert a vertical pixel delta into a span-preserving viewport shift.
    ///
    /// Panning past the data edge stops at the edge; it never shrinks the
    /// visible span the way raw intersection clamping would.
    pub fn mutation(&self, ctx: &PaneContext, delta_px: f64) -> Mutation {
        let delta_depth = delta_px * ctx.transform.depth_per_pixel();
        let panned = ctx
            .transform
            .visible()
            .shifted_within(delta_depth, &ctx.total);
        Mutation::SetViewportRange {
            top: panned.top(),
            bottom: panned.bottom(),
        }
    }
}

/// Pointer move/click → cursor mutation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CursorSynchronizer;

impl CursorSynchronizer {
    /// Map a pointer's vertical pixel coordinate to a cursor depth.
    pub fn pointer_moved(&self, ctx: &PaneContext, y_px: f64) -> Mutation {
        Mutation::SetCursorDepth {
            depth: Some(ctx.transform.y_to_depth(y_px)),
        }
    }

    /// Clear the cursor when the pointer leaves the pane.
    pub fn pointer_left(&self) -> Mutation {
        Mutation::SetCursorDepth { depth: None }
    }
}

/// Drag-select → selection mutation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionSynchronizer;

impl SelectionSynchronizer {
    /// Map a drag between two pixel coordinates (in either order) to a
    /// selection range. A zero-height drag clears the selection.
    pub fn drag_select(&self, ctx: &PaneContext, start_y_px: f64, end_y_px: f64) -> Mutation {
        let a = ctx.transform.y_to_depth(start_y_px);
        let b = ctx.transform.y_to_depth(end_y_px);
        let (top, bottom) = if a <= b { (a, b) } else { (b, a) };
        Mutation::SetSelectionRange {
            range: DepthRange::new(top, bottom).ok(),
        }
    }

    /// Clear the selection.
    pub fn clear(&self) -> Mutation {
        Mutation::SetSelectionRange { range: None }
    }
}
