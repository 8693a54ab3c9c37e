#![forbid(unsafe_code)]

//! The contract rendering panes implement to stay depth-aligned.
//!
//! A pane is one independently rendered visualization surface. It never holds
//! a private copy of the depth state: it receives pushed updates through
//! [`PaneAdapter`], recomputes its local transform, and repaints. The core
//! assumes adapter calls are non-blocking and do not panic; draw failures
//! inside a pane are the pane's own concern.

use std::cell::RefCell;
use std::fmt;
use std::num::NonZeroU64;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use strata_core::DepthRange;

/// Identifier for an attached pane, allocated by the store on attach.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PaneId(NonZeroU64);

impl PaneId {
    /// Construct from a raw id. Returns `None` for zero.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// The raw id value.
    #[inline]
    pub const fn get(&self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pane#{}", self.0.get())
    }
}

/// Per-delivery metadata attached to every broadcast.
///
/// `seq` increases by one per broadcast notification; every pane observes the
/// same sequence in the same order. `origin` names the pane whose gesture
/// caused the mutation, when there was one: an originating pane may use it to
/// skip a redundant local repaint. That is an optimization only — repaints
/// must be idempotent, and every pane, originator included, receives the
/// echo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub seq: u64,
    pub origin: Option<PaneId>,
}

/// The operations a rendering pane implements to receive pushed state.
///
/// All methods are invoked synchronously during a broadcast, on the single
/// event-processing thread. A pane must tolerate receiving the echo of its
/// own gesture. To mutate state from inside a callback, submit through a
/// [`StoreHandle`](crate::store::StoreHandle); the mutation is applied after
/// the current broadcast completes.
pub trait PaneAdapter {
    /// The visible depth range changed. Recompute the local transform and
    /// repaint with the new top/bottom.
    fn on_viewport_range_changed(&mut self, range: DepthRange, meta: Delivery);

    /// The zoom factor changed. Always followed by a viewport notification
    /// carrying the post-zoom range.
    fn on_zoom_level_changed(&mut self, factor: f64, meta: Delivery);

    /// The cursor moved or was cleared. Draw or clear the cursor indicator
    /// at `depth_to_y(depth)`.
    fn on_cursor_depth_changed(&mut self, depth: Option<f64>, meta: Delivery);

    /// The selection changed or was cleared. Draw or clear the highlight.
    fn on_selection_range_changed(&mut self, range: Option<DepthRange>, meta: Delivery);

    /// This pane's canvas was resized. Recompute the local transform only;
    /// the visible range is untouched by a resize.
    fn on_canvas_resized(&mut self, height_px: u32);
}

/// Shared, single-threaded handle to a pane adapter.
pub type SharedPane = Rc<RefCell<dyn PaneAdapter>>;
