#![forbid(unsafe_code)]

//! Application-assembly layer.
//!
//! [`SyncEngine`] wires the pieces together the way the surrounding
//! application consumes them: it owns the [`StateStore`], the three
//! synchronizers, and the configuration, and exposes the two external
//! surfaces of the engine — the data-load collaborator's lifecycle calls
//! (attach/detach/resize/total-range) and the panes' gesture entry point.
//!
//! The store is constructor-injected here and passed nowhere else; panes and
//! synchronizers never hold long-lived copies of the state.

use strata_core::{CoordinateTransform, DepthRange};

use crate::adapter::{PaneId, SharedPane};
use crate::coalesce::GestureCoalescer;
use crate::config::SyncConfig;
use crate::gesture::Gesture;
use crate::store::{Mutation, StateStore, StoreError, StoreHandle};
use crate::synchronizer::{
    CursorSynchronizer, PaneContext, ScrollSynchronizer, SelectionSynchronizer,
};

/// Owner of the store and the gesture → mutation routing.
pub struct SyncEngine {
    store: StateStore,
    scroll: ScrollSynchronizer,
    cursor: CursorSynchronizer,
    selection: SelectionSynchronizer,
    config: SyncConfig,
}

impl SyncEngine {
    /// Engine for data spanning `total`, with default configuration.
    pub fn new(total: DepthRange) -> Self {
        Self::with_config(total, SyncConfig::default())
    }

    /// Engine with explicit configuration.
    pub fn with_config(total: DepthRange, config: SyncConfig) -> Self {
        Self {
            store: StateStore::with_config(total, &config),
            scroll: ScrollSynchronizer,
            cursor: CursorSynchronizer,
            selection: SelectionSynchronizer,
            config,
        }
    }

    /// The underlying store, for reads.
    #[inline]
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// The underlying store, for direct mutation by the data-load
    /// collaborator.
    #[inline]
    pub fn store_mut(&mut self) -> &mut StateStore {
        &mut self.store
    }

    /// Engine configuration.
    #[inline]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// A deferred-submission handle (see [`StoreHandle`]).
    pub fn handle(&self) -> StoreHandle {
        self.store.handle()
    }

    // -- lifecycle passthrough --------------------------------------------

    /// Register a pane; it receives the current state snapshot before this
    /// returns.
    pub fn attach(&mut self, adapter: SharedPane, canvas_height_px: u32) -> Result<PaneId, StoreError> {
        self.store.attach(adapter, canvas_height_px)
    }

    /// Unregister a pane. Idempotent.
    pub fn detach(&mut self, pane: PaneId) -> bool {
        self.store.detach(pane)
    }

    /// Record a pane's new canvas height.
    pub fn set_canvas_height(&mut self, pane: PaneId, height_px: u32) -> Result<(), StoreError> {
        self.store.set_canvas_height(pane, height_px)
    }

    /// New data loaded: replace the total depth bounds.
    pub fn set_total_range(&mut self, range: DepthRange) -> Result<(), StoreError> {
        self.store.set_total_range(range)
    }

    // -- gestures ----------------------------------------------------------

    /// Route one gesture from `pane` through the matching synchronizer into
    /// the store.
    ///
    /// The mutation is computed against the pane's current transform (its
    /// registered canvas height and the store's current visible range), then
    /// applied and broadcast to every pane, the originator included.
    pub fn handle_gesture(&mut self, pane: PaneId, gesture: Gesture) -> Result<(), StoreError> {
        let height = self.store.canvas_height(pane)?;
        let transform = CoordinateTransform::new(self.store.state().visible_range(), height)?;
        debug_assert!(
            transform.round_trip_within(
                transform.visible().midpoint(),
                self.config.pixel_tolerance_px
            ),
            "transform exceeds the configured round-trip tolerance"
        );
        let ctx = PaneContext {
            transform,
            total: self.store.state().total_range(),
        };
        tracing::debug!(pane = pane.get(), kind = ?gesture.kind(), "gesture");

        let mutation = match gesture {
            Gesture::ScrollBy { delta_px } => self.scroll.mutation(&ctx, delta_px),
            Gesture::PointerMoved { y_px } => self.cursor.pointer_moved(&ctx, y_px),
            Gesture::PointerLeft => self.cursor.pointer_left(),
            Gesture::DragSelect {
                start_y_px,
                end_y_px,
            } => self.selection.drag_select(&ctx, start_y_px, end_y_px),
            Gesture::ClearSelection => self.selection.clear(),
            Gesture::Zoom { factor, anchor } => Mutation::SetZoomFactor { factor, anchor },
        };
        self.store.submit_from(Some(pane), mutation)
    }

    /// Route a burst of gestures from `pane`.
    ///
    /// With [`SyncConfig::coalesce_input`] set, same-kind gestures collapse
    /// to their cumulative effect before being applied, so a 60Hz scroll
    /// flood costs one mutation cycle instead of dozens. Without it, this is
    /// a plain loop over [`handle_gesture`](Self::handle_gesture). Stops at
    /// the first error.
    pub fn handle_gestures<I>(&mut self, pane: PaneId, gestures: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = Gesture>,
    {
        if !self.config.coalesce_input {
            for gesture in gestures {
                self.handle_gesture(pane, gesture)?;
            }
            return Ok(());
        }

        let mut coalescer = GestureCoalescer::new();
        for gesture in gestures {
            if let Some(pass_through) = coalescer.push(gesture) {
                for pending in coalescer.flush() {
                    self.handle_gesture(pane, pending)?;
                }
                self.handle_gesture(pane, pass_through)?;
            }
        }
        for pending in coalescer.flush() {
            self.handle_gesture(pane, pending)?;
        }
        Ok(())
    }
}
