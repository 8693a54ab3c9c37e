#![forbid(unsafe_code)]

//! The single source of truth for depth alignment.
//!
//! [`StateStore`] owns the one mutable [`DepthState`], the ordered list of
//! attached panes, and the deferred-mutation inbox. Every mutation is applied
//! all-or-nothing and broadcast synchronously to every attached pane,
//! originator included, before the mutator returns.
//!
//! # Re-entrancy
//!
//! Exactly one mutation is in flight at a time. Direct mutator calls cannot
//! overlap a broadcast (they need `&mut StateStore`, which the broadcast loop
//! holds); mutations submitted from inside an adapter callback go through a
//! [`StoreHandle`] into the inbox and are applied strictly after the current
//! broadcast completes, in submission order. Feedback-loop prevention is
//! therefore structural — there is no per-pane suppression guard — and a
//! budget on deferred mutations per cycle bounds misbehaving panes.
//!
//! # Invariants
//!
//! 1. After any mutator returns, every attached pane has observed the new
//!    value; no pane is stale at rest.
//! 2. Broadcast sequence numbers are strictly increasing and observed in the
//!    same order by every pane.
//! 3. A detached pane receives no further calls, ever.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use strata_core::{
    DepthRange, DepthState, InvalidZoom, RangeError, TransformError, ZoomAnchor,
};

use crate::adapter::{Delivery, PaneId, SharedPane};
use crate::config::SyncConfig;

// ---------------------------------------------------------------------------
// Mutations and broadcast events
// ---------------------------------------------------------------------------

/// A single atomic change request against the depth state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Mutation {
    SetViewportRange { top: f64, bottom: f64 },
    SetCursorDepth { depth: Option<f64> },
    SetSelectionRange { range: Option<DepthRange> },
    SetZoomFactor { factor: f64, anchor: ZoomAnchor },
    SetTotalRange { range: DepthRange },
}

impl Mutation {
    /// Coalescing/logging category.
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::SetViewportRange { .. } => MutationKind::Viewport,
            Self::SetCursorDepth { .. } => MutationKind::Cursor,
            Self::SetSelectionRange { .. } => MutationKind::Selection,
            Self::SetZoomFactor { .. } => MutationKind::Zoom,
            Self::SetTotalRange { .. } => MutationKind::Total,
        }
    }
}

/// Mutation categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutationKind {
    Viewport,
    Cursor,
    Selection,
    Zoom,
    Total,
}

/// One field change produced by an applied mutation, in broadcast order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateEvent {
    ZoomLevelChanged(f64),
    ViewportRangeChanged(DepthRange),
    CursorDepthChanged(Option<f64>),
    SelectionRangeChanged(Option<DepthRange>),
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Contract violations reported synchronously to the caller.
///
/// Clamping to the total bounds is intended behavior, not an error; these
/// fire only for malformed input or lifecycle misuse, and the state is left
/// unchanged when they do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoreError {
    /// Malformed range, or a range with no overlap with the data bounds.
    InvalidRange(RangeError),
    /// Non-positive or non-finite zoom factor.
    InvalidZoom(InvalidZoom),
    /// The adapter is already registered.
    AlreadyAttached { pane: PaneId },
    /// The pane is not registered.
    NotAttached { pane: PaneId },
    /// Zero canvas height or zero-span viewport in a transform.
    DegenerateRange(TransformError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRange(err) => write!(f, "invalid range: {err}"),
            Self::InvalidZoom(err) => write!(f, "invalid zoom: {err}"),
            Self::AlreadyAttached { pane } => write!(f, "{pane} is already attached"),
            Self::NotAttached { pane } => write!(f, "{pane} is not attached"),
            Self::DegenerateRange(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRange(err) => Some(err),
            Self::InvalidZoom(err) => Some(err),
            Self::DegenerateRange(err) => Some(err),
            Self::AlreadyAttached { .. } | Self::NotAttached { .. } => None,
        }
    }
}

impl From<RangeError> for StoreError {
    fn from(err: RangeError) -> Self {
        Self::InvalidRange(err)
    }
}

impl From<InvalidZoom> for StoreError {
    fn from(err: InvalidZoom) -> Self {
        Self::InvalidZoom(err)
    }
}

impl From<TransformError> for StoreError {
    fn from(err: TransformError) -> Self {
        Self::DegenerateRange(err)
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// One attached pane: identity, adapter, and current canvas height.
///
/// Created on attach, destroyed on detach; owned exclusively by the store.
struct PaneRegistration {
    id: PaneId,
    adapter: SharedPane,
    canvas_height_px: u32,
}

// ---------------------------------------------------------------------------
// StoreHandle
// ---------------------------------------------------------------------------

/// Cloneable submission handle for mutations originating inside broadcast
/// callbacks (or any other place without `&mut StateStore`).
///
/// Handle submissions land in the store's inbox and are applied at the end of
/// the current mutation cycle — or, when the store is idle, at the next
/// direct mutation or explicit [`StateStore::pump_deferred`] call.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    inbox: Weak<RefCell<VecDeque<Mutation>>>,
}

impl StoreHandle {
    /// Queue a mutation. Returns `false` if the store no longer exists.
    pub fn submit(&self, mutation: Mutation) -> bool {
        match self.inbox.upgrade() {
            Some(inbox) => {
                inbox.borrow_mut().push_back(mutation);
                true
            }
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// StateStore
// ---------------------------------------------------------------------------

/// Owner of the authoritative [`DepthState`] and the pane registry.
pub struct StateStore {
    state: DepthState,
    panes: Vec<PaneRegistration>,
    ids: FxHashMap<PaneId, usize>,
    next_pane_id: u64,
    seq: u64,
    broadcasting: bool,
    inbox: Rc<RefCell<VecDeque<Mutation>>>,
    max_deferred_mutations: usize,
}

impl StateStore {
    /// Create a store for data spanning `total`, with default configuration.
    /// The initial state shows the whole of `total` at zoom 1.0.
    pub fn new(total: DepthRange) -> Self {
        Self::with_config(total, &SyncConfig::default())
    }

    /// Create a store with explicit configuration.
    pub fn with_config(total: DepthRange, config: &SyncConfig) -> Self {
        Self {
            state: DepthState::initial(total),
            panes: Vec::new(),
            ids: FxHashMap::default(),
            next_pane_id: 1,
            seq: 0,
            broadcasting: false,
            inbox: Rc::new(RefCell::new(VecDeque::new())),
            max_deferred_mutations: config.max_deferred_mutations,
        }
    }

    /// The current authoritative state.
    #[inline]
    pub fn state(&self) -> &DepthState {
        &self.state
    }

    /// A submission handle for use inside broadcast callbacks.
    pub fn handle(&self) -> StoreHandle {
        StoreHandle {
            inbox: Rc::downgrade(&self.inbox),
        }
    }

    /// Number of attached panes.
    #[inline]
    pub fn pane_count(&self) -> usize {
        self.panes.len()
    }

    /// Whether `pane` is currently attached.
    #[inline]
    pub fn is_attached(&self, pane: PaneId) -> bool {
        self.ids.contains_key(&pane)
    }

    /// The registered canvas height of an attached pane.
    pub fn canvas_height(&self, pane: PaneId) -> Result<u32, StoreError> {
        self.ids
            .get(&pane)
            .map(|&idx| self.panes[idx].canvas_height_px)
            .ok_or(StoreError::NotAttached { pane })
    }

    /// Latest broadcast sequence number.
    #[inline]
    pub fn last_seq(&self) -> u64 {
        self.seq
    }

    // -- lifecycle ---------------------------------------------------------

    /// Register a pane and synchronously deliver the current state snapshot
    /// to it before returning.
    ///
    /// Fails with `AlreadyAttached` when the same adapter is already
    /// registered, and with `DegenerateRange` for a zero canvas height.
    pub fn attach(&mut self, adapter: SharedPane, canvas_height_px: u32) -> Result<PaneId, StoreError> {
        if canvas_height_px == 0 {
            return Err(StoreError::DegenerateRange(TransformError::DegenerateRange {
                span: self.state.visible_range().span(),
                canvas_height_px,
            }));
        }
        if let Some(existing) = self
            .panes
            .iter()
            .find(|reg| Rc::ptr_eq(&reg.adapter, &adapter))
        {
            return Err(StoreError::AlreadyAttached { pane: existing.id });
        }

        // The counter starts at 1 and only increments.
        let id = PaneId::new(self.next_pane_id)
            .unwrap_or_else(|| unreachable!("pane id counter is never zero"));
        self.next_pane_id += 1;
        self.ids.insert(id, self.panes.len());
        self.panes.push(PaneRegistration {
            id,
            adapter: Rc::clone(&adapter),
            canvas_height_px,
        });
        tracing::debug!(pane = id.get(), height = canvas_height_px, "pane attached");

        // Snapshot delivery: the new pane sees every field before attach
        // returns. Other panes are already current and receive nothing.
        self.broadcasting = true;
        {
            let mut pane = adapter.borrow_mut();
            for event in [
                StateEvent::ViewportRangeChanged(self.state.visible_range()),
                StateEvent::ZoomLevelChanged(self.state.zoom_factor()),
                StateEvent::CursorDepthChanged(self.state.cursor_depth()),
                StateEvent::SelectionRangeChanged(self.state.selection_range()),
            ] {
                self.seq += 1;
                deliver(&mut *pane, &event, Delivery { seq: self.seq, origin: None });
            }
        }
        self.broadcasting = false;
        self.drain_inbox();
        Ok(id)
    }

    /// Unregister a pane. Idempotent: returns `false` when the pane was not
    /// attached. A detached pane receives no further calls.
    pub fn detach(&mut self, pane: PaneId) -> bool {
        let Some(idx) = self.ids.remove(&pane) else {
            return false;
        };
        self.panes.remove(idx);
        // Indices after the removed slot shifted down by one.
        for (i, reg) in self.panes.iter().enumerate().skip(idx) {
            self.ids.insert(reg.id, i);
        }
        tracing::debug!(pane = pane.get(), "pane detached");
        true
    }

    /// Record a pane's new canvas height and notify that pane only.
    ///
    /// Resizing never mutates the visible range; the pane recomputes its
    /// transform against the unchanged viewport.
    pub fn set_canvas_height(&mut self, pane: PaneId, height_px: u32) -> Result<(), StoreError> {
        if height_px == 0 {
            return Err(StoreError::DegenerateRange(TransformError::DegenerateRange {
                span: self.state.visible_range().span(),
                canvas_height_px: height_px,
            }));
        }
        let idx = *self.ids.get(&pane).ok_or(StoreError::NotAttached { pane })?;
        self.panes[idx].canvas_height_px = height_px;
        let adapter = Rc::clone(&self.panes[idx].adapter);
        adapter.borrow_mut().on_canvas_resized(height_px);
        self.drain_inbox();
        Ok(())
    }

    // -- mutators ----------------------------------------------------------

    /// Set the visible range, clamped to the total bounds.
    ///
    /// Broadcasts `viewport_range_changed` even when the clamped result
    /// equals the current range: repeated identical calls produce
    /// content-identical broadcasts rather than silence.
    pub fn set_viewport_range(&mut self, top: f64, bottom: f64) -> Result<(), StoreError> {
        self.submit_from(None, Mutation::SetViewportRange { top, bottom })
    }

    /// Set or clear the cursor depth, clamped to the total bounds.
    pub fn set_cursor_depth(&mut self, depth: Option<f64>) -> Result<(), StoreError> {
        self.submit_from(None, Mutation::SetCursorDepth { depth })
    }

    /// Set or clear the selection, clamped to the total bounds.
    pub fn set_selection_range(&mut self, range: Option<DepthRange>) -> Result<(), StoreError> {
        self.submit_from(None, Mutation::SetSelectionRange { range })
    }

    /// Change the zoom factor around an explicit anchor.
    ///
    /// Broadcasts `zoom_level_changed` followed by `viewport_range_changed`.
    pub fn set_zoom_factor(&mut self, factor: f64, anchor: ZoomAnchor) -> Result<(), StoreError> {
        self.submit_from(None, Mutation::SetZoomFactor { factor, anchor })
    }

    /// Replace the total data bounds (new data load), re-clamping the
    /// viewport, cursor, and selection, and broadcasting each field that
    /// changed.
    pub fn set_total_range(&mut self, range: DepthRange) -> Result<(), StoreError> {
        self.submit_from(None, Mutation::SetTotalRange { range })
    }

    /// Apply one mutation attributed to `origin`, broadcast the resulting
    /// field changes, then drain any mutations deferred during the
    /// broadcast.
    ///
    /// This is the single entry point every mutator funnels through; the
    /// state is unchanged on error.
    pub fn submit_from(
        &mut self,
        origin: Option<PaneId>,
        mutation: Mutation,
    ) -> Result<(), StoreError> {
        debug_assert!(!self.broadcasting, "mutator re-entered during broadcast");
        let events = self.apply(&mutation)?;
        self.broadcast(origin, &events);
        self.drain_inbox();
        Ok(())
    }

    /// Drain deferred handle submissions without applying a new mutation.
    /// For embedding event loops that tick between gestures.
    pub fn pump_deferred(&mut self) {
        self.drain_inbox();
    }

    // -- internals ---------------------------------------------------------

    fn apply(&mut self, mutation: &Mutation) -> Result<Vec<StateEvent>, StoreError> {
        let events = match *mutation {
            Mutation::SetViewportRange { top, bottom } => {
                let stored = self.state.apply_viewport(top, bottom)?;
                vec![StateEvent::ViewportRangeChanged(stored)]
            }
            Mutation::SetCursorDepth { depth } => {
                let stored = self.state.apply_cursor(depth)?;
                vec![StateEvent::CursorDepthChanged(stored)]
            }
            Mutation::SetSelectionRange { range } => {
                let stored = self.state.apply_selection(range)?;
                vec![StateEvent::SelectionRangeChanged(stored)]
            }
            Mutation::SetZoomFactor { factor, anchor } => {
                let (stored_factor, visible) = self.state.apply_zoom(factor, anchor)?;
                vec![
                    StateEvent::ZoomLevelChanged(stored_factor),
                    StateEvent::ViewportRangeChanged(visible),
                ]
            }
            Mutation::SetTotalRange { range } => {
                let effects = self.state.apply_total(range);
                let mut events = Vec::new();
                if let Some(factor) = effects.zoom {
                    events.push(StateEvent::ZoomLevelChanged(factor));
                }
                if let Some(visible) = effects.viewport {
                    events.push(StateEvent::ViewportRangeChanged(visible));
                }
                if let Some(cursor) = effects.cursor {
                    events.push(StateEvent::CursorDepthChanged(cursor));
                }
                if let Some(selection) = effects.selection {
                    events.push(StateEvent::SelectionRangeChanged(selection));
                }
                events
            }
        };
        Ok(events)
    }

    fn broadcast(&mut self, origin: Option<PaneId>, events: &[StateEvent]) {
        self.broadcasting = true;
        for event in events {
            self.seq += 1;
            let meta = Delivery {
                seq: self.seq,
                origin,
            };
            tracing::trace!(seq = meta.seq, event = ?event, "broadcast");
            for reg in &self.panes {
                deliver(&mut *reg.adapter.borrow_mut(), event, meta);
            }
        }
        self.broadcasting = false;
    }

    fn drain_inbox(&mut self) {
        let mut applied = 0usize;
        loop {
            let next = self.inbox.borrow_mut().pop_front();
            let Some(mutation) = next else { break };
            if applied == self.max_deferred_mutations {
                let dropped = 1 + self.inbox.borrow().len();
                self.inbox.borrow_mut().clear();
                tracing::warn!(dropped, "deferred mutation budget exhausted");
                break;
            }
            applied += 1;
            match self.apply(&mutation) {
                Ok(events) => self.broadcast(None, &events),
                // No caller left to report to; deferred rejects are logged.
                Err(err) => {
                    tracing::warn!(error = %err, kind = ?mutation.kind(), "deferred mutation rejected");
                }
            }
        }
    }
}

fn deliver(pane: &mut dyn crate::adapter::PaneAdapter, event: &StateEvent, meta: Delivery) {
    match *event {
        StateEvent::ViewportRangeChanged(range) => pane.on_viewport_range_changed(range, meta),
        StateEvent::ZoomLevelChanged(factor) => pane.on_zoom_level_changed(factor, meta),
        StateEvent::CursorDepthChanged(depth) => pane.on_cursor_depth_changed(depth, meta),
        StateEvent::SelectionRangeChanged(range) => pane.on_selection_range_changed(range, meta),
    }
}
