#![forbid(unsafe_code)]

//! The authoritative depth-state value object.
//!
//! [`DepthState`] holds everything the panes must agree on: the visible depth
//! range, the cursor depth, the selection, the zoom factor, and the total
//! data bounds. Exactly one mutable instance exists per document, owned by
//! the store in `strata-sync`; everything here is pure arithmetic so the
//! clamp and zoom rules can be tested without any pane wiring.
//!
//! # Invariants
//!
//! 1. `visible_range ⊆ total_range`.
//! 2. Cursor and selection, when set, lie within `total_range`.
//! 3. `zoom_factor == reference_span / visible_range.span()`.
//!
//! Every `apply_*` method is all-or-nothing: on `Err` the state is unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::depth::{DepthRange, RangeError};

/// The depth the viewport holds fixed on-screen while the zoom factor
/// changes.
///
/// The anchor is an explicit parameter of every zoom mutation rather than an
/// implicit conditional, so pointer-driven and keyboard-driven zoom gestures
/// can choose different policies per call site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ZoomAnchor {
    /// The cursor depth when one is set, otherwise the viewport midpoint.
    /// The usual policy for pointer-driven zoom.
    CursorOrCenter,
    /// Always the viewport midpoint. The usual policy for keyboard zoom.
    ViewCenter,
    /// An explicit depth, clamped to the visible range.
    Depth(f64),
}

impl ZoomAnchor {
    /// Resolve to a concrete depth inside the current visible range.
    ///
    /// A non-finite explicit depth falls back to the viewport midpoint.
    pub fn resolve(&self, state: &DepthState) -> f64 {
        let visible = state.visible_range;
        match self {
            Self::CursorOrCenter => state
                .cursor_depth
                .map_or_else(|| visible.midpoint(), |d| visible.clamp_depth(d)),
            Self::ViewCenter => visible.midpoint(),
            Self::Depth(d) if d.is_finite() => visible.clamp_depth(*d),
            Self::Depth(_) => visible.midpoint(),
        }
    }
}

/// A zoom factor that is not strictly positive and finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidZoom {
    pub factor: f64,
}

impl fmt::Display for InvalidZoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zoom factor {} must be positive and finite", self.factor)
    }
}

impl std::error::Error for InvalidZoom {}

/// Which fields a total-range update touched, with their new values.
///
/// The store broadcasts one notification per `Some` field.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TotalRangeEffects {
    pub viewport: Option<DepthRange>,
    pub zoom: Option<f64>,
    pub cursor: Option<Option<f64>>,
    pub selection: Option<Option<DepthRange>>,
}

/// The single source of truth for depth alignment across panes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthState {
    visible_range: DepthRange,
    cursor_depth: Option<f64>,
    selection_range: Option<DepthRange>,
    zoom_factor: f64,
    /// The visible span at zoom factor 1.0. Re-baselined whenever the
    /// viewport is set explicitly; zoom mutations are relative to it.
    reference_span: f64,
    total_range: DepthRange,
}

impl DepthState {
    /// Fresh state for newly loaded data: the whole of `total` is visible at
    /// zoom 1.0, with no cursor and no selection.
    pub fn initial(total: DepthRange) -> Self {
        Self {
            visible_range: total,
            cursor_depth: None,
            selection_range: None,
            zoom_factor: 1.0,
            reference_span: total.span(),
            total_range: total,
        }
    }

    /// Currently visible depth interval.
    #[inline]
    pub const fn visible_range(&self) -> DepthRange {
        self.visible_range
    }

    /// Cursor depth, if a cursor is shown.
    #[inline]
    pub const fn cursor_depth(&self) -> Option<f64> {
        self.cursor_depth
    }

    /// Selected depth interval, if any.
    #[inline]
    pub const fn selection_range(&self) -> Option<DepthRange> {
        self.selection_range
    }

    /// Current zoom factor relative to [`reference_span`](Self::reference_span).
    #[inline]
    pub const fn zoom_factor(&self) -> f64 {
        self.zoom_factor
    }

    /// The visible span corresponding to zoom factor 1.0.
    #[inline]
    pub const fn reference_span(&self) -> f64 {
        self.reference_span
    }

    /// Total data bounds.
    #[inline]
    pub const fn total_range(&self) -> DepthRange {
        self.total_range
    }

    /// Whether all structural invariants hold. Used by debug assertions and
    /// the test harness.
    pub fn is_consistent(&self) -> bool {
        let zoom_ok = (self.zoom_factor - self.reference_span / self.visible_range.span()).abs()
            <= self.zoom_factor * 1e-9;
        let cursor_ok = self
            .cursor_depth
            .is_none_or(|d| self.total_range.contains(d));
        let selection_ok = self
            .selection_range
            .is_none_or(|s| s.is_subrange_of(&self.total_range));
        self.visible_range.is_subrange_of(&self.total_range) && zoom_ok && cursor_ok && selection_ok
    }

    /// Set the visible range, clamping it to the total bounds.
    ///
    /// The clamped span becomes the new zoom baseline: the zoom factor reads
    /// 1.0 after an explicit viewport set, and subsequent zoom mutations are
    /// relative to this span. Fails when the input is malformed or has no
    /// overlap with the data bounds; returns the clamped range actually
    /// stored.
    pub fn apply_viewport(&mut self, top: f64, bottom: f64) -> Result<DepthRange, RangeError> {
        let requested = DepthRange::new(top, bottom)?;
        let clamped = requested
            .intersection(&self.total_range)
            .ok_or(RangeError::OutsideTotal { top, bottom })?;
        self.visible_range = clamped;
        self.reference_span = clamped.span();
        self.zoom_factor = 1.0;
        Ok(clamped)
    }

    /// Set or clear the cursor, clamping a set depth to the total bounds.
    /// Returns the value actually stored.
    pub fn apply_cursor(&mut self, depth: Option<f64>) -> Result<Option<f64>, RangeError> {
        let stored = match depth {
            Some(d) if !d.is_finite() => return Err(RangeError::NonFinite { value: d }),
            Some(d) => Some(self.total_range.clamp_depth(d)),
            None => None,
        };
        self.cursor_depth = stored;
        Ok(stored)
    }

    /// Set or clear the selection, clamping a set range to the total bounds.
    /// Fails when a set range has no overlap with the bounds.
    pub fn apply_selection(
        &mut self,
        range: Option<DepthRange>,
    ) -> Result<Option<DepthRange>, RangeError> {
        let stored = match range {
            Some(r) => Some(r.intersection(&self.total_range).ok_or(
                RangeError::OutsideTotal {
                    top: r.top(),
                    bottom: r.bottom(),
                },
            )?),
            None => None,
        };
        self.selection_range = stored;
        Ok(stored)
    }

    /// Change the zoom factor, holding the anchor depth's screen position.
    ///
    /// The new visible span is `reference_span / factor`. The resulting range
    /// is pushed back inside the total bounds without shrinking, and the
    /// stored factor is recomputed from the final span so invariant 3 holds
    /// even when clamping intervened. Returns `(zoom_factor, visible_range)`
    /// as stored.
    pub fn apply_zoom(
        &mut self,
        factor: f64,
        anchor: ZoomAnchor,
    ) -> Result<(f64, DepthRange), InvalidZoom> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(InvalidZoom { factor });
        }
        let new_span = self.reference_span / factor;
        if !new_span.is_finite() || new_span <= 0.0 {
            return Err(InvalidZoom { factor });
        }

        let anchor_depth = anchor.resolve(self);
        let fraction =
            ((anchor_depth - self.visible_range.top()) / self.visible_range.span()).clamp(0.0, 1.0);
        let top = anchor_depth - fraction * new_span;
        // top < top + new_span always holds here, so construction cannot fail.
        let candidate = match DepthRange::new(top, top + new_span) {
            Ok(r) => r,
            Err(_) => return Err(InvalidZoom { factor }),
        };

        let clamped = candidate.shifted_within(0.0, &self.total_range);
        self.visible_range = clamped;
        self.zoom_factor = self.reference_span / clamped.span();
        Ok((self.zoom_factor, clamped))
    }

    /// Replace the total data bounds, re-clamping every dependent field.
    ///
    /// A visible range left with no overlap resets to the full new bounds at
    /// zoom 1.0; otherwise the overlap survives and the zoom factor is
    /// recomputed against the unchanged baseline. A selection with no overlap
    /// is cleared; a cursor outside the bounds clamps to the nearest edge.
    pub fn apply_total(&mut self, total: DepthRange) -> TotalRangeEffects {
        let mut effects = TotalRangeEffects::default();
        self.total_range = total;

        match self.visible_range.intersection(&total) {
            Some(clamped) if clamped == self.visible_range => {}
            Some(clamped) => {
                self.visible_range = clamped;
                self.zoom_factor = self.reference_span / clamped.span();
                effects.viewport = Some(clamped);
                effects.zoom = Some(self.zoom_factor);
            }
            None => {
                self.visible_range = total;
                self.reference_span = total.span();
                self.zoom_factor = 1.0;
                effects.viewport = Some(total);
                effects.zoom = Some(1.0);
            }
        }

        if let Some(cursor) = self.cursor_depth {
            let clamped = total.clamp_depth(cursor);
            if clamped != cursor {
                self.cursor_depth = Some(clamped);
                effects.cursor = Some(Some(clamped));
            }
        }

        if let Some(selection) = self.selection_range {
            match selection.intersection(&total) {
                Some(clamped) if clamped == selection => {}
                clamped => {
                    self.selection_range = clamped;
                    effects.selection = Some(clamped);
                }
            }
        }

        debug_assert!(self.is_consistent());
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::{DepthState, InvalidZoom, ZoomAnchor};
    use crate::depth::{DepthRange, RangeError};

    fn range(top: f64, bottom: f64) -> DepthRange {
        DepthRange::new(top, bottom).unwrap()
    }

    fn state_0_1000() -> DepthState {
        DepthState::initial(range(0.0, 1000.0))
    }

    #[test]
    fn initial_state_shows_everything() {
        let state = state_0_1000();
        assert_eq!(state.visible_range(), range(0.0, 1000.0));
        assert_eq!(state.zoom_factor(), 1.0);
        assert_eq!(state.cursor_depth(), None);
        assert_eq!(state.selection_range(), None);
        assert!(state.is_consistent());
    }

    #[test]
    fn viewport_clamps_to_total() {
        let mut state = state_0_1000();
        let stored = state.apply_viewport(-50.0, 50.0).unwrap();
        assert_eq!(stored, range(0.0, 50.0));
        assert_eq!(state.visible_range(), range(0.0, 50.0));
        assert!(state.is_consistent());
    }

    #[test]
    fn viewport_outside_total_is_rejected_unchanged() {
        let mut state = state_0_1000();
        let before = state.clone();
        assert_eq!(
            state.apply_viewport(2000.0, 3000.0),
            Err(RangeError::OutsideTotal {
                top: 2000.0,
                bottom: 3000.0
            })
        );
        assert_eq!(state, before);
    }

    #[test]
    fn viewport_rebaselines_zoom() {
        let mut state = state_0_1000();
        state.apply_viewport(100.0, 200.0).unwrap();
        assert_eq!(state.zoom_factor(), 1.0);
        assert_eq!(state.reference_span(), 100.0);
    }

    #[test]
    fn cursor_clamps_to_nearest_bound() {
        let mut state = state_0_1000();
        assert_eq!(state.apply_cursor(Some(-25.0)), Ok(Some(0.0)));
        assert_eq!(state.apply_cursor(Some(1250.0)), Ok(Some(1000.0)));
        assert_eq!(state.apply_cursor(None), Ok(None));
    }

    #[test]
    fn cursor_rejects_nan() {
        let mut state = state_0_1000();
        assert!(matches!(
            state.apply_cursor(Some(f64::NAN)),
            Err(RangeError::NonFinite { .. })
        ));
        assert_eq!(state.cursor_depth(), None);
    }

    #[test]
    fn zoom_anchored_on_cursor() {
        let mut state = state_0_1000();
        state.apply_viewport(100.0, 200.0).unwrap();
        state.apply_cursor(Some(150.0)).unwrap();
        let (factor, visible) = state.apply_zoom(2.0, ZoomAnchor::CursorOrCenter).unwrap();
        assert_eq!(factor, 2.0);
        assert_eq!(visible, range(125.0, 175.0));
    }

    #[test]
    fn zoom_without_cursor_anchors_on_midpoint() {
        let mut state = state_0_1000();
        state.apply_viewport(100.0, 200.0).unwrap();
        let (_, visible) = state.apply_zoom(2.0, ZoomAnchor::CursorOrCenter).unwrap();
        assert_eq!(visible, range(125.0, 175.0));
    }

    #[test]
    fn zoom_keeps_anchor_screen_fraction() {
        let mut state = state_0_1000();
        state.apply_viewport(100.0, 200.0).unwrap();
        // Anchor at 120 sits at fraction 0.2 of the viewport.
        let (_, visible) = state.apply_zoom(4.0, ZoomAnchor::Depth(120.0)).unwrap();
        assert_eq!(visible.span(), 25.0);
        let fraction = (120.0 - visible.top()) / visible.span();
        assert!((fraction - 0.2).abs() < 1e-9);
    }

    #[test]
    fn zoom_out_clamps_at_data_edge() {
        let mut state = state_0_1000();
        state.apply_viewport(0.0, 100.0).unwrap();
        // Zooming out to a 400-unit span near the top edge must not escape
        // the bounds, and the stored factor reflects the final span.
        let (factor, visible) = state.apply_zoom(0.25, ZoomAnchor::ViewCenter).unwrap();
        assert!(visible.is_subrange_of(&range(0.0, 1000.0)));
        assert_eq!(visible.span(), 400.0);
        assert_eq!(visible.top(), 0.0);
        assert_eq!(factor, 0.25);
    }

    #[test]
    fn zoom_out_past_total_settles_on_full_bounds() {
        let mut state = state_0_1000();
        state.apply_viewport(400.0, 600.0).unwrap();
        let (factor, visible) = state.apply_zoom(0.05, ZoomAnchor::ViewCenter).unwrap();
        assert_eq!(visible, range(0.0, 1000.0));
        assert_eq!(factor, 200.0 / 1000.0);
        assert!(state.is_consistent());
    }

    #[test]
    fn zoom_rejects_non_positive_factor() {
        let mut state = state_0_1000();
        let before = state.clone();
        assert_eq!(
            state.apply_zoom(0.0, ZoomAnchor::ViewCenter),
            Err(InvalidZoom { factor: 0.0 })
        );
        assert!(state.apply_zoom(-1.5, ZoomAnchor::ViewCenter).is_err());
        assert!(state.apply_zoom(f64::NAN, ZoomAnchor::ViewCenter).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn selection_clamps_and_clears() {
        let mut state = state_0_1000();
        let stored = state.apply_selection(Some(range(900.0, 1100.0))).unwrap();
        assert_eq!(stored, Some(range(900.0, 1000.0)));
        assert_eq!(state.apply_selection(None), Ok(None));
    }

    #[test]
    fn shrinking_total_reclamps_everything() {
        let mut state = state_0_1000();
        state.apply_viewport(100.0, 600.0).unwrap();
        state.apply_cursor(Some(550.0)).unwrap();
        state.apply_selection(Some(range(400.0, 580.0))).unwrap();

        let effects = state.apply_total(range(0.0, 500.0));
        assert_eq!(effects.viewport, Some(range(100.0, 500.0)));
        assert_eq!(effects.cursor, Some(Some(500.0)));
        assert_eq!(effects.selection, Some(Some(range(400.0, 500.0))));
        assert!(state.is_consistent());
    }

    #[test]
    fn disjoint_total_resets_viewport() {
        let mut state = state_0_1000();
        state.apply_viewport(0.0, 100.0).unwrap();
        let effects = state.apply_total(range(5000.0, 6000.0));
        assert_eq!(effects.viewport, Some(range(5000.0, 6000.0)));
        assert_eq!(effects.zoom, Some(1.0));
        assert_eq!(state.zoom_factor(), 1.0);
    }

    #[test]
    fn growing_total_changes_nothing_visible() {
        let mut state = state_0_1000();
        state.apply_viewport(100.0, 200.0).unwrap();
        state.apply_cursor(Some(150.0)).unwrap();
        let effects = state.apply_total(range(-500.0, 2000.0));
        assert_eq!(effects, super::TotalRangeEffects::default());
    }

    #[test]
    fn state_round_trips_through_json() {
        let mut state = state_0_1000();
        state.apply_viewport(100.0, 200.0).unwrap();
        state.apply_cursor(Some(150.0)).unwrap();
        let json = serde_json::to_string(&state).unwrap();
        let back: DepthState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn anchor_resolution() {
        let mut state = state_0_1000();
        state.apply_viewport(100.0, 200.0).unwrap();
        assert_eq!(ZoomAnchor::ViewCenter.resolve(&state), 150.0);
        assert_eq!(ZoomAnchor::Depth(170.0).resolve(&state), 170.0);
        // Explicit anchors outside the viewport clamp to it.
        assert_eq!(ZoomAnchor::Depth(500.0).resolve(&state), 200.0);
        assert_eq!(ZoomAnchor::CursorOrCenter.resolve(&state), 150.0);
        state.apply_cursor(Some(130.0)).unwrap();
        assert_eq!(ZoomAnchor::CursorOrCenter.resolve(&state), 130.0);
    }
}
