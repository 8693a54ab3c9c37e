#![forbid(unsafe_code)]

//! Gesture coalescing for high-frequency interaction.
//!
//! Continuous interaction arrives at ~60 updates/second per pane; a flood of
//! scroll or pointer gestures would otherwise trigger one full mutate +
//! broadcast cycle each. [`GestureCoalescer`] collapses bursts of same-kind
//! gestures so only the cumulative effect is applied:
//!
//! - Scroll deltas accumulate (a burst of `ScrollBy` becomes one shift by
//!   the summed delta).
//! - Pointer and selection gestures keep only the latest ("latest wins").
//! - Zoom gestures pass through immediately; the caller flushes pending
//!   gestures first to preserve relative ordering.
//!
//! Only the final observed state must be correct; skipped intermediate
//! broadcasts cost smoothness, never consistency.

use crate::gesture::Gesture;

/// Collapses bursts of same-kind gestures to bound broadcast frequency.
///
/// Not thread-safe; lives on the single event-processing thread. Holds at
/// most three pending gestures, one per coalescable kind. All operations are
/// O(1).
#[derive(Debug, Clone, Copy, Default)]
pub struct GestureCoalescer {
    /// Accumulated scroll delta in pixels.
    pending_scroll_px: Option<f64>,
    /// Latest pointer gesture (move or leave).
    pending_cursor: Option<Gesture>,
    /// Latest selection gesture (drag or clear).
    pending_selection: Option<Gesture>,
}

impl GestureCoalescer {
    /// Create an empty coalescer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a gesture.
    ///
    /// Returns `Some(gesture)` when it must be processed immediately (zoom),
    /// or `None` when it was absorbed into the pending set. When a gesture
    /// passes through, the caller should [`flush`](Self::flush) pending
    /// gestures first so the cumulative effects apply in order.
    pub fn push(&mut self, gesture: Gesture) -> Option<Gesture> {
        match gesture {
            Gesture::ScrollBy { delta_px } => {
                self.pending_scroll_px = Some(self.pending_scroll_px.unwrap_or(0.0) + delta_px);
                None
            }
            Gesture::PointerMoved { .. } | Gesture::PointerLeft => {
                self.pending_cursor = Some(gesture);
                None
            }
            Gesture::DragSelect { .. } | Gesture::ClearSelection => {
                self.pending_selection = Some(gesture);
                None
            }
            Gesture::Zoom { .. } => Some(gesture),
        }
    }

    /// Take all pending gestures, in scroll → cursor → selection order.
    pub fn flush(&mut self) -> Vec<Gesture> {
        let mut out = Vec::with_capacity(self.pending_count());
        if let Some(delta_px) = self.pending_scroll_px.take() {
            out.push(Gesture::ScrollBy { delta_px });
        }
        if let Some(gesture) = self.pending_cursor.take() {
            out.push(gesture);
        }
        if let Some(gesture) = self.pending_selection.take() {
            out.push(gesture);
        }
        out
    }

    /// Number of pending coalesced gestures.
    pub fn pending_count(&self) -> usize {
        usize::from(self.pending_scroll_px.is_some())
            + usize::from(self.pending_cursor.is_some())
            + usize::from(self.pending_selection.is_some())
    }
}

#[cfg(test)]
mod tests {
    use strata_core::ZoomAnchor;

    use super::GestureCoalescer;
    use crate::gesture::Gesture;

    #[test]
    fn scroll_deltas_accumulate() {
        let mut c = GestureCoalescer::new();
        assert!(c.push(Gesture::ScrollBy { delta_px: 10.0 }).is_none());
        assert!(c.push(Gesture::ScrollBy { delta_px: -4.0 }).is_none());
        assert!(c.push(Gesture::ScrollBy { delta_px: 6.0 }).is_none());
        assert_eq!(c.flush(), vec![Gesture::ScrollBy { delta_px: 12.0 }]);
        assert_eq!(c.pending_count(), 0);
    }

    #[test]
    fn latest_pointer_wins() {
        let mut c = GestureCoalescer::new();
        c.push(Gesture::PointerMoved { y_px: 10.0 });
        c.push(Gesture::PointerMoved { y_px: 99.0 });
        assert_eq!(c.flush(), vec![Gesture::PointerMoved { y_px: 99.0 }]);
    }

    #[test]
    fn pointer_leave_supersedes_moves() {
        let mut c = GestureCoalescer::new();
        c.push(Gesture::PointerMoved { y_px: 10.0 });
        c.push(Gesture::PointerLeft);
        assert_eq!(c.flush(), vec![Gesture::PointerLeft]);
    }

    #[test]
    fn zoom_passes_through() {
        let mut c = GestureCoalescer::new();
        c.push(Gesture::ScrollBy { delta_px: 5.0 });
        let passed = c.push(Gesture::Zoom {
            factor: 2.0,
            anchor: ZoomAnchor::ViewCenter,
        });
        assert!(matches!(passed, Some(Gesture::Zoom { .. })));
        // The scroll is still pending; the caller flushes it before the zoom.
        assert_eq!(c.pending_count(), 1);
    }

    #[test]
    fn flush_order_is_scroll_cursor_selection() {
        let mut c = GestureCoalescer::new();
        c.push(Gesture::ClearSelection);
        c.push(Gesture::PointerMoved { y_px: 1.0 });
        c.push(Gesture::ScrollBy { delta_px: 2.0 });
        let flushed = c.flush();
        assert_eq!(
            flushed,
            vec![
                Gesture::ScrollBy { delta_px: 2.0 },
                Gesture::PointerMoved { y_px: 1.0 },
                Gesture::ClearSelection,
            ]
        );
    }
}
