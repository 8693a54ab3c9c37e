#![forbid(unsafe_code)]

//! Cross-pane convergence checks.
//!
//! The single-source-of-truth property: at rest, every attached pane's
//! last-received broadcast for a field exactly matches the store's current
//! value. These checks compare bitwise, not within tolerance — broadcast
//! payloads are the stored values, never recomputed per pane.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use strata_core::DepthState;
use strata_sync::PaneId;

use crate::recording::RecordingPane;

/// A pane whose last-received value disagrees with the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Divergence {
    pub pane: PaneId,
    pub field: &'static str,
    pub got: String,
    pub want: String,
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} diverged on {}: last received {}, store holds {}",
            self.pane, self.field, self.got, self.want
        )
    }
}

impl std::error::Error for Divergence {}

/// Check that every recording pane's last-received values match `state`.
///
/// Returns the first divergence found. Panes attached via
/// [`attach_recording`](crate::recording::attach_recording) have seen every
/// field at least once (the attach snapshot), so a missing delivery is also
/// a divergence.
pub fn assert_converged(
    state: &DepthState,
    panes: &[(PaneId, Rc<RefCell<RecordingPane>>)],
) -> Result<(), Divergence> {
    for (id, pane) in panes {
        let pane = pane.borrow();

        match pane.last_viewport() {
            Some(range) if range == state.visible_range() => {}
            got => {
                return Err(diverged(*id, "viewport", &got, &state.visible_range()));
            }
        }
        match pane.last_zoom() {
            Some(factor) if factor == state.zoom_factor() => {}
            got => {
                return Err(diverged(*id, "zoom", &got, &state.zoom_factor()));
            }
        }
        match pane.last_cursor() {
            Some(depth) if depth == state.cursor_depth() => {}
            got => {
                return Err(diverged(*id, "cursor", &got, &state.cursor_depth()));
            }
        }
        match pane.last_selection() {
            Some(range) if range == state.selection_range() => {}
            got => {
                return Err(diverged(*id, "selection", &got, &state.selection_range()));
            }
        }
    }
    Ok(())
}

fn diverged<G: fmt::Debug, W: fmt::Debug>(
    pane: PaneId,
    field: &'static str,
    got: &G,
    want: &W,
) -> Divergence {
    Divergence {
        pane,
        field,
        got: format!("{got:?}"),
        want: format!("{want:?}"),
    }
}
