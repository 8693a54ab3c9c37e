#![forbid(unsafe_code)]

//! Engine configuration.

use serde::{Deserialize, Serialize};
use strata_core::DEFAULT_PIXEL_TOLERANCE_PX;

/// Tunables for the synchronization engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Round-trip tolerance for the depth↔pixel transform, in device pixels
    /// (default: 0.5). The engine asserts every gesture transform honors it.
    pub pixel_tolerance_px: f64,
    /// Coalesce bursts of same-kind gestures before applying them, keeping
    /// only the cumulative effect (default: false). Intermediate broadcasts
    /// are smoothness, not correctness; only the final state must agree.
    pub coalesce_input: bool,
    /// Upper bound on mutations a single broadcast cycle may enqueue through
    /// store handles before the remainder is dropped with a warning
    /// (default: 64). Bounds misbehaving feedback loops.
    pub max_deferred_mutations: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            pixel_tolerance_px: DEFAULT_PIXEL_TOLERANCE_PX,
            coalesce_input: false,
            max_deferred_mutations: 64,
        }
    }
}
