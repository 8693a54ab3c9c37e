#![forbid(unsafe_code)]

//! Deterministic gesture storms for stress testing.
//!
//! Continuous interaction arrives at ~60 events/second per pane; a storm
//! compresses minutes of adversarial wiggling into one reproducible burst.
//! Generation is seeded and uses a local xorshift64, so a failing seed can be
//! replayed exactly.

use strata_core::ZoomAnchor;
use strata_sync::Gesture;

/// Shape of a generated burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StormPattern {
    /// Rapid wheel events with alternating direction.
    ScrollFlood { count: usize },
    /// High-frequency pointer moves sweeping the canvas.
    CursorSweep { count: usize },
    /// Interleaved scroll, pointer, selection, and zoom gestures.
    MixedBurst { count: usize },
}

/// Seeded gesture generator.
#[derive(Debug, Clone, Copy)]
pub struct GestureStorm {
    pattern: StormPattern,
    seed: u64,
    canvas_height_px: u32,
}

impl GestureStorm {
    pub fn new(pattern: StormPattern, seed: u64, canvas_height_px: u32) -> Self {
        Self {
            pattern,
            seed,
            canvas_height_px,
        }
    }

    /// Generate the full burst. Same config, same output.
    pub fn generate(&self) -> Vec<Gesture> {
        let mut rng = Rng::new(self.seed);
        let height = f64::from(self.canvas_height_px);
        let gestures: Vec<Gesture> = match self.pattern {
            StormPattern::ScrollFlood { count } => (0..count)
                .map(|_| Gesture::ScrollBy {
                    delta_px: rng.range_f64(-40.0, 40.0),
                })
                .collect(),
            StormPattern::CursorSweep { count } => (0..count)
                .map(|_| Gesture::PointerMoved {
                    y_px: rng.range_f64(0.0, height),
                })
                .collect(),
            StormPattern::MixedBurst { count } => {
                (0..count).map(|_| self.mixed_gesture(&mut rng, height)).collect()
            }
        };
        tracing::debug!(
            pattern = ?self.pattern,
            seed = self.seed,
            count = gestures.len(),
            "gesture storm generated"
        );
        gestures
    }

    fn mixed_gesture(&self, rng: &mut Rng, height: f64) -> Gesture {
        match rng.next_u64() % 10 {
            0..=3 => Gesture::ScrollBy {
                delta_px: rng.range_f64(-40.0, 40.0),
            },
            4..=6 => Gesture::PointerMoved {
                y_px: rng.range_f64(0.0, height),
            },
            7 => Gesture::DragSelect {
                start_y_px: rng.range_f64(0.0, height),
                end_y_px: rng.range_f64(0.0, height),
            },
            8 => Gesture::Zoom {
                // Factors from 1/4x to 4x around the three anchor policies.
                factor: (2.0f64).powf(rng.range_f64(-2.0, 2.0)),
                anchor: match rng.next_u64() % 3 {
                    0 => ZoomAnchor::CursorOrCenter,
                    1 => ZoomAnchor::ViewCenter,
                    _ => ZoomAnchor::Depth(rng.range_f64(0.0, 1000.0)),
                },
            },
            _ => Gesture::PointerLeft,
        }
    }
}

/// Simple deterministic PRNG (xorshift64) for reproducible sequences.
#[derive(Debug, Clone, Copy)]
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform in `[0, 1)`.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range_f64(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }
}
