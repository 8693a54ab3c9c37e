#![forbid(unsafe_code)]

//! Depth ↔ device-pixel coordinate transform.
//!
//! One [`CoordinateTransform`] maps the current visible depth range onto one
//! pane's vertical pixel axis. Transforms are pane-local, derived on demand
//! from `(visible range, canvas height)`, and never shared or stored across
//! broadcasts: a cached transform is stale as soon as a new viewport
//! broadcast arrives.
//!
//! # Invariants
//!
//! 1. `depth_to_y` and `y_to_depth` are mutual inverses within a sub-pixel
//!    tolerance (default 0.5 px) for every depth inside the visible range.
//! 2. Bottom-inclusive edge: `depth_to_y(visible.bottom()) == height` exactly.
//! 3. Construction fails rather than producing a division by zero; a held
//!    transform is always usable.

use std::fmt;

use crate::depth::DepthRange;

/// Default round-trip tolerance in device pixels.
///
/// The single surfaced tunable of the engine: a depth pushed through
/// `depth_to_y` then `y_to_depth` must land within this many pixels' worth of
/// depth of where it started.
pub const DEFAULT_PIXEL_TOLERANCE_PX: f64 = 0.5;

/// Pure depth↔pixel conversion for one pane.
///
/// `y = 0` is the top of the canvas; depth increases downward with `y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    visible: DepthRange,
    canvas_height_px: u32,
}

impl CoordinateTransform {
    /// Build a transform for a pane's current viewport.
    ///
    /// Fails with [`TransformError::DegenerateRange`] when the canvas has no
    /// height; a valid [`DepthRange`] already guarantees a positive span.
    pub fn new(visible: DepthRange, canvas_height_px: u32) -> Result<Self, TransformError> {
        if canvas_height_px == 0 {
            return Err(TransformError::DegenerateRange {
                span: visible.span(),
                canvas_height_px,
            });
        }
        Ok(Self {
            visible,
            canvas_height_px,
        })
    }

    /// The visible range this transform was derived from.
    #[inline]
    pub const fn visible(&self) -> DepthRange {
        self.visible
    }

    /// Canvas height in device pixels.
    #[inline]
    pub const fn canvas_height_px(&self) -> u32 {
        self.canvas_height_px
    }

    /// Depth covered by one device pixel.
    #[inline]
    pub fn depth_per_pixel(&self) -> f64 {
        self.visible.span() / f64::from(self.canvas_height_px)
    }

    /// Map a depth to a vertical pixel coordinate.
    ///
    /// `visible.top()` maps to `0.0`; `visible.bottom()` maps to the canvas
    /// height (bottom-inclusive). Depths outside the visible range map to
    /// coordinates outside `[0, height]`, which callers may use for
    /// off-screen culling.
    #[inline]
    pub fn depth_to_y(&self, depth: f64) -> f64 {
        (depth - self.visible.top()) / self.visible.span() * f64::from(self.canvas_height_px)
    }

    /// Map a vertical pixel coordinate back to a depth.
    #[inline]
    pub fn y_to_depth(&self, pixel_y: f64) -> f64 {
        self.visible.top() + pixel_y / f64::from(self.canvas_height_px) * self.visible.span()
    }

    /// Absolute depth error of a full round trip through both mappings.
    #[inline]
    pub fn round_trip_error(&self, depth: f64) -> f64 {
        (self.y_to_depth(self.depth_to_y(depth)) - depth).abs()
    }

    /// Whether a round trip of `depth` stays within `tolerance_px` device
    /// pixels' worth of depth.
    #[inline]
    pub fn round_trip_within(&self, depth: f64, tolerance_px: f64) -> bool {
        self.round_trip_error(depth) <= tolerance_px * self.depth_per_pixel()
    }
}

/// Errors building a coordinate transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformError {
    /// The viewport cannot be mapped: zero canvas height or zero depth span.
    DegenerateRange { span: f64, canvas_height_px: u32 },
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateRange {
                span,
                canvas_height_px,
            } => write!(
                f,
                "degenerate viewport: span {span} over {canvas_height_px}px canvas"
            ),
        }
    }
}

impl std::error::Error for TransformError {}
