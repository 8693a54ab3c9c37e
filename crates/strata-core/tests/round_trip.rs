//! Property tests for the depth↔pixel round-trip tolerance.
//!
//! The contract: for any depth inside the visible range, mapping to a pixel
//! coordinate and back lands within half a device pixel's worth of depth of
//! where it started, across arbitrary viewport positions and canvas heights.

use proptest::prelude::*;
use strata_core::{CoordinateTransform, DEFAULT_PIXEL_TOLERANCE_PX, DepthRange};

proptest! {
    #[test]
    fn round_trip_within_half_pixel(
        top in -1.0e6f64..1.0e6,
        span in 1.0e-3f64..1.0e6,
        height in 1u32..=10_000,
        fraction in 0.0f64..=1.0,
    ) {
        let visible = DepthRange::new(top, top + span).unwrap();
        let transform = CoordinateTransform::new(visible, height).unwrap();
        let depth = top + fraction * span;
        prop_assert!(
            transform.round_trip_within(depth, DEFAULT_PIXEL_TOLERANCE_PX),
            "error {} exceeds tolerance at depth {depth} ({visible} over {height}px)",
            transform.round_trip_error(depth),
        );
    }

    #[test]
    fn depth_to_y_is_monotonic(
        top in -1.0e6f64..1.0e6,
        span in 1.0e-3f64..1.0e6,
        height in 1u32..=10_000,
        a in 0.0f64..=1.0,
        b in 0.0f64..=1.0,
    ) {
        let visible = DepthRange::new(top, top + span).unwrap();
        let transform = CoordinateTransform::new(visible, height).unwrap();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(
            transform.depth_to_y(top + lo * span) <= transform.depth_to_y(top + hi * span)
        );
    }

    #[test]
    fn bottom_edge_maps_to_canvas_height(
        top in -1.0e6f64..1.0e6,
        span in 1.0e-3f64..1.0e6,
        height in 1u32..=10_000,
    ) {
        let visible = DepthRange::new(top, top + span).unwrap();
        let transform = CoordinateTransform::new(visible, height).unwrap();
        let y = transform.depth_to_y(visible.bottom());
        prop_assert!((y - f64::from(height)).abs() < 1e-6);
    }
}
