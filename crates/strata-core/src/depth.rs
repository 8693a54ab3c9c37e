#![forbid(unsafe_code)]

//! Depth intervals.
//!
//! [`DepthRange`] is the fundamental interval type of the depth domain:
//! borehole depth increases downward, so `top < bottom` always holds and both
//! endpoints are finite. Construction is validated; every other operation
//! preserves the invariant, so holders of a `DepthRange` never re-check it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A depth interval with `top < bottom`, in depth units (increasing downward).
///
/// The fields are private so a malformed interval cannot be constructed;
/// use [`DepthRange::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthRange {
    top: f64,
    bottom: f64,
}

impl DepthRange {
    /// Create a validated depth range.
    ///
    /// Fails with [`RangeError::Inverted`] unless `top < bottom`, and with
    /// [`RangeError::NonFinite`] if either endpoint is NaN or infinite.
    pub fn new(top: f64, bottom: f64) -> Result<Self, RangeError> {
        if !top.is_finite() {
            return Err(RangeError::NonFinite { value: top });
        }
        if !bottom.is_finite() {
            return Err(RangeError::NonFinite { value: bottom });
        }
        if top >= bottom {
            return Err(RangeError::Inverted { top, bottom });
        }
        Ok(Self { top, bottom })
    }

    /// Shallow endpoint.
    #[inline]
    pub const fn top(&self) -> f64 {
        self.top
    }

    /// Deep endpoint.
    #[inline]
    pub const fn bottom(&self) -> f64 {
        self.bottom
    }

    /// Interval length. Always positive.
    #[inline]
    pub fn span(&self) -> f64 {
        self.bottom - self.top
    }

    /// Depth halfway between the endpoints.
    #[inline]
    pub fn midpoint(&self) -> f64 {
        self.top + self.span() / 2.0
    }

    /// Whether `depth` lies inside the interval. Both endpoints inclusive,
    /// matching the bottom-inclusive pixel edge policy of the transform.
    #[inline]
    pub fn contains(&self, depth: f64) -> bool {
        depth >= self.top && depth <= self.bottom
    }

    /// Whether `self` lies entirely inside `other`.
    #[inline]
    pub fn is_subrange_of(&self, other: &DepthRange) -> bool {
        self.top >= other.top && self.bottom <= other.bottom
    }

    /// Clamp a depth to the nearest point of the interval.
    #[inline]
    pub fn clamp_depth(&self, depth: f64) -> f64 {
        depth.clamp(self.top, self.bottom)
    }

    /// Translate both endpoints by `delta`. The span is unchanged.
    #[inline]
    pub fn shifted(&self, delta: f64) -> DepthRange {
        DepthRange {
            top: self.top + delta,
            bottom: self.bottom + delta,
        }
    }

    /// Overlap with another range, or `None` when the overlap is empty.
    ///
    /// Ranges that merely touch at an endpoint produce an empty overlap.
    pub fn intersection(&self, other: &DepthRange) -> Option<DepthRange> {
        let top = self.top.max(other.top);
        let bottom = self.bottom.min(other.bottom);
        if top < bottom {
            Some(DepthRange { top, bottom })
        } else {
            None
        }
    }

    /// Shift `self` by `delta`, then push it back inside `bounds` without
    /// shrinking the span.
    ///
    /// Used for panning: scrolling past the data edge stops at the edge
    /// instead of implicitly zooming via intersection clamping. When the span
    /// exceeds `bounds` the whole of `bounds` is returned.
    pub fn shifted_within(&self, delta: f64, bounds: &DepthRange) -> DepthRange {
        if self.span() >= bounds.span() {
            return *bounds;
        }
        let shifted = self.shifted(delta);
        if shifted.top < bounds.top {
            bounds_anchored_top(bounds.top, self.span())
        } else if shifted.bottom > bounds.bottom {
            bounds_anchored_top(bounds.bottom - self.span(), self.span())
        } else {
            shifted
        }
    }
}

#[inline]
fn bounds_anchored_top(top: f64, span: f64) -> DepthRange {
    DepthRange {
        top,
        bottom: top + span,
    }
}

impl fmt::Display for DepthRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.top, self.bottom)
    }
}

/// Errors constructing or clamping depth ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeError {
    /// `top >= bottom`.
    Inverted { top: f64, bottom: f64 },
    /// An endpoint or depth value was NaN or infinite.
    NonFinite { value: f64 },
    /// The range has no overlap with the total data bounds.
    OutsideTotal { top: f64, bottom: f64 },
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inverted { top, bottom } => {
                write!(f, "depth range top {top} must be above bottom {bottom}")
            }
            Self::NonFinite { value } => write!(f, "depth value {value} is not finite"),
            Self::OutsideTotal { top, bottom } => {
                write!(f, "range [{top}, {bottom}] lies outside the data bounds")
            }
        }
    }
}

impl std::error::Error for RangeError {}

#[cfg(test)]
mod tests {
    use super::{DepthRange, RangeError};

    fn range(top: f64, bottom: f64) -> DepthRange {
        DepthRange::new(top, bottom).unwrap()
    }

    #[test]
    fn new_rejects_inverted_and_empty() {
        assert_eq!(
            DepthRange::new(10.0, 10.0),
            Err(RangeError::Inverted {
                top: 10.0,
                bottom: 10.0
            })
        );
        assert!(DepthRange::new(20.0, 10.0).is_err());
    }

    #[test]
    fn new_rejects_non_finite() {
        assert!(matches!(
            DepthRange::new(f64::NAN, 10.0),
            Err(RangeError::NonFinite { .. })
        ));
        assert!(matches!(
            DepthRange::new(0.0, f64::INFINITY),
            Err(RangeError::NonFinite { .. })
        ));
    }

    #[test]
    fn span_and_midpoint() {
        let r = range(100.0, 200.0);
        assert_eq!(r.span(), 100.0);
        assert_eq!(r.midpoint(), 150.0);
    }

    #[test]
    fn contains_is_endpoint_inclusive() {
        let r = range(0.0, 50.0);
        assert!(r.contains(0.0));
        assert!(r.contains(50.0));
        assert!(!r.contains(50.1));
    }

    #[test]
    fn intersection_overlapping() {
        let a = range(-50.0, 50.0);
        let b = range(0.0, 1000.0);
        assert_eq!(a.intersection(&b), Some(range(0.0, 50.0)));
    }

    #[test]
    fn intersection_touching_is_empty() {
        let a = range(0.0, 10.0);
        let b = range(10.0, 20.0);
        assert_eq!(a.intersection(&b), None);
    }

    #[test]
    fn clamp_depth_to_bounds() {
        let r = range(0.0, 1000.0);
        assert_eq!(r.clamp_depth(-5.0), 0.0);
        assert_eq!(r.clamp_depth(1500.0), 1000.0);
        assert_eq!(r.clamp_depth(500.0), 500.0);
    }

    #[test]
    fn shifted_within_stops_at_edges() {
        let bounds = range(0.0, 1000.0);
        let visible = range(0.0, 100.0);
        let panned = visible.shifted_within(-50.0, &bounds);
        assert_eq!(panned, range(0.0, 100.0));
        let panned = visible.shifted_within(950.0, &bounds);
        assert_eq!(panned, range(900.0, 1000.0));
        let panned = visible.shifted_within(10.0, &bounds);
        assert_eq!(panned, range(10.0, 110.0));
    }

    #[test]
    fn shifted_within_preserves_span() {
        let bounds = range(0.0, 1000.0);
        let visible = range(200.0, 450.0);
        for delta in [-500.0, -10.0, 0.0, 123.0, 900.0] {
            let panned = visible.shifted_within(delta, &bounds);
            assert_eq!(panned.span(), visible.span());
            assert!(panned.is_subrange_of(&bounds));
        }
    }
}
