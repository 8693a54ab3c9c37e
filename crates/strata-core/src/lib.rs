#![forbid(unsafe_code)]

//! Core: depth-domain value types and coordinate math.
//!
//! # Role in stratasync
//! `strata-core` is the leaf layer. It owns the depth interval types, the
//! authoritative [`DepthState`](state::DepthState) value object, and the pure
//! depth↔pixel [`CoordinateTransform`](transform::CoordinateTransform).
//!
//! # Primary responsibilities
//! - **DepthRange**: validated depth intervals (`top < bottom`, finite).
//! - **DepthState**: visible range, cursor, selection, zoom, data bounds.
//! - **CoordinateTransform**: invertible depth↔device-pixel mapping per pane.
//!
//! # How it fits in the system
//! The engine (`strata-sync`) owns the single mutable `DepthState` and applies
//! gesture-driven mutations through the pure clamp/zoom arithmetic defined
//! here. Nothing in this crate registers panes or broadcasts; it is the clean
//! bridge between interaction handling and per-pane rendering coordinates.

pub mod depth;
pub mod state;
pub mod transform;

pub use depth::{DepthRange, RangeError};
pub use state::{DepthState, InvalidZoom, TotalRangeEffects, ZoomAnchor};
pub use transform::{CoordinateTransform, DEFAULT_PIXEL_TOLERANCE_PX, TransformError};
