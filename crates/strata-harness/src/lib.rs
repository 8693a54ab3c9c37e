#![forbid(unsafe_code)]

//! Test harness and reference fixtures for stratasync.
//!
//! Everything here exists to interrogate the synchronization engine from the
//! outside: recording panes that log every delivery, a deliberately
//! misbehaving echo pane for feedback-loop bounds, deterministic gesture
//! storms for stress testing, and convergence checks that compare what each
//! pane last saw against the store's authoritative state.

pub mod check;
pub mod recording;
pub mod storm;

pub use check::{Divergence, assert_converged};
pub use recording::{DeliveryRecord, EchoPane, Recorded, RecordingPane, attach_recording};
pub use storm::{GestureStorm, StormPattern};
