#![forbid(unsafe_code)]

//! Depth-state synchronization engine.
//!
//! # Role in stratasync
//! `strata-sync` keeps every pane of a multi-pane depth visualization
//! showing exactly the same depth window, cursor, and selection. One
//! [`StateStore`](store::StateStore) owns the single authoritative
//! [`DepthState`](strata_core::DepthState); panes implement
//! [`PaneAdapter`](adapter::PaneAdapter) and receive synchronous broadcasts
//! on every change, so no two panes can diverge, even transiently.
//!
//! # Primary responsibilities
//! - **StateStore**: single-writer state ownership, ordered registration
//!   list, synchronous broadcast, deferred-mutation inbox.
//! - **Synchronizers**: translate pixel-space pane gestures into
//!   depth-domain mutations through the originating pane's transform.
//! - **SyncEngine**: assembly glue the application embeds.
//!
//! # Concurrency model
//! Single-threaded and cooperative: every mutator and broadcast runs to
//! completion on one logical event-processing thread. Mutations apply in
//! submission order and every pane observes broadcasts in that same order.

pub mod adapter;
pub mod coalesce;
pub mod config;
pub mod engine;
pub mod gesture;
pub mod store;
pub mod synchronizer;

pub use adapter::{Delivery, PaneAdapter, PaneId, SharedPane};
pub use coalesce::GestureCoalescer;
pub use config::SyncConfig;
pub use engine::SyncEngine;
pub use gesture::{Gesture, GestureKind};
pub use store::{Mutation, MutationKind, StateEvent, StateStore, StoreError, StoreHandle};
pub use synchronizer::{
    CursorSynchronizer, PaneContext, ScrollSynchronizer, SelectionSynchronizer,
};
