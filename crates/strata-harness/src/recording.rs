#![forbid(unsafe_code)]

//! Recording and misbehaving pane adapters.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use strata_core::DepthRange;
use strata_sync::{Delivery, Mutation, PaneAdapter, PaneId, StateStore, StoreError, StoreHandle};

/// One broadcast payload as a pane received it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Recorded {
    Viewport(DepthRange),
    Zoom(f64),
    Cursor(Option<f64>),
    Selection(Option<DepthRange>),
}

/// A delivery with its metadata, in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryRecord {
    pub meta: Delivery,
    pub payload: Recorded,
}

/// A pane that renders nothing and remembers everything.
///
/// Attach through [`attach_recording`] so the pane learns its own id and can
/// recognize echoes of its own gestures.
#[derive(Debug, Default)]
pub struct RecordingPane {
    id: Option<PaneId>,
    deliveries: Vec<DeliveryRecord>,
    resizes: Vec<u32>,
}

impl RecordingPane {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the store assigned on attach, once known.
    pub fn id(&self) -> Option<PaneId> {
        self.id
    }

    pub fn set_id(&mut self, id: PaneId) {
        self.id = Some(id);
    }

    /// Every broadcast delivery, in arrival order.
    pub fn deliveries(&self) -> &[DeliveryRecord] {
        &self.deliveries
    }

    /// Total number of adapter calls received (broadcasts plus resizes).
    pub fn call_count(&self) -> usize {
        self.deliveries.len() + self.resizes.len()
    }

    /// Resize notifications, in arrival order.
    pub fn resizes(&self) -> &[u32] {
        &self.resizes
    }

    /// Last received viewport range, if any viewport broadcast arrived.
    pub fn last_viewport(&self) -> Option<DepthRange> {
        self.last_payload(|p| match p {
            Recorded::Viewport(range) => Some(*range),
            _ => None,
        })
    }

    /// Last received zoom factor.
    pub fn last_zoom(&self) -> Option<f64> {
        self.last_payload(|p| match p {
            Recorded::Zoom(factor) => Some(*factor),
            _ => None,
        })
    }

    /// Last received cursor value. Outer `None` means no cursor broadcast
    /// ever arrived.
    pub fn last_cursor(&self) -> Option<Option<f64>> {
        self.last_payload(|p| match p {
            Recorded::Cursor(depth) => Some(*depth),
            _ => None,
        })
    }

    /// Last received selection value.
    pub fn last_selection(&self) -> Option<Option<DepthRange>> {
        self.last_payload(|p| match p {
            Recorded::Selection(range) => Some(*range),
            _ => None,
        })
    }

    /// Delivery log as JSON lines, for diffing failed scenarios.
    pub fn deliveries_jsonl(&self) -> String {
        self.deliveries
            .iter()
            .map(|record| serde_json::to_string(record).unwrap_or_else(|_| "<unserializable>".into()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn last_payload<T>(&self, select: impl Fn(&Recorded) -> Option<T>) -> Option<T> {
        self.deliveries
            .iter()
            .rev()
            .find_map(|record| select(&record.payload))
    }
}

impl PaneAdapter for RecordingPane {
    fn on_viewport_range_changed(&mut self, range: DepthRange, meta: Delivery) {
        self.deliveries.push(DeliveryRecord {
            meta,
            payload: Recorded::Viewport(range),
        });
    }

    fn on_zoom_level_changed(&mut self, factor: f64, meta: Delivery) {
        self.deliveries.push(DeliveryRecord {
            meta,
            payload: Recorded::Zoom(factor),
        });
    }

    fn on_cursor_depth_changed(&mut self, depth: Option<f64>, meta: Delivery) {
        self.deliveries.push(DeliveryRecord {
            meta,
            payload: Recorded::Cursor(depth),
        });
    }

    fn on_selection_range_changed(&mut self, range: Option<DepthRange>, meta: Delivery) {
        self.deliveries.push(DeliveryRecord {
            meta,
            payload: Recorded::Selection(range),
        });
    }

    fn on_canvas_resized(&mut self, height_px: u32) {
        self.resizes.push(height_px);
    }
}

/// Attach a fresh [`RecordingPane`] and tell it its assigned id.
pub fn attach_recording(
    store: &mut StateStore,
    canvas_height_px: u32,
) -> Result<(PaneId, Rc<RefCell<RecordingPane>>), StoreError> {
    let pane = Rc::new(RefCell::new(RecordingPane::new()));
    let id = store.attach(pane.clone(), canvas_height_px)?;
    pane.borrow_mut().set_id(id);
    Ok((id, pane))
}

/// A pane that reacts to the echo of its own gesture by submitting more
/// mutations — the pathological client the single-in-flight rule exists for.
///
/// Every viewport broadcast attributed to this pane triggers up to
/// `max_echoes` further viewport submissions through the store handle. The
/// engine must terminate with bounded adapter calls regardless.
#[derive(Debug)]
pub struct EchoPane {
    id: Option<PaneId>,
    handle: StoreHandle,
    max_echoes: usize,
    echoes_sent: usize,
    viewport_calls: usize,
}

impl EchoPane {
    pub fn new(handle: StoreHandle, max_echoes: usize) -> Self {
        Self {
            id: None,
            handle,
            max_echoes,
            echoes_sent: 0,
            viewport_calls: 0,
        }
    }

    pub fn set_id(&mut self, id: PaneId) {
        self.id = Some(id);
    }

    /// How many follow-up mutations this pane has submitted.
    pub fn echoes_sent(&self) -> usize {
        self.echoes_sent
    }

    /// How many viewport broadcasts this pane has received.
    pub fn viewport_calls(&self) -> usize {
        self.viewport_calls
    }
}

impl PaneAdapter for EchoPane {
    fn on_viewport_range_changed(&mut self, range: DepthRange, meta: Delivery) {
        self.viewport_calls += 1;
        let is_own_echo = self.id.is_some() && meta.origin == self.id;
        if is_own_echo && self.echoes_sent < self.max_echoes {
            self.echoes_sent += 1;
            self.handle.submit(Mutation::SetViewportRange {
                top: range.top() + 1.0,
                bottom: range.bottom() + 1.0,
            });
        }
    }

    fn on_zoom_level_changed(&mut self, _factor: f64, _meta: Delivery) {}

    fn on_cursor_depth_changed(&mut self, _depth: Option<f64>, _meta: Delivery) {}

    fn on_selection_range_changed(&mut self, _range: Option<DepthRange>, _meta: Delivery) {}

    fn on_canvas_resized(&mut self, _height_px: u32) {}
}
