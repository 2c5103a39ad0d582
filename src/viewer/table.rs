//! Platform-independent table view.
//!
//! `TableView` wires the controller, the interaction store, the sync gateway
//! and a mount surface together. Every public entry point runs under the
//! view's own tracing dispatcher; captured log records are shipped over the
//! host message channel before the entry point returns.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use super::controller::ViewportController;
use super::events::{self, Action, ElementInfo};
use super::scroll::Debouncer;
use crate::config::ViewerConfig;
use crate::error::Result;
use crate::logging::{self, LogBuffer};
use crate::render::{Renderer, Surface, FILTER_OPEN_CLASS};
use crate::store::InteractionStore;
use crate::sync::{
    EventBus, EventKind, Host, PushOutcome, Receipt, SyncGateway, SyncRequest, SyncResponse,
};
use crate::types::{ColumnId, DatasetMetadata};

/// Provider fields merged into the pending response as they change.
const RESPONSE_FIELDS: [&str; 12] = [
    "seq",
    "view",
    "n_rows",
    "n_cols",
    "min_rows",
    "max_rows",
    "max_columns",
    "max_colwidth",
    "reset",
    "config",
    "state_cols",
    "state_rows",
];

/// Field whose change commits the pending response.
const COMMIT_FIELD: &str = "view";

pub struct TableView<S, H> {
    surface: S,
    gateway: SyncGateway<H>,
    controller: ViewportController,
    store: InteractionStore,
    config: ViewerConfig,
    metadata: DatasetMetadata,
    debouncer: Debouncer<EventKind>,
    bus: EventBus,
    draft: Rc<RefCell<SyncResponse>>,
    logs: LogBuffer,
    log_dispatch: tracing::Dispatch,
    pending_scroll: Option<(f64, f64)>,
    pending_height: Option<f64>,
    drag_source: Option<ColumnId>,
    generation: u64,
    reset_pending: bool,
}

impl<S: Surface, H: Host> TableView<S, H> {
    pub fn new(surface: S, host: H, config: ViewerConfig) -> Self {
        let draft = Rc::new(RefCell::new(SyncResponse::default()));
        let mut bus = EventBus::new();
        for key in RESPONSE_FIELDS {
            let draft = Rc::clone(&draft);
            bus.on(key, move |value| draft.borrow_mut().apply_field(key, value));
        }
        let logs = LogBuffer::new();
        Self {
            surface,
            gateway: SyncGateway::new(host),
            controller: ViewportController::new(&config),
            store: InteractionStore::new(),
            metadata: DatasetMetadata::default(),
            debouncer: Debouncer::new(config.scroll_debounce_ms),
            bus,
            draft,
            log_dispatch: logging::dispatch(logs.clone(), config.level()),
            logs,
            config,
            pending_scroll: None,
            pending_height: None,
            drag_source: None,
            generation: 0,
            reset_pending: false,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn store(&self) -> &InteractionStore {
        &self.store
    }

    pub fn controller(&self) -> &ViewportController {
        &self.controller
    }

    pub fn gateway(&self) -> &SyncGateway<H> {
        &self.gateway
    }

    pub fn host(&self) -> &H {
        self.gateway.host()
    }

    pub fn host_mut(&mut self) -> &mut H {
        self.gateway.host_mut()
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    /// Mount counter; bumped every time new markup is attached.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Earliest debounce deadline still pending.
    pub fn next_due(&self) -> Option<f64> {
        self.debouncer.next_due()
    }

    /// Register an extra observer of host change notifications.
    pub fn on(&mut self, key: &str, handler: impl FnMut(&Value) + 'static) {
        self.bus.on(key, handler);
    }

    /// Host notification that `key` changed to `value`.
    ///
    /// Fields accumulate until the markup itself changes, which commits them
    /// as one response.
    pub fn notify(&mut self, key: &str, value: &Value) -> Result<Option<Receipt>> {
        match self.collect(key, value) {
            Some(response) => self.receive(response).map(Some),
            None => Ok(None),
        }
    }

    /// Merge one changed field into the pending response; returns the
    /// response once the commit field arrives.
    pub fn collect(&mut self, key: &str, value: &Value) -> Option<SyncResponse> {
        self.bus.emit(key, value);
        if key != COMMIT_FIELD {
            return None;
        }
        let mut draft = self.draft.borrow_mut();
        let response = draft.clone();
        // per-message fields must not leak into the next commit
        draft.seq = None;
        draft.reset = false;
        draft.config = None;
        draft.state_cols = None;
        draft.state_rows = None;
        Some(response)
    }

    /// Apply a provider response and complete the mount inline.
    pub fn receive(&mut self, response: SyncResponse) -> Result<Receipt> {
        let (receipt, generation) = self.begin_receive(response)?;
        if let Some(generation) = generation {
            self.finish_mount(generation)?;
        }
        Ok(receipt)
    }

    /// First half of [`TableView::receive`]: sequence check, state reset and
    /// markup mount. Returns the mount generation to complete, or `None` for
    /// a stale response.
    pub fn begin_receive(&mut self, response: SyncResponse) -> Result<(Receipt, Option<u64>)> {
        self.traced(|view| {
            if view.gateway.is_stale(response.seq) {
                let receipt = view.gateway.receive(&response)?;
                return Ok((receipt, None));
            }

            let reset = response.reset
                || (view.generation > 0 && response.metadata.total_cols != view.metadata.total_cols);
            if reset {
                view.gateway.discard_queued();
            }
            let receipt = view.gateway.receive(&response)?;

            if let Some(config) = response.config {
                view.configure(config);
            }
            if reset {
                tracing::info!(
                    n_rows = response.metadata.total_rows,
                    n_cols = response.metadata.total_cols,
                    "dataset reset"
                );
                view.store.clear();
                view.controller.reset();
                view.reset_pending = true;
            } else if response.seq.unwrap_or(0) == 0 {
                if let Some(columns) = response.state_cols.as_deref() {
                    view.store.load_columns(columns);
                }
                if let Some(rows) = response.state_rows.as_deref() {
                    view.store.load_rows(rows);
                }
            }

            view.metadata = response.metadata;
            view.generation += 1;
            view.surface.mount(&response.view)?;
            Renderer::busy(&mut view.surface, view.gateway.is_busy());
            Ok((receipt, Some(view.generation)))
        })
    }

    /// Second half of [`TableView::receive`]: measure, lay out and restore
    /// interaction state on the mounted markup.
    ///
    /// A generation superseded by a newer mount is skipped and returns
    /// `false`.
    pub fn finish_mount(&mut self, generation: u64) -> Result<bool> {
        self.traced(|view| {
            if generation != view.generation {
                tracing::debug!(generation, current = view.generation, "skipping superseded mount");
                return Ok(false);
            }
            let measurements = view.surface.measure();
            view.controller.mount(&measurements, &view.metadata);
            view.store.ensure_order(view.surface.index().column_ids());
            Renderer::layout(&mut view.surface, &view.controller.view_model());
            Renderer::interaction(&mut view.surface, &view.store);
            if std::mem::take(&mut view.reset_pending) {
                view.push(EventKind::Reset)?;
            }
            Renderer::busy(&mut view.surface, view.gateway.is_busy());
            Ok(true)
        })
    }

    /// Discard all interaction state, zero the viewport and resync.
    pub fn reset(&mut self) -> Result<PushOutcome> {
        self.traced(|view| {
            view.store.clear();
            view.controller.reset();
            Renderer::interaction(&mut view.surface, &view.store);
            view.push(EventKind::Reset)
        })
    }

    /// Raw scroll event; synced once scrolling has been quiet for the
    /// debounce delay.
    pub fn scroll(&mut self, scroll_top: f64, scroll_left: f64, now_ms: f64) {
        self.pending_scroll = Some((scroll_top, scroll_left));
        self.debouncer.schedule(EventKind::Scroll, now_ms);
    }

    /// Raw size observation of the scroll region; debounced like scrolling.
    pub fn observe_height(&mut self, view_height: f64, now_ms: f64) {
        self.pending_height = Some(view_height);
        self.debouncer.schedule(EventKind::Resize, now_ms);
    }

    /// Advance the debounce clock and handle whatever came due.
    pub fn tick(&mut self, now_ms: f64) -> Result<()> {
        self.traced(|view| {
            for kind in view.debouncer.take_due(now_ms) {
                match kind {
                    EventKind::Scroll => {
                        if let Some((top, left)) = view.pending_scroll.take() {
                            if let Some(request) = view.controller.on_scroll(top, left) {
                                view.push(request.event)?;
                            }
                        }
                    }
                    EventKind::Resize => {
                        if let Some(height) = view.pending_height.take() {
                            view.apply_height(height)?;
                        }
                    }
                    _ => {}
                }
            }
            Ok(())
        })
    }

    /// Scroll region resized to `view_height`.
    pub fn resize(&mut self, view_height: f64) -> Result<()> {
        self.traced(|view| view.apply_height(view_height))
    }

    /// Click on the element path `path` (innermost first).
    pub fn click(&mut self, path: &[ElementInfo]) -> Result<()> {
        self.traced(|view| {
            let route = events::route_click(path, view.surface.index());
            if let Some(action) = route.width {
                view.dispatch(action)?;
            }
            if let Some(action) = route.action {
                view.dispatch(action)?;
            }
            Ok(())
        })
    }

    /// Drag started on `path`; returns true if a column was picked up.
    pub fn drag_start(&mut self, path: &[ElementInfo]) -> bool {
        self.drag_source = events::route_drag_start(path, self.surface.index());
        self.drag_source.is_some()
    }

    /// Drop onto `path`, swapping the dragged column with the target.
    pub fn drop_on(&mut self, path: &[ElementInfo]) -> Result<()> {
        let Some(dragged) = self.drag_source.take() else {
            return Ok(());
        };
        self.traced(|view| {
            match events::route_drop(path, view.surface.index(), dragged, &view.store) {
                Some(action) => view.dispatch(action),
                None => Ok(()),
            }
        })
    }

    /// Key released inside `path` with the input holding `value`.
    pub fn key_up(&mut self, key: &str, path: &[ElementInfo], value: &str) -> Result<()> {
        self.traced(|view| match events::route_key(key, path, value) {
            Some(action) => view.dispatch(action),
            None => Ok(()),
        })
    }

    /// Apply one routed action.
    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        match action {
            Action::OpenFilter(position) => {
                let open = self.surface.toggle_head_class(position, FILTER_OPEN_CLASS);
                tracing::debug!(position, open, "filter popup");
                Ok(())
            }
            Action::ResizeView => {
                let height = self.surface.measure().view_height;
                self.apply_height(height)
            }
            action => {
                if let Some(kind) = action.apply(&mut self.store) {
                    Renderer::interaction(&mut self.surface, &self.store);
                    self.push(kind)?;
                }
                Ok(())
            }
        }
    }

    fn apply_height(&mut self, view_height: f64) -> Result<()> {
        if let Some(request) = self.controller.on_resize(view_height) {
            self.push(request.event)?;
        }
        Ok(())
    }

    fn push(&mut self, event: EventKind) -> Result<PushOutcome> {
        let request = SyncRequest::new(self.controller.range(), &self.store, event);
        let outcome = self.gateway.push(request)?;
        Renderer::busy(&mut self.surface, true);
        Ok(outcome)
    }

    fn configure(&mut self, config: ViewerConfig) {
        self.controller.configure(&config);
        self.debouncer.set_delay(config.scroll_debounce_ms);
        if config.level() != self.config.level() {
            self.log_dispatch = logging::dispatch(self.logs.clone(), config.level());
        }
        tracing::debug!(?config, "configured");
        self.config = config;
    }

    fn traced<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let dispatch = self.log_dispatch.clone();
        let result = tracing::dispatcher::with_default(&dispatch, || {
            let result = f(self);
            if let Err(e) = &result {
                tracing::warn!(error = %e, "view operation failed");
            }
            result
        });
        self.flush_logs();
        result
    }

    fn flush_logs(&mut self) {
        let records = self.logs.drain();
        if records.is_empty() {
            return;
        }
        let Ok(records) = serde_json::to_value(&records) else {
            return;
        };
        let payload = serde_json::json!({ "type": "log", "records": records });
        // logging must never fail an operation
        let _ = self.gateway.send(payload);
    }
}
