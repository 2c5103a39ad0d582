//! Table viewer.
//!
//! - [`controller`]: viewport state machine deciding when to refetch rows
//! - [`events`]: routing of clicks, drags and keys into typed actions
//! - [`scroll`]: debouncing of scroll and resize bursts
//! - [`TableView`]: the platform-independent view tying it all together
//!
//! On wasm32, [`PdView`] is the JavaScript entry point: it mounts a
//! [`TableView`] on a DOM element, talks to the widget model through
//! [`JsHost`](crate::sync::JsHost) and wires DOM events automatically.

pub mod controller;
pub mod events;
pub mod scroll;
mod table;

pub use controller::{Phase, RangeRequest, ViewportController};
pub use events::{Action, ClickRoute, ElementInfo};
pub use scroll::Debouncer;
pub use table::TableView;

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use web_sys::{Element, HtmlElement, HtmlInputElement, KeyboardEvent, ResizeObserver};

#[cfg(target_arch = "wasm32")]
use crate::config::ViewerConfig;
#[cfg(target_arch = "wasm32")]
use crate::render::{DomSurface, Surface};
#[cfg(target_arch = "wasm32")]
use crate::sync::{self, JsHost, Outbox, SyncResponse};

#[cfg(target_arch = "wasm32")]
pub(crate) fn now_ms() -> f64 {
    if let Some(window) = web_sys::window() {
        if let Some(perf) = window.performance() {
            return perf.now();
        }
    }
    js_sys::Date::now()
}

/// Shared state reachable from event handlers (wasm32 only).
#[cfg(target_arch = "wasm32")]
pub(crate) struct SharedState {
    pub(crate) view: TableView<DomSurface, Outbox>,
    pub(crate) host: JsHost,
    pub(crate) debounce_timer: Option<i32>,
    pub(crate) debounce_closure: Option<Closure<dyn FnMut()>>,
}

#[cfg(target_arch = "wasm32")]
fn report(result: crate::error::Result<()>) {
    if let Err(e) = result {
        web_sys::console::error_1(&e.to_string().into());
    }
}

/// Run `f` on the view, then deliver the host calls it staged once the
/// borrow is released. The model fires change events synchronously from
/// `set`, and those land back in [`PdView::notify`].
#[cfg(target_arch = "wasm32")]
pub(crate) fn with_view<T>(
    state: &Rc<RefCell<SharedState>>,
    f: impl FnOnce(&mut TableView<DomSurface, Outbox>) -> T,
) -> T {
    let (result, calls, mut host) = {
        let mut s = state.borrow_mut();
        let result = f(&mut s.view);
        let calls = s.view.host_mut().take();
        (result, calls, s.host.clone())
    };
    report(sync::deliver(calls, &mut host));
    result
}

#[cfg(target_arch = "wasm32")]
fn event_path(state: &Rc<RefCell<SharedState>>, event: &web_sys::Event) -> Vec<ElementInfo> {
    event
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .map(|target| state.borrow().view.surface().element_path(&target))
        .unwrap_or_default()
}

/// Table view exported to JavaScript.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub struct PdView {
    state: Rc<RefCell<SharedState>>,
    #[allow(dead_code)]
    closures: Vec<Closure<dyn FnMut(web_sys::Event)>>,
    #[allow(dead_code)]
    resize_closure: Option<Closure<dyn FnMut(js_sys::Array)>>,
    resize_observer: Option<ResizeObserver>,
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl PdView {
    /// Mount a view under `root`, synchronized through the widget `model`
    /// (an object exposing `set`, `save_changes` and `send`).
    #[wasm_bindgen(constructor)]
    pub fn new(root: HtmlElement, model: JsValue) -> Result<PdView, JsValue> {
        console_error_panic_hook::set_once();

        let surface = DomSurface::new(root.clone())?;
        let scroll_target = surface.view().clone();
        let view = TableView::new(surface, Outbox::new(), ViewerConfig::default());
        let state = Rc::new(RefCell::new(SharedState {
            view,
            host: JsHost::new(model),
            debounce_timer: None,
            debounce_closure: None,
        }));

        let mut closures: Vec<Closure<dyn FnMut(web_sys::Event)>> = Vec::new();

        // Scroll: record the raw offsets, sync after the debounce delay
        {
            let state = state.clone();
            let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                {
                    let mut s = state.borrow_mut();
                    let (top, left) = (s.view.surface().scroll_top(), s.view.surface().scroll_left());
                    s.view.scroll(top, left, now_ms());
                }
                Self::schedule_debounce_timeout(&state);
            }) as Box<dyn FnMut(web_sys::Event)>);
            scroll_target
                .add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref())
                .ok();
            closures.push(closure);
        }

        // Click: width capture plus one action
        {
            let state = state.clone();
            let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
                let path = event_path(&state, &event);
                report(with_view(&state, |view| view.click(&path)));
            }) as Box<dyn FnMut(web_sys::Event)>);
            root.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
                .ok();
            closures.push(closure);
        }

        // Drag and drop of column labels
        {
            let state = state.clone();
            let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
                let path = event_path(&state, &event);
                state.borrow_mut().view.drag_start(&path);
            }) as Box<dyn FnMut(web_sys::Event)>);
            root.add_event_listener_with_callback("dragstart", closure.as_ref().unchecked_ref())
                .ok();
            closures.push(closure);
        }
        {
            let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
                // allow dropping
                event.prevent_default();
            }) as Box<dyn FnMut(web_sys::Event)>);
            root.add_event_listener_with_callback("dragover", closure.as_ref().unchecked_ref())
                .ok();
            closures.push(closure);
        }
        {
            let state = state.clone();
            let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
                event.prevent_default();
                let path = event_path(&state, &event);
                report(with_view(&state, |view| view.drop_on(&path)));
            }) as Box<dyn FnMut(web_sys::Event)>);
            root.add_event_listener_with_callback("drop", closure.as_ref().unchecked_ref())
                .ok();
            closures.push(closure);
        }

        // Enter in the search input
        {
            let state = state.clone();
            let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
                let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
                    return;
                };
                let value = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                    .map(|input| input.value())
                    .unwrap_or_default();
                let path = event_path(&state, &event);
                report(with_view(&state, |view| view.key_up(&key, &path, &value)));
            }) as Box<dyn FnMut(web_sys::Event)>);
            root.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())
                .ok();
            closures.push(closure);
        }

        // Size changes of the scroll region
        let (resize_closure, resize_observer) = {
            let state_for_resize = state.clone();
            let observed = scroll_target.clone();
            let closure = Closure::wrap(Box::new(move |_entries: js_sys::Array| {
                {
                    let mut s = state_for_resize.borrow_mut();
                    let height = f64::from(observed.offset_height());
                    s.view.observe_height(height, now_ms());
                }
                Self::schedule_debounce_timeout(&state_for_resize);
            }) as Box<dyn FnMut(js_sys::Array)>);
            let observer = ResizeObserver::new(closure.as_ref().unchecked_ref()).ok();
            if let Some(observer) = &observer {
                observer.observe(&scroll_target);
            }
            (Some(closure), observer)
        };

        Ok(PdView {
            state,
            closures,
            resize_closure,
            resize_observer,
        })
    }

    /// Host notification that model field `key` changed.
    ///
    /// A change of `view` commits the accumulated fields; the mount is
    /// completed on the next microtask so the browser has laid the new
    /// markup out before it is measured.
    pub fn notify(&self, key: &str, value: JsValue) -> Result<(), JsValue> {
        let value: serde_json::Value =
            serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let response = with_view(&self.state, |view| view.collect(key, &value));
        if let Some(response) = response {
            self.apply(response)?;
        }
        Ok(())
    }

    /// Apply a whole provider response object at once.
    pub fn receive(&self, response: JsValue) -> Result<(), JsValue> {
        let value: serde_json::Value = serde_wasm_bindgen::from_value(response)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.apply(SyncResponse::from_value(value)?)
    }

    /// Discard interaction state and resync from the top.
    pub fn reset(&self) -> Result<(), JsValue> {
        with_view(&self.state, TableView::reset)?;
        Ok(())
    }

    /// Number of markup mounts so far.
    pub fn generation(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let generation = self.state.borrow().view.generation() as f64;
        generation
    }

    /// Stop observing and cancel pending timers.
    pub fn destroy(&mut self) {
        if let Some(observer) = self.resize_observer.take() {
            observer.disconnect();
        }
        let mut s = self.state.borrow_mut();
        if let (Some(window), Some(timer)) = (web_sys::window(), s.debounce_timer.take()) {
            window.clear_timeout_with_handle(timer);
        }
        s.view.surface_mut().set_flag(crate::render::Flag::Busy, false);
    }
}

#[cfg(target_arch = "wasm32")]
impl PdView {
    fn apply(&self, response: SyncResponse) -> Result<(), JsValue> {
        let (_, generation) = with_view(&self.state, |view| view.begin_receive(response))?;
        if let Some(generation) = generation {
            let state = Rc::clone(&self.state);
            wasm_bindgen_futures::spawn_local(async move {
                let result = with_view(&state, |view| view.finish_mount(generation));
                report(result.map(|_| ()));
            });
        }
        Ok(())
    }
}
