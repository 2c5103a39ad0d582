//! Debouncing of bursty events.
//!
//! [`Debouncer`] tracks a due time per key: every schedule pushes the
//! deadline back, and a key fires once the clock passes it with no newer
//! schedule in between. On wasm the clock is driven by a single
//! `setTimeout` per view whose handle is cleared on every reschedule.

use std::collections::HashMap;
use std::hash::Hash;

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

#[cfg(target_arch = "wasm32")]
use super::{now_ms, with_view, PdView, SharedState};

/// Per-key trailing-edge debouncer on an external millisecond clock.
#[derive(Debug, Clone)]
pub struct Debouncer<K> {
    delay_ms: f64,
    due: HashMap<K, f64>,
}

impl<K: Copy + Eq + Hash> Debouncer<K> {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms: delay_ms.max(0.0),
            due: HashMap::new(),
        }
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    pub fn set_delay(&mut self, delay_ms: f64) {
        self.delay_ms = delay_ms.max(0.0);
    }

    /// (Re)arm `key` to fire `delay_ms` after `now_ms`.
    ///
    /// Returns true if an earlier schedule was superseded.
    pub fn schedule(&mut self, key: K, now_ms: f64) -> bool {
        self.due.insert(key, now_ms + self.delay_ms).is_some()
    }

    /// Disarm `key`; returns true if it was pending.
    pub fn cancel(&mut self, key: K) -> bool {
        self.due.remove(&key).is_some()
    }

    pub fn is_pending(&self, key: K) -> bool {
        self.due.contains_key(&key)
    }

    /// Earliest pending deadline.
    pub fn next_due(&self) -> Option<f64> {
        self.due.values().copied().reduce(f64::min)
    }

    /// Remove and return every key whose deadline has passed.
    pub fn take_due(&mut self, now_ms: f64) -> Vec<K> {
        let fired: Vec<K> = self
            .due
            .iter()
            .filter(|(_, due)| **due <= now_ms)
            .map(|(&k, _)| k)
            .collect();
        for key in &fired {
            self.due.remove(key);
        }
        fired
    }
}

#[cfg(target_arch = "wasm32")]
impl PdView {
    /// Arm the view timer for the earliest pending deadline, replacing any
    /// timer already set.
    pub(crate) fn schedule_debounce_timeout(state: &Rc<RefCell<SharedState>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let mut s = state.borrow_mut();
        if let Some(timer_id) = s.debounce_timer.take() {
            window.clear_timeout_with_handle(timer_id);
        }
        let Some(due) = s.view.next_due() else {
            return;
        };
        if s.debounce_closure.is_none() {
            let weak_state = Rc::downgrade(state);
            let closure = Closure::wrap(Box::new(move || {
                if let Some(state) = weak_state.upgrade() {
                    PdView::handle_debounce_timeout(&state);
                }
            }) as Box<dyn FnMut()>);
            s.debounce_closure = Some(closure);
        }
        let Some(callback) = s.debounce_closure.as_ref() else {
            return;
        };
        #[allow(clippy::cast_possible_truncation)]
        let delay = (due - now_ms()).max(0.0).ceil() as i32;
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            delay,
        ) {
            Ok(id) => s.debounce_timer = Some(id),
            Err(_) => s.debounce_timer = None,
        }
    }

    pub(crate) fn handle_debounce_timeout(state: &Rc<RefCell<SharedState>>) {
        state.borrow_mut().debounce_timer = None;
        if let Err(e) = with_view(state, |view| view.tick(now_ms())) {
            web_sys::console::error_1(&e.to_string().into());
        }
        // a deadline pushed back while the timer was armed is still pending
        Self::schedule_debounce_timeout(state);
    }
}
