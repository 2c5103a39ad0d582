//! Change notifications from the host, keyed by field name.

use std::collections::HashMap;

use serde_json::Value;

/// Handler invoked with the new value of a field.
pub type Handler = Box<dyn FnMut(&Value)>;

/// Field-name keyed dispatch of host change notifications.
///
/// Handlers are plain closures; whatever state they touch is captured
/// explicitly when they are registered.
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<String, Vec<Handler>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for changes of `key`.
    pub fn on(&mut self, key: &str, handler: impl FnMut(&Value) + 'static) {
        self.handlers
            .entry(key.to_string())
            .or_default()
            .push(Box::new(handler));
    }

    /// Drop every handler registered for `key`.
    pub fn off(&mut self, key: &str) {
        self.handlers.remove(key);
    }

    /// Run the handlers of `key` in registration order; returns how many ran.
    pub fn emit(&mut self, key: &str, value: &Value) -> usize {
        match self.handlers.get_mut(key) {
            Some(handlers) => {
                for handler in handlers.iter_mut() {
                    handler(value);
                }
                handlers.len()
            }
            None => 0,
        }
    }

    pub fn has_handlers(&self, key: &str) -> bool {
        self.handlers.get(key).is_some_and(|h| !h.is_empty())
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.handlers.keys().collect();
        keys.sort();
        f.debug_struct("EventBus").field("keys", &keys).finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_emit_runs_handlers_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        for tag in ["a", "b"] {
            let seen = seen.clone();
            bus.on("n_rows", move |v| seen.borrow_mut().push(format!("{tag}{v}")));
        }
        assert_eq!(bus.emit("n_rows", &json!(7)), 2);
        assert_eq!(*seen.borrow(), vec!["a7", "b7"]);
        assert_eq!(bus.emit("n_cols", &json!(1)), 0);
    }

    #[test]
    fn test_off_removes_handlers() {
        let mut bus = EventBus::new();
        bus.on("view", |_| {});
        assert!(bus.has_handlers("view"));
        bus.off("view");
        assert!(!bus.has_handlers("view"));
    }
}
