//! Host seam: the key/value state store and message channel the view is
//! embedded in.

use serde_json::{Map, Value};

use crate::error::Result;

#[cfg(target_arch = "wasm32")]
use crate::error::PdviewError;
#[cfg(target_arch = "wasm32")]
use js_sys::{Function, Reflect};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue};

/// State synchronization primitives provided by the embedding host.
pub trait Host {
    /// Stage one key for the next commit.
    fn set(&mut self, key: &str, value: Value) -> Result<()>;

    /// Commit every staged key to the provider in one update.
    fn send_update(&mut self) -> Result<()>;

    /// Fire-and-forget message that bypasses synced state.
    fn send(&mut self, payload: Value) -> Result<()>;
}

/// In-memory host that records every staged key, commit and message.
///
/// Used for headless embedding and by the test suites.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    staged: Map<String, Value>,
    /// Every committed update, oldest first.
    pub commits: Vec<Map<String, Value>>,
    /// Every fire-and-forget message, oldest first.
    pub messages: Vec<Value>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent commit, if any.
    pub fn last_commit(&self) -> Option<&Map<String, Value>> {
        self.commits.last()
    }

    /// Value of `key` in the most recent commit.
    pub fn last(&self, key: &str) -> Option<&Value> {
        self.last_commit().and_then(|c| c.get(key))
    }
}

impl Host for MemoryHost {
    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.staged.insert(key.to_string(), value);
        Ok(())
    }

    fn send_update(&mut self) -> Result<()> {
        self.commits.push(std::mem::take(&mut self.staged));
        Ok(())
    }

    fn send(&mut self, payload: Value) -> Result<()> {
        self.messages.push(payload);
        Ok(())
    }
}

/// One host call, recorded for later delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Set(String, Value),
    SendUpdate,
    Send(Value),
}

/// Host that only records calls.
///
/// A view shared behind a `RefCell` stages its calls here; the owner takes
/// them and [`deliver`]s them to the real host after releasing the borrow,
/// so change callbacks fired by the host can re-enter the view.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    calls: Vec<HostCall>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Remove every staged call, oldest first.
    pub fn take(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }
}

impl Host for Outbox {
    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.calls.push(HostCall::Set(key.to_string(), value));
        Ok(())
    }

    fn send_update(&mut self) -> Result<()> {
        self.calls.push(HostCall::SendUpdate);
        Ok(())
    }

    fn send(&mut self, payload: Value) -> Result<()> {
        self.calls.push(HostCall::Send(payload));
        Ok(())
    }
}

/// Replay recorded calls against `host` in order, stopping at the first
/// failure.
pub fn deliver<H: Host + ?Sized>(calls: Vec<HostCall>, host: &mut H) -> Result<()> {
    for call in calls {
        match call {
            HostCall::Set(key, value) => host.set(&key, value)?,
            HostCall::SendUpdate => host.send_update()?,
            HostCall::Send(payload) => host.send(payload)?,
        }
    }
    Ok(())
}

/// Host backed by a JavaScript widget model exposing `set`, `save_changes`
/// and `send`.
#[cfg(target_arch = "wasm32")]
#[derive(Clone)]
pub struct JsHost {
    model: JsValue,
}

#[cfg(target_arch = "wasm32")]
impl JsHost {
    pub fn new(model: JsValue) -> Self {
        Self { model }
    }

    fn method(&self, name: &str) -> Result<Function> {
        Reflect::get(&self.model, &JsValue::from_str(name))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or_else(|| PdviewError::Host(format!("model has no `{name}` method")))
    }
}

#[cfg(target_arch = "wasm32")]
fn to_js(value: &Value) -> Result<JsValue> {
    use serde::Serialize;
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|e| PdviewError::Host(e.to_string()))
}

#[cfg(target_arch = "wasm32")]
fn js_error(e: JsValue) -> PdviewError {
    PdviewError::Host(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

#[cfg(target_arch = "wasm32")]
impl Host for JsHost {
    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        let set = self.method("set")?;
        set.call2(&self.model, &JsValue::from_str(key), &to_js(&value)?)
            .map_err(js_error)?;
        Ok(())
    }

    fn send_update(&mut self) -> Result<()> {
        let save = self.method("save_changes")?;
        save.call0(&self.model).map_err(js_error)?;
        Ok(())
    }

    fn send(&mut self, payload: Value) -> Result<()> {
        let send = self.method("send")?;
        send.call1(&self.model, &to_js(&payload)?).map_err(js_error)?;
        Ok(())
    }
}
