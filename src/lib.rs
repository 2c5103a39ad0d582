//! pdview - lazily-loading table viewport for notebook widgets
//!
//! Shows a large tabular dataset inside a scrollable DOM region while only a
//! bounded window of rows is materialized. The provider renders table markup
//! for a requested row window; pdview decides which window to ask for, keeps
//! sort/select/width/order/search state, and syncs it back.
//! - Row windowing driven by scroll position and screen height
//! - Sequenced, coalescing sync with stale-response rejection
//! - Interaction state that survives markup replacement
//! - A headless surface for driving the engine outside the browser
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { PdView } from 'pdview';
//! await init();
//! const view = new PdView(el, model);
//! const fields = ['seq', 'n_rows', 'n_cols', 'min_rows', 'max_rows', 'max_columns',
//!   'max_colwidth', 'reset', 'config', 'state_cols', 'state_rows', 'view'];
//! for (const key of fields) {
//!   model.on(`change:${key}`, () => view.notify(key, model.get(key)));
//! }
//! view.receive(model.attributes);
//! ```
//!
//! The view's own writes to the model are delivered after it has released
//! its state, so `change:seq` fired by them re-enters `notify` safely. Keep
//! `seq` wired: the model does not announce an answer's `seq` again when it
//! equals the value the view just wrote, so the echo is what pairs the next
//! `view` change with its request.

pub mod config;
pub mod error;
pub mod layout;
pub mod logging;
pub mod render;
pub mod store;
pub mod sync;
pub mod types;
pub mod viewer;
pub mod xml_helpers;

use wasm_bindgen::prelude::*;

pub use config::ViewerConfig;
pub use error::PdviewError;
pub use store::InteractionStore;
pub use viewer::TableView;
#[cfg(target_arch = "wasm32")]
pub use viewer::PdView;

pub use types::*;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Wire protocol version spoken by this build.
#[must_use]
#[wasm_bindgen]
pub fn protocol_version() -> u32 {
    sync::PROTOCOL_VERSION
}
