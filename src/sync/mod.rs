//! Synchronization with the data provider.
//!
//! - [`host`]: the `Host` seam (key/value store, commit, message channel)
//! - [`message`]: outbound requests and inbound responses
//! - [`gateway`]: sequencing, coalescing and stale-response rejection
//! - [`bus`]: field-keyed change notifications from the host

mod bus;
mod gateway;
mod host;
mod message;

pub use bus::{EventBus, Handler};
pub use gateway::{PushOutcome, Receipt, SyncGateway};
#[cfg(target_arch = "wasm32")]
pub use host::JsHost;
pub use host::{deliver, Host, HostCall, MemoryHost, Outbox};
pub use message::{EventKind, SyncRequest, SyncResponse, PROTOCOL_VERSION};
