//! Data types shared between the viewport, the store and the sync channel.

mod metadata;
mod state;

pub use metadata::*;
pub use state::*;
