//! Location search for Mana Weather.
//!
//! Turns raw keystrokes into a confirmed location: input is debounced,
//! superseded lookups are cancelled, and only the newest lookup may touch
//! the visible candidate list.

mod bounds;
mod consumer;
mod controller;
mod debounce;
mod request;

pub use bounds::Bounds;
pub use consumer::SelectionConsumer;
pub use controller::{LocationSearch, SearchMessage, SearchSettings, SearchState};
