//! Audio playback module.

pub mod backend;

pub use backend::{Player, PlayerEvent};
