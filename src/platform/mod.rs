//! Platform abstraction layer
//!
//! Handles host differences for:
//! - Input events (key codes to game actions)
//!
//! Storage lives in `persistence`, audio output behind `audio::AudioBackend`.

pub mod input;

pub use input::{Action, InputState};
