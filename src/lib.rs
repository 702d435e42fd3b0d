//! Lane Runner - a lane-based 3D endless runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, game state)
//! - `tuning`: Data-driven game balance and difficulty presets
//! - `persistence`: Namespaced key-value storage for high score, settings, stats
//! - `audio`: Named sound cues with a synthesized fallback
//! - `effects`: Per-frame animation registry and particle bursts
//! - `platform`: Keyboard input mapping
//! - `session`: Owns the managers and drives the frame loop

pub mod audio;
pub mod effects;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod stats;
pub mod tuning;

pub use session::{Screen, Session};
pub use settings::{Difficulty, Settings};
pub use stats::GameStats;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Number of lanes (left, centre, right)
    pub const LANE_COUNT: u8 = 3;
    /// Lane the player starts in
    pub const START_LANE: u8 = 1;
    /// Ground height; the player's feet rest here
    pub const GROUND_Y: f32 = 0.0;

    /// Player bounding box (body plus head)
    pub const PLAYER_WIDTH: f32 = 0.8;
    pub const PLAYER_HEIGHT: f32 = 2.1;
    pub const PLAYER_DEPTH: f32 = 0.6;
    /// Height multiplier while sliding
    pub const SLIDE_HEIGHT_SCALE: f32 = 0.5;
}

/// Move `current` toward `target` by at most `max_delta`, never overshooting
#[inline]
pub fn approach(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + max_delta.copysign(delta)
    }
}
