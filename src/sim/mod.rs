//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No audio, storage or platform dependencies

pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Aabb, first_collision, obstacle_box, player_box};
pub use spawn::{advance_obstacles, pick_kind_and_lane, spawn_obstacle};
pub use state::{GameEvent, GamePhase, GameState, Obstacle, ObstacleKind, Player};
pub use tick::{TickInput, tick};
