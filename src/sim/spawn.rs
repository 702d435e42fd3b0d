//! Obstacle generation and recycling
//!
//! All randomness goes through the caller's RNG so a seeded run lays out the
//! same course every time.

use rand::Rng;

use super::state::{GameState, Obstacle, ObstacleKind};
use crate::consts::LANE_COUNT;
use crate::tuning::Tuning;

/// Draw an obstacle kind and lane
pub fn pick_kind_and_lane<R: Rng + ?Sized>(rng: &mut R) -> (ObstacleKind, u8) {
    let kind = ObstacleKind::ALL[rng.random_range(0..ObstacleKind::ALL.len())];
    let lane = rng.random_range(0..LANE_COUNT);
    (kind, lane)
}

/// Spawn one random obstacle at depth `z`
pub fn spawn_obstacle(state: &mut GameState, tuning: &Tuning, z: f32) -> u32 {
    let (kind, lane) = pick_kind_and_lane(&mut state.rng);
    let id = state.next_entity_id();
    state.obstacles.push(Obstacle::new(id, kind, lane, z, tuning));
    id
}

/// Move obstacles toward the player, recycle the ones behind it and roll for
/// new arrivals. Returns how many obstacles were dropped.
pub fn advance_obstacles(state: &mut GameState, tuning: &Tuning, dt: f32) -> usize {
    let step = state.speed * dt;
    for obstacle in &mut state.obstacles {
        obstacle.pos.z += step;
    }

    let before = state.obstacles.len();
    state.obstacles.retain(|o| o.pos.z <= tuning.despawn_z);
    let dropped = before - state.obstacles.len();

    for _ in 0..dropped {
        if state.obstacles.len() >= tuning.max_obstacles {
            break;
        }
        if state.rng.random_bool(tuning.respawn_chance) {
            spawn_obstacle(state, tuning, tuning.spawn_z);
        }
    }

    if state.obstacles.len() < tuning.max_obstacles && state.rng.random_bool(tuning.spawn_chance) {
        spawn_obstacle(state, tuning, tuning.spawn_z);
    }

    if dropped > 0 {
        log::debug!(
            "Recycled {} obstacles, {} live at speed {:.2}",
            dropped,
            state.obstacles.len(),
            state.speed
        );
    }

    dropped
}
