//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use super::collision::first_collision;
use super::spawn::advance_obstacles;
use super::state::{GameEvent, GamePhase, GameState, Obstacle, ObstacleKind};
use crate::tuning::Tuning;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Move one lane left
    pub lane_left: bool,
    /// Move one lane right
    pub lane_right: bool,
    /// Jump (ignored while airborne)
    pub jump: bool,
    /// Slide (ignored while already sliding)
    pub slide: bool,
    /// Pause toggle
    pub pause: bool,
    /// Idle/demo mode - autopilot plays the game
    pub idle_mode: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, tuning: &Tuning, dt: f32) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                log::debug!("Paused at score {}", state.score);
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                log::debug!("Resumed at score {}", state.score);
            }
            GamePhase::GameOver => {}
        }
    }

    // Don't tick if paused or game over
    if state.phase != GamePhase::Playing {
        return;
    }

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(state, tuning, &mut input);
    }
    let input = &input;

    apply_controls(state, input, tuning);

    state.time_ticks += 1;
    state.elapsed += dt as f64;

    // Player physics
    state.player.integrate(tuning, dt);

    // Obstacles
    advance_obstacles(state, tuning, dt);
    state.normalize_order();

    // Collisions end the run before this tick scores
    if let Some(id) = first_collision(&state.player, &state.obstacles) {
        state.phase = GamePhase::GameOver;
        let play_time = state.play_time();
        log::info!(
            "Hit obstacle {} - game over with score {} after {:.1}s",
            id,
            state.score,
            play_time
        );
        state.events.push(GameEvent::GameOver {
            score: state.score,
            play_time,
        });
        return;
    }

    state.score += 1;

    // Difficulty ramp
    if state.score % tuning.speed_interval == 0 {
        let new_speed = (state.speed + tuning.speed_increment).min(tuning.max_speed);
        if new_speed > state.speed {
            state.speed = new_speed;
            log::debug!("Speed up to {:.2} at score {}", state.speed, state.score);
            state.events.push(GameEvent::SpeedUp { speed: state.speed });
        }
    }
}

fn apply_controls(state: &mut GameState, input: &TickInput, tuning: &Tuning) {
    let player = &mut state.player;

    let direction = match (input.lane_left, input.lane_right) {
        (true, false) => -1,
        (false, true) => 1,
        _ => 0,
    };
    if direction != 0 && player.change_lane(direction) {
        state.events.push(GameEvent::LaneChanged { lane: player.lane });
    }

    if input.jump && player.jump(tuning) {
        state.events.push(GameEvent::Jumped);
    }

    if input.slide && player.slide(tuning) {
        state.events.push(GameEvent::Slid);
    }
}

/// Seconds of warning the autopilot looks ahead
const AUTOPILOT_LOOKAHEAD_SECS: f32 = 0.6;
/// Jump when an obstacle is this close (seconds)
const AUTOPILOT_JUMP_SECS: f32 = 0.15;
/// Slide when a barrier is this close (seconds)
const AUTOPILOT_SLIDE_SECS: f32 = 0.25;

/// Gap between the player's front face and the obstacle's near face
fn gap_ahead(state: &GameState, obstacle: &Obstacle) -> f32 {
    let player_front = state.player.pos.z - state.player.size.z / 2.0;
    let obstacle_back = obstacle.pos.z + obstacle.size.z / 2.0;
    player_front - obstacle_back
}

/// Nearest obstacle in `lane` that has not passed the player yet
fn nearest_threat(state: &GameState, lane: u8, lookahead: f32) -> Option<&Obstacle> {
    let player_back = state.player.pos.z + state.player.size.z / 2.0;
    state
        .obstacles
        .iter()
        .filter(|o| o.lane == lane && o.pos.z - o.size.z / 2.0 < player_back)
        .filter(|o| gap_ahead(state, o) < lookahead)
        .min_by(|a, b| {
            gap_ahead(state, a)
                .partial_cmp(&gap_ahead(state, b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// Demo-mode player: dodge sideways when a free lane exists, otherwise jump
/// or slide at the last moment.
fn autopilot(state: &GameState, tuning: &Tuning, input: &mut TickInput) {
    let player = &state.player;
    let lookahead = (state.speed * AUTOPILOT_LOOKAHEAD_SECS).max(4.0);

    let Some(threat) = nearest_threat(state, player.lane, lookahead) else {
        return;
    };

    // Wait until the previous lane change has landed
    let settled = (player.pos.x - tuning.lane_x(player.lane)).abs() < 0.05;
    if settled {
        let free_lane = [player.lane.checked_sub(1), player.lane.checked_add(1)]
            .into_iter()
            .flatten()
            .filter(|&l| l < crate::consts::LANE_COUNT)
            .find(|&l| nearest_threat(state, l, lookahead).is_none());

        if let Some(lane) = free_lane {
            if lane < player.lane {
                input.lane_left = true;
            } else {
                input.lane_right = true;
            }
            return;
        }
    }

    let time_to_impact = gap_ahead(state, threat) / state.speed.max(f32::EPSILON);
    match threat.kind {
        ObstacleKind::Barrier => {
            if time_to_impact <= AUTOPILOT_SLIDE_SECS && player.is_grounded() {
                input.slide = true;
            }
        }
        ObstacleKind::Cube | ObstacleKind::Wide | ObstacleKind::Pillar => {
            if time_to_impact <= AUTOPILOT_JUMP_SECS && player.is_grounded() {
                input.jump = true;
            }
        }
    }
}
