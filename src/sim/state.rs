//! Game state and core simulation types
//!
//! Everything a run needs to be replayed from its seed lives here.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::spawn;
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended on a collision
    GameOver,
}

/// Something the host should react to (sound, effects, persistence)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player left the ground
    Jumped,
    /// Player started a slide
    Slid,
    /// Player committed to a new lane
    LaneChanged { lane: u8 },
    /// Speed stepped up at a score interval
    SpeedUp { speed: f32 },
    /// Run ended; final score and elapsed seconds
    GameOver { score: u64, play_time: f64 },
}

/// The runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// x = lateral, y = feet height above ground, z = depth (fixed)
    pub pos: Vec3,
    /// Vertical velocity (units/s, up is positive)
    pub vel_y: f32,
    /// Lane the player is in or moving toward
    pub lane: u8,
    pub jumping: bool,
    pub sliding: bool,
    /// Ticks left in the current slide
    pub slide_ticks: u32,
    /// Standing box size
    pub size: Vec3,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec3::new(tuning.lane_x(START_LANE), GROUND_Y, 0.0),
            vel_y: 0.0,
            lane: START_LANE,
            jumping: false,
            sliding: false,
            slide_ticks: 0,
            size: Vec3::new(PLAYER_WIDTH, PLAYER_HEIGHT, PLAYER_DEPTH),
        }
    }

    /// Current box height (shrinks while sliding)
    pub fn height(&self) -> f32 {
        if self.sliding {
            self.size.y * SLIDE_HEIGHT_SCALE
        } else {
            self.size.y
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.pos.y <= GROUND_Y && !self.jumping
    }

    /// Start a jump if standing on the ground
    pub fn jump(&mut self, tuning: &Tuning) -> bool {
        if self.jumping {
            return false;
        }
        self.jumping = true;
        self.vel_y = tuning.jump_velocity;
        true
    }

    /// Start a slide unless one is already running
    pub fn slide(&mut self, tuning: &Tuning) -> bool {
        if self.sliding || tuning.slide_ticks == 0 {
            return false;
        }
        self.sliding = true;
        self.slide_ticks = tuning.slide_ticks;
        true
    }

    /// Shift the target lane by `direction`; returns false at the edge
    pub fn change_lane(&mut self, direction: i8) -> bool {
        let target = self.lane as i16 + direction as i16;
        if (0..LANE_COUNT as i16).contains(&target) {
            self.lane = target as u8;
            true
        } else {
            false
        }
    }

    /// Gravity, ground clamp and slide timer for one step
    pub fn integrate(&mut self, tuning: &Tuning, dt: f32) {
        self.vel_y -= tuning.gravity * dt;
        self.pos.y += self.vel_y * dt;

        if self.pos.y <= GROUND_Y {
            self.pos.y = GROUND_Y;
            self.vel_y = 0.0;
            self.jumping = false;
        }

        if self.sliding {
            self.slide_ticks = self.slide_ticks.saturating_sub(1);
            if self.slide_ticks == 0 {
                self.sliding = false;
            }
        }

        let target_x = tuning.lane_x(self.lane);
        self.pos.x = crate::approach(self.pos.x, target_x, tuning.lane_switch_speed * dt);
    }
}

/// Obstacle shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Low block, jump over it
    Cube,
    /// Tall post, change lanes
    Pillar,
    /// Low slab wider than a lane
    Wide,
    /// Raised bar, slide under it
    Barrier,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 4] = [
        ObstacleKind::Cube,
        ObstacleKind::Pillar,
        ObstacleKind::Wide,
        ObstacleKind::Barrier,
    ];

    /// Box size (width, height, depth)
    pub fn size(&self) -> Vec3 {
        match self {
            ObstacleKind::Cube => Vec3::new(1.0, 1.0, 1.0),
            ObstacleKind::Pillar => Vec3::new(0.5, 2.0, 0.5),
            ObstacleKind::Wide => Vec3::new(2.0, 0.5, 1.0),
            ObstacleKind::Barrier => Vec3::new(1.8, 0.6, 0.5),
        }
    }

    /// Height of the box's underside above the ground
    pub fn clearance(&self) -> f32 {
        match self {
            ObstacleKind::Barrier => 1.2,
            _ => 0.0,
        }
    }
}

/// An obstacle entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub lane: u8,
    /// Box centre
    pub pos: Vec3,
    pub size: Vec3,
}

impl Obstacle {
    pub fn new(id: u32, kind: ObstacleKind, lane: u8, z: f32, tuning: &Tuning) -> Self {
        let size = kind.size();
        Self {
            id,
            kind,
            lane,
            pos: Vec3::new(tuning.lane_x(lane), GROUND_Y + kind.clearance() + size.y / 2.0, z),
            size,
        }
    }
}

/// Complete run state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Obstacle RNG, seeded from `seed`
    pub rng: Pcg32,
    /// Score, one point per tick survived
    pub score: u64,
    /// Obstacle speed toward the player (units/s)
    pub speed: f32,
    /// Simulation tick counter (ticks spent playing)
    pub time_ticks: u64,
    /// Seconds spent playing (pauses excluded)
    pub elapsed: f64,
    /// Current phase
    pub phase: GamePhase,
    pub player: Player,
    /// Active obstacles (sorted by id for determinism)
    pub obstacles: Vec<Obstacle>,
    /// Events raised since the host last drained them
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new run with the given seed and lay out the opening obstacles
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            score: 0,
            speed: tuning.base_speed,
            time_ticks: 0,
            elapsed: 0.0,
            phase: GamePhase::Playing,
            player: Player::new(tuning),
            obstacles: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        };

        for i in 0..tuning.initial_obstacles {
            let z = tuning.initial_start_z - i as f32 * tuning.initial_gap;
            spawn::spawn_obstacle(&mut state, tuning, z);
        }

        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Seconds spent playing (pauses excluded)
    pub fn play_time(&self) -> f64 {
        self.elapsed
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ensure obstacles are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.obstacles.sort_by_key(|o| o.id);
    }
}
