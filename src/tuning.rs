//! Data-driven game balance
//!
//! Every constant the simulation reads at runtime lives in [`Tuning`] so a
//! difficulty preset or a JSON override file can change the feel of a run
//! without touching the loop.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::settings::Difficulty;

/// Errors raised while loading a tuning file
#[derive(thiserror::Error, Debug)]
pub enum TuningError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is outside its usable range
    #[error("Invalid tuning: {0}")]
    Invalid(String),
}

/// Balance constants for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tuning {
    // === Player ===
    /// Distance between lane centres
    pub lane_spacing: f32,
    /// Downward acceleration (units/s²)
    pub gravity: f32,
    /// Initial upward velocity of a jump (units/s)
    pub jump_velocity: f32,
    /// How long a slide lasts, in ticks
    pub slide_ticks: u32,
    /// Lateral speed when changing lanes (units/s)
    pub lane_switch_speed: f32,

    // === Difficulty ramp ===
    /// Obstacle speed at the start of a run (units/s)
    pub base_speed: f32,
    /// Speed goes up every time the score hits a multiple of this
    pub speed_interval: u64,
    /// Speed added at each interval
    pub speed_increment: f32,
    /// Speed never exceeds this
    pub max_speed: f32,

    // === Obstacles ===
    /// Chance per tick of an extra obstacle spawning
    pub spawn_chance: f64,
    /// Chance that a recycled obstacle is replaced
    pub respawn_chance: f64,
    /// Depth where new obstacles appear
    pub spawn_z: f32,
    /// Obstacles past this depth are behind the player and get recycled
    pub despawn_z: f32,
    /// Obstacles laid out when a run starts
    pub initial_obstacles: u32,
    /// Depth of the first initial obstacle
    pub initial_start_z: f32,
    /// Gap between initial obstacles
    pub initial_gap: f32,
    /// Upper bound on live obstacles
    pub max_obstacles: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::normal()
    }
}

impl Tuning {
    fn normal() -> Self {
        Self {
            lane_spacing: 2.0,
            // Apex of 3.0 units after 0.5 s
            gravity: 24.0,
            jump_velocity: 12.0,
            slide_ticks: 30,
            lane_switch_speed: 20.0,

            base_speed: 12.0,
            speed_interval: 500,
            speed_increment: 0.6,
            max_speed: 40.0,

            spawn_chance: 0.02,
            respawn_chance: 0.9,
            spawn_z: -200.0,
            despawn_z: 5.0,
            initial_obstacles: 20,
            initial_start_z: -20.0,
            initial_gap: 8.0,
            max_obstacles: 32,
        }
    }

    /// Preset for a difficulty level
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let normal = Self::normal();
        match difficulty {
            Difficulty::Easy => Self {
                base_speed: 9.0,
                speed_increment: 0.45,
                max_speed: 30.0,
                spawn_chance: 0.015,
                respawn_chance: 0.75,
                ..normal
            },
            Difficulty::Normal => normal,
            Difficulty::Hard => Self {
                base_speed: 15.0,
                speed_increment: 0.9,
                max_speed: 50.0,
                spawn_chance: 0.03,
                respawn_chance: 1.0,
                max_obstacles: 40,
                ..normal
            },
        }
    }

    /// Load a tuning override from a JSON file.
    ///
    /// Fields missing from the file keep their normal-preset values.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let tuning: Tuning = serde_json::from_str(&contents)?;
        tuning.validate()?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.speed_interval == 0 {
            return Err(TuningError::Invalid("speedInterval must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.spawn_chance) || !(0.0..=1.0).contains(&self.respawn_chance)
        {
            return Err(TuningError::Invalid("chances must be within 0..=1".into()));
        }
        if self.despawn_z <= self.spawn_z {
            return Err(TuningError::Invalid("despawnZ must lie past spawnZ".into()));
        }
        if self.gravity <= 0.0 || self.lane_switch_speed <= 0.0 {
            return Err(TuningError::Invalid(
                "gravity and laneSwitchSpeed must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Lateral position of a lane's centre (lane 1 is the middle)
    pub fn lane_x(&self, lane: u8) -> f32 {
        (lane as f32 - 1.0) * self.lane_spacing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_ramp_with_difficulty() {
        let easy = Tuning::for_difficulty(Difficulty::Easy);
        let normal = Tuning::for_difficulty(Difficulty::Normal);
        let hard = Tuning::for_difficulty(Difficulty::Hard);

        assert!(easy.base_speed < normal.base_speed);
        assert!(normal.base_speed < hard.base_speed);
        assert!(easy.spawn_chance < hard.spawn_chance);
        assert_eq!(normal, Tuning::default());
    }

    #[test]
    fn test_lane_positions() {
        let tuning = Tuning::default();
        assert_eq!(tuning.lane_x(0), -2.0);
        assert_eq!(tuning.lane_x(1), 0.0);
        assert_eq!(tuning.lane_x(2), 2.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning: Tuning = serde_json::from_str(r#"{"baseSpeed": 20.0}"#).unwrap();
        assert_eq!(tuning.base_speed, 20.0);
        assert_eq!(tuning.speed_interval, 500);
        assert!(tuning.validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let tuning = Tuning {
            speed_interval: 0,
            ..Default::default()
        };
        assert!(matches!(tuning.validate(), Err(TuningError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir()
            .join(format!("lane_runner_tuning_{}.json", std::process::id()));
        std::fs::write(&path, r#"{"gravity": 30.0, "maxObstacles": 12}"#).unwrap();

        let tuning = Tuning::load_from_file(&path).unwrap();
        assert_eq!(tuning.gravity, 30.0);
        assert_eq!(tuning.max_obstacles, 12);

        std::fs::remove_file(&path).ok();
        assert!(matches!(Tuning::load_from_file(&path), Err(TuningError::Io(_))));
    }
}
