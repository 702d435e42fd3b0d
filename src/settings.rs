//! Game settings and preferences
//!
//! Persisted separately from stats under their own storage key.

use serde::{Deserialize, Serialize};

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "medium" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// User preferences.
///
/// Stored verbatim: the difficulty stays a free-form label so whatever the
/// user picked round-trips unchanged, and is only interpreted by
/// [`Settings::difficulty`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Master volume (0.0 - 1.0)
    pub volume: f32,
    /// All audio muted
    pub is_muted: bool,
    /// Difficulty label ("easy", "normal", "hard")
    pub difficulty: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            volume: 0.5,
            is_muted: false,
            difficulty: Difficulty::Normal.as_str().to_string(),
        }
    }
}

impl Settings {
    /// Parsed difficulty; unknown labels play as normal
    pub fn difficulty(&self) -> Difficulty {
        Difficulty::from_label(&self.difficulty).unwrap_or_else(|| {
            log::warn!("Unknown difficulty {:?}, using normal", self.difficulty);
            Difficulty::Normal
        })
    }

    /// Volume clamped to the usable range
    pub fn effective_volume(&self) -> f32 {
        if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
