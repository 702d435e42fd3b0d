//! Collision detection between the runner and obstacles
//!
//! Everything is an axis-aligned box. Any overlap ends the run; there is no
//! damage model, so the only question is whether *some* obstacle overlaps.

use glam::Vec3;

use super::state::{Obstacle, Player};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Strict overlap on every axis; boxes that only touch do not intersect
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }
}

/// The runner's box: feet at `pos.y`, centred on x/z
pub fn player_box(player: &Player) -> Aabb {
    let half_w = player.size.x / 2.0;
    let half_d = player.size.z / 2.0;
    Aabb::new(
        Vec3::new(player.pos.x - half_w, player.pos.y, player.pos.z - half_d),
        Vec3::new(
            player.pos.x + half_w,
            player.pos.y + player.height(),
            player.pos.z + half_d,
        ),
    )
}

pub fn obstacle_box(obstacle: &Obstacle) -> Aabb {
    Aabb::from_center_size(obstacle.pos, obstacle.size)
}

/// ID of the first obstacle (in iteration order) overlapping the player
pub fn first_collision(player: &Player, obstacles: &[Obstacle]) -> Option<u32> {
    let hitbox = player_box(player);
    obstacles
        .iter()
        .find(|o| hitbox.intersects(&obstacle_box(o)))
        .map(|o| o.id)
}
