//! Per-frame animations and particle effects
//!
//! Visual-only bookkeeping: nothing here feeds back into the simulation.
//! The [`AnimationManager`] steps every active entry once per frame and drops
//! the ones that report completion.

use std::collections::BTreeMap;
use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;

/// Visual adjustments an animation applies to whatever it is attached to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub opacity: f32,
    /// Screen-space offset (y down)
    pub offset: Vec2,
    pub scale: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        opacity: 1.0,
        offset: Vec2::ZERO,
        scale: 1.0,
    };
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Anything the manager can step
pub trait Animation {
    /// Advance by `dt` seconds
    fn update(&mut self, dt: f32);

    fn is_complete(&self) -> bool;

    fn transform(&self) -> Transform {
        Transform::IDENTITY
    }

    /// Live particles, for effects that have them
    fn particles(&self) -> &[Particle] {
        &[]
    }
}

/// Shape of a [`Tween`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenKind {
    FadeIn,
    FadeOut,
    /// Decaying vertical hop
    Bounce { height: f32 },
    /// Decaying horizontal jitter
    Shake { intensity: f32 },
    /// One grow-and-shrink cycle
    Pulse { scale: f32 },
}

/// Fixed-duration animation driven by progress 0..1
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub kind: TweenKind,
    pub duration: f32,
    pub elapsed: f32,
}

impl Tween {
    pub fn new(kind: TweenKind, duration: f32) -> Self {
        Self {
            kind,
            duration,
            elapsed: 0.0,
        }
    }

    pub fn fade_in(duration: f32) -> Self {
        Self::new(TweenKind::FadeIn, duration)
    }

    pub fn fade_out(duration: f32) -> Self {
        Self::new(TweenKind::FadeOut, duration)
    }

    pub fn bounce(duration: f32, height: f32) -> Self {
        Self::new(TweenKind::Bounce { height }, duration)
    }

    pub fn shake(duration: f32, intensity: f32) -> Self {
        Self::new(TweenKind::Shake { intensity }, duration)
    }

    pub fn pulse(duration: f32, scale: f32) -> Self {
        Self::new(TweenKind::Pulse { scale }, duration)
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        }
    }
}

impl Animation for Tween {
    fn update(&mut self, dt: f32) {
        self.elapsed += dt.max(0.0);
    }

    fn is_complete(&self) -> bool {
        self.progress() >= 1.0
    }

    fn transform(&self) -> Transform {
        let p = self.progress();
        let mut t = Transform::IDENTITY;
        match self.kind {
            TweenKind::FadeIn => t.opacity = p,
            TweenKind::FadeOut => t.opacity = 1.0 - p,
            // Motion tweens settle back to identity when done
            _ if p >= 1.0 => {}
            TweenKind::Bounce { height } => {
                t.offset.y = -(p * PI * 4.0).sin() * height * (1.0 - p);
            }
            TweenKind::Shake { intensity } => {
                t.offset.x = (p * PI * 20.0).sin() * intensity * (1.0 - p);
            }
            TweenKind::Pulse { scale } => {
                t.scale = 1.0 + (p * PI * 2.0).sin() * (scale - 1.0) * 0.5;
            }
        }
        t
    }
}

/// A single spark
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 0-1, decreases over time
    pub life: f32,
    /// Life lost per second
    pub decay: f32,
    /// 0xRRGGBB
    pub color: u32,
    pub size: f32,
}

/// Gravity applied to particles (screen units/s², y down)
const PARTICLE_GRAVITY: f32 = 500.0;

/// Gold, the default burst colour
pub const DEFAULT_PARTICLE_COLOR: u32 = 0xFFD700;

/// Burst of particles thrown upward from a point
#[derive(Debug, Clone)]
pub struct ParticleBurst {
    particles: Vec<Particle>,
}

impl ParticleBurst {
    pub fn new<R: Rng + ?Sized>(origin: Vec2, color: u32, count: usize, rng: &mut R) -> Self {
        let particles = (0..count)
            .map(|_| Particle {
                pos: origin,
                vel: Vec2::new(
                    (rng.random::<f32>() - 0.5) * 200.0,
                    (rng.random::<f32>() - 0.5) * 200.0 - 100.0,
                ),
                life: 1.0,
                decay: 1.2 + rng.random::<f32>() * 1.8,
                color,
                size: 3.0 + rng.random::<f32>() * 5.0,
            })
            .collect();
        Self { particles }
    }
}

impl Animation for ParticleBurst {
    fn update(&mut self, dt: f32) {
        for particle in self.particles.iter_mut() {
            particle.pos += particle.vel * dt;
            particle.vel.y += PARTICLE_GRAVITY * dt;
            particle.life -= particle.decay * dt;
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    fn is_complete(&self) -> bool {
        self.particles.is_empty()
    }

    fn particles(&self) -> &[Particle] {
        &self.particles
    }
}

struct Entry {
    animation: Box<dyn Animation>,
    active: bool,
}

/// Registry of running animations keyed by name
#[derive(Default)]
pub struct AnimationManager {
    // BTreeMap keeps update order stable
    entries: BTreeMap<String, Entry>,
    running: bool,
}

impl AnimationManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        if !self.running {
            log::debug!("Animation manager started");
            self.running = true;
        }
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Register an animation, replacing any with the same id
    pub fn add(&mut self, id: impl Into<String>, animation: impl Animation + 'static) {
        self.entries.insert(
            id.into(),
            Entry {
                animation: Box::new(animation),
                active: true,
            },
        );
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Hold an animation in place without removing it
    pub fn set_active(&mut self, id: &str, active: bool) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) => {
                entry.active = active;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&dyn Animation> {
        self.entries.get(id).map(|e| e.animation.as_ref())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Step every active animation and drop the finished ones
    pub fn update(&mut self, dt: f32) {
        if !self.running {
            return;
        }
        for entry in self.entries.values_mut().filter(|e| e.active) {
            entry.animation.update(dt);
        }
        self.entries
            .retain(|_, e| !(e.active && e.animation.is_complete()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_fade_progress() {
        let mut fade = Tween::fade_in(1.0);
        assert_eq!(fade.transform().opacity, 0.0);
        fade.update(0.25);
        assert_eq!(fade.transform().opacity, 0.25);
        fade.update(2.0);
        assert!(fade.is_complete());
        assert_eq!(fade.transform().opacity, 1.0);

        let mut out = Tween::fade_out(0.5);
        out.update(0.25);
        assert_eq!(out.transform().opacity, 0.5);
    }

    #[test]
    fn test_motion_tweens_reset_when_done() {
        for mut tween in [
            Tween::bounce(0.5, 20.0),
            Tween::shake(0.3, 5.0),
            Tween::pulse(1.0, 1.2),
        ] {
            tween.update(0.1);
            assert_ne!(tween.transform(), Transform::IDENTITY);
            tween.update(1.0);
            assert!(tween.is_complete());
            assert_eq!(tween.transform(), Transform::IDENTITY);
        }
    }

    #[test]
    fn test_particles_fall_and_expire() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut burst =
            ParticleBurst::new(Vec2::new(10.0, 10.0), DEFAULT_PARTICLE_COLOR, 10, &mut rng);
        assert_eq!(burst.particles().len(), 10);
        assert!(burst.particles().iter().all(|p| p.vel.y <= 0.0), "thrown upward");

        let start_vel: Vec<f32> = burst.particles().iter().map(|p| p.vel.y).collect();
        burst.update(0.1);
        for (p, v0) in burst.particles().iter().zip(&start_vel) {
            assert!(p.vel.y > *v0, "gravity pulls down");
        }

        // Slowest decay is 1.2/s, so a second is always enough
        for _ in 0..60 {
            burst.update(1.0 / 60.0);
        }
        assert!(burst.is_complete());
    }

    #[test]
    fn test_manager_drops_completed() {
        let mut manager = AnimationManager::new();
        manager.add("fade", Tween::fade_in(0.1));
        manager.add("pulse", Tween::pulse(1.0, 1.2));

        // Not running yet: nothing moves
        manager.update(1.0);
        assert_eq!(manager.len(), 2);

        manager.start();
        manager.update(0.2);
        assert!(!manager.contains("fade"));
        assert!(manager.contains("pulse"));
        assert!(manager.get("pulse").is_some_and(|a| !a.is_complete()));
    }

    #[test]
    fn test_inactive_entries_hold() {
        let mut manager = AnimationManager::new();
        manager.start();
        manager.add("fade", Tween::fade_in(0.1));
        assert!(manager.set_active("fade", false));
        manager.update(1.0);
        assert!(manager.contains("fade"));
        assert_eq!(manager.get("fade").map(|a| a.transform().opacity), Some(0.0));

        assert!(manager.set_active("fade", true));
        manager.update(1.0);
        assert!(manager.is_empty());
        assert!(!manager.set_active("fade", true));
    }

    #[test]
    fn test_add_replaces_and_remove() {
        let mut manager = AnimationManager::new();
        manager.add("x", Tween::fade_in(1.0));
        manager.add("x", Tween::fade_out(1.0));
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.get("x").map(|a| a.transform().opacity), Some(1.0));
        assert!(manager.remove("x"));
        assert!(!manager.remove("x"));
    }
}
