//! Game session: owns every manager and drives the frame loop
//!
//! The host calls [`Session::frame`] once per display refresh with the wall
//! time since the previous frame. The session runs as many fixed simulation
//! ticks as that time covers and reacts to what happened: sounds, particles,
//! high score and stats.

use std::path::Path;

use chrono::Utc;
use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::audio::{AudioBackend, Cue, SoundManager};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::effects::{AnimationManager, DEFAULT_PARTICLE_COLOR, ParticleBurst, Tween};
use crate::persistence::{Storage, StorageManager};
use crate::platform::InputState;
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, tick};
use crate::stats::GameStats;
use crate::tuning::Tuning;

/// Which top-level screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Intro,
    Menu,
    Game,
}

/// Outcome of the last finished run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunResult {
    pub score: u64,
    pub play_time: f64,
    pub new_high_score: bool,
}

/// Longest frame the accumulator will take (avoids a burst of catch-up ticks)
const MAX_FRAME_DT: f32 = 0.1;
/// Particles thrown on a jump
const JUMP_PARTICLES: usize = 10;

pub struct Session<S: Storage, B: AudioBackend> {
    screen: Screen,
    state: Option<GameState>,
    /// Phase seen at the end of the previous frame
    last_phase: Option<GamePhase>,
    tuning: Tuning,
    /// Fixed tuning that ignores the difficulty setting
    tuning_override: Option<Tuning>,
    settings: Settings,
    storage: StorageManager<S>,
    sound: SoundManager<B>,
    animations: AnimationManager,
    input: InputState,
    accumulator: f32,
    /// Cosmetic randomness, kept apart from the simulation RNG
    effects_rng: Pcg32,
    next_seed: u64,
    high_score: u64,
    stats: GameStats,
    last_result: Option<RunResult>,
}

impl<S: Storage, B: AudioBackend> Session<S, B> {
    /// Load saved data and apply settings. `track` is the background music.
    pub fn new(storage: S, backend: B, track: Option<&Path>, seed: u64) -> Self {
        let storage = StorageManager::new(storage);
        let settings = storage.settings();
        let high_score = storage.high_score();
        let stats = storage.stats();

        let mut sound = SoundManager::new(backend, track);
        sound.set_volume(settings.effective_volume());
        sound.set_muted(settings.is_muted);

        let mut animations = AnimationManager::new();
        animations.start();

        log::info!(
            "Session ready: high score {}, {} games played, difficulty {}",
            high_score,
            stats.total_games,
            settings.difficulty
        );

        Self {
            screen: Screen::Intro,
            state: None,
            last_phase: None,
            tuning: Tuning::for_difficulty(settings.difficulty()),
            tuning_override: None,
            settings,
            storage,
            sound,
            animations,
            input: InputState::new(),
            accumulator: 0.0,
            effects_rng: Pcg32::seed_from_u64(seed ^ 0x5EED_F00D),
            next_seed: seed,
            high_score,
            stats,
            last_result: None,
        }
    }

    /// Use fixed tuning for every run regardless of difficulty.
    ///
    /// Invalid tuning is rejected with a warning and the difficulty preset
    /// stays in effect.
    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        if let Err(e) = tuning.validate() {
            log::warn!("Ignoring tuning override: {}", e);
            return self;
        }
        self.tuning = tuning.clone();
        self.tuning_override = Some(tuning);
        self
    }

    // === Screens ===

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn finish_intro(&mut self) {
        if self.screen == Screen::Intro {
            self.screen = Screen::Menu;
            self.sound.play_background_music();
        }
    }

    /// Begin a fresh run with the next seed
    pub fn start_game(&mut self) {
        if self.tuning_override.is_none() {
            self.tuning = Tuning::for_difficulty(self.settings.difficulty());
        }

        let seed = self.next_seed;
        self.next_seed = self.next_seed.wrapping_add(0x9E37_79B9_7F4A_7C15);

        self.state = Some(GameState::new(seed, &self.tuning));
        self.last_phase = Some(GamePhase::Playing);
        self.screen = Screen::Game;
        self.accumulator = 0.0;
        self.input.clear();
        self.last_result = None;

        self.sound.play(Cue::MenuConfirm);
        self.sound.play(Cue::Background);
        self.animations.add("game-start", Tween::fade_in(0.5));
        log::info!("Run started with seed {}", seed);
    }

    pub fn back_to_menu(&mut self) {
        self.screen = Screen::Menu;
        self.state = None;
        self.last_phase = None;
        self.input.clear();
        self.sound.play(Cue::MenuSelect);
        self.sound.play(Cue::Background);
    }

    // === Input ===

    /// Forward a key press (DOM key code) to the running game
    pub fn key_down(&mut self, code: &str) {
        if self.screen == Screen::Game {
            self.input.key_down(code);
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.screen == Screen::Game {
            self.input.press(crate::platform::Action::Pause);
        }
    }

    /// Let the autopilot play
    pub fn set_idle_mode(&mut self, on: bool) {
        self.input.set_idle_mode(on);
    }

    // === Frame loop ===

    /// Advance by `dt` seconds of wall time. Returns the ticks simulated.
    pub fn frame(&mut self, dt: f32) -> u32 {
        // clamp lets NaN through
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        let mut substeps = 0;

        if self.screen == Screen::Game {
            self.accumulator += dt;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let Some(state) = self.state.as_mut() else {
                    break;
                };
                let input = self.input.take_tick_input();
                tick(state, &input, &self.tuning, SIM_DT);
                let events = state.drain_events();
                self.accumulator -= SIM_DT;
                substeps += 1;

                for event in events {
                    self.handle_event(event);
                }
            }
            self.sync_phase();
        }

        self.animations.update(dt);
        substeps
    }

    fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::Jumped => {
                self.sound.play(Cue::Jump);
                if let Some(state) = &self.state {
                    let origin = Vec2::new(state.player.pos.x, state.player.pos.y);
                    let burst = ParticleBurst::new(
                        origin,
                        DEFAULT_PARTICLE_COLOR,
                        JUMP_PARTICLES,
                        &mut self.effects_rng,
                    );
                    self.animations
                        .add(format!("jump-{}", state.time_ticks), burst);
                }
            }
            GameEvent::SpeedUp { speed } => {
                log::info!("Speed now {:.2}", speed);
                self.animations.add("speed-up", Tween::pulse(1.0, 1.2));
            }
            GameEvent::GameOver { score, play_time } => self.on_game_over(score, play_time),
            GameEvent::Slid | GameEvent::LaneChanged { .. } => {}
        }
    }

    fn on_game_over(&mut self, score: u64, play_time: f64) {
        let new_high_score = self.storage.save_high_score(score);
        if new_high_score {
            self.high_score = score;
            self.sound.play(Cue::Score);
        } else {
            self.sound.play(Cue::GameOver);
        }

        let now = Utc::now();
        self.storage.record_game_at(score, play_time, now);
        self.stats.record(score, play_time, now);

        self.sound.stop(Cue::Background);
        self.animations.add("game-over", Tween::shake(0.3, 5.0));
        self.last_result = Some(RunResult {
            score,
            play_time,
            new_high_score,
        });

        log::info!(
            "Game over: score {}, {:.1}s{}",
            score,
            play_time,
            if new_high_score { " (new high score)" } else { "" }
        );
    }

    /// Music plays on the menu and during an unpaused run
    fn music_wanted(&self) -> bool {
        match self.screen {
            Screen::Intro => false,
            Screen::Menu => true,
            Screen::Game => self.game().is_some_and(|g| g.is_playing()),
        }
    }

    /// Keep music in step with pause/resume
    fn sync_phase(&mut self) {
        let Some(phase) = self.state.as_ref().map(|s| s.phase) else {
            return;
        };
        if self.last_phase == Some(phase) {
            return;
        }
        match phase {
            GamePhase::Paused => self.sound.stop(Cue::Background),
            GamePhase::Playing => self.sound.play(Cue::Background),
            GamePhase::GameOver => {}
        }
        self.last_phase = Some(phase);
    }

    // === Settings ===

    /// Flip mute and persist it. Returns the new state.
    pub fn toggle_mute(&mut self) -> bool {
        let muted = self.sound.toggle_mute();
        if !muted && self.music_wanted() {
            self.sound.play(Cue::Background);
        }
        self.settings.is_muted = muted;
        self.storage.save_settings(&self.settings);
        muted
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.sound.set_volume(volume);
        self.settings.volume = self.sound.volume();
        self.storage.save_settings(&self.settings);
    }

    /// Store a difficulty label; it applies from the next run
    pub fn set_difficulty(&mut self, label: &str) {
        self.settings.difficulty = label.to_string();
        self.storage.save_settings(&self.settings);
    }

    /// Wipe saved data and forget the local copies
    pub fn clear_saved_data(&mut self) -> bool {
        let cleared = self.storage.clear_all();
        if cleared {
            self.high_score = 0;
            self.stats = GameStats::default();
        }
        cleared
    }

    // === Accessors ===

    pub fn game(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    pub fn last_result(&self) -> Option<RunResult> {
        self.last_result
    }

    pub fn sound(&self) -> &SoundManager<B> {
        &self.sound
    }

    pub fn animations(&self) -> &AnimationManager {
        &self.animations
    }

    pub fn into_storage(self) -> S {
        self.storage.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentBackend;
    use crate::consts::START_LANE;
    use crate::persistence::MemoryStorage;
    use crate::sim::{Obstacle, ObstacleKind};

    type TestSession = Session<MemoryStorage, SilentBackend>;

    fn quiet_tuning() -> Tuning {
        Tuning {
            spawn_chance: 0.0,
            respawn_chance: 0.0,
            initial_obstacles: 0,
            ..Default::default()
        }
    }

    fn session_with(storage: MemoryStorage) -> TestSession {
        Session::new(storage, SilentBackend::new(), None, 1).with_tuning(quiet_tuning())
    }

    fn session() -> TestSession {
        session_with(MemoryStorage::new())
    }

    /// Put an obstacle in the player's lane `ticks` ticks away
    fn obstacle_in(session: &mut TestSession, ticks: u32) {
        let tuning = session.tuning.clone();
        let state = session.state.as_mut().unwrap();
        // Player front face at -0.3, cube half depth 0.5
        let z = -0.8 - state.speed * SIM_DT * ticks as f32 + 0.01;
        let id = state.next_entity_id();
        state
            .obstacles
            .push(Obstacle::new(id, ObstacleKind::Cube, START_LANE, z, &tuning));
    }

    fn run_until_over(session: &mut TestSession) -> u32 {
        let mut frames = 0;
        while session.game().is_some_and(|g| g.is_playing()) && frames < 10_000 {
            session.frame(SIM_DT);
            frames += 1;
        }
        frames
    }

    #[test]
    fn test_screen_flow() {
        let mut s = session();
        assert_eq!(s.screen(), Screen::Intro);
        s.finish_intro();
        assert_eq!(s.screen(), Screen::Menu);

        s.start_game();
        assert_eq!(s.screen(), Screen::Game);
        assert!(s.game().is_some_and(|g| g.is_playing()));
        assert!(s.sound().is_background_playing());

        s.back_to_menu();
        assert_eq!(s.screen(), Screen::Menu);
        assert!(s.game().is_none());
        assert!(s.sound().is_background_playing());
    }

    #[test]
    fn test_frames_only_tick_in_game() {
        let mut s = session();
        assert_eq!(s.frame(SIM_DT), 0);
        s.start_game();
        assert_eq!(s.frame(SIM_DT), 1);
        assert_eq!(s.game().map(|g| g.score), Some(1));
    }

    #[test]
    fn test_non_finite_frame_skipped() {
        let mut s = session();
        s.start_game();
        assert_eq!(s.frame(f32::NAN), 0);
        assert_eq!(s.frame(f32::INFINITY), 0);
        assert!(s.accumulator.is_finite());

        let ticks: u32 = (0..60).map(|_| s.frame(SIM_DT)).sum();
        assert_eq!(ticks, 60);
        assert_eq!(s.game().map(|g| g.score), Some(60));
    }

    #[test]
    fn test_invalid_tuning_override_ignored() {
        let bad = Tuning {
            spawn_chance: 1.5,
            respawn_chance: -0.2,
            ..quiet_tuning()
        };
        let mut s: TestSession =
            Session::new(MemoryStorage::new(), SilentBackend::new(), None, 4).with_tuning(bad);
        assert_eq!(s.tuning(), &Tuning::default());

        // Runs on the normal preset without panicking in the spawner
        s.start_game();
        for _ in 0..120 {
            s.frame(SIM_DT);
        }
        assert!(s.game().is_some_and(|g| g.time_ticks > 0));
    }

    #[test]
    fn test_menu_music_survives_run_and_mute() {
        let mut s = session();
        s.finish_intro();
        assert!(s.sound().is_background_playing());

        assert!(s.toggle_mute());
        assert!(!s.sound().is_background_playing());
        assert!(!s.toggle_mute());
        assert!(s.sound().is_background_playing());

        s.start_game();
        obstacle_in(&mut s, 5);
        run_until_over(&mut s);
        assert!(!s.sound().is_background_playing());
        s.back_to_menu();
        assert!(s.sound().is_background_playing());
    }

    #[test]
    fn test_long_frame_capped() {
        let mut s = session();
        s.start_game();
        let ticks = s.frame(10.0);
        // 0.1s clamp covers about six ticks
        assert!(ticks <= MAX_SUBSTEPS);
        assert!((5..=6).contains(&ticks));
    }

    #[test]
    fn test_game_over_records_results() {
        let mut s = session();
        s.start_game();
        obstacle_in(&mut s, 30);
        run_until_over(&mut s);

        let result = s.last_result().unwrap();
        assert!(result.new_high_score);
        assert!(result.score > 0);
        assert_eq!(s.high_score(), result.score);
        assert_eq!(s.stats().total_games, 1);
        assert_eq!(s.stats().total_score, result.score);
        assert!(!s.sound().is_background_playing());
        assert!(s.animations().contains("game-over"));

        // A shorter run does not beat it
        s.start_game();
        obstacle_in(&mut s, 5);
        run_until_over(&mut s);
        let second = s.last_result().unwrap();
        assert!(second.score < result.score);
        assert!(!second.new_high_score);
        assert_eq!(s.high_score(), result.score);
        assert_eq!(s.stats().total_games, 2);
    }

    #[test]
    fn test_stats_sum_over_runs() {
        let mut s = session();
        let mut scores = Vec::new();
        let mut times = Vec::new();
        for gap in [12, 4, 20] {
            s.start_game();
            obstacle_in(&mut s, gap);
            run_until_over(&mut s);
            let r = s.last_result().unwrap();
            scores.push(r.score);
            times.push(r.play_time);
        }

        let storage = s.into_storage();
        let stats = StorageManager::new(storage).stats();
        assert_eq!(stats.total_games, 3);
        assert_eq!(stats.total_score, scores.iter().sum::<u64>());
        assert_eq!(stats.best_score, *scores.iter().max().unwrap());
        assert!((stats.total_play_time - times.iter().sum::<f64>()).abs() < 1e-9);
        assert!(stats.last_played.is_some());
    }

    #[test]
    fn test_saved_data_loaded_on_start() {
        let mut s = session();
        s.start_game();
        obstacle_in(&mut s, 10);
        run_until_over(&mut s);
        let best = s.high_score();
        assert!(s.toggle_mute());
        s.set_volume(0.3);
        s.set_difficulty("hard");

        let reloaded = session_with(s.into_storage());
        assert_eq!(reloaded.high_score(), best);
        assert_eq!(reloaded.stats().total_games, 1);
        assert!(reloaded.settings().is_muted);
        assert!(reloaded.sound().is_muted());
        assert_eq!(reloaded.settings().volume, 0.3);
        assert_eq!(reloaded.settings().difficulty, "hard");
    }

    #[test]
    fn test_difficulty_applies_next_run() {
        let mut s: TestSession = Session::new(MemoryStorage::new(), SilentBackend::new(), None, 3);
        s.set_difficulty("easy");
        s.start_game();
        assert_eq!(s.tuning(), &Tuning::for_difficulty(crate::settings::Difficulty::Easy));
        assert_eq!(s.game().map(|g| g.speed), Some(s.tuning().base_speed));
    }

    #[test]
    fn test_pause_stops_music() {
        let mut s = session();
        s.start_game();
        s.key_down("Escape");
        s.frame(SIM_DT);
        assert_eq!(s.game().map(|g| g.phase), Some(GamePhase::Paused));
        assert!(!s.sound().is_background_playing());

        let score = s.game().map(|g| g.score);
        s.frame(SIM_DT);
        assert_eq!(s.game().map(|g| g.score), score);

        s.toggle_pause();
        s.frame(SIM_DT);
        assert_eq!(s.game().map(|g| g.phase), Some(GamePhase::Playing));
        assert!(s.sound().is_background_playing());
    }

    #[test]
    fn test_jump_spawns_particles() {
        let mut s = session();
        s.start_game();
        s.key_down("Space");
        s.frame(SIM_DT);
        let ticks = s.game().map(|g| g.time_ticks).unwrap();
        assert!(s.animations().contains(&format!("jump-{ticks}")));
    }

    #[test]
    fn test_each_run_gets_new_seed() {
        let mut s = session();
        s.start_game();
        let first = s.game().map(|g| g.seed);
        s.start_game();
        assert_ne!(s.game().map(|g| g.seed), first);
    }

    #[test]
    fn test_clear_saved_data() {
        let mut s = session();
        s.start_game();
        obstacle_in(&mut s, 10);
        run_until_over(&mut s);
        assert!(s.high_score() > 0);

        assert!(s.clear_saved_data());
        assert_eq!(s.high_score(), 0);
        assert_eq!(s.stats(), &GameStats::default());
    }
}
