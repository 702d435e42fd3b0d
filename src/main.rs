//! Lane Runner entry point
//!
//! Runs a headless session with the autopilot at the controls and records the
//! result like a normal game would. Rendering and windowing live elsewhere.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use lane_runner::Tuning;
use lane_runner::audio::SilentBackend;
use lane_runner::consts::SIM_DT;
use lane_runner::persistence::{FileStorage, MemoryStorage, Storage, StorageError};
use lane_runner::session::Session;

/// Ten minutes of play at 60 Hz
const DEFAULT_MAX_TICKS: u64 = 36_000;

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring {}={:?}: not a valid value", name, raw);
            None
        }
    }
}

fn open_storage() -> Result<FileStorage, StorageError> {
    match env::var_os("RUNNER_DATA_DIR") {
        Some(dir) => FileStorage::open(PathBuf::from(dir).join(FileStorage::FILE_NAME)),
        None => FileStorage::open_default(),
    }
}

fn load_tuning() -> Option<Tuning> {
    let path = env::var_os("RUNNER_TUNING")?;
    match Tuning::load_from_file(&path) {
        Ok(tuning) => Some(tuning),
        Err(e) => {
            log::warn!("Failed to load tuning from {:?}: {}", path, e);
            None
        }
    }
}

fn run<S: Storage>(storage: S, seed: u64, max_ticks: u64) {
    let mut session = Session::new(storage, SilentBackend::new(), None, seed);
    if let Some(tuning) = load_tuning() {
        session = session.with_tuning(tuning);
    }

    session.finish_intro();
    session.start_game();
    session.set_idle_mode(true);

    let mut ticks = 0u64;
    while ticks < max_ticks && session.game().is_some_and(|g| g.is_playing()) {
        ticks += u64::from(session.frame(SIM_DT));
    }

    match session.last_result() {
        Some(result) => log::info!(
            "Run ended after {} ticks: score {} in {:.1}s{}",
            ticks,
            result.score,
            result.play_time,
            if result.new_high_score { ", new high score!" } else { "" }
        ),
        None => log::info!(
            "Autopilot survived {} ticks (score {})",
            ticks,
            session.game().map_or(0, |g| g.score)
        ),
    }

    let stats = session.stats();
    log::info!(
        "High score {} | {} games, average {:.0}, {:.0}s played",
        session.high_score(),
        stats.total_games,
        stats.average_score(),
        stats.total_play_time
    );
}

fn main() {
    env_logger::init();
    log::info!("Lane Runner (headless) starting...");

    let seed = env_parse("RUNNER_SEED")
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis() as u64);
    let max_ticks = env_parse("RUNNER_MAX_TICKS").unwrap_or(DEFAULT_MAX_TICKS);
    log::info!("Seed {}, tick limit {}", seed, max_ticks);

    match open_storage() {
        Ok(storage) => {
            log::info!("Using storage at {}", storage.path().display());
            run(storage, seed, max_ticks);
        }
        Err(e) => {
            log::error!("Storage unavailable ({}), progress will not be saved", e);
            run(MemoryStorage::new(), seed, max_ticks);
        }
    }
}
