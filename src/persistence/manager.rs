//! Namespaced game records on top of a [`Storage`] backend
//!
//! Every operation is best-effort: failures are logged and the caller gets a
//! default (`0`, `Settings::default()`, `GameStats::default()`) or `false`.

use chrono::{DateTime, Utc};

use super::store::{Storage, StorageError};
use crate::settings::Settings;
use crate::stats::GameStats;

/// Prefix shared by every key this game writes
pub const DEFAULT_NAMESPACE: &str = "desktopRunnerGame";

/// High score, settings and stats persistence
#[derive(Debug)]
pub struct StorageManager<S: Storage> {
    storage: S,
    namespace: String,
}

impl<S: Storage> StorageManager<S> {
    pub fn new(storage: S) -> Self {
        Self::with_namespace(storage, DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(storage: S, namespace: impl Into<String>) -> Self {
        Self {
            storage,
            namespace: namespace.into(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    fn key(&self, name: &str) -> String {
        format!("{}_{}", self.namespace, name)
    }

    fn high_score_key(&self) -> String {
        self.key("highScore")
    }

    fn settings_key(&self) -> String {
        self.key("settings")
    }

    fn stats_key(&self) -> String {
        self.key("stats")
    }

    /// Store `score` if it beats the current best. Returns true on a new record.
    pub fn save_high_score(&mut self, score: u64) -> bool {
        let current = self.high_score();
        if score <= current {
            return false;
        }
        let key = self.high_score_key();
        match self.storage.set(&key, &score.to_string()) {
            Ok(()) => {
                log::info!("New high score {} (was {})", score, current);
                true
            }
            Err(e) => {
                log::error!("Error saving high score: {}", e);
                false
            }
        }
    }

    /// Best score so far (0 when absent or unreadable)
    pub fn high_score(&self) -> u64 {
        match self.storage.get(&self.high_score_key()) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("Ignoring malformed high score {:?}", raw);
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                log::error!("Error loading high score: {}", e);
                0
            }
        }
    }

    pub fn save_settings(&mut self, settings: &Settings) -> bool {
        let key = self.settings_key();
        let result = serde_json::to_string(settings)
            .map_err(StorageError::from)
            .and_then(|json| self.storage.set(&key, &json));
        match result {
            Ok(()) => {
                log::debug!("Settings saved");
                true
            }
            Err(e) => {
                log::error!("Error saving game settings: {}", e);
                false
            }
        }
    }

    /// Stored settings, or defaults when absent or unreadable
    pub fn settings(&self) -> Settings {
        self.load_json(&self.settings_key(), "game settings")
    }

    /// Fold a finished run into the stats, stamped with the current time
    pub fn record_game(&mut self, score: u64, play_time: f64) -> bool {
        self.record_game_at(score, play_time, Utc::now())
    }

    /// Fold a finished run into the stats
    pub fn record_game_at(&mut self, score: u64, play_time: f64, now: DateTime<Utc>) -> bool {
        let mut stats = self.stats();
        stats.record(score, play_time, now);

        let key = self.stats_key();
        let result = serde_json::to_string(&stats)
            .map_err(StorageError::from)
            .and_then(|json| self.storage.set(&key, &json));
        match result {
            Ok(()) => {
                log::debug!(
                    "Stats saved: {} games, best {}",
                    stats.total_games,
                    stats.best_score
                );
                true
            }
            Err(e) => {
                log::error!("Error saving game stats: {}", e);
                false
            }
        }
    }

    /// Stored stats, or zeroes when absent or unreadable
    pub fn stats(&self) -> GameStats {
        self.load_json(&self.stats_key(), "game stats")
    }

    /// Remove every key under this namespace; other keys are left alone
    pub fn clear_all(&mut self) -> bool {
        let prefix = format!("{}_", self.namespace);
        let result = self.storage.keys().and_then(|keys| {
            keys.iter()
                .filter(|k| k.starts_with(&prefix))
                .try_for_each(|k| self.storage.remove(k))
        });
        match result {
            Ok(()) => {
                log::info!("Cleared all saved data");
                true
            }
            Err(e) => {
                log::error!("Error clearing data: {}", e);
                false
            }
        }
    }

    fn load_json<T>(&self, key: &str, what: &str) -> T
    where
        T: serde::de::DeserializeOwned + Default,
    {
        match self.storage.get(key) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                log::warn!("Error loading {}: {}", what, e);
                T::default()
            }),
            Ok(None) => T::default(),
            Err(e) => {
                log::error!("Error loading {}: {}", what, e);
                T::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use chrono::TimeZone;
    use proptest::prelude::*;

    /// Backend whose every call fails
    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(std::io::Error::other("disk on fire").into())
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(std::io::Error::other("disk on fire").into())
        }
        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(std::io::Error::other("disk on fire").into())
        }
        fn keys(&self) -> Result<Vec<String>, StorageError> {
            Err(std::io::Error::other("disk on fire").into())
        }
    }

    fn manager() -> StorageManager<MemoryStorage> {
        StorageManager::new(MemoryStorage::new())
    }

    #[test]
    fn test_high_score_only_on_improvement() {
        let mut m = manager();
        assert_eq!(m.high_score(), 0);
        assert!(!m.save_high_score(0));
        assert!(m.save_high_score(100));
        assert!(!m.save_high_score(100));
        assert!(!m.save_high_score(50));
        assert_eq!(m.high_score(), 100);
        assert!(m.save_high_score(101));
        assert_eq!(m.high_score(), 101);
        assert_eq!(
            m.storage().get("desktopRunnerGame_highScore").unwrap().as_deref(),
            Some("101")
        );
    }

    #[test]
    fn test_malformed_high_score_defaults() {
        let mut store = MemoryStorage::new();
        store.set("desktopRunnerGame_highScore", "lots").unwrap();
        let mut m = StorageManager::new(store);
        assert_eq!(m.high_score(), 0);
        assert!(m.save_high_score(1));
    }

    #[test]
    fn test_settings_roundtrip() {
        let mut m = manager();
        assert_eq!(m.settings(), Settings::default());

        let settings = Settings {
            volume: 0.25,
            is_muted: true,
            difficulty: "hard".into(),
        };
        assert!(m.save_settings(&settings));
        assert_eq!(m.settings(), settings);
    }

    #[test]
    fn test_malformed_settings_default() {
        let mut store = MemoryStorage::new();
        store.set("desktopRunnerGame_settings", "[1,2").unwrap();
        store.set("desktopRunnerGame_stats", "\"nope\"").unwrap();
        let m = StorageManager::new(store);
        assert_eq!(m.settings(), Settings::default());
        assert_eq!(m.stats(), GameStats::default());
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let mut store = MemoryStorage::new();
        store.set("desktopRunnerGame_settings", r#"{"isMuted":true}"#).unwrap();
        let m = StorageManager::new(store);
        let settings = m.settings();
        assert!(settings.is_muted);
        assert_eq!(settings.volume, 0.5);
        assert_eq!(settings.difficulty, "normal");
    }

    #[test]
    fn test_record_game_accumulates() {
        let mut m = manager();
        let t0 = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let t1 = Utc.with_ymd_and_hms(2025, 1, 2, 4, 0, 0).unwrap();
        assert!(m.record_game_at(300, 12.5, t0));
        assert!(m.record_game_at(700, 20.0, t1));

        let stats = m.stats();
        assert_eq!(stats.total_games, 2);
        assert_eq!(stats.total_score, 1000);
        assert_eq!(stats.best_score, 700);
        assert_eq!(stats.total_play_time, 32.5);
        assert_eq!(stats.last_played, Some(t1));
    }

    #[test]
    fn test_clear_all_keeps_foreign_keys() {
        let mut store = MemoryStorage::new();
        store.set("otherApp_highScore", "9").unwrap();
        let mut m = StorageManager::new(store);
        m.save_high_score(10);
        m.save_settings(&Settings::default());
        m.record_game(10, 1.0);

        assert!(m.clear_all());
        assert_eq!(m.high_score(), 0);
        assert_eq!(m.stats(), GameStats::default());
        assert_eq!(m.storage().keys().unwrap(), vec!["otherApp_highScore"]);
    }

    #[test]
    fn test_broken_storage_degrades() {
        let mut m = StorageManager::new(BrokenStorage);
        assert_eq!(m.high_score(), 0);
        assert!(!m.save_high_score(10));
        assert!(!m.save_settings(&Settings::default()));
        assert_eq!(m.settings(), Settings::default());
        assert!(!m.record_game(10, 1.0));
        assert_eq!(m.stats(), GameStats::default());
        assert!(!m.clear_all());
    }

    proptest! {
        #[test]
        fn prop_high_score_iff_strictly_greater(
            scores in prop::collection::vec(0u64..1000, 1..30)
        ) {
            let mut m = manager();
            let mut best = 0u64;
            for score in scores {
                let updated = m.save_high_score(score);
                prop_assert_eq!(updated, score > best);
                best = best.max(score);
                prop_assert_eq!(m.high_score(), best);
            }
        }
    }
}
