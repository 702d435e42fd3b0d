//! Lifetime play statistics
//!
//! Accumulated across runs and never decreased.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate stats over every finished run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameStats {
    /// Runs finished
    pub total_games: u64,
    /// Sum of final scores
    pub total_score: u64,
    /// Best final score
    pub best_score: u64,
    /// Sum of run durations, in seconds
    pub total_play_time: f64,
    /// When the last run ended
    pub last_played: Option<DateTime<Utc>>,
}

impl GameStats {
    /// Fold one finished run into the totals
    pub fn record(&mut self, score: u64, play_time: f64, now: DateTime<Utc>) {
        self.total_games = self.total_games.saturating_add(1);
        self.total_score = self.total_score.saturating_add(score);
        self.best_score = self.best_score.max(score);
        // Negative or NaN durations would shrink the total
        if play_time.is_finite() && play_time > 0.0 {
            self.total_play_time += play_time;
        }
        self.last_played = Some(now);
    }

    /// Mean score per run (0 when nothing has been played)
    pub fn average_score(&self) -> f64 {
        if self.total_games == 0 {
            0.0
        } else {
            self.total_score as f64 / self.total_games as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_record_accumulates() {
        let mut stats = GameStats::default();
        stats.record(120, 4.5, at(1_700_000_000));
        stats.record(80, 2.0, at(1_700_000_100));

        assert_eq!(stats.total_games, 2);
        assert_eq!(stats.total_score, 200);
        assert_eq!(stats.best_score, 120);
        assert_eq!(stats.total_play_time, 6.5);
        assert_eq!(stats.last_played, Some(at(1_700_000_100)));
        assert_eq!(stats.average_score(), 100.0);
    }

    #[test]
    fn test_bad_play_time_ignored() {
        let mut stats = GameStats::default();
        stats.record(10, -3.0, at(0));
        stats.record(10, f64::NAN, at(0));
        assert_eq!(stats.total_play_time, 0.0);
        assert_eq!(stats.total_games, 2);
    }

    #[test]
    fn test_json_shape() {
        let mut stats = GameStats::default();
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalGames"], 0);
        assert!(json["lastPlayed"].is_null());

        stats.record(5, 1.0, at(1_700_000_000));
        let json = serde_json::to_string(&stats).unwrap();
        let back: GameStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }

    #[test]
    fn test_reads_browser_timestamp() {
        let stats: GameStats = serde_json::from_str(
            concat!(
                r#"{"totalGames":3,"totalScore":900,"bestScore":500,"totalPlayTime":42.5,"#,
                r#""lastPlayed":"2024-05-01T12:00:00.000Z"}"#,
            ),
        )
        .unwrap();
        assert_eq!(stats.total_games, 3);
        assert_eq!(stats.last_played, Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()));
    }

    proptest! {
        #[test]
        fn prop_totals_equal_sums(
            runs in prop::collection::vec((0u64..100_000, 0u32..10_000), 0..40)
        ) {
            let mut stats = GameStats::default();
            for (i, &(score, half_secs)) in runs.iter().enumerate() {
                stats.record(score, half_secs as f64 * 0.5, at(i as i64));
            }

            let score_sum: u64 = runs.iter().map(|r| r.0).sum();
            let time_sum: f64 = runs.iter().map(|r| r.1 as f64 * 0.5).sum();
            let best = runs.iter().map(|r| r.0).max().unwrap_or(0);

            prop_assert_eq!(stats.total_games, runs.len() as u64);
            prop_assert_eq!(stats.total_score, score_sum);
            prop_assert_eq!(stats.best_score, best);
            prop_assert_eq!(stats.total_play_time, time_sum);
        }
    }
}
