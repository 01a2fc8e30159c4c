//! Snake records
//!
//! The running high score survives reloads, and the ten best runs are kept
//! with their final body length for the game-over message.

use serde::{Deserialize, Serialize};

use crate::platform;

/// Runs listed in the game-over message
pub const MAX_RUNS: usize = 10;

/// A finished snake run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Apples eaten
    pub score: u32,
    /// Body length at death
    pub length: u32,
    /// Unix timestamp (ms) of the death
    pub timestamp: f64,
}

/// Snake high score plus best runs, sorted by score descending
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeRecords {
    /// Highest score ever reached, including runs that scored nothing new
    pub best: u32,
    pub runs: Vec<RunRecord>,
}

impl SnakeRecords {
    const STORAGE_KEY: &'static str = "canvas_toys_snake_records";

    /// Store a finished run. Returns its 1-indexed place among the best runs.
    ///
    /// Runs without apples are not listed. Equal scores keep the older run first.
    pub fn record(&mut self, run: RunRecord) -> Option<usize> {
        self.best = self.best.max(run.score);
        if run.score == 0 {
            return None;
        }

        let place = self.runs.partition_point(|r| r.score >= run.score);
        if place >= MAX_RUNS {
            return None;
        }
        self.runs.insert(place, run);
        self.runs.truncate(MAX_RUNS);
        Some(place + 1)
    }

    /// Longest snake among the listed runs
    pub fn longest(&self) -> Option<u32> {
        self.runs.iter().map(|r| r.length).max()
    }

    pub fn load() -> Self {
        let loaded = platform::local_storage_get(Self::STORAGE_KEY)
            .and_then(|json| serde_json::from_str::<SnakeRecords>(&json).ok());
        match loaded {
            Some(records) => {
                log::info!("Loaded snake records (best {}, {} runs)", records.best, records.runs.len());
                records
            }
            None => {
                log::info!("No snake records yet");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        match serde_json::to_string(self) {
            Ok(json) => {
                platform::local_storage_set(Self::STORAGE_KEY, &json);
            }
            Err(e) => log::warn!("Failed to encode snake records: {}", e),
        }
    }

    /// Game-over text: the high score, then one line per listed run
    pub fn summary(&self, now_ms: f64) -> String {
        let mut lines = vec![format!("Highscore: {}", self.best)];
        lines.extend(self.runs.iter().enumerate().map(|(i, run)| {
            format!(
                "{}. {} apples, length {} ({})",
                i + 1,
                run.score,
                run.length,
                format_age(now_ms, run.timestamp)
            )
        }));
        lines.join("\n")
    }
}

/// How long ago `timestamp` was, coarsest unit first
pub fn format_age(now_ms: f64, timestamp: f64) -> String {
    let mins = ((now_ms - timestamp) / 60_000.0).max(0.0).floor() as i64;
    let (hours, days) = (mins / 60, mins / (60 * 24));

    match (days, hours, mins) {
        (d, _, _) if d >= 7 => calendar_date(timestamp),
        (1, _, _) => "Yesterday".to_string(),
        (d, _, _) if d > 1 => format!("{} days ago", d),
        (_, 1, _) => "1 hour ago".to_string(),
        (_, h, _) if h > 1 => format!("{} hours ago", h),
        (_, _, 1) => "1 min ago".to_string(),
        (_, _, m) if m > 1 => format!("{} mins ago", m),
        _ => "Just now".to_string(),
    }
}

#[cfg(target_arch = "wasm32")]
fn calendar_date(timestamp: f64) -> String {
    let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp));
    format!(
        "{}/{}/{}",
        date.get_month() + 1,
        date.get_date(),
        date.get_full_year() % 100
    )
}

#[cfg(not(target_arch = "wasm32"))]
fn calendar_date(_timestamp: f64) -> String {
    "a while ago".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(score: u32, length: u32) -> RunRecord {
        RunRecord { score, length, timestamp: 0.0 }
    }

    #[test]
    fn test_appleless_run_not_listed() {
        let mut records = SnakeRecords::default();
        assert_eq!(records.record(run(0, 1)), None);
        assert!(records.runs.is_empty());
        assert_eq!(records.best, 0);
    }

    #[test]
    fn test_places_and_best() {
        let mut records = SnakeRecords::default();
        assert_eq!(records.record(run(5, 6)), Some(1));
        assert_eq!(records.record(run(9, 10)), Some(1));
        assert_eq!(records.record(run(7, 8)), Some(2));
        // Tie goes behind the older run
        assert_eq!(records.record(run(5, 12)), Some(4));
        let order: Vec<u32> = records.runs.iter().map(|r| r.score).collect();
        assert_eq!(order, vec![9, 7, 5, 5]);
        assert_eq!(records.best, 9);
        assert_eq!(records.longest(), Some(12));
    }

    #[test]
    fn test_keeps_ten_runs_but_best_survives() {
        let mut records = SnakeRecords::default();
        for s in 1..=15 {
            records.record(run(s, s + 1));
        }
        assert_eq!(records.runs.len(), MAX_RUNS);
        assert_eq!(records.runs.last().map(|r| r.score), Some(6));
        assert_eq!(records.record(run(6, 7)), None);
        assert_eq!(records.best, 15);
    }

    #[test]
    fn test_old_json_without_best_loads() {
        let records: SnakeRecords =
            serde_json::from_str(r#"{"runs":[{"score":3,"length":4,"timestamp":0.0}]}"#).unwrap();
        assert_eq!(records.best, 0);
        assert_eq!(records.runs.len(), 1);
    }

    #[test]
    fn test_format_age() {
        let min = 60_000.0;
        let now = 100.0 * 24.0 * 60.0 * min;
        assert_eq!(format_age(now, now - 10_000.0), "Just now");
        assert_eq!(format_age(now, now - min), "1 min ago");
        assert_eq!(format_age(now, now - 5.0 * min), "5 mins ago");
        assert_eq!(format_age(now, now - 60.0 * min), "1 hour ago");
        assert_eq!(format_age(now, now - 25.0 * 60.0 * min), "Yesterday");
        assert_eq!(format_age(now, now - 3.0 * 24.0 * 60.0 * min), "3 days ago");
        assert_eq!(format_age(now, now + min), "Just now");
    }

    #[test]
    fn test_summary() {
        let mut records = SnakeRecords::default();
        records.record(run(3, 4));
        records.record(run(8, 9));
        assert_eq!(
            records.summary(1000.0),
            "Highscore: 8\n1. 8 apples, length 9 (Just now)\n2. 3 apples, length 4 (Just now)"
        );
    }
}
