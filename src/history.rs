//! Daily wellness score history
//!
//! Keeps one snapshot per calendar day. Recalculating on the same day
//! replaces that day's snapshot in place; the oldest days are evicted once
//! the window is full.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::config::DEFAULT_HISTORY_DAYS;
use crate::error::WellnessError;
use crate::types::{Trend, WellnessScore};

/// Overall-score change (points) below which the trend is stable
const TREND_TOLERANCE: f64 = 2.0;

/// Persisted summary of one day's wellness score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub id: Uuid,
    pub date: NaiveDate,
    pub overall: f64,
    /// Metric name → value
    pub metrics: BTreeMap<String, f64>,
    pub calculated_at: DateTime<Utc>,
}

/// Score snapshots keyed by date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreHistory {
    snapshots: BTreeMap<NaiveDate, ScoreSnapshot>,
    max_days: usize,
}

impl Default for ScoreHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DAYS)
    }
}

impl ScoreHistory {
    /// Create an empty history keeping at most `max_days` snapshots
    pub fn new(max_days: usize) -> Self {
        Self {
            snapshots: BTreeMap::new(),
            max_days: max_days.max(1),
        }
    }

    /// Insert or replace the snapshot for `date`.
    ///
    /// Returns the stored snapshot, or `None` when `date` is older than every
    /// day in a full window and was evicted straight away.
    pub fn upsert(&mut self, score: &WellnessScore, date: NaiveDate) -> Option<&ScoreSnapshot> {
        let id = self
            .snapshots
            .get(&date)
            .map(|existing| existing.id)
            .unwrap_or_else(Uuid::new_v4);

        let snapshot = ScoreSnapshot {
            id,
            date,
            overall: score.overall,
            metrics: score
                .metrics
                .iter()
                .map(|m| (m.name.clone(), m.value))
                .collect(),
            calculated_at: score.calculated_at,
        };
        self.snapshots.insert(date, snapshot);
        self.evict();
        self.snapshots.get(&date)
    }

    fn evict(&mut self) {
        while self.snapshots.len() > self.max_days {
            self.snapshots.pop_first();
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&ScoreSnapshot> {
        self.snapshots.get(&date)
    }

    /// Most recent snapshot
    pub fn latest(&self) -> Option<&ScoreSnapshot> {
        self.snapshots.values().next_back()
    }

    /// Latest `n` snapshots, oldest first
    pub fn recent(&self, n: usize) -> Vec<&ScoreSnapshot> {
        let mut recent: Vec<&ScoreSnapshot> = self.snapshots.values().rev().take(n).collect();
        recent.reverse();
        recent
    }

    /// Direction of the overall score between the two latest snapshots
    pub fn overall_trend(&self) -> Trend {
        let mut latest = self.snapshots.values().rev();
        match (latest.next(), latest.next()) {
            (Some(current), Some(previous)) => {
                let delta = current.overall - previous.overall;
                if delta > TREND_TOLERANCE {
                    Trend::Up
                } else if delta < -TREND_TOLERANCE {
                    Trend::Down
                } else {
                    Trend::Stable
                }
            }
            _ => Trend::Stable,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn max_days(&self) -> usize {
        self.max_days
    }

    /// Change the window, dropping the oldest days if needed
    pub fn set_max_days(&mut self, max_days: usize) {
        self.max_days = max_days.max(1);
        self.evict();
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    /// Load history from JSON
    pub fn from_json(json: &str) -> Result<Self, WellnessError> {
        let mut history: Self = serde_json::from_str(json)?;
        history.max_days = history.max_days.max(1);
        history.evict();
        Ok(history)
    }

    /// Serialize history to JSON
    pub fn to_json(&self) -> Result<String, WellnessError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WellnessMetric;
    use chrono::TimeZone;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, day).unwrap()
    }

    fn score(overall: f64, day: u32) -> WellnessScore {
        WellnessScore {
            overall,
            metrics: vec![WellnessMetric {
                name: "Mood Tracking".to_string(),
                value: overall,
                weight: 1.0,
                trend: Trend::Stable,
                suggestion: String::new(),
            }],
            calculated_at: Utc.with_ymd_and_hms(2024, 4, day, 12, 0, 0).unwrap(),
            improvements: vec![],
            strengths: vec![],
        }
    }

    #[test]
    fn test_upsert_replaces_same_day() {
        let mut history = ScoreHistory::default();
        let first_id = history.upsert(&score(40.0, 1), date(1)).unwrap().id;
        let second = history.upsert(&score(55.0, 1), date(1)).unwrap().clone();

        assert_eq!(history.len(), 1);
        assert_eq!(second.id, first_id);
        assert_eq!(second.overall, 55.0);
        assert_eq!(second.metrics["Mood Tracking"], 55.0);
    }

    #[test]
    fn test_one_snapshot_per_day() {
        let mut history = ScoreHistory::default();
        for day in 1..=5 {
            history.upsert(&score(day as f64 * 10.0, day), date(day));
        }

        assert_eq!(history.len(), 5);
        assert_eq!(history.latest().unwrap().date, date(5));
        assert_eq!(history.get(date(3)).unwrap().overall, 30.0);
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut history = ScoreHistory::new(3);
        for day in 1..=5 {
            history.upsert(&score(50.0, day), date(day));
        }

        assert_eq!(history.len(), 3);
        assert!(history.get(date(2)).is_none());
        let dates: Vec<NaiveDate> = history.recent(10).iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date(3), date(4), date(5)]);
    }

    #[test]
    fn test_backfilled_day_older_than_window() {
        let mut history = ScoreHistory::new(2);
        history.upsert(&score(50.0, 5), date(5));
        history.upsert(&score(60.0, 6), date(6));

        assert!(history.upsert(&score(10.0, 1), date(1)).is_none());
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().date, date(6));
    }

    #[test]
    fn test_overall_trend() {
        let mut history = ScoreHistory::default();
        assert_eq!(history.overall_trend(), Trend::Stable);

        history.upsert(&score(50.0, 1), date(1));
        history.upsert(&score(60.0, 2), date(2));
        assert_eq!(history.overall_trend(), Trend::Up);

        history.upsert(&score(59.0, 3), date(3));
        assert_eq!(history.overall_trend(), Trend::Stable);

        history.upsert(&score(40.0, 4), date(4));
        assert_eq!(history.overall_trend(), Trend::Down);
    }

    #[test]
    fn test_json_round_trip() {
        let mut history = ScoreHistory::new(30);
        history.upsert(&score(72.0, 2), date(2));

        let json = history.to_json().unwrap();
        let loaded = ScoreHistory::from_json(&json).unwrap();
        assert_eq!(loaded, history);
        assert_eq!(loaded.max_days(), 30);
    }

    #[test]
    fn test_shrinking_window_evicts_oldest() {
        let mut history = ScoreHistory::default();
        for day in 1..=5 {
            history.upsert(&score(50.0, day), date(day));
        }

        history.set_max_days(2);
        assert_eq!(history.max_days(), 2);
        let dates: Vec<NaiveDate> = history.recent(10).iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date(4), date(5)]);

        history.upsert(&score(50.0, 6), date(6));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut history = ScoreHistory::default();
        history.upsert(&score(72.0, 2), date(2));
        history.clear();
        assert!(history.is_empty());
        assert!(history.latest().is_none());
    }
}
