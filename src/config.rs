//! Engine configuration
//!
//! Thresholds, windows and weights used by the profiler, the personalization
//! engine and the wellness calculator. Every field has a default, so a partial
//! JSON document only needs to name what it overrides.

use serde::{Deserialize, Serialize};

use crate::error::WellnessError;

/// Default number of behavior events kept in the log
pub const DEFAULT_LOG_CAPACITY: usize = 500;

/// Default number of daily score snapshots kept in history
pub const DEFAULT_HISTORY_DAYS: usize = 90;

/// Largest UTC offset accepted (14 hours, in minutes)
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub personalization: PersonalizationConfig,
    pub engagement: EngagementConfig,
    pub scoring: ScoringConfig,
    /// Offset of the user's local time from UTC, used for day and hour bucketing
    pub utc_offset_minutes: i32,
    /// Maximum number of events kept in the behavior log
    pub log_capacity: usize,
    /// Maximum number of daily snapshots kept in score history
    pub history_days: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            personalization: PersonalizationConfig::default(),
            engagement: EngagementConfig::default(),
            scoring: ScoringConfig::default(),
            utc_offset_minutes: 0,
            log_capacity: DEFAULT_LOG_CAPACITY,
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }
}

/// Rules for recommendations and quote selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalizationConfig {
    /// How many of the latest mood patterns are inspected
    pub recent_mood_window: usize,
    /// Negative moods within the window that trigger mindfulness
    pub negative_mood_threshold: usize,
    /// Length of the most-used feature list
    pub top_features: usize,
    /// Mood patterns kept in a behavior snapshot
    pub mood_pattern_limit: usize,
}

impl Default for PersonalizationConfig {
    fn default() -> Self {
        Self {
            recent_mood_window: 10,
            negative_mood_threshold: 3,
            top_features: 5,
            mood_pattern_limit: 50,
        }
    }
}

/// Event counts that classify engagement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementConfig {
    pub window_days: u32,
    pub high_min_events: usize,
    pub medium_min_events: usize,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            high_min_events: 20,
            medium_min_events: 7,
        }
    }
}

/// Per-metric weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricWeights {
    pub mood_tracking: f64,
    pub journaling: f64,
    pub mindfulness: f64,
    pub consistency: f64,
    pub feature_exploration: f64,
    pub emotional_balance: f64,
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self {
            mood_tracking: 0.25,
            journaling: 0.20,
            mindfulness: 0.20,
            consistency: 0.15,
            feature_exploration: 0.10,
            emotional_balance: 0.10,
        }
    }
}

impl MetricWeights {
    fn all(&self) -> [(&'static str, f64); 6] {
        [
            ("mood_tracking", self.mood_tracking),
            ("journaling", self.journaling),
            ("mindfulness", self.mindfulness),
            ("consistency", self.consistency),
            ("feature_exploration", self.feature_exploration),
            ("emotional_balance", self.emotional_balance),
        ]
    }
}

/// Wellness score thresholds, windows and targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Metrics below this value are listed as improvements
    pub needs_attention_threshold: f64,
    /// Metrics at or above this value are listed as strengths
    pub doing_well_threshold: f64,
    /// Days of activity counted towards frequency metrics
    pub activity_window_days: u32,
    /// Days per trend comparison period
    pub trend_window_days: u32,
    /// Mood entries per activity window that score 100
    pub mood_target: u32,
    /// Journal entries per activity window that score 100
    pub journal_target: u32,
    /// Mindfulness sessions per activity window that score 100
    pub mindfulness_target: u32,
    /// Streak length that scores 100
    pub streak_target: u32,
    pub weights: MetricWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            needs_attention_threshold: 60.0,
            doing_well_threshold: 80.0,
            activity_window_days: 30,
            trend_window_days: 7,
            mood_target: 30,
            journal_target: 12,
            mindfulness_target: 12,
            streak_target: 14,
            weights: MetricWeights::default(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, WellnessError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to pretty JSON
    pub fn to_json(&self) -> Result<String, WellnessError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that thresholds, windows and weights are usable
    pub fn validate(&self) -> Result<(), WellnessError> {
        let p = &self.personalization;
        if p.recent_mood_window == 0 {
            return Err(invalid("personalization.recent_mood_window must be > 0"));
        }
        if p.negative_mood_threshold > p.recent_mood_window {
            return Err(invalid(
                "personalization.negative_mood_threshold exceeds recent_mood_window",
            ));
        }
        if p.mood_pattern_limit < p.recent_mood_window {
            return Err(invalid(
                "personalization.mood_pattern_limit is below recent_mood_window",
            ));
        }

        let e = &self.engagement;
        if e.window_days == 0 {
            return Err(invalid("engagement.window_days must be > 0"));
        }
        if e.medium_min_events > e.high_min_events {
            return Err(invalid(
                "engagement.medium_min_events exceeds high_min_events",
            ));
        }

        let s = &self.scoring;
        if !(0.0..=100.0).contains(&s.needs_attention_threshold)
            || !(0.0..=100.0).contains(&s.doing_well_threshold)
        {
            return Err(invalid("scoring thresholds must be within 0-100"));
        }
        if s.needs_attention_threshold > s.doing_well_threshold {
            return Err(invalid(
                "scoring.needs_attention_threshold exceeds doing_well_threshold",
            ));
        }
        if s.activity_window_days == 0 || s.trend_window_days == 0 {
            return Err(invalid("scoring windows must be > 0"));
        }
        if s.mood_target == 0
            || s.journal_target == 0
            || s.mindfulness_target == 0
            || s.streak_target == 0
        {
            return Err(invalid("scoring targets must be > 0"));
        }
        for (name, weight) in s.weights.all() {
            if !(0.0..=1.0).contains(&weight) {
                return Err(invalid(&format!(
                    "scoring.weights.{name} must be within 0-1, got {weight}"
                )));
            }
        }

        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(invalid("utc_offset_minutes must be within +/-14 hours"));
        }
        if self.log_capacity == 0 || self.history_days == 0 {
            return Err(invalid("log_capacity and history_days must be > 0"));
        }

        Ok(())
    }
}

fn invalid(msg: &str) -> WellnessError {
    WellnessError::InvalidConfig(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let total: f64 = MetricWeights::default().all().iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "utc_offset_minutes": -300, "scoring": { "doing_well_threshold": 85 } }"#;
        let config = EngineConfig::from_json(json).unwrap();

        assert_eq!(config.utc_offset_minutes, -300);
        assert_eq!(config.scoring.doing_well_threshold, 85.0);
        assert_eq!(config.scoring.needs_attention_threshold, 60.0);
        assert_eq!(config.personalization.recent_mood_window, 10);
    }

    #[test]
    fn test_rejects_out_of_range_weight() {
        let json = r#"{ "scoring": { "weights": { "journaling": 1.5 } } }"#;
        let err = EngineConfig::from_json(json).unwrap_err();
        assert!(matches!(err, WellnessError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let mut config = EngineConfig::default();
        config.scoring.needs_attention_threshold = 90.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.engagement.medium_min_events = 50;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_pattern_limit_below_mood_window() {
        let mut config = EngineConfig::default();
        config.personalization.mood_pattern_limit = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("mood_pattern_limit"));

        config.personalization.mood_pattern_limit = config.personalization.recent_mood_window;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_large_offset() {
        let config = EngineConfig {
            utc_offset_minutes: 15 * 60,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = EngineConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }
}
