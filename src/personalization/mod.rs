//! Personalization engine
//!
//! Rule-based recommendations, adaptive reminder schedules and quote
//! selection driven by a [`UserBehavior`] snapshot. Every operation accepts
//! `None` for users without any recorded behavior.

pub mod quotes;
pub mod recommend;
pub mod reminders;

use chrono::NaiveDate;

use crate::config::PersonalizationConfig;
use crate::types::{AdaptiveReminder, PersonalizedContent, Recommendation, UserBehavior};

pub use quotes::{personalized_quote, Quote, QUOTES};
pub use recommend::recommend;
pub use reminders::{adaptive_reminders, time_slots, DEFAULT_TIME_SLOTS, FALLBACK_TIME};

/// Personalization engine with configurable rule thresholds
#[derive(Debug, Clone, Default)]
pub struct PersonalizationEngine {
    config: PersonalizationConfig,
}

impl PersonalizationEngine {
    pub fn new(config: PersonalizationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PersonalizationConfig {
        &self.config
    }

    /// Ranked content recommendations, most urgent first
    pub fn recommend(&self, behavior: Option<&UserBehavior>) -> Vec<Recommendation> {
        recommend::recommend_with(&self.config, behavior)
    }

    /// One reminder per type with positionally assigned time slots
    pub fn adaptive_reminders(&self, behavior: Option<&UserBehavior>) -> Vec<AdaptiveReminder> {
        reminders::adaptive_reminders(behavior)
    }

    /// Quote of the day for this behavior snapshot
    pub fn personalized_quote(
        &self,
        behavior: Option<&UserBehavior>,
        today: NaiveDate,
    ) -> PersonalizedContent {
        quotes::personalized_quote_with(&self.config, behavior, today)
    }

    /// Whether the negative-mood rule fires for this snapshot
    pub fn needs_mindfulness(&self, behavior: &UserBehavior) -> bool {
        needs_mindfulness(&self.config, behavior)
    }
}

pub(crate) fn needs_mindfulness(config: &PersonalizationConfig, behavior: &UserBehavior) -> bool {
    behavior.recent_negative_moods(config.recent_mood_window) >= config.negative_mood_threshold
}
