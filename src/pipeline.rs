//! Pipeline orchestration
//!
//! Public entry points tying the behavior log, personalization engine and
//! score calculator together. [`WellnessProcessor`] keeps state across calls
//! through an injected [`WellnessStore`]; [`insights_from_json`] and
//! [`score_from_json`] are stateless one-shot variants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use crate::behavior::{BehaviorEvent, BehaviorLog, BehaviorProfiler};
use crate::config::EngineConfig;
use crate::error::WellnessError;
use crate::history::{ScoreHistory, ScoreSnapshot};
use crate::personalization::PersonalizationEngine;
use crate::scoring::WellnessCalculator;
use crate::storage::WellnessStore;
use crate::types::{
    AdaptiveReminder, JournalEntry, MindfulnessSession, Mood, MoodEntry, PersonalizedContent,
    Recommendation, UserBehavior, WellnessScore,
};

/// Everything the home screen shows, derived from one behavior snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub behavior: Option<UserBehavior>,
    pub recommendations: Vec<Recommendation>,
    pub reminders: Vec<AdaptiveReminder>,
    pub quote: PersonalizedContent,
}

/// Input of a stateless score calculation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreRequest {
    /// Behavior log used for the consistency and exploration metrics
    #[serde(default, deserialize_with = "deserialize_log")]
    pub log: Option<BehaviorLog>,
    #[serde(default)]
    pub mood_entries: Vec<MoodEntry>,
    #[serde(default)]
    pub journal_entries: Vec<JournalEntry>,
    #[serde(default)]
    pub mindfulness_sessions: Vec<MindfulnessSession>,
}

fn deserialize_log<'de, D>(deserializer: D) -> Result<Option<BehaviorLog>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<BehaviorLog>::deserialize(deserializer)?
        .map(BehaviorLog::normalized)
        .transpose()
        .map_err(serde::de::Error::custom)
}

/// Compute insights for a serialized behavior log.
///
/// # Arguments
/// * `log_json` - Serialized [`BehaviorLog`]
/// * `now` - Reference time for engagement, streak and quote of the day
///
/// # Returns
/// Serialized [`Insights`]
pub fn insights_from_json(log_json: &str, now: DateTime<Utc>) -> Result<String, WellnessError> {
    let log = BehaviorLog::from_json(log_json)?;
    let config = EngineConfig::default();
    let insights = compute_insights(
        &BehaviorProfiler::new(&config),
        &PersonalizationEngine::new(config.personalization.clone()),
        &log,
        now,
    );
    Ok(serde_json::to_string(&insights)?)
}

/// Compute a wellness score for a serialized [`ScoreRequest`].
///
/// Returns the serialized [`WellnessScore`].
pub fn score_from_json(request_json: &str, now: DateTime<Utc>) -> Result<String, WellnessError> {
    let request: ScoreRequest = serde_json::from_str(request_json)?;
    let config = EngineConfig::default();

    let behavior = request
        .log
        .as_ref()
        .and_then(|log| BehaviorProfiler::new(&config).derive(log, now));
    let score = WellnessCalculator::new(config.scoring).calculate_at(
        &request.mood_entries,
        &request.journal_entries,
        &request.mindfulness_sessions,
        behavior.as_ref(),
        now,
    );
    Ok(serde_json::to_string(&score)?)
}

fn compute_insights(
    profiler: &BehaviorProfiler,
    engine: &PersonalizationEngine,
    log: &BehaviorLog,
    now: DateTime<Utc>,
) -> Insights {
    let behavior = profiler.derive(log, now);
    let today = profiler.local_date(now);

    Insights {
        recommendations: engine.recommend(behavior.as_ref()),
        reminders: engine.adaptive_reminders(behavior.as_ref()),
        quote: engine.personalized_quote(behavior.as_ref(), today),
        behavior,
    }
}

/// Stateful processor persisting its log and score history.
///
/// Every mutation is written through to the store before returning.
pub struct WellnessProcessor<S: WellnessStore> {
    config: EngineConfig,
    store: S,
    log: BehaviorLog,
    history: ScoreHistory,
    profiler: BehaviorProfiler,
    engine: PersonalizationEngine,
    calculator: WellnessCalculator,
}

impl<S: WellnessStore> WellnessProcessor<S> {
    /// Create a processor with the default configuration
    pub fn new(store: S) -> Result<Self, WellnessError> {
        Self::with_config(store, EngineConfig::default())
    }

    /// Create a processor, loading any state already in the store
    pub fn with_config(store: S, config: EngineConfig) -> Result<Self, WellnessError> {
        config.validate()?;

        let mut log = store
            .load_log()?
            .unwrap_or_else(|| BehaviorLog::new(config.log_capacity));
        log.set_capacity(config.log_capacity);

        let mut history = store
            .load_history()?
            .unwrap_or_else(|| ScoreHistory::new(config.history_days));
        history.set_max_days(config.history_days);

        debug!(events = log.len(), snapshots = history.len(), "loaded processor state");

        Ok(Self {
            profiler: BehaviorProfiler::new(&config),
            engine: PersonalizationEngine::new(config.personalization.clone()),
            calculator: WellnessCalculator::new(config.scoring.clone()),
            config,
            store,
            log,
            history,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Record a mood check-in
    pub fn record_mood(
        &mut self,
        mood: Mood,
        factors: Vec<String>,
        at: DateTime<Utc>,
    ) -> Result<(), WellnessError> {
        self.record_event(BehaviorEvent::mood(mood, factors, at))
    }

    /// Record a feature use
    pub fn record_feature_use(
        &mut self,
        feature: &str,
        at: DateTime<Utc>,
    ) -> Result<(), WellnessError> {
        self.record_event(BehaviorEvent::feature(feature, at))
    }

    /// Record any behavior event and persist the log
    ///
    /// The in-memory log only changes once the store accepted the new log.
    pub fn record_event(&mut self, event: BehaviorEvent) -> Result<(), WellnessError> {
        let mut log = self.log.clone();
        log.record(event)?;
        self.store.save_log(&log)?;
        self.log = log;
        Ok(())
    }

    /// Current behavior snapshot, `None` before anything was recorded
    pub fn behavior(&self, now: DateTime<Utc>) -> Option<UserBehavior> {
        self.profiler.derive(&self.log, now)
    }

    pub fn recommendations(&self, now: DateTime<Utc>) -> Vec<Recommendation> {
        self.engine.recommend(self.behavior(now).as_ref())
    }

    pub fn reminders(&self, now: DateTime<Utc>) -> Vec<AdaptiveReminder> {
        self.engine.adaptive_reminders(self.behavior(now).as_ref())
    }

    /// Quote of the day for the local date of `now`
    pub fn quote(&self, now: DateTime<Utc>) -> PersonalizedContent {
        let today = self.profiler.local_date(now);
        self.engine.personalized_quote(self.behavior(now).as_ref(), today)
    }

    /// Behavior, recommendations, reminders and quote from one snapshot
    pub fn insights(&self, now: DateTime<Utc>) -> Insights {
        compute_insights(&self.profiler, &self.engine, &self.log, now)
    }

    /// Behavior snapshot for a log other than the processor's own
    pub fn behavior_of(&self, log: &BehaviorLog, now: DateTime<Utc>) -> Option<UserBehavior> {
        self.profiler.derive(log, now)
    }

    /// Calculate the wellness score and store it as today's snapshot
    pub fn calculate_score(
        &mut self,
        mood_entries: &[MoodEntry],
        journal_entries: &[JournalEntry],
        mindfulness_sessions: &[MindfulnessSession],
        now: DateTime<Utc>,
    ) -> Result<WellnessScore, WellnessError> {
        let behavior = self.behavior(now);
        self.calculate_score_with(
            mood_entries,
            journal_entries,
            mindfulness_sessions,
            behavior.as_ref(),
            now,
        )
    }

    /// Calculate the wellness score for an explicit behavior snapshot and
    /// store it as today's snapshot. The behavior log is left untouched.
    pub fn calculate_score_with(
        &mut self,
        mood_entries: &[MoodEntry],
        journal_entries: &[JournalEntry],
        mindfulness_sessions: &[MindfulnessSession],
        behavior: Option<&UserBehavior>,
        now: DateTime<Utc>,
    ) -> Result<WellnessScore, WellnessError> {
        let score = self.calculator.calculate_at(
            mood_entries,
            journal_entries,
            mindfulness_sessions,
            behavior,
            now,
        );

        let today = self.profiler.local_date(now);
        let mut history = self.history.clone();
        history.upsert(&score, today);
        self.store.save_history(&history)?;
        self.history = history;

        info!(overall = score.overall, date = %today, "stored wellness score");
        Ok(score)
    }

    pub fn history(&self) -> &ScoreHistory {
        &self.history
    }

    /// Latest stored snapshot
    pub fn latest_score(&self) -> Option<&ScoreSnapshot> {
        self.history.latest()
    }

    pub fn log(&self) -> &BehaviorLog {
        &self.log
    }

    /// Replace the behavior log, e.g. with one restored from a backup
    pub fn load_log(&mut self, json: &str) -> Result<(), WellnessError> {
        let mut log = BehaviorLog::from_json(json)?;
        log.set_capacity(self.config.log_capacity);
        self.store.save_log(&log)?;
        self.log = log;
        Ok(())
    }

    /// Serialized behavior log
    pub fn save_log(&self) -> Result<String, WellnessError> {
        self.log.to_json()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Forget all behavior and score history
    pub fn clear(&mut self) -> Result<(), WellnessError> {
        self.log.clear();
        self.history.clear();
        self.store.save_log(&self.log)?;
        self.store.save_history(&self.history)?;
        info!("cleared processor state");
        Ok(())
    }
}
