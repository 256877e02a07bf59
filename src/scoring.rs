//! Wellness score calculation
//!
//! Turns activity counts and the behavior snapshot into weighted 0-100
//! metrics and an overall score. The calculation is deterministic for a given
//! `now`; loading inputs and persisting results is the caller's job.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::config::ScoringConfig;
use crate::types::{
    JournalEntry, MindfulnessSession, MoodEntry, Trend, UserBehavior, WellnessMetric,
    WellnessScore,
};

pub const MOOD_TRACKING: &str = "Mood Tracking";
pub const JOURNALING: &str = "Journaling";
pub const MINDFULNESS: &str = "Mindfulness";
pub const CONSISTENCY: &str = "Consistency";
pub const FEATURE_EXPLORATION: &str = "Feature Exploration";
pub const EMOTIONAL_BALANCE: &str = "Emotional Balance";

/// Features counted by the exploration metric
pub const KNOWN_FEATURES: [&str; 5] = ["mood", "journal", "mindfulness", "gratitude", "analytics"];

/// Mood entries inspected for emotional balance
const BALANCE_WINDOW: usize = 10;

/// Minimum change in positive share that counts as a trend
const BALANCE_TREND_TOLERANCE: f64 = 0.2;

/// Streak length at which consistency is trending up
const STREAK_TRENDING_DAYS: u32 = 7;

/// Wellness score calculator
#[derive(Debug, Clone, Default)]
pub struct WellnessCalculator {
    config: ScoringConfig,
}

impl WellnessCalculator {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Calculate the score as of now
    pub fn calculate(
        &self,
        mood_entries: &[MoodEntry],
        journal_entries: &[JournalEntry],
        mindfulness_sessions: &[MindfulnessSession],
        user_behavior: Option<&UserBehavior>,
    ) -> WellnessScore {
        self.calculate_at(
            mood_entries,
            journal_entries,
            mindfulness_sessions,
            user_behavior,
            Utc::now(),
        )
    }

    /// Calculate the score as of `now`
    pub fn calculate_at(
        &self,
        mood_entries: &[MoodEntry],
        journal_entries: &[JournalEntry],
        mindfulness_sessions: &[MindfulnessSession],
        user_behavior: Option<&UserBehavior>,
        now: DateTime<Utc>,
    ) -> WellnessScore {
        let cfg = &self.config;
        let weights = &cfg.weights;

        let mood_times: Vec<DateTime<Utc>> = mood_entries.iter().map(|e| e.created_at).collect();
        let journal_times: Vec<DateTime<Utc>> =
            journal_entries.iter().map(|e| e.created_at).collect();
        let session_times: Vec<DateTime<Utc>> =
            mindfulness_sessions.iter().map(|s| s.completed_at).collect();

        let metrics = vec![
            self.frequency_metric(
                MOOD_TRACKING,
                &mood_times,
                cfg.mood_target,
                weights.mood_tracking,
                "Check in with your mood once a day, even briefly.",
                now,
            ),
            self.frequency_metric(
                JOURNALING,
                &journal_times,
                cfg.journal_target,
                weights.journaling,
                "Try writing a few lines in your journal a few times a week.",
                now,
            ),
            self.frequency_metric(
                MINDFULNESS,
                &session_times,
                cfg.mindfulness_target,
                weights.mindfulness,
                "Add a short mindfulness session to your routine.",
                now,
            ),
            WellnessMetric {
                name: CONSISTENCY.to_string(),
                value: compute_consistency(user_behavior, cfg.streak_target),
                weight: weights.consistency,
                trend: consistency_trend(user_behavior),
                suggestion: "Open the app each day to build a streak.".to_string(),
            },
            WellnessMetric {
                name: FEATURE_EXPLORATION.to_string(),
                value: compute_feature_exploration(user_behavior),
                weight: weights.feature_exploration,
                trend: Trend::Stable,
                suggestion: "Explore gratitude practice and insights to round out your routine."
                    .to_string(),
            },
            WellnessMetric {
                name: EMOTIONAL_BALANCE.to_string(),
                value: compute_emotional_balance(mood_entries),
                weight: weights.emotional_balance,
                trend: emotional_balance_trend(mood_entries),
                suggestion: "Notice what lifts your mood and make room for more of it."
                    .to_string(),
            },
        ];

        let overall = compute_overall(&metrics);

        let improvements = metrics
            .iter()
            .filter(|m| m.value < cfg.needs_attention_threshold)
            .map(|m| format!("{}: {}", m.name, m.suggestion))
            .collect();

        let strengths = metrics
            .iter()
            .filter(|m| m.value >= cfg.doing_well_threshold)
            .map(|m| m.name.clone())
            .collect();

        debug!(overall, "calculated wellness score");

        WellnessScore {
            overall,
            metrics,
            calculated_at: now,
            improvements,
            strengths,
        }
    }

    fn frequency_metric(
        &self,
        name: &str,
        timestamps: &[DateTime<Utc>],
        target: u32,
        weight: f64,
        suggestion: &str,
        now: DateTime<Utc>,
    ) -> WellnessMetric {
        let window = Duration::days(i64::from(self.config.activity_window_days));
        let trend_window = Duration::days(i64::from(self.config.trend_window_days));

        let count = count_between(timestamps, now - window, now);
        let recent = count_between(timestamps, now - trend_window, now);
        let previous = count_between(timestamps, now - trend_window * 2, now - trend_window);

        WellnessMetric {
            name: name.to_string(),
            value: compute_frequency_score(count, target),
            weight,
            trend: compare_counts(recent, previous),
            suggestion: suggestion.to_string(),
        }
    }
}

/// Count timestamps in `(start, end]`
fn count_between(timestamps: &[DateTime<Utc>], start: DateTime<Utc>, end: DateTime<Utc>) -> usize {
    timestamps.iter().filter(|t| **t > start && **t <= end).count()
}

/// Scale a count against its target to 0-100
///
/// Formula: `min(100, round(count / target * 100))`
fn compute_frequency_score(count: usize, target: u32) -> f64 {
    if target == 0 {
        return 0.0;
    }
    to_score(count as f64 / f64::from(target))
}

/// Streak length against the target streak
fn compute_consistency(behavior: Option<&UserBehavior>, streak_target: u32) -> f64 {
    match behavior {
        Some(b) if streak_target > 0 => to_score(f64::from(b.streak_days) / f64::from(streak_target)),
        _ => 0.0,
    }
}

/// Share of known features the user has tried
fn compute_feature_exploration(behavior: Option<&UserBehavior>) -> f64 {
    let Some(b) = behavior else {
        return 0.0;
    };
    let used = KNOWN_FEATURES.iter().filter(|f| b.uses_feature(f)).count();
    to_score(used as f64 / KNOWN_FEATURES.len() as f64)
}

/// Share of positive moods among the latest entries; neutral 50 with no data
fn compute_emotional_balance(mood_entries: &[MoodEntry]) -> f64 {
    let recent = latest_moods(mood_entries, BALANCE_WINDOW);
    match positive_share(&recent) {
        Some(share) => to_score(share),
        None => 50.0,
    }
}

fn emotional_balance_trend(mood_entries: &[MoodEntry]) -> Trend {
    let recent = latest_moods(mood_entries, BALANCE_WINDOW);
    if recent.len() < 2 {
        return Trend::Stable;
    }

    let half = recent.len() / 2;
    let (earlier, later) = recent.split_at(recent.len() - half);
    match (positive_share(earlier), positive_share(later)) {
        (Some(before), Some(after)) if after - before > BALANCE_TREND_TOLERANCE => Trend::Up,
        (Some(before), Some(after)) if before - after > BALANCE_TREND_TOLERANCE => Trend::Down,
        _ => Trend::Stable,
    }
}

fn consistency_trend(behavior: Option<&UserBehavior>) -> Trend {
    match behavior {
        Some(b) if b.streak_days >= STREAK_TRENDING_DAYS => Trend::Up,
        Some(b) if b.streak_days == 0 => Trend::Down,
        _ => Trend::Stable,
    }
}

/// Latest `n` entries, oldest first
fn latest_moods(mood_entries: &[MoodEntry], n: usize) -> Vec<&MoodEntry> {
    let mut sorted: Vec<&MoodEntry> = mood_entries.iter().collect();
    sorted.sort_by_key(|e| e.created_at);
    let skip = sorted.len().saturating_sub(n);
    sorted.split_off(skip)
}

fn positive_share(entries: &[&MoodEntry]) -> Option<f64> {
    if entries.is_empty() {
        return None;
    }
    let positive = entries.iter().filter(|e| e.mood.is_positive()).count();
    Some(positive as f64 / entries.len() as f64)
}

fn compare_counts(recent: usize, previous: usize) -> Trend {
    match recent.cmp(&previous) {
        std::cmp::Ordering::Greater => Trend::Up,
        std::cmp::Ordering::Less => Trend::Down,
        std::cmp::Ordering::Equal => Trend::Stable,
    }
}

/// Weighted sum of metric values, clamped to 0-100
///
/// Formula: `round(Σ value × weight)`
fn compute_overall(metrics: &[WellnessMetric]) -> f64 {
    let total: f64 = metrics.iter().map(|m| m.value * m.weight).sum();
    total.round().clamp(0.0, 100.0)
}

/// Ratio (1.0 = target met) to a whole-number 0-100 score
fn to_score(ratio: f64) -> f64 {
    (ratio * 100.0).round().clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EngagementLevel, Mood, TimeOfDay};
    use chrono::{NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 31, 20, 0, 0).unwrap()
    }

    fn days_ago(days: i64) -> DateTime<Utc> {
        now() - Duration::days(days) - Duration::minutes(1)
    }

    fn mood(mood: Mood, days: i64) -> MoodEntry {
        MoodEntry {
            id: format!("m-{days}"),
            mood,
            intensity: Some(5),
            note: None,
            factors: vec![],
            weather: None,
            sleep_hours: None,
            created_at: days_ago(days),
        }
    }

    fn journal(days: i64) -> JournalEntry {
        JournalEntry {
            id: format!("j-{days}"),
            title: None,
            content: "Today was fine".to_string(),
            created_at: days_ago(days),
        }
    }

    fn session(days: i64) -> MindfulnessSession {
        MindfulnessSession {
            id: format!("s-{days}"),
            exercise: "box-breathing".to_string(),
            duration_minutes: 5,
            completed_at: days_ago(days),
        }
    }

    fn behavior(streak_days: u32, features: &[&str]) -> UserBehavior {
        UserBehavior {
            preferred_time_of_day: TimeOfDay::Evening,
            most_used_features: features.iter().map(|f| f.to_string()).collect(),
            mood_patterns: vec![],
            engagement_level: EngagementLevel::High,
            streak_days,
            last_active_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        }
    }

    fn metric<'a>(score: &'a WellnessScore, name: &str) -> &'a WellnessMetric {
        score.metrics.iter().find(|m| m.name == name).unwrap()
    }

    #[test]
    fn test_frequency_score() {
        assert_eq!(compute_frequency_score(0, 30), 0.0);
        assert_eq!(compute_frequency_score(15, 30), 50.0);
        assert_eq!(compute_frequency_score(45, 30), 100.0);
        assert_eq!(compute_frequency_score(5, 0), 0.0);
    }

    #[test]
    fn test_count_window_excludes_old_entries() {
        let moods: Vec<MoodEntry> = (0..40).map(|d| mood(Mood::Happy, d)).collect();
        let score = WellnessCalculator::default().calculate_at(&moods, &[], &[], None, now());

        // Only the 30 most recent days count towards the 30-entry target
        assert_eq!(metric(&score, MOOD_TRACKING).value, 100.0);

        let moods: Vec<MoodEntry> = (20..40).map(|d| mood(Mood::Happy, d)).collect();
        let score = WellnessCalculator::default().calculate_at(&moods, &[], &[], None, now());
        assert_eq!(metric(&score, MOOD_TRACKING).value, 33.0);
    }

    #[test]
    fn test_empty_inputs() {
        let score = WellnessCalculator::default().calculate_at(&[], &[], &[], None, now());

        assert_eq!(score.metrics.len(), 6);
        assert_eq!(metric(&score, EMOTIONAL_BALANCE).value, 50.0);
        // Only emotional balance contributes: 50 * 0.10
        assert_eq!(score.overall, 5.0);
        assert!(score.strengths.is_empty());
        assert_eq!(score.improvements.len(), 6);
        assert_eq!(score.calculated_at, now());
    }

    #[test]
    fn test_full_engagement_scores_high() {
        let moods: Vec<MoodEntry> = (0..30).map(|d| mood(Mood::Happy, d)).collect();
        let journals: Vec<JournalEntry> = (0..12).map(journal).collect();
        let sessions: Vec<MindfulnessSession> = (0..12).map(session).collect();
        let b = behavior(14, &KNOWN_FEATURES);

        let score =
            WellnessCalculator::default().calculate_at(&moods, &journals, &sessions, Some(&b), now());

        assert_eq!(score.overall, 100.0);
        assert!(score.improvements.is_empty());
        assert_eq!(score.strengths.len(), 6);
    }

    #[test]
    fn test_improvements_and_strengths_thresholds() {
        let moods: Vec<MoodEntry> = (0..30).map(|d| mood(Mood::Sad, d)).collect();
        let b = behavior(3, &["mood"]);
        let score = WellnessCalculator::default().calculate_at(&moods, &[], &[], Some(&b), now());

        for m in &score.metrics {
            if m.value < 60.0 {
                assert!(score.improvements.iter().any(|i| i.starts_with(&m.name)), "{}", m.name);
            }
            if m.value >= 80.0 {
                assert!(score.strengths.contains(&m.name), "{}", m.name);
            }
        }
        assert!(score.strengths.contains(&MOOD_TRACKING.to_string()));
        assert!(score
            .improvements
            .contains(&format!("{JOURNALING}: {}", metric(&score, JOURNALING).suggestion)));
    }

    #[test]
    fn test_overall_clamped_with_oversized_weights() {
        let mut config = ScoringConfig::default();
        config.weights.mood_tracking = 1.0;
        config.weights.journaling = 1.0;
        config.weights.mindfulness = 1.0;

        let moods: Vec<MoodEntry> = (0..30).map(|d| mood(Mood::Happy, d)).collect();
        let journals: Vec<JournalEntry> = (0..12).map(journal).collect();
        let sessions: Vec<MindfulnessSession> = (0..12).map(session).collect();

        let score =
            WellnessCalculator::new(config).calculate_at(&moods, &journals, &sessions, None, now());
        assert_eq!(score.overall, 100.0);
    }

    #[test]
    fn test_frequency_trend() {
        // Three entries this week, one last week
        let journals = vec![journal(1), journal(2), journal(3), journal(10)];
        let score = WellnessCalculator::default().calculate_at(&[], &journals, &[], None, now());
        assert_eq!(metric(&score, JOURNALING).trend, Trend::Up);

        let sessions = vec![session(9), session(10)];
        let score = WellnessCalculator::default().calculate_at(&[], &[], &sessions, None, now());
        assert_eq!(metric(&score, MINDFULNESS).trend, Trend::Down);

        let score = WellnessCalculator::default().calculate_at(&[], &[], &[], None, now());
        assert_eq!(metric(&score, MOOD_TRACKING).trend, Trend::Stable);
    }

    #[test]
    fn test_emotional_balance_trend() {
        // Older half sad, newer half happy
        let mut moods: Vec<MoodEntry> = (6..11).map(|d| mood(Mood::Sad, d)).collect();
        moods.extend((0..5).map(|d| mood(Mood::Happy, d)));

        let score = WellnessCalculator::default().calculate_at(&moods, &[], &[], None, now());
        let balance = metric(&score, EMOTIONAL_BALANCE);
        assert_eq!(balance.value, 50.0);
        assert_eq!(balance.trend, Trend::Up);
    }

    #[test]
    fn test_consistency_and_exploration() {
        let b = behavior(7, &["mood", "journal", "unknown"]);
        let score = WellnessCalculator::default().calculate_at(&[], &[], &[], Some(&b), now());

        assert_eq!(metric(&score, CONSISTENCY).value, 50.0);
        assert_eq!(metric(&score, CONSISTENCY).trend, Trend::Up);
        assert_eq!(metric(&score, FEATURE_EXPLORATION).value, 40.0);
    }

    #[test]
    fn test_deterministic() {
        let moods = vec![mood(Mood::Calm, 1), mood(Mood::Anxious, 2)];
        let calc = WellnessCalculator::default();
        assert_eq!(
            calc.calculate_at(&moods, &[], &[], None, now()),
            calc.calculate_at(&moods, &[], &[], None, now())
        );
    }

    #[test]
    fn test_overall_within_bounds() {
        let calc = WellnessCalculator::default();
        for n in [0usize, 1, 5, 20, 60] {
            let moods: Vec<MoodEntry> = (0..n as i64).map(|d| mood(Mood::Excited, d % 30)).collect();
            let score = calc.calculate_at(&moods, &[], &[], None, now());
            assert!((0.0..=100.0).contains(&score.overall));
            for m in &score.metrics {
                assert!((0.0..=100.0).contains(&m.value));
            }
        }
    }
}
