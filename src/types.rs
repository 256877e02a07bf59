//! Core data types for Mindwell
//!
//! These types flow between the behavior profiler, the personalization engine
//! and the wellness calculator. Everything here is plain data.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Mood label recorded by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Happy,
    Excited,
    Calm,
    Neutral,
    Anxious,
    Sad,
    Angry,
}

impl Mood {
    /// Moods that trigger the mindfulness recommendation
    pub fn is_negative(self) -> bool {
        matches!(self, Mood::Sad | Mood::Angry)
    }

    /// Moods that count towards emotional balance
    pub fn is_positive(self) -> bool {
        matches!(self, Mood::Happy | Mood::Excited | Mood::Calm)
    }
}

/// Coarse time-of-day bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// All buckets in tie-breaking order
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];

    /// Bucket a local hour (0-23)
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }
}

/// How actively the user interacts with the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementLevel {
    Low,
    Medium,
    High,
}

/// A single observed mood with its context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodPattern {
    pub mood: Mood,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub factors: Vec<String>,
}

/// Behavior snapshot derived from the event log.
///
/// Recomputed on every read; see [`crate::behavior::BehaviorProfiler`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBehavior {
    pub preferred_time_of_day: TimeOfDay,
    /// Feature identifiers, most used first
    pub most_used_features: Vec<String>,
    /// Mood observations, oldest first
    pub mood_patterns: Vec<MoodPattern>,
    pub engagement_level: EngagementLevel,
    pub streak_days: u32,
    pub last_active_date: NaiveDate,
}

impl UserBehavior {
    /// Whether a feature identifier appears in the most used list
    pub fn uses_feature(&self, feature: &str) -> bool {
        self.most_used_features.iter().any(|f| f == feature)
    }

    /// Count negative moods among the most recent `window` patterns
    pub fn recent_negative_moods(&self, window: usize) -> usize {
        self.mood_patterns
            .iter()
            .rev()
            .take(window)
            .filter(|p| p.mood.is_negative())
            .count()
    }
}

/// Kind of content recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationKind {
    MoodTracker,
    Mindfulness,
    Journal,
    Gratitude,
    Analytics,
}

/// Ranked content recommendation (lower priority = more urgent)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    pub priority: u8,
    pub reason: String,
}

/// Quote selected for the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalizedContent {
    pub quote: String,
    pub author: String,
    pub category: String,
    /// Relevance to the current behavior snapshot (0-1)
    pub relevance_score: f64,
}

/// Reminder categories, in the fixed order reminders are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderType {
    MoodCheck,
    Mindfulness,
    Journal,
    Gratitude,
}

impl ReminderType {
    pub const ALL: [ReminderType; 4] = [
        ReminderType::MoodCheck,
        ReminderType::Mindfulness,
        ReminderType::Journal,
        ReminderType::Gratitude,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReminderType::MoodCheck => "mood_check",
            ReminderType::Mindfulness => "mindfulness",
            ReminderType::Journal => "journal",
            ReminderType::Gratitude => "gratitude",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderFrequency {
    Daily,
    Weekly,
    Custom,
}

/// Reminder with a time slot adapted to the user's habits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveReminder {
    pub id: String,
    #[serde(rename = "type")]
    pub reminder_type: ReminderType,
    pub message: String,
    /// Local time, HH:MM
    pub optimal_time: String,
    pub frequency: ReminderFrequency,
    pub enabled: bool,
}

/// Mood log entry as stored by the application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: String,
    pub mood: Mood,
    /// Self-reported intensity (1-10)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub factors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<f32>,
    pub created_at: DateTime<Utc>,
}

/// Journal entry as stored by the application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Completed mindfulness exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MindfulnessSession {
    pub id: String,
    pub exercise: String,
    pub duration_minutes: u32,
    pub completed_at: DateTime<Utc>,
}

/// Direction of a metric compared with the previous period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

/// One weighted contributor to the overall wellness score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessMetric {
    pub name: String,
    /// Normalized score (0-100)
    pub value: f64,
    /// Contribution weight (0-1)
    pub weight: f64,
    pub trend: Trend,
    pub suggestion: String,
}

/// Result of a wellness score calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessScore {
    /// Weighted overall score (0-100)
    pub overall: f64,
    pub metrics: Vec<WellnessMetric>,
    pub calculated_at: DateTime<Utc>,
    pub improvements: Vec<String>,
    pub strengths: Vec<String>,
}
