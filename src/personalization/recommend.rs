//! Rule-based content recommendations

use tracing::debug;

use crate::config::PersonalizationConfig;
use crate::personalization::needs_mindfulness;
use crate::types::{EngagementLevel, Recommendation, RecommendationKind, UserBehavior};

/// Recommendations using the default rule thresholds
pub fn recommend(behavior: Option<&UserBehavior>) -> Vec<Recommendation> {
    recommend_with(&PersonalizationConfig::default(), behavior)
}

/// Recommendations sorted ascending by priority; ties keep rule order.
pub fn recommend_with(
    config: &PersonalizationConfig,
    behavior: Option<&UserBehavior>,
) -> Vec<Recommendation> {
    let Some(behavior) = behavior else {
        return vec![
            build(
                RecommendationKind::MoodTracker,
                1,
                "Start by tracking how you feel",
            ),
            build(
                RecommendationKind::Mindfulness,
                2,
                "A short breathing exercise is an easy first step",
            ),
        ];
    };

    let mut recommendations = Vec::new();

    if needs_mindfulness(config, behavior) {
        recommendations.push(build(
            RecommendationKind::Mindfulness,
            1,
            "Several recent check-ins were sad or angry",
        ));
    }

    if !behavior.uses_feature("journal") {
        recommendations.push(build(
            RecommendationKind::Journal,
            2,
            "You haven't tried journaling yet",
        ));
    }

    if !behavior.uses_feature("gratitude") {
        recommendations.push(build(
            RecommendationKind::Gratitude,
            3,
            "Gratitude practice is not part of your routine yet",
        ));
    }

    if behavior.engagement_level == EngagementLevel::High {
        recommendations.push(build(
            RecommendationKind::Analytics,
            4,
            "You have enough history for meaningful insights",
        ));
    }

    // sort_by_key is stable
    recommendations.sort_by_key(|r| r.priority);

    debug!(count = recommendations.len(), "computed recommendations");

    recommendations
}

fn build(kind: RecommendationKind, priority: u8, reason: &str) -> Recommendation {
    let (title, description) = match kind {
        RecommendationKind::MoodTracker => (
            "Track Your Mood",
            "Log how you feel today to start spotting patterns",
        ),
        RecommendationKind::Mindfulness => (
            "Take a Mindful Moment",
            "Try a guided breathing or body-scan exercise",
        ),
        RecommendationKind::Journal => (
            "Write in Your Journal",
            "Put your thoughts into words to process the day",
        ),
        RecommendationKind::Gratitude => (
            "Practice Gratitude",
            "Note three things you are thankful for",
        ),
        RecommendationKind::Analytics => (
            "Explore Your Insights",
            "See how your mood and habits have changed over time",
        ),
    };

    Recommendation {
        kind,
        title: title.to_string(),
        description: description.to_string(),
        priority,
        reason: reason.to_string(),
    }
}
