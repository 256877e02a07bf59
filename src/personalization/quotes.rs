//! Personalized quote selection
//!
//! Chooses a category pool from the behavior snapshot, then picks the quote
//! of the day from that pool with the deterministic daily selector.

use chrono::NaiveDate;
use tracing::debug;

use crate::config::PersonalizationConfig;
use crate::daily::pick_daily_on;
use crate::personalization::needs_mindfulness;
use crate::types::{EngagementLevel, PersonalizedContent, UserBehavior};

/// A library quote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub text: &'static str,
    pub author: &'static str,
    pub category: &'static str,
}

const fn quote(text: &'static str, author: &'static str, category: &'static str) -> Quote {
    Quote {
        text,
        author,
        category,
    }
}

/// Built-in quote library
pub const QUOTES: &[Quote] = &[
    quote(
        "You don't have to control your thoughts. You just have to stop letting them control you.",
        "Dan Millman",
        "resilience",
    ),
    quote(
        "Rock bottom became the solid foundation on which I rebuilt my life.",
        "J.K. Rowling",
        "resilience",
    ),
    quote(
        "Although the world is full of suffering, it is also full of the overcoming of it.",
        "Helen Keller",
        "resilience",
    ),
    quote(
        "Almost everything will work again if you unplug it for a few minutes, including you.",
        "Anne Lamott",
        "calm",
    ),
    quote(
        "Feelings come and go like clouds in a windy sky. Conscious breathing is my anchor.",
        "Thich Nhat Hanh",
        "calm",
    ),
    quote(
        "Gratitude turns what we have into enough.",
        "Aesop",
        "gratitude",
    ),
    quote(
        "Enjoy the little things, for one day you may look back and realize they were the big things.",
        "Robert Brault",
        "gratitude",
    ),
    quote(
        "What you do today can improve all your tomorrows.",
        "Ralph Marston",
        "growth",
    ),
    quote(
        "Small steps every day add up to big changes.",
        "Unknown",
        "growth",
    ),
    quote(
        "Happiness is not something ready made. It comes from your own actions.",
        "Dalai Lama",
        "joy",
    ),
    quote(
        "Keep your face always toward the sunshine, and shadows will fall behind you.",
        "Walt Whitman",
        "joy",
    ),
];

/// Quote of the day using the default rule thresholds
pub fn personalized_quote(behavior: Option<&UserBehavior>, today: NaiveDate) -> PersonalizedContent {
    personalized_quote_with(&PersonalizationConfig::default(), behavior, today)
}

/// Quote of the day for a behavior snapshot
pub fn personalized_quote_with(
    config: &PersonalizationConfig,
    behavior: Option<&UserBehavior>,
    today: NaiveDate,
) -> PersonalizedContent {
    const ANY: &[&str] = &[];
    const SUPPORTIVE: &[&str] = &["resilience", "calm"];
    const GRATITUDE: &[&str] = &["gratitude"];
    const GROWTH: &[&str] = &["growth"];
    const JOY: &[&str] = &["joy"];

    let (categories, relevance) = match behavior {
        None => (ANY, 0.5),
        Some(b) if needs_mindfulness(config, b) => (SUPPORTIVE, 0.9),
        Some(b) if !b.uses_feature("gratitude") => (GRATITUDE, 0.75),
        Some(b) if b.engagement_level == EngagementLevel::High => (GROWTH, 0.7),
        Some(_) => (JOY, 0.6),
    };

    let pool: Vec<&Quote> = QUOTES
        .iter()
        .filter(|q| categories.is_empty() || categories.contains(&q.category))
        .collect();

    // Every category above has library entries; the whole library is the fallback.
    let selected = pick_daily_on(&pool, today).copied().unwrap_or(&QUOTES[0]);

    debug!(category = selected.category, relevance, "selected personalized quote");

    PersonalizedContent {
        quote: selected.text.to_string(),
        author: selected.author.to_string(),
        category: selected.category.to_string(),
        relevance_score: relevance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Mood, MoodPattern, TimeOfDay};
    use chrono::{TimeZone, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    fn behavior(moods: &[Mood], features: &[&str], engagement: EngagementLevel) -> UserBehavior {
        UserBehavior {
            preferred_time_of_day: TimeOfDay::Afternoon,
            most_used_features: features.iter().map(|f| f.to_string()).collect(),
            mood_patterns: moods
                .iter()
                .map(|m| MoodPattern {
                    mood: *m,
                    time: Utc.with_ymd_and_hms(2024, 5, 19, 12, 0, 0).unwrap(),
                    factors: vec![],
                })
                .collect(),
            engagement_level: engagement,
            streak_days: 2,
            last_active_date: today(),
        }
    }

    #[test]
    fn test_every_category_has_quotes() {
        for category in ["resilience", "calm", "gratitude", "growth", "joy"] {
            assert!(QUOTES.iter().any(|q| q.category == category), "{category}");
        }
    }

    #[test]
    fn test_cold_start_uses_whole_library() {
        let content = personalized_quote(None, today());
        assert_eq!(content.relevance_score, 0.5);
        assert!(QUOTES.iter().any(|q| q.text == content.quote));
    }

    #[test]
    fn test_negative_moods_pick_supportive_quote() {
        let b = behavior(&[Mood::Sad, Mood::Angry, Mood::Sad], &["gratitude"], EngagementLevel::Low);
        let content = personalized_quote(Some(&b), today());

        assert!(content.category == "resilience" || content.category == "calm");
        assert_eq!(content.relevance_score, 0.9);
    }

    #[test]
    fn test_gratitude_unused() {
        let b = behavior(&[Mood::Happy], &["journal"], EngagementLevel::High);
        let content = personalized_quote(Some(&b), today());
        assert_eq!(content.category, "gratitude");
        assert_eq!(content.relevance_score, 0.75);
    }

    #[test]
    fn test_high_engagement_growth() {
        let b = behavior(&[Mood::Happy], &["gratitude"], EngagementLevel::High);
        assert_eq!(personalized_quote(Some(&b), today()).category, "growth");
    }

    #[test]
    fn test_default_joy() {
        let b = behavior(&[Mood::Calm], &["gratitude"], EngagementLevel::Medium);
        let content = personalized_quote(Some(&b), today());
        assert_eq!(content.category, "joy");
        assert!(content.relevance_score >= 0.0 && content.relevance_score <= 1.0);
    }

    #[test]
    fn test_same_day_same_quote() {
        let b = behavior(&[Mood::Calm], &["gratitude"], EngagementLevel::Medium);
        assert_eq!(
            personalized_quote(Some(&b), today()),
            personalized_quote(Some(&b), today())
        );
    }
}
