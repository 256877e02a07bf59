//! Adaptive reminder schedules
//!
//! Reminders are produced in a fixed order (mood check, mindfulness, journal,
//! gratitude) and reminder `i` takes time slot `i` from the table for the
//! user's preferred time of day and engagement level. Low and medium
//! engagement only provide two slots, so the later reminders fall back to
//! [`FALLBACK_TIME`].

use crate::types::{
    AdaptiveReminder, EngagementLevel, ReminderFrequency, ReminderType, TimeOfDay, UserBehavior,
};

/// Slots used when no behavior has been recorded
pub const DEFAULT_TIME_SLOTS: [&str; 4] = ["09:00", "14:00", "19:00", "20:00"];

/// Time given to reminders past the end of the slot list
pub const FALLBACK_TIME: &str = "09:00";

/// Slot table keyed by preferred time of day and engagement level
pub fn time_slots(time_of_day: TimeOfDay, engagement: EngagementLevel) -> &'static [&'static str] {
    match (time_of_day, engagement) {
        (TimeOfDay::Morning, EngagementLevel::High) => &["07:00", "08:30", "12:00", "20:00"],
        (TimeOfDay::Morning, _) => &["08:00", "09:00"],
        (TimeOfDay::Afternoon, EngagementLevel::High) => &["12:00", "14:00", "16:00", "20:30"],
        (TimeOfDay::Afternoon, _) => &["13:00", "15:00"],
        (TimeOfDay::Evening, EngagementLevel::High) => &["17:00", "18:30", "20:00", "21:00"],
        (TimeOfDay::Evening, _) => &["18:00", "20:00"],
        (TimeOfDay::Night, EngagementLevel::High) => &["20:00", "21:30", "22:00", "22:30"],
        (TimeOfDay::Night, _) => &["21:00", "22:00"],
    }
}

/// One enabled daily reminder per type
pub fn adaptive_reminders(behavior: Option<&UserBehavior>) -> Vec<AdaptiveReminder> {
    let slots: &[&str] = match behavior {
        Some(b) => time_slots(b.preferred_time_of_day, b.engagement_level),
        None => &DEFAULT_TIME_SLOTS,
    };

    ReminderType::ALL
        .iter()
        .enumerate()
        .map(|(i, &reminder_type)| AdaptiveReminder {
            id: reminder_type.as_str().to_string(),
            reminder_type,
            message: message(reminder_type).to_string(),
            optimal_time: slots.get(i).copied().unwrap_or(FALLBACK_TIME).to_string(),
            frequency: ReminderFrequency::Daily,
            enabled: true,
        })
        .collect()
}

fn message(reminder_type: ReminderType) -> &'static str {
    match reminder_type {
        ReminderType::MoodCheck => "How are you feeling right now? Take a moment to check in.",
        ReminderType::Mindfulness => "Pause for a few mindful breaths.",
        ReminderType::Journal => "Capture today's thoughts in your journal.",
        ReminderType::Gratitude => "What are you grateful for today?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn behavior(time_of_day: TimeOfDay, engagement: EngagementLevel) -> UserBehavior {
        UserBehavior {
            preferred_time_of_day: time_of_day,
            most_used_features: vec![],
            mood_patterns: vec![],
            engagement_level: engagement,
            streak_days: 0,
            last_active_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    fn times(reminders: &[AdaptiveReminder]) -> Vec<&str> {
        reminders.iter().map(|r| r.optimal_time.as_str()).collect()
    }

    #[test]
    fn test_default_reminders() {
        let reminders = adaptive_reminders(None);

        assert_eq!(reminders.len(), 4);
        assert_eq!(times(&reminders), vec!["09:00", "14:00", "19:00", "20:00"]);
        for reminder in &reminders {
            assert_eq!(reminder.frequency, ReminderFrequency::Daily);
            assert!(reminder.enabled);
        }
    }

    #[test]
    fn test_reminder_order_is_fixed() {
        let types: Vec<ReminderType> = adaptive_reminders(None)
            .iter()
            .map(|r| r.reminder_type)
            .collect();
        assert_eq!(types, ReminderType::ALL.to_vec());
    }

    #[test]
    fn test_high_engagement_gets_four_slots() {
        let b = behavior(TimeOfDay::Evening, EngagementLevel::High);
        assert_eq!(
            times(&adaptive_reminders(Some(&b))),
            vec!["17:00", "18:30", "20:00", "21:00"]
        );
    }

    #[test]
    fn test_low_engagement_falls_back_positionally() {
        let b = behavior(TimeOfDay::Night, EngagementLevel::Low);
        // Only two slots exist; journal and gratitude take the fallback
        assert_eq!(
            times(&adaptive_reminders(Some(&b))),
            vec!["21:00", "22:00", "09:00", "09:00"]
        );
    }

    #[test]
    fn test_medium_matches_low() {
        for tod in TimeOfDay::ALL {
            assert_eq!(
                time_slots(tod, EngagementLevel::Medium),
                time_slots(tod, EngagementLevel::Low)
            );
            assert_eq!(time_slots(tod, EngagementLevel::Low).len(), 2);
            assert_eq!(time_slots(tod, EngagementLevel::High).len(), 4);
        }
    }

    #[test]
    fn test_ids_match_types() {
        let reminders = adaptive_reminders(None);
        let ids: Vec<&str> = reminders.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["mood_check", "mindfulness", "journal", "gratitude"]);
    }
}
