//! Behavior profile derivation
//!
//! Computes a [`UserBehavior`] snapshot from a [`BehaviorLog`]. The snapshot
//! is a pure function of the log, the configuration and `now`.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, Timelike, Utc};
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::behavior::log::{BehaviorEventKind, BehaviorLog};
use crate::config::{EngagementConfig, EngineConfig, PersonalizationConfig};
use crate::types::{EngagementLevel, MoodPattern, TimeOfDay, UserBehavior};

/// Derives behavior snapshots from the event log
#[derive(Debug, Clone)]
pub struct BehaviorProfiler {
    personalization: PersonalizationConfig,
    engagement: EngagementConfig,
    offset: FixedOffset,
}

impl Default for BehaviorProfiler {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl BehaviorProfiler {
    pub fn new(config: &EngineConfig) -> Self {
        let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60).unwrap_or_else(|| {
            warn!(
                utc_offset_minutes = config.utc_offset_minutes,
                "UTC offset out of range, bucketing in UTC"
            );
            Utc.fix()
        });

        Self {
            personalization: config.personalization.clone(),
            engagement: config.engagement.clone(),
            offset,
        }
    }

    /// Local calendar date of a timestamp
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// Derive the behavior snapshot. Returns `None` for an empty log.
    pub fn derive(&self, log: &BehaviorLog, now: DateTime<Utc>) -> Option<UserBehavior> {
        let last = log.last()?;

        let behavior = UserBehavior {
            preferred_time_of_day: self.preferred_time_of_day(log),
            most_used_features: self.most_used_features(log),
            mood_patterns: self.mood_patterns(log),
            engagement_level: self.engagement_level(log, now),
            streak_days: self.streak_days(log, now),
            last_active_date: self.local_date(last.timestamp),
        };

        debug!(
            events = log.len(),
            time_of_day = ?behavior.preferred_time_of_day,
            engagement = ?behavior.engagement_level,
            streak_days = behavior.streak_days,
            "derived behavior profile"
        );

        Some(behavior)
    }

    /// Bucket with the most events; ties resolve morning first
    fn preferred_time_of_day(&self, log: &BehaviorLog) -> TimeOfDay {
        let mut counts = [0usize; 4];
        for event in log.events() {
            let hour = event.timestamp.with_timezone(&self.offset).hour();
            let bucket = TimeOfDay::from_hour(hour);
            if let Some(i) = TimeOfDay::ALL.iter().position(|b| *b == bucket) {
                counts[i] += 1;
            }
        }

        let mut best = 0;
        for (i, &count) in counts.iter().enumerate() {
            if count > counts[best] {
                best = i;
            }
        }
        TimeOfDay::ALL[best]
    }

    /// Feature identifiers by use count, ties keep first-use order
    fn most_used_features(&self, log: &BehaviorLog) -> Vec<String> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for event in log.events() {
            if let BehaviorEventKind::FeatureUsed { feature } = &event.kind {
                match counts.iter_mut().find(|(name, _)| name == feature) {
                    Some((_, count)) => *count += 1,
                    None => counts.push((feature.clone(), 1)),
                }
            }
        }

        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
            .into_iter()
            .take(self.personalization.top_features)
            .map(|(name, _)| name)
            .collect()
    }

    /// Latest mood check-ins, oldest first
    fn mood_patterns(&self, log: &BehaviorLog) -> Vec<MoodPattern> {
        let mut patterns: Vec<MoodPattern> = log
            .events()
            .rev()
            .filter_map(|event| match &event.kind {
                BehaviorEventKind::MoodLogged { mood, factors } => Some(MoodPattern {
                    mood: *mood,
                    time: event.timestamp,
                    factors: factors.clone(),
                }),
                BehaviorEventKind::FeatureUsed { .. } => None,
            })
            .take(self.personalization.mood_pattern_limit)
            .collect();
        patterns.reverse();
        patterns
    }

    /// Classify engagement by events within the trailing window
    fn engagement_level(&self, log: &BehaviorLog, now: DateTime<Utc>) -> EngagementLevel {
        let window_start = now - Duration::days(i64::from(self.engagement.window_days));
        let recent = log
            .events()
            .filter(|e| e.timestamp >= window_start && e.timestamp <= now)
            .count();

        if recent >= self.engagement.high_min_events {
            EngagementLevel::High
        } else if recent >= self.engagement.medium_min_events {
            EngagementLevel::Medium
        } else {
            EngagementLevel::Low
        }
    }

    /// Consecutive active days ending today or yesterday
    fn streak_days(&self, log: &BehaviorLog, now: DateTime<Utc>) -> u32 {
        let active: BTreeSet<NaiveDate> = log
            .events()
            .map(|e| self.local_date(e.timestamp))
            .collect();

        let today = self.local_date(now);
        let yesterday = today.pred_opt();
        let Some(&last_active) = active.iter().next_back() else {
            return 0;
        };
        if last_active != today && Some(last_active) != yesterday {
            return 0;
        }

        let mut streak = 0;
        let mut day = Some(last_active);
        while let Some(d) = day {
            if !active.contains(&d) {
                break;
            }
            streak += 1;
            day = d.pred_opt();
        }
        streak
    }
}
