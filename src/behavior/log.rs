//! Rolling behavior event log
//!
//! Holds the most recent behavior events in timestamp order. The log is the
//! only persisted behavior state; every derived value is recomputed from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::config::DEFAULT_LOG_CAPACITY;
use crate::error::WellnessError;
use crate::types::Mood;

/// What the user did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum BehaviorEventKind {
    /// A mood check-in
    MoodLogged {
        mood: Mood,
        #[serde(default)]
        factors: Vec<String>,
    },
    /// A feature was opened or used (e.g. "journal", "gratitude")
    FeatureUsed { feature: String },
}

/// A behavior event with its timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorEvent {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: BehaviorEventKind,
}

impl BehaviorEvent {
    pub fn mood(mood: Mood, factors: Vec<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            kind: BehaviorEventKind::MoodLogged { mood, factors },
        }
    }

    pub fn feature(feature: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            kind: BehaviorEventKind::FeatureUsed {
                feature: feature.into(),
            },
        }
    }

    /// Reject events that would corrupt derived values
    pub fn validate(&self) -> Result<(), WellnessError> {
        if let BehaviorEventKind::FeatureUsed { feature } = &self.kind {
            if feature.trim().is_empty() {
                return Err(WellnessError::InvalidEvent(
                    "feature identifier is empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Rolling event log, oldest event first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorLog {
    events: VecDeque<BehaviorEvent>,
    capacity: usize,
}

impl Default for BehaviorLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl BehaviorLog {
    /// Create an empty log keeping at most `capacity` events
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(DEFAULT_LOG_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    /// Record an event, keeping timestamp order and dropping the oldest overflow
    pub fn record(&mut self, event: BehaviorEvent) -> Result<(), WellnessError> {
        event.validate()?;

        let position = self
            .events
            .partition_point(|e| e.timestamp <= event.timestamp);
        self.events.insert(position, event);

        while self.events.len() > self.capacity {
            self.events.pop_front();
        }
        Ok(())
    }

    /// Record a mood check-in
    pub fn record_mood(
        &mut self,
        mood: Mood,
        factors: Vec<String>,
        at: DateTime<Utc>,
    ) -> Result<(), WellnessError> {
        self.record(BehaviorEvent::mood(mood, factors, at))
    }

    /// Record a feature use
    pub fn record_feature_use(
        &mut self,
        feature: &str,
        at: DateTime<Utc>,
    ) -> Result<(), WellnessError> {
        self.record(BehaviorEvent::feature(feature, at))
    }

    /// Events, oldest first
    pub fn events(&self) -> impl DoubleEndedIterator<Item = &BehaviorEvent> + ExactSizeIterator {
        self.events.iter()
    }

    /// Most recent event
    pub fn last(&self) -> Option<&BehaviorEvent> {
        self.events.back()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity, dropping the oldest events if needed
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.events.len() > self.capacity {
            self.events.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Load a log from JSON, restoring order and capacity
    pub fn from_json(json: &str) -> Result<Self, WellnessError> {
        let log: Self = serde_json::from_str(json)?;
        log.normalized()
    }

    /// Validate every event, sort by timestamp and apply the capacity.
    ///
    /// Needed for any log deserialized without [`BehaviorLog::from_json`].
    pub fn normalized(mut self) -> Result<Self, WellnessError> {
        for event in &self.events {
            event.validate()?;
        }
        self.events
            .make_contiguous()
            .sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        let capacity = self.capacity;
        self.set_capacity(capacity);
        Ok(self)
    }

    /// Serialize the log to JSON
    pub fn to_json(&self) -> Result<String, WellnessError> {
        Ok(serde_json::to_string(self)?)
    }
}
