//! Mindwell - On-device personalization and wellness scoring engine
//!
//! Mindwell turns a user's mood check-ins and feature usage into a behavior
//! profile, and the profile into recommendations, adaptive reminders and a
//! quote of the day. Separately it combines mood, journal and mindfulness
//! activity into a weighted 0-100 wellness score.
//!
//! ## Modules
//!
//! - **Behavior**: Rolling event log and profile derivation
//! - **Personalization**: Recommendations, reminders and quotes
//! - **Scoring**: Wellness score calculation and daily score history
//! - **Pipeline**: Stateful processor and stateless JSON entry points

pub mod behavior;
pub mod config;
pub mod daily;
pub mod error;
pub mod history;
pub mod personalization;
pub mod pipeline;
pub mod scoring;
pub mod storage;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use behavior::{BehaviorEvent, BehaviorLog, BehaviorProfiler};
pub use config::EngineConfig;
pub use daily::{pick_daily, pick_daily_on};
pub use error::WellnessError;
pub use history::{ScoreHistory, ScoreSnapshot};
pub use personalization::PersonalizationEngine;
pub use pipeline::{insights_from_json, score_from_json, Insights, ScoreRequest, WellnessProcessor};
pub use scoring::WellnessCalculator;
pub use storage::{JsonFileStore, MemoryStore, WellnessStore};

/// Library version
pub const MINDWELL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by diagnostics
pub const PRODUCER_NAME: &str = "mindwell";
