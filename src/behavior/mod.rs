//! Behavior log and profile derivation
//!
//! The application records mood check-ins and feature usage into a rolling
//! [`BehaviorLog`]. [`BehaviorProfiler`] turns that log into a
//! [`UserBehavior`](crate::types::UserBehavior) snapshot on every read.
//!
//! Pipeline: events → BehaviorLog → BehaviorProfiler → UserBehavior

pub mod log;
pub mod profile;

pub use log::{BehaviorEvent, BehaviorEventKind, BehaviorLog};
pub use profile::BehaviorProfiler;
