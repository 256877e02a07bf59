//! Deterministic daily selection
//!
//! Picks one element per calendar day. The seed is the sum of the character
//! codes of `"{year}-{month0}-{day}"`, with a 0-based month and no zero
//! padding, so the same list yields the same element all day.

use chrono::{Datelike, Local, NaiveDate};

/// Seed for a calendar date
pub fn daily_seed(date: NaiveDate) -> u32 {
    let key = format!("{}-{}-{}", date.year(), date.month0(), date.day());
    key.chars().map(|c| c as u32).sum()
}

/// Pick today's element (local date). Returns `None` for an empty slice.
pub fn pick_daily<T>(items: &[T]) -> Option<&T> {
    pick_daily_on(items, Local::now().date_naive())
}

/// Pick the element for a given date. Returns `None` for an empty slice.
pub fn pick_daily_on<T>(items: &[T], date: NaiveDate) -> Option<&T> {
    if items.is_empty() {
        return None;
    }
    let index = daily_seed(date) as usize % items.len();
    items.get(index)
}
