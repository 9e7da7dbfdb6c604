//! The sliding lookahead window used for highlighting and reminders.

use chrono::{Duration, NaiveDate};

use crate::resolve::ResolvedEvent;

/// Default lookahead, in days.
pub const UPCOMING_WINDOW_DAYS: u32 = 14;

/// Last day of a window of `window_days` starting at `today`, saturating at the
/// largest representable date.
pub fn window_end(today: NaiveDate, window_days: u32) -> NaiveDate {
    today
        .checked_add_signed(Duration::days(i64::from(window_days)))
        .unwrap_or(NaiveDate::MAX)
}

/// Keep events with `today <= date <= today + window_days`, sorted by date.
///
/// The sort is stable: events on the same day keep their input order.
pub fn filter_upcoming(
    events: &[ResolvedEvent],
    today: NaiveDate,
    window_days: u32,
) -> Vec<ResolvedEvent> {
    let end = window_end(today, window_days);

    let mut upcoming: Vec<ResolvedEvent> = events
        .iter()
        .filter(|e| e.event_date >= today && e.event_date <= end)
        .cloned()
        .collect();

    upcoming.sort_by_key(|e| e.event_date);
    upcoming
}
