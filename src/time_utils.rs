// SPDX-License-Identifier: MIT

//! Shared helpers for date/time handling.
//!
//! The competition runs in Monday-to-Monday weeks. Week math is done on
//! calendar dates, so a DST shift inside a week cannot move the bounds.

use chrono::{DateTime, Datelike, Duration, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// The submission week containing `today`: most recent Monday (inclusive)
/// through the following Monday (exclusive).
pub fn current_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    (monday, monday + Duration::days(7))
}

/// Whether `activity_date` falls inside the submission week containing `today`.
pub fn is_within_current_week(activity_date: NaiveDate, today: NaiveDate) -> bool {
    let (week_start, week_end) = current_week(today);
    week_start <= activity_date && activity_date < week_end
}
