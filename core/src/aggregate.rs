//! Daily totals and the five-day chart window.
//!
//! Everything here is a pure function of the entries and the current date.

use chrono::{Days, NaiveDate};

use crate::models::{AggregationMode, DailyPoint, Entry, Progress};

/// Number of days in the rolling chart window, today included.
pub const WINDOW_DAYS: u64 = 5;

/// Aggregate the entries logged on `date`. Days with no entries are 0 in
/// both modes; `Latest` takes the last-inserted entry of the day.
#[must_use]
pub fn daily_value(entries: &[Entry], mode: AggregationMode, date: NaiveDate) -> f64 {
    let mut on_day = entries.iter().filter(|e| e.date() == date);
    match mode {
        AggregationMode::Sum => on_day.map(|e| e.value).sum(),
        AggregationMode::Latest => on_day.next_back().map_or(0.0, |e| e.value),
    }
}

#[must_use]
pub fn today_total(entries: &[Entry], mode: AggregationMode, today: NaiveDate) -> f64 {
    daily_value(entries, mode, today)
}

/// First day of the window ending at `today`, or `None` when it would fall
/// before the earliest representable date.
#[must_use]
pub fn window_start(today: NaiveDate) -> Option<NaiveDate> {
    today.checked_sub_days(Days::new(WINDOW_DAYS - 1))
}

/// Five points, oldest first, ending with today. No carry-forward between days.
/// Days before the earliest representable date are left out.
#[must_use]
pub fn rolling_series(entries: &[Entry], mode: AggregationMode, today: NaiveDate) -> Vec<DailyPoint> {
    (0..WINDOW_DAYS)
        .rev()
        .filter_map(|days_ago| {
            let date = today.checked_sub_days(Days::new(days_ago))?;
            let label = if days_ago == 0 {
                "Today".to_string()
            } else {
                date.format("%a").to_string()
            };
            Some(DailyPoint {
                date,
                label,
                value: daily_value(entries, mode, date),
            })
        })
        .collect()
}

#[must_use]
pub fn progress(total: f64, goal: f64) -> Progress {
    Progress {
        completed: total,
        goal,
        remaining: (goal - total).max(0.0),
    }
}
