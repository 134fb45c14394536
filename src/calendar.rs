//! Calendar helpers for walking a window of days
//!
//! Everything here works on naive local dates and times; the caller decides
//! what "now" is.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

/// Iterates over `[start, start + 1 day, ..., start + (num_days - 1) days]`
///
/// Stops early if the calendar runs out (only possible near `NaiveDate::MAX`).
pub fn iter_days(start: NaiveDate, num_days: u32) -> impl Iterator<Item = NaiveDate> {
    (0..u64::from(num_days)).map_while(move |offset| start.checked_add_days(Days::new(offset)))
}

/// Returns the top of the given hour on the given day
///
/// Hours past 23 are clamped to 23.
pub fn hour_boundary(day: NaiveDate, hour: u32) -> NaiveDateTime {
    let time = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    day.and_time(time)
}
