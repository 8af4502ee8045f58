// Date utility functions

use chrono::{DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, NaiveTime};

use crate::models::grid::SLOT_MINUTES;

/// `YYYY-MM-DD` partition key for persisted events.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Combine a calendar date with a time-of-day into a local instant.
///
/// On a DST fold the earlier of the two mappings is taken; in a DST gap
/// the time is pushed forward one slot at a time until it exists.
pub fn instant_at(date: NaiveDate, time: NaiveTime) -> DateTime<Local> {
    let mut naive = date.and_time(time);
    loop {
        match naive.and_local_timezone(Local) {
            LocalResult::Single(instant) => return instant,
            LocalResult::Ambiguous(earliest, _) => return earliest,
            LocalResult::None => naive += Duration::minutes(SLOT_MINUTES as i64),
        }
    }
}

/// Monday of the ISO week containing the given date.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// The seven days of the week starting at `start`.
pub fn week_days(start: NaiveDate) -> Vec<NaiveDate> {
    (0..7).map(|i| start + Duration::days(i)).collect()
}
