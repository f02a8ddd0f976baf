//! Daily summary schedule.

use chrono::{DateTime, Duration, NaiveTime, Utc};

/// The next moment, strictly after `now`, when the UTC clock reads `hour:00`.
///
/// Hours above 23 are clamped to 23.
#[must_use]
pub fn next_summary_at(now: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    let today = now.date_naive().and_time(time).and_utc();
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// How long to wait from `now` until the next summary.
#[must_use]
pub fn until_next_summary(now: DateTime<Utc>, hour: u32) -> std::time::Duration {
    (next_summary_at(now, hour) - now)
        .to_std()
        .unwrap_or_default()
}
