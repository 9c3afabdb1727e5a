//! Snapping pointer-derived instants to the scheduling grid.
//!
//! Steps are measured from the Unix epoch, which is UTC-midnight aligned, so
//! any step that divides a day yields the same boundaries on every day.

use chrono::{DateTime, Duration, DurationRound, Utc};

fn step(minutes: i64) -> Duration {
    Duration::minutes(minutes.max(1))
}

/// Latest boundary at or before `instant`.
pub fn floor_to(instant: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    instant.duration_trunc(step(minutes)).unwrap_or(instant)
}

/// Earliest boundary at or after `instant`.
pub fn ceil_to(instant: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    let floored = floor_to(instant, minutes);
    if floored == instant {
        instant
    } else {
        floored + step(minutes)
    }
}

/// Nearest boundary; halfway rounds up.
pub fn round_to(instant: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    instant.duration_round(step(minutes)).unwrap_or(instant)
}

pub fn is_aligned(instant: DateTime<Utc>, minutes: i64) -> bool {
    floor_to(instant, minutes) == instant
}
