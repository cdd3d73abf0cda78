use std::cmp::Reverse;

use chrono::{NaiveDateTime, TimeDelta};
use itertools::Itertools;

/// Fallback when there are not enough timestamps to infer anything.
pub const DEFAULT_INTERVAL: TimeDelta = TimeDelta::hours(1);

/// Infer the sampling interval as the most frequent gap between consecutive timestamps.
///
/// This is an approximation: gaps in the data or a mix of granularities silently change the
/// result, and with it every per-interval power ceiling. Ties go to the shorter gap.
#[must_use]
pub fn detect(timestamps: impl IntoIterator<Item = NaiveDateTime>) -> TimeDelta {
    timestamps
        .into_iter()
        .tuple_windows()
        .map(|(previous, next)| next - previous)
        .filter(|gap| *gap > TimeDelta::zero())
        .counts()
        .into_iter()
        .max_by_key(|(gap, count)| (*count, Reverse(*gap)))
        .map_or(DEFAULT_INTERVAL, |(gap, _)| gap)
}

/// Length of the interval as a fraction of an hour.
#[must_use]
pub fn hours(interval: TimeDelta) -> f64 {
    interval.as_seconds_f64() / 3600.0
}
