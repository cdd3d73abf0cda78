use std::collections::BTreeMap;

use chrono::{NaiveDateTime, TimeDelta};

use crate::{core::reading::PriceQuote, prelude::*, quantity::rate::KilowattHourRate};

/// Upsample the price quotes onto a finer grid by repeating each quote until the next one.
///
/// The last quote spans as long as the gap before it, or an hour when it is the only quote.
/// Duplicate timestamps keep the last quote.
pub fn forward_fill(quotes: &[PriceQuote], step: TimeDelta) -> Result<Vec<PriceQuote>> {
    ensure!(step > TimeDelta::zero(), "forward-fill step must be positive, got {step}");

    let quotes: BTreeMap<NaiveDateTime, KilowattHourRate> =
        quotes.iter().map(|quote| (quote.timestamp, quote.price)).collect();
    let timestamps: Vec<NaiveDateTime> = quotes.keys().copied().collect();

    let mut filled = Vec::new();
    for (index, (&start, &price)) in quotes.iter().enumerate() {
        let end = match (timestamps.get(index + 1), index.checked_sub(1)) {
            (Some(next), _) => *next,
            (None, Some(previous)) => start + (start - timestamps[previous]),
            (None, None) => start + TimeDelta::hours(1),
        };
        let mut timestamp = start;
        while timestamp < end {
            filled.push(PriceQuote::new(timestamp, price));
            timestamp += step;
        }
    }
    Ok(filled)
}
