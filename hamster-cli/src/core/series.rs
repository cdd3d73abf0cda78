mod forward_fill;

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

pub use self::forward_fill::forward_fill;
use crate::{
    core::reading::{EnergyReading, PriceQuote, ReadingKind},
    prelude::*,
    quantity::{energy::KilowattHours, rate::KilowattHourRate},
};

/// Supply and return aligned with the price at one timestamp.
///
/// The price is absent when the price source did not cover the timestamp.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Point {
    pub timestamp: NaiveDateTime,
    pub supply: KilowattHours,
    pub returned: KilowattHours,
    pub price: Option<KilowattHourRate>,
}

/// Aligned row with a known price, the only kind the planner can work with.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct PricedPoint {
    pub timestamp: NaiveDateTime,
    pub supply: KilowattHours,
    pub returned: KilowattHours,
    pub price: KilowattHourRate,
}

impl PricedPoint {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Solar production in excess of the consumption.
    pub fn surplus(&self) -> KilowattHours {
        (self.returned - self.supply).positive_part()
    }

    /// Consumption not covered by the solar production.
    pub fn deficit(&self) -> KilowattHours {
        (self.supply - self.returned).positive_part()
    }
}

impl TryFrom<Point> for PricedPoint {
    type Error = Point;

    fn try_from(point: Point) -> Result<Self, Self::Error> {
        match point.price {
            Some(price) => Ok(Self {
                timestamp: point.timestamp,
                supply: point.supply,
                returned: point.returned,
                price,
            }),
            None => Err(point),
        }
    }
}

/// Align the readings and the price quotes onto the energy timestamps.
///
/// Multiple readings of the same kind at the same timestamp are summed up, a missing channel
/// counts as zero. Non-finite prices are treated as missing. The result is chronological.
#[instrument(skip_all)]
pub fn align(readings: &[EnergyReading], quotes: &[PriceQuote]) -> Result<Vec<Point>> {
    let mut energy: BTreeMap<NaiveDateTime, (KilowattHours, KilowattHours)> = BTreeMap::new();
    for reading in readings {
        ensure!(
            reading.value.is_finite() && reading.value >= KilowattHours::ZERO,
            "invalid {} reading at {}: {:?}",
            reading.kind,
            reading.timestamp,
            reading.value,
        );
        let (supply, returned) = energy.entry(reading.timestamp).or_default();
        match reading.kind {
            ReadingKind::Supply => *supply += reading.value,
            ReadingKind::Return => *returned += reading.value,
        }
    }

    let prices: BTreeMap<NaiveDateTime, KilowattHourRate> = quotes
        .iter()
        .filter(|quote| quote.price.is_finite())
        .map(|quote| (quote.timestamp, quote.price))
        .collect();
    if prices.len() != quotes.len() {
        debug!(n_quotes = quotes.len(), n_usable = prices.len(), "dropped unusable price quotes");
    }

    Ok(energy
        .into_iter()
        .map(|(timestamp, (supply, returned))| Point {
            timestamp,
            supply,
            returned,
            price: prices.get(&timestamp).copied(),
        })
        .collect())
}

/// Keep the points with a known price.
///
/// The engine never makes up a price, so the unpriced timestamps are excluded from planning.
pub fn priced(points: Vec<Point>) -> Vec<PricedPoint> {
    let n_points = points.len();
    let priced: Vec<PricedPoint> =
        points.into_iter().filter_map(|point| PricedPoint::try_from(point).ok()).collect();
    let n_excluded = n_points - priced.len();
    if n_excluded != 0 {
        warn!(n_excluded, n_points, "excluded timestamps without a price");
    }
    priced
}

/// Split the chronological points into calendar days.
pub fn days(points: &[PricedPoint]) -> impl Iterator<Item = (NaiveDate, &[PricedPoint])> {
    points.chunk_by(|lhs, rhs| lhs.date() == rhs.date()).map(|day| (day[0].date(), day))
}
