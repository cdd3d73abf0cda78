use std::fmt::{Display, Formatter};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::quantity::{energy::KilowattHours, rate::KilowattHourRate};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingKind {
    /// Energy drawn from the grid.
    Supply,

    /// Solar energy returned to the grid.
    Return,
}

impl Display for ReadingKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Supply => write!(f, "supply"),
            Self::Return => write!(f, "return"),
        }
    }
}

/// Single metered value for one channel and interval.
///
/// Timestamps are naive local time. Several readings of the same kind at the same timestamp
/// are summed up during alignment.
#[must_use]
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct EnergyReading {
    pub timestamp: NaiveDateTime,

    #[serde(rename = "type")]
    pub kind: ReadingKind,

    pub value: KilowattHours,
}

impl EnergyReading {
    pub const fn new(timestamp: NaiveDateTime, kind: ReadingKind, value: KilowattHours) -> Self {
        Self { timestamp, kind, value }
    }

    pub const fn supply(timestamp: NaiveDateTime, value: KilowattHours) -> Self {
        Self::new(timestamp, ReadingKind::Supply, value)
    }

    pub const fn returned(timestamp: NaiveDateTime, value: KilowattHours) -> Self {
        Self::new(timestamp, ReadingKind::Return, value)
    }
}

/// Day-ahead price in effect for the interval starting at the timestamp.
#[must_use]
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct PriceQuote {
    pub timestamp: NaiveDateTime,
    pub price: KilowattHourRate,
}

impl PriceQuote {
    pub const fn new(timestamp: NaiveDateTime, price: KilowattHourRate) -> Self {
        Self { timestamp, price }
    }
}
