mod grid;
mod solar;
mod statistics;

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

pub use self::statistics::{PriceStatistics, Thresholds};
use crate::{
    core::{battery::BatteryConfig, series::PricedPoint},
    prelude::*,
    quantity::{energy::KilowattHours, rate::KilowattHourRate},
};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Action {
    Charge,
    Discharge,
}

/// Planned battery action at a single timestamp.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Intent {
    pub action: Action,

    /// For a charge: energy to take in. For a discharge: energy to deliver.
    pub amount: KilowattHours,

    pub price: KilowattHourRate,
}

impl Intent {
    pub const fn charge(amount: KilowattHours, price: KilowattHourRate) -> Self {
        Self { action: Action::Charge, amount, price }
    }

    pub const fn discharge(amount: KilowattHours, price: KilowattHourRate) -> Self {
        Self { action: Action::Discharge, amount, price }
    }
}

pub type Plan = BTreeMap<NaiveDateTime, Intent>;

#[must_use]
#[derive(Clone, Debug, Default)]
pub struct DailyPlan {
    pub solar: Plan,
    pub grid: Plan,
}

impl DailyPlan {
    #[must_use]
    pub fn intents(&self, timestamp: NaiveDateTime) -> (Option<Intent>, Option<Intent>) {
        (self.solar.get(&timestamp).copied(), self.grid.get(&timestamp).copied())
    }
}

/// Plans a single day at a time, without looking into the following days.
#[must_use]
pub struct Planner<'a> {
    config: &'a BatteryConfig,

    /// Per-interval power ceiling.
    ceiling: KilowattHours,
}

impl<'a> Planner<'a> {
    pub const fn new(config: &'a BatteryConfig, ceiling: KilowattHours) -> Self {
        Self { config, ceiling }
    }

    pub fn plan(&self, day: &[PricedPoint]) -> DailyPlan {
        let statistics = PriceStatistics::from_points(day);
        let solar = if self.config.enable_solar_arbitrage {
            let thresholds = statistics.thresholds(self.config);
            trace!(?statistics, ?thresholds, "solar thresholds");
            solar::plan(day, self.ceiling, thresholds)
        } else {
            Plan::new()
        };
        let grid = if self.config.enable_grid_arbitrage {
            grid::plan(day, self.config, self.ceiling)
        } else {
            Plan::new()
        };
        DailyPlan { solar, grid }
    }
}
