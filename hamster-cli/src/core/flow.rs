use std::fmt::{Display, Formatter};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::{
    core::{battery::BatteryState, series::PricedPoint},
    quantity::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate},
};

/// Constraint that cut a planned charge short.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeLimit {
    /// Everything available was charged.
    #[default]
    None,

    /// The battery filled up.
    BatterySpace,

    /// The per-interval power ceiling.
    ChargingRate,

    /// Charge-current curtailment near full charge.
    Taper,
}

impl Display for ChargeLimit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::BatterySpace => write!(f, "battery_space"),
            Self::ChargingRate => write!(f, "charging_rate"),
            Self::Taper => write!(f, "taper"),
        }
    }
}

/// Every energy transfer within one interval, plus what it was worth.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct FlowRecord {
    pub timestamp: NaiveDateTime,
    pub price: KilowattHourRate,

    pub solar_to_battery: KilowattHours,
    pub solar_to_grid: KilowattHours,
    pub grid_to_battery: KilowattHours,
    pub battery_to_house: KilowattHours,

    /// Discharges only ever cover the house deficit, so this stays zero.
    pub battery_to_grid: KilowattHours,
    pub grid_to_house: KilowattHours,

    /// Part of `battery_to_house` attributed to stored solar energy.
    pub battery_to_house_solar: KilowattHours,

    /// Part of `battery_to_house` attributed to energy bought from the grid.
    pub battery_to_house_grid: KilowattHours,

    /// Battery state after the transfers.
    pub battery: BatteryState,

    pub charge_limit: ChargeLimit,

    /// Grid purchase avoided by discharging stored solar energy.
    pub solar_savings: Cost,

    /// Export income foregone by storing solar energy instead of selling it.
    pub lost_revenue: Cost,

    /// Discharge value minus the purchase cost of grid arbitrage.
    pub grid_arbitrage: Cost,
}

impl FlowRecord {
    /// No-battery baseline: the surplus is exported and the deficit is drawn from the grid.
    pub fn baseline(point: &PricedPoint, battery: BatteryState) -> Self {
        Self {
            timestamp: point.timestamp,
            price: point.price,
            solar_to_battery: KilowattHours::ZERO,
            solar_to_grid: point.surplus(),
            grid_to_battery: KilowattHours::ZERO,
            battery_to_house: KilowattHours::ZERO,
            battery_to_grid: KilowattHours::ZERO,
            grid_to_house: point.deficit(),
            battery_to_house_solar: KilowattHours::ZERO,
            battery_to_house_grid: KilowattHours::ZERO,
            battery,
            charge_limit: ChargeLimit::None,
            solar_savings: Cost::ZERO,
            lost_revenue: Cost::ZERO,
            grid_arbitrage: Cost::ZERO,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Energy drawn from the grid, the only energy that attracts the network tax.
    pub fn grid_import(&self) -> KilowattHours {
        self.grid_to_house + self.grid_to_battery
    }

    pub fn grid_export(&self) -> KilowattHours {
        self.solar_to_grid + self.battery_to_grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_limit_display() {
        assert_eq!(ChargeLimit::BatterySpace.to_string(), "battery_space");
        assert_eq!(ChargeLimit::None.to_string(), "none");
    }
}
