use bon::bon;
use chrono::TimeDelta;

use crate::{
    core::interval,
    quantity::{energy::KilowattHours, power::Kilowatts},
};

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum InvalidConfig {
    #[error("battery capacity must be positive, got {0}")]
    Capacity(KilowattHours),

    #[error("charging efficiency must be within (0, 1], got {0}")]
    ChargingEfficiency(f64),

    #[error("discharging efficiency must be within (0, 1], got {0}")]
    DischargingEfficiency(f64),

    #[error("minimum state of charge must be within [0, 1), got {0}")]
    MinStateOfCharge(f64),

    #[error("maximum power must be positive, got {0}")]
    MaxPower(Kilowatts),

    #[error("maximum cycle fraction must be within (0, 1], got {0}")]
    MaxCycleFraction(f64),

    #[error("price threshold factor must be at least 1, got {0}")]
    PriceThresholdFactor(f64),

    #[error("standard deviation weight must be finite and non-negative, got {0}")]
    StdDevWeight(f64),
}

/// Battery parameters, fixed for the entire simulation run.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BatteryConfig {
    pub capacity: KilowattHours,

    /// Charging efficiency, `(0, 1]`.
    pub charging_efficiency: f64,

    /// Discharging efficiency, `(0, 1]`.
    pub discharging_efficiency: f64,

    /// Minimal state of charge as a fraction of the capacity, `[0, 1)`.
    pub min_state_of_charge: f64,

    /// Absolute inverter power limit.
    pub max_power: Kilowatts,

    /// C-rate: maximum fraction of the capacity that may flow in or out per hour.
    pub max_cycle_fraction: f64,

    /// Safety margin on top of the round-trip losses for a trade to be worth it, `>= 1`.
    pub price_threshold_factor: f64,

    /// Weight of the daily price standard deviation in the charge and discharge thresholds.
    pub std_dev_weight: f64,

    pub enable_solar_arbitrage: bool,
    pub enable_grid_arbitrage: bool,

    /// Curtail the charging rate above 80% state of charge.
    pub enable_charge_taper: bool,
}

#[bon]
impl BatteryConfig {
    #[builder]
    pub fn new(
        #[builder(default = KilowattHours::new(100.0))] capacity: KilowattHours,
        #[builder(default = 0.95)] charging_efficiency: f64,
        #[builder(default = 0.95)] discharging_efficiency: f64,
        #[builder(default = 0.1)] min_state_of_charge: f64,
        #[builder(default = Kilowatts::new(50.0))] max_power: Kilowatts,
        #[builder(default = 0.5)] max_cycle_fraction: f64,
        #[builder(default = 1.1)] price_threshold_factor: f64,
        #[builder(default = 0.5)] std_dev_weight: f64,
        #[builder(default = true)] enable_solar_arbitrage: bool,
        #[builder(default = true)] enable_grid_arbitrage: bool,
        #[builder(default = true)] enable_charge_taper: bool,
    ) -> Result<Self, InvalidConfig> {
        let is_efficiency = |value: f64| value > 0.0 && value <= 1.0;

        if !(capacity.is_finite() && capacity.is_positive()) {
            return Err(InvalidConfig::Capacity(capacity));
        }
        if !is_efficiency(charging_efficiency) {
            return Err(InvalidConfig::ChargingEfficiency(charging_efficiency));
        }
        if !is_efficiency(discharging_efficiency) {
            return Err(InvalidConfig::DischargingEfficiency(discharging_efficiency));
        }
        if !(0.0..1.0).contains(&min_state_of_charge) {
            return Err(InvalidConfig::MinStateOfCharge(min_state_of_charge));
        }
        if !(max_power.is_finite() && max_power.is_positive()) {
            return Err(InvalidConfig::MaxPower(max_power));
        }
        if !is_efficiency(max_cycle_fraction) {
            return Err(InvalidConfig::MaxCycleFraction(max_cycle_fraction));
        }
        if !(price_threshold_factor.is_finite() && price_threshold_factor >= 1.0) {
            return Err(InvalidConfig::PriceThresholdFactor(price_threshold_factor));
        }
        if !(std_dev_weight.is_finite() && std_dev_weight >= 0.0) {
            return Err(InvalidConfig::StdDevWeight(std_dev_weight));
        }

        Ok(Self {
            capacity,
            charging_efficiency,
            discharging_efficiency,
            min_state_of_charge,
            max_power,
            max_cycle_fraction,
            price_threshold_factor,
            std_dev_weight,
            enable_solar_arbitrage,
            enable_grid_arbitrage,
            enable_charge_taper,
        })
    }
}

impl BatteryConfig {
    /// Combined efficiency: the part of the charged energy that eventually comes back out.
    #[must_use]
    pub const fn round_trip_efficiency(&self) -> f64 {
        self.charging_efficiency * self.discharging_efficiency
    }

    /// Lowest allowed battery level.
    pub fn min_level(&self) -> KilowattHours {
        self.capacity * self.min_state_of_charge
    }

    #[must_use]
    pub const fn is_arbitrage_enabled(&self) -> bool {
        self.enable_solar_arbitrage || self.enable_grid_arbitrage
    }

    /// Maximum energy that may flow in or out of the battery within one interval.
    ///
    /// The stricter one of the C-rate limit and the absolute power limit.
    pub fn power_ceiling(&self, interval: TimeDelta) -> KilowattHours {
        let c_rate_limit = self.capacity * (self.max_cycle_fraction * interval::hours(interval));
        c_rate_limit.min(self.max_power * interval)
    }
}
