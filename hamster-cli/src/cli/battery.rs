//! Battery-related CLI arguments.

use clap::Parser;
use hamster::{
    core::battery::BatteryConfig,
    prelude::*,
    quantity::{energy::KilowattHours, power::Kilowatts},
};

#[must_use]
#[derive(Parser)]
pub struct BatteryArgs {
    /// Usable battery capacity in kilowatt-hours.
    #[clap(long = "capacity-kwh", default_value = "100", env = "BATTERY_CAPACITY_KWH")]
    pub capacity: KilowattHours,

    /// Part of the energy that ends up in the battery when charging.
    #[clap(long, default_value = "0.95", env = "BATTERY_CHARGING_EFFICIENCY")]
    pub charging_efficiency: f64,

    /// Part of the stored energy that comes out when discharging.
    #[clap(long, default_value = "0.95", env = "BATTERY_DISCHARGING_EFFICIENCY")]
    pub discharging_efficiency: f64,

    /// Minimum state of charge, as a fraction of the capacity.
    #[clap(long, default_value = "0.1", env = "BATTERY_MIN_STATE_OF_CHARGE")]
    pub min_state_of_charge: f64,

    /// Inverter power limit in kilowatts.
    #[clap(long = "max-power-kw", default_value = "50", env = "BATTERY_MAX_POWER_KW")]
    pub max_power: Kilowatts,

    /// C-rate: maximum part of the capacity that may flow within an hour.
    #[clap(long, default_value = "0.5", env = "BATTERY_MAX_CYCLE_FRACTION")]
    pub max_cycle_fraction: f64,

    /// Safety margin on top of the round-trip losses when deciding whether a trade is profitable.
    #[clap(long, default_value = "1.1", env = "PRICE_THRESHOLD_FACTOR")]
    pub price_threshold_factor: f64,

    /// Weight of the daily price standard deviation in the discharge threshold.
    #[clap(long, default_value = "0.5", env = "STD_DEV_WEIGHT")]
    pub std_dev_weight: f64,

    /// Do not store the excess solar energy.
    #[clap(long, env = "NO_SOLAR_ARBITRAGE")]
    pub no_solar_arbitrage: bool,

    /// Do not buy grid energy to sell or consume it later.
    #[clap(long, env = "NO_GRID_ARBITRAGE")]
    pub no_grid_arbitrage: bool,

    /// Charge at the full rate up to 100% state of charge.
    #[clap(long, env = "NO_CHARGE_TAPER")]
    pub no_charge_taper: bool,
}

impl BatteryArgs {
    pub fn config(&self) -> Result<BatteryConfig> {
        BatteryConfig::builder()
            .capacity(self.capacity)
            .charging_efficiency(self.charging_efficiency)
            .discharging_efficiency(self.discharging_efficiency)
            .min_state_of_charge(self.min_state_of_charge)
            .max_power(self.max_power)
            .max_cycle_fraction(self.max_cycle_fraction)
            .price_threshold_factor(self.price_threshold_factor)
            .std_dev_weight(self.std_dev_weight)
            .enable_solar_arbitrage(!self.no_solar_arbitrage)
            .enable_grid_arbitrage(!self.no_grid_arbitrage)
            .enable_charge_taper(!self.no_charge_taper)
            .build()
            .context("invalid battery configuration")
    }
}
