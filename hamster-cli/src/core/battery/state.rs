use serde::Serialize;

use crate::{core::battery::BatteryConfig, quantity::energy::KilowattHours};

/// Where the stored energy originally came from.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Source {
    Solar,
    Grid,
}

/// Battery content, split by the energy source.
///
/// The split is an accounting convention over a physically fungible pool: discharges draw from
/// both fractions in proportion to their current share. It exists so that downstream tax
/// computation can tell solar routed through the battery from energy bought on the grid.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct BatteryState {
    pub level: KilowattHours,
    pub solar: KilowattHours,
    pub grid: KilowattHours,
}

impl BatteryState {
    /// Start at the minimum level, attributed entirely to solar.
    pub fn initial(config: &BatteryConfig) -> Self {
        let level = config.min_level();
        Self { level, solar: level, grid: KilowattHours::ZERO }
    }

    #[must_use]
    pub fn state_of_charge(&self, capacity: KilowattHours) -> f64 {
        (self.level / capacity).0
    }

    /// Share of the content attributed to solar, `0..=1`.
    #[must_use]
    pub fn solar_share(&self) -> f64 {
        if self.level.is_positive() { (self.solar / self.level).0.clamp(0.0, 1.0) } else { 1.0 }
    }

    /// Add the energy that actually ended up in the battery, after the charging losses.
    pub fn store(mut self, source: Source, energy: KilowattHours) -> Self {
        match source {
            Source::Solar => self.solar += energy,
            Source::Grid => self.grid += energy,
        }
        self.level = self.solar + self.grid;
        self
    }

    /// Remove the energy from both fractions proportionally.
    pub fn draw(mut self, energy: KilowattHours) -> Self {
        let from_solar = energy * self.solar_share();
        self.solar = (self.solar - from_solar).positive_part();
        self.grid = (self.grid - (energy - from_solar)).positive_part();
        self.level = self.solar + self.grid;
        self
    }

    /// Remove the energy from a single fraction, never taking more than it holds.
    pub fn draw_from(mut self, source: Source, energy: KilowattHours) -> Self {
        match source {
            Source::Solar => self.solar = (self.solar - energy).positive_part(),
            Source::Grid => self.grid = (self.grid - energy).positive_part(),
        }
        self.level = self.solar + self.grid;
        self
    }
}
