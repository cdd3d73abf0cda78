use average::Variance;

use crate::{
    core::{battery::BatteryConfig, series::PricedPoint},
    quantity::rate::KilowattHourRate,
};

/// Daily price mean and sample standard deviation.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PriceStatistics {
    pub mean: KilowattHourRate,
    pub std_dev: KilowattHourRate,
}

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Thresholds {
    pub charge: KilowattHourRate,
    pub discharge: KilowattHourRate,
}

impl PriceStatistics {
    pub fn from_points(points: &[PricedPoint]) -> Self {
        let estimate: Variance = points.iter().map(|point| point.price.0.0).collect();
        if estimate.is_empty() {
            return Self { mean: KilowattHourRate::ZERO, std_dev: KilowattHourRate::ZERO };
        }
        let std_dev = if estimate.len() > 1 { estimate.sample_variance().sqrt() } else { 0.0 };
        Self { mean: estimate.mean().into(), std_dev: std_dev.into() }
    }

    /// Charge threshold is `mean − w·σ`. A discharge must beat the largest of:
    ///
    /// - the mean corrected on the round-trip losses,
    /// - `mean + w·σ`,
    /// - the charge threshold corrected on the round-trip losses and the safety factor.
    pub fn thresholds(&self, config: &BatteryConfig) -> Thresholds {
        let round_trip = config.round_trip_efficiency();
        let spread = self.std_dev * config.std_dev_weight;
        let charge = self.mean - spread;
        let discharge = (self.mean / round_trip)
            .max(self.mean + spread)
            .max(charge / round_trip * config.price_threshold_factor);
        Thresholds { charge, discharge }
    }
}
