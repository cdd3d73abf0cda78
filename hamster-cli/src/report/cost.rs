use chrono::NaiveDate;

use crate::{
    core::series::{self, PricedPoint},
    quantity::{cost::Cost, rate::KilowattHourRate},
};

/// What the grid supply cost within a day without any battery.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DailyCost {
    pub date: NaiveDate,
    pub energy: Cost,

    /// Network tax over the supplied energy.
    pub tax: Cost,
}

impl DailyCost {
    pub fn total(&self) -> Cost {
        self.energy + self.tax
    }
}

/// Baseline bill per calendar day.
#[must_use]
pub fn daily_costs(points: &[PricedPoint], network_tax: KilowattHourRate) -> Vec<DailyCost> {
    series::days(points)
        .map(|(date, day)| DailyCost {
            date,
            energy: day.iter().map(|point| point.supply * point.price).sum(),
            tax: day.iter().map(|point| point.supply * network_tax).sum(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{core::series::tests::at, quantity::energy::KilowattHours};

    fn point(day: u32, hour: u32, supply: f64, price: f64) -> PricedPoint {
        PricedPoint {
            timestamp: at(day, hour, 0),
            supply: KilowattHours::from(supply),
            returned: KilowattHours::from(1.0),
            price: KilowattHourRate::from(price),
        }
    }

    #[test]
    fn test_daily_costs() {
        let points = [point(25, 10, 2.0, 0.1), point(25, 11, 1.0, 0.3), point(26, 10, 4.0, 0.2)];
        let costs = daily_costs(&points, KilowattHourRate::from(0.1));
        assert_eq!(costs.len(), 2);
        assert_abs_diff_eq!(costs[0].energy.0.0, 0.5);
        assert_abs_diff_eq!(costs[0].tax.0.0, 0.3);
        assert_abs_diff_eq!(costs[0].total().0.0, 0.8);
        assert_eq!(costs[1].date, at(26, 0, 0).date());
        assert_abs_diff_eq!(costs[1].total().0.0, 1.2);
    }
}
