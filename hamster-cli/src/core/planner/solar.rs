use crate::{
    core::{
        planner::{Intent, Plan, Thresholds},
        series::PricedPoint,
    },
    quantity::energy::KilowattHours,
};

/// Store every surplus, release the stored energy on expensive deficits.
///
/// Storing is preferred over exporting regardless of the price, since stored energy later
/// displaces the more expensive grid purchase.
pub fn plan(day: &[PricedPoint], ceiling: KilowattHours, thresholds: Thresholds) -> Plan {
    day.iter()
        .filter_map(|point| {
            let surplus = point.surplus();
            let deficit = point.deficit();
            if surplus.is_positive() {
                Some((point.timestamp, Intent::charge(surplus.min(ceiling), point.price)))
            } else if deficit.is_positive() && point.price > thresholds.discharge {
                Some((point.timestamp, Intent::discharge(deficit.min(ceiling), point.price)))
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{
        core::{planner::Action, series::tests::at},
        quantity::rate::KilowattHourRate,
    };

    const THRESHOLDS: Thresholds = Thresholds {
        charge: KilowattHourRate::new(0.15),
        discharge: KilowattHourRate::new(0.25),
    };

    fn point(hour: u32, supply: f64, returned: f64, price: f64) -> PricedPoint {
        PricedPoint {
            timestamp: at(25, hour, 0),
            supply: KilowattHours::from(supply),
            returned: KilowattHours::from(returned),
            price: KilowattHourRate::from(price),
        }
    }

    #[test]
    fn test_surplus_is_always_stored() {
        let plan = plan(&[point(12, 1.0, 30.0, 0.01)], KilowattHours::from(12.5), THRESHOLDS);
        let intent = plan[&at(25, 12, 0)];
        assert_eq!(intent.action, Action::Charge);
        assert_abs_diff_eq!(intent.amount.0.0, 12.5);
    }

    #[test]
    fn test_discharge_only_above_threshold() {
        let day = [point(18, 5.0, 0.0, 0.30), point(19, 5.0, 0.0, 0.20)];
        let plan = plan(&day, KilowattHours::from(12.5), THRESHOLDS);
        assert_eq!(plan.len(), 1);
        let intent = plan[&at(25, 18, 0)];
        assert_eq!(intent.action, Action::Discharge);
        assert_abs_diff_eq!(intent.amount.0.0, 5.0);
    }

    #[test]
    fn test_balanced_points_are_idle() {
        let day = [point(10, 2.0, 2.0, 0.50), point(11, 0.0, 0.0, 0.01)];
        assert!(plan(&day, KilowattHours::from(12.5), THRESHOLDS).is_empty());
    }
}
