use crate::{
    core::{
        battery::{BatteryConfig, BatteryState, Source},
        flow::{ChargeLimit, FlowRecord},
        planner::{Action, Intent},
        series::PricedPoint,
    },
    quantity::energy::KilowattHours,
};

/// State of charge above which the charging rate gets curtailed.
const TAPER_START: f64 = 0.8;

/// Part of the nominal charging rate that is left at full charge.
const TAPER_FLOOR: f64 = 0.2;

/// Outcome of a single timestamp: the state to carry on and the emitted record.
#[must_use]
pub struct Step {
    pub state: BatteryState,
    pub record: FlowRecord,
}

/// Turns the planned intents into physically valid energy flows.
#[must_use]
pub struct Executor<'a> {
    config: &'a BatteryConfig,

    /// Per-interval power ceiling, shared by all charging and by all discharging in an interval.
    ceiling: KilowattHours,
}

impl<'a> Executor<'a> {
    pub const fn new(config: &'a BatteryConfig, ceiling: KilowattHours) -> Self {
        Self { config, ceiling }
    }

    /// Apply the intents at a single timestamp.
    ///
    /// Charging takes the solar surplus first and then the grid purchase. Discharging covers the
    /// house deficit: first with the energy bought for grid arbitrage, drawn from the grid
    /// fraction only, and then with the solar plan, drawn proportionally from both fractions.
    /// Whatever deficit remains is drawn from the grid. Nothing is discharged into the grid.
    pub fn execute(
        &self,
        state: BatteryState,
        point: &PricedPoint,
        solar: Option<Intent>,
        grid: Option<Intent>,
    ) -> Step {
        let is_charge = |intent: &Intent| intent.action == Action::Charge;
        let is_discharge = |intent: &Intent| intent.action == Action::Discharge;

        let mut state = state;
        let mut record = FlowRecord::baseline(point, state);
        let mut charge_budget = self.ceiling;
        let mut discharge_budget = self.ceiling;
        let surplus = point.surplus();
        let mut deficit = point.deficit();

        if let Some(intent) = solar.filter(is_charge)
            && surplus.is_positive()
        {
            let (amount, limit) =
                self.charge_allowance(state, intent.amount.min(charge_budget), surplus);
            state = state.store(Source::Solar, amount * self.config.charging_efficiency);
            charge_budget -= amount;
            record.solar_to_battery = amount;
            record.solar_to_grid = surplus - amount;
            record.lost_revenue = amount * point.price;
            record.charge_limit = limit;
        }

        if let Some(intent) = grid.filter(is_charge) {
            let (amount, limit) =
                self.charge_allowance(state, intent.amount.min(charge_budget), intent.amount);
            if amount.is_positive() {
                state = state.store(Source::Grid, amount * self.config.charging_efficiency);
                record.grid_to_battery = amount;
                record.grid_arbitrage -= amount * point.price;
            }
            if record.charge_limit == ChargeLimit::None {
                record.charge_limit = limit;
            }
        }

        if let Some(intent) = grid.filter(is_discharge)
            && deficit.is_positive()
        {
            let amount = deficit
                .min(intent.amount)
                .min(discharge_budget)
                .min(self.dischargeable(state))
                .min(state.grid * self.config.discharging_efficiency);
            if amount.is_positive() {
                state = state.draw_from(Source::Grid, amount / self.config.discharging_efficiency);
                discharge_budget -= amount;
                deficit = (deficit - amount).positive_part();
                record.battery_to_house += amount;
                record.battery_to_house_grid += amount;
                record.grid_arbitrage += amount * point.price;
            }
        }

        if let Some(intent) = solar.filter(is_discharge)
            && deficit.is_positive()
        {
            let amount =
                deficit.min(intent.amount).min(discharge_budget).min(self.dischargeable(state));
            if amount.is_positive() {
                let solar_share = state.solar_share();
                state = state.draw(amount / self.config.discharging_efficiency);
                deficit = (deficit - amount).positive_part();
                record.battery_to_house += amount;
                record.battery_to_house_solar += amount * solar_share;
                record.battery_to_house_grid += amount * (1.0 - solar_share);
                record.solar_savings = amount * point.price;
            }
        }

        record.grid_to_house = deficit;
        record.battery = state;
        Step { state, record }
    }

    /// Energy that can still be delivered before hitting the minimum level.
    fn dischargeable(&self, state: BatteryState) -> KilowattHours {
        (state.level - self.config.min_level()).positive_part() * self.config.discharging_efficiency
    }

    /// Decide how much of the `available` energy may be charged, and what limited it.
    fn charge_allowance(
        &self,
        state: BatteryState,
        requested: KilowattHours,
        available: KilowattHours,
    ) -> (KilowattHours, ChargeLimit) {
        let mut bound = (requested, ChargeLimit::ChargingRate);
        if let Some(rate) = self.tapered_rate(state)
            && rate < bound.0
        {
            bound = (rate, ChargeLimit::Taper);
        }
        let space =
            (self.config.capacity - state.level).positive_part() / self.config.charging_efficiency;
        if space <= bound.0 {
            bound = (space, ChargeLimit::BatterySpace);
        }
        if available <= bound.0 { (available, ChargeLimit::None) } else { bound }
    }

    /// Charging rate curtailed linearly from 100% at 80% state of charge down to 20% at full.
    fn tapered_rate(&self, state: BatteryState) -> Option<KilowattHours> {
        if !self.config.enable_charge_taper {
            return None;
        }
        let state_of_charge = state.state_of_charge(self.config.capacity);
        (state_of_charge > TAPER_START).then(|| {
            let progress = ((state_of_charge - TAPER_START) / (1.0 - TAPER_START)).min(1.0);
            self.ceiling * (1.0 - (1.0 - TAPER_FLOOR) * progress)
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{
        core::series::tests::at,
        quantity::{cost::Cost, rate::KilowattHourRate},
    };

    fn config() -> BatteryConfig {
        BatteryConfig::builder().build().unwrap()
    }

    fn point(supply: f64, returned: f64, price: f64) -> PricedPoint {
        PricedPoint {
            timestamp: at(25, 12, 0),
            supply: KilowattHours::from(supply),
            returned: KilowattHours::from(returned),
            price: KilowattHourRate::from(price),
        }
    }

    fn state(level: f64, solar: f64) -> BatteryState {
        BatteryState {
            level: KilowattHours::from(level),
            solar: KilowattHours::from(solar),
            grid: KilowattHours::from(level - solar),
        }
    }

    #[test]
    fn test_no_plan_is_the_baseline() {
        let config = config();
        let executor = Executor::new(&config, KilowattHours::from(12.5));
        let initial = BatteryState::initial(&config);

        let step = executor.execute(initial, &point(1.0, 4.0, 0.1), None, None);
        assert_eq!(step.state, initial);
        assert_abs_diff_eq!(step.record.solar_to_grid.0.0, 3.0);
        assert_eq!(step.record.solar_to_battery, KilowattHours::ZERO);
        assert_eq!(step.record.lost_revenue, Cost::ZERO);

        let step = executor.execute(initial, &point(4.0, 1.0, 0.1), None, None);
        assert_abs_diff_eq!(step.record.grid_to_house.0.0, 3.0);
        assert_eq!(step.record.battery_to_house, KilowattHours::ZERO);
    }

    #[test]
    fn test_solar_charge_capped_by_rate() {
        let config = config();
        let executor = Executor::new(&config, KilowattHours::from(12.5));
        let intent = Intent::charge(KilowattHours::from(12.5), KilowattHourRate::from(0.1));

        let step =
            executor.execute(BatteryState::initial(&config), &point(0.0, 50.0, 0.1), Some(intent), None);
        let record = step.record;
        assert_abs_diff_eq!(record.solar_to_battery.0.0, 12.5);
        assert_abs_diff_eq!(record.solar_to_grid.0.0, 37.5);
        assert_abs_diff_eq!(record.lost_revenue.0.0, 1.25);
        assert_eq!(record.charge_limit, ChargeLimit::ChargingRate);
        assert_abs_diff_eq!(step.state.level.0.0, 10.0 + 12.5 * 0.95);
        assert_abs_diff_eq!(step.state.solar.0.0, step.state.level.0.0);
    }

    #[test]
    fn test_solar_charge_capped_by_space() {
        let config = BatteryConfig::builder().enable_charge_taper(false).build().unwrap();
        let executor = Executor::new(&config, KilowattHours::from(12.5));
        let intent = Intent::charge(KilowattHours::from(12.5), KilowattHourRate::from(0.1));

        let step = executor.execute(state(99.05, 99.05), &point(0.0, 12.5, 0.1), Some(intent), None);
        assert_abs_diff_eq!(step.record.solar_to_battery.0.0, 1.0, epsilon = 1e-9);
        assert_eq!(step.record.charge_limit, ChargeLimit::BatterySpace);
        assert_abs_diff_eq!(step.state.level.0.0, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_solar_charge_tapers_near_full() {
        let config = config();
        let executor = Executor::new(&config, KilowattHours::from(12.5));
        let intent = Intent::charge(KilowattHours::from(12.5), KilowattHourRate::from(0.1));

        // At 90% the rate is curtailed to 60% of the ceiling:
        let step = executor.execute(state(90.0, 90.0), &point(0.0, 12.5, 0.1), Some(intent), None);
        assert_abs_diff_eq!(step.record.solar_to_battery.0.0, 7.5, epsilon = 1e-9);
        assert_eq!(step.record.charge_limit, ChargeLimit::Taper);
    }

    #[test]
    fn test_small_surplus_is_not_limited() {
        let config = config();
        let executor = Executor::new(&config, KilowattHours::from(12.5));
        let intent = Intent::charge(KilowattHours::from(2.0), KilowattHourRate::from(0.1));

        let step =
            executor.execute(BatteryState::initial(&config), &point(1.0, 3.0, 0.1), Some(intent), None);
        assert_abs_diff_eq!(step.record.solar_to_battery.0.0, 2.0);
        assert_eq!(step.record.solar_to_grid, KilowattHours::ZERO);
        assert_eq!(step.record.charge_limit, ChargeLimit::None);
    }

    #[test]
    fn test_solar_discharge_stops_at_min_level() {
        let config = config();
        let executor = Executor::new(&config, KilowattHours::from(12.5));
        let intent = Intent::discharge(KilowattHours::from(12.5), KilowattHourRate::from(0.3));

        let step = executor.execute(state(15.0, 15.0), &point(20.0, 0.0, 0.3), Some(intent), None);
        let record = step.record;
        assert_abs_diff_eq!(record.battery_to_house.0.0, 5.0 * 0.95, epsilon = 1e-9);
        assert_abs_diff_eq!(record.grid_to_house.0.0, 20.0 - 5.0 * 0.95, epsilon = 1e-9);
        assert_abs_diff_eq!(record.solar_savings.0.0, 5.0 * 0.95 * 0.3, epsilon = 1e-9);
        assert_abs_diff_eq!(step.state.level.0.0, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_grid_charge_is_attributed_to_grid() {
        let config = config();
        let executor = Executor::new(&config, KilowattHours::from(12.5));
        let intent = Intent::charge(KilowattHours::from(10.0), KilowattHourRate::from(0.05));

        let step =
            executor.execute(BatteryState::initial(&config), &point(1.0, 0.0, 0.05), None, Some(intent));
        let record = step.record;
        assert_abs_diff_eq!(record.grid_to_battery.0.0, 10.0);
        assert_abs_diff_eq!(record.grid_to_house.0.0, 1.0);
        assert_abs_diff_eq!(record.grid_import().0.0, 11.0);
        assert_abs_diff_eq!(record.grid_arbitrage.0.0, -0.5);
        assert_abs_diff_eq!(step.state.grid.0.0, 9.5);
        assert_abs_diff_eq!(step.state.solar.0.0, 10.0);
    }

    #[test]
    fn test_grid_discharge_covers_only_the_deficit() {
        let config = config();
        let executor = Executor::new(&config, KilowattHours::from(12.5));
        let intent = Intent::discharge(KilowattHours::from(9.5), KilowattHourRate::from(0.25));

        let step = executor.execute(state(30.0, 10.0), &point(4.0, 0.0, 0.25), None, Some(intent));
        let record = step.record;
        assert_abs_diff_eq!(record.battery_to_house.0.0, 4.0);
        assert_eq!(record.battery_to_grid, KilowattHours::ZERO);
        assert_eq!(record.grid_to_house, KilowattHours::ZERO);
        assert_abs_diff_eq!(record.grid_arbitrage.0.0, 4.0 * 0.25);
        assert_eq!(record.battery_to_house_solar, KilowattHours::ZERO);
        assert_abs_diff_eq!(record.battery_to_house_grid.0.0, 4.0);
        assert_abs_diff_eq!(step.state.solar.0.0, 10.0);
        assert_abs_diff_eq!(step.state.grid.0.0, 20.0 - 4.0 / 0.95, epsilon = 1e-9);
        assert_abs_diff_eq!(
            (step.state.solar + step.state.grid).0.0,
            step.state.level.0.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_grid_discharge_is_limited_to_grid_content() {
        let config = config();
        let executor = Executor::new(&config, KilowattHours::from(12.5));
        let price = KilowattHourRate::from(0.25);
        let grid = Intent::discharge(KilowattHours::from(19.0), price);
        let solar = Intent::discharge(KilowattHours::from(20.0), price);

        let step =
            executor.execute(state(30.0, 25.0), &point(20.0, 0.0, 0.25), Some(solar), Some(grid));
        let record = step.record;

        // Only 5 kWh was bought, the rest of the ceiling goes to the solar plan:
        assert_abs_diff_eq!(record.battery_to_house_grid.0.0, 4.75, epsilon = 1e-9);
        assert_abs_diff_eq!(record.battery_to_house_solar.0.0, 7.75, epsilon = 1e-9);
        assert_abs_diff_eq!(record.battery_to_house.0.0, 12.5, epsilon = 1e-9);
        assert_abs_diff_eq!(record.grid_to_house.0.0, 7.5, epsilon = 1e-9);
        assert_abs_diff_eq!(record.grid_arbitrage.0.0, 4.75 * 0.25, epsilon = 1e-9);
        assert_abs_diff_eq!(record.solar_savings.0.0, 7.75 * 0.25, epsilon = 1e-9);
        assert_abs_diff_eq!(step.state.grid.0.0, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_curtailed_grid_purchase_limits_the_sale() {
        let config = BatteryConfig::builder().enable_charge_taper(false).build().unwrap();
        let executor = Executor::new(&config, KilowattHours::from(12.5));

        let buy = Intent::charge(KilowattHours::from(10.0), KilowattHourRate::from(0.05));
        let step =
            executor.execute(state(95.0, 95.0), &point(0.0, 0.0, 0.05), None, Some(buy));
        assert_eq!(step.record.charge_limit, ChargeLimit::BatterySpace);
        assert_abs_diff_eq!(step.record.grid_to_battery.0.0, 5.0 / 0.95, epsilon = 1e-9);
        assert_abs_diff_eq!(step.state.grid.0.0, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(step.state.level.0.0, 100.0, epsilon = 1e-9);

        let sell = Intent::discharge(KilowattHours::from(10.0 * 0.9025), KilowattHourRate::from(0.25));
        let step = executor.execute(step.state, &point(20.0, 0.0, 0.25), None, Some(sell));
        let record = step.record;
        assert_abs_diff_eq!(record.battery_to_house.0.0, 4.75, epsilon = 1e-9);
        assert_abs_diff_eq!(record.battery_to_house_grid.0.0, 4.75, epsilon = 1e-9);
        assert_abs_diff_eq!(record.grid_arbitrage.0.0, 4.75 * 0.25, epsilon = 1e-9);
        assert_abs_diff_eq!(record.grid_to_house.0.0, 15.25, epsilon = 1e-9);
        assert_abs_diff_eq!(step.state.solar.0.0, 95.0, epsilon = 1e-9);
        assert_abs_diff_eq!(step.state.grid.0.0, 0.0, epsilon = 1e-9);
    }
}
