use bon::Builder;
use chrono::TimeDelta;

use crate::{
    core::{
        battery::{BatteryConfig, BatteryState, Executor, Step},
        flow::FlowRecord,
        interval,
        planner::Planner,
        reading::{EnergyReading, PriceQuote},
        savings::{DailySavings, Totals, aggregate},
        series::{self, PricedPoint},
    },
    prelude::*,
};

/// Replays the readings with a simulated battery.
#[derive(Builder)]
#[builder(finish_fn(vis = ""))]
pub struct Simulation<'a> {
    config: &'a BatteryConfig,
    readings: &'a [EnergyReading],
    quotes: &'a [PriceQuote],
}

impl<S: simulation_builder::IsComplete> SimulationBuilder<'_, S> {
    pub fn run(self) -> Result<Outcome> {
        self.build().run()
    }
}

/// Everything the simulation produced.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    /// Detected sampling interval.
    pub interval: TimeDelta,

    /// Aligned input with a known price, chronologically.
    pub points: Vec<PricedPoint>,

    /// One record per priced timestamp, chronologically.
    pub ledger: Vec<FlowRecord>,

    /// Days with battery activity.
    pub daily: Vec<DailySavings>,
}

impl Outcome {
    pub fn totals(&self) -> Totals {
        self.daily.iter().map(Totals::from).sum()
    }
}

impl Simulation<'_> {
    #[instrument(skip_all)]
    fn run(self) -> Result<Outcome> {
        let points = series::align(self.readings, self.quotes)?;
        let interval = interval::detect(points.iter().map(|point| point.timestamp));
        info!(n_points = points.len(), ?interval, "aligned");
        let points = series::priced(points);

        if !self.config.is_arbitrage_enabled() {
            warn!("both solar and grid arbitrage are disabled, nothing to simulate");
            return Ok(Outcome { interval, points, ledger: Vec::new(), daily: Vec::new() });
        }
        let ceiling = self.config.power_ceiling(interval);
        debug!(%ceiling, "power ceiling per interval");

        let planner = Planner::new(self.config, ceiling);
        let executor = Executor::new(self.config, ceiling);
        let mut state = BatteryState::initial(self.config);
        let mut ledger = Vec::with_capacity(points.len());

        for (date, day) in series::days(&points) {
            let plan = planner.plan(day);
            debug!(%date, n_solar = plan.solar.len(), n_grid = plan.grid.len(), "planned");
            for point in day {
                let (solar, grid) = plan.intents(point.timestamp);
                let Step { state: next_state, record } = executor.execute(state, point, solar, grid);
                state = next_state;
                ledger.push(record);
            }
        }

        let daily = aggregate(&ledger);
        let outcome = Outcome { interval, points, ledger, daily };
        let totals = outcome.totals();
        info!(
            n_days = outcome.daily.len(),
            net_savings = %totals.net_savings,
            grid_arbitrage = %totals.grid_arbitrage_savings,
            total = %totals.total(),
            "simulated",
        );
        Ok(outcome)
    }
}
