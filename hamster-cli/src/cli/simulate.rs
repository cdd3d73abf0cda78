use std::path::PathBuf;

use clap::Parser;
use hamster::{
    core::{interval, series::forward_fill, simulation::Simulation},
    prelude::*,
    quantity::{cost::Cost, rate::KilowattHourRate},
    report::{DailyCost, Grouping, Roi, Summary, daily_costs, regroup},
};
use itertools::Itertools;

use crate::{cli::battery::BatteryArgs, input, ledger, tables::build_savings_table};

#[derive(Parser)]
pub struct SimulateArgs {
    /// Energy readings CSV with the `timestamp,type,value` columns, `type` being `supply` or `return`.
    #[clap(long, env = "READINGS_PATH")]
    pub readings: PathBuf,

    /// Day-ahead prices CSV with the `timestamp,price` columns, in euro per kilowatt-hour.
    #[clap(long, env = "PRICES_PATH")]
    pub prices: PathBuf,

    /// Upsample the prices onto the interval detected in the readings.
    #[clap(long, env = "FORWARD_FILL_PRICES")]
    pub forward_fill_prices: bool,

    /// Network tax per kilowatt-hour drawn from the grid, used for the baseline bill.
    #[clap(long = "network-tax-per-kwh", default_value = "0", env = "NETWORK_TAX_PER_KWH")]
    pub network_tax: KilowattHourRate,

    /// System price per kilowatt-hour of capacity.
    #[clap(long = "system-cost-per-kwh", default_value = "800", env = "SYSTEM_COST_PER_KWH")]
    pub system_cost_per_kwh: KilowattHourRate,

    #[clap(long, default_value = "2000", env = "INSTALLATION_COST")]
    pub installation_cost: Cost,

    #[clap(long, default_value = "10", env = "LIFETIME_YEARS")]
    pub lifetime_years: f64,

    /// Write the detailed flow ledger to this CSV.
    #[clap(long, env = "LEDGER_PATH")]
    pub ledger: Option<PathBuf>,

    #[clap(flatten)]
    pub battery: BatteryArgs,
}

#[instrument(skip_all)]
pub fn simulate(args: &SimulateArgs) -> Result {
    let config = args.battery.config()?;
    let readings = input::read_readings(&args.readings)?;
    let mut quotes = input::read_prices(&args.prices)?;
    info!(n_readings = readings.len(), n_quotes = quotes.len(), "loaded");

    if args.forward_fill_prices {
        let step = interval::detect(readings.iter().map(|reading| reading.timestamp).sorted());
        quotes = forward_fill(&quotes, step)?;
        info!(?step, n_quotes = quotes.len(), "forward-filled the prices");
    }

    let outcome =
        Simulation::builder().config(&config).readings(&readings).quotes(&quotes).run()?;
    if let Some(path) = &args.ledger {
        ledger::write(path, &outcome.ledger)?;
    }

    let (Some(first), Some(last)) = (outcome.points.first(), outcome.points.last()) else {
        warn!("no priced data, nothing to report");
        return Ok(());
    };
    let grouping = Grouping::for_range(first.date(), last.date());
    println!("{}", build_savings_table(&regroup(&outcome.daily, grouping), grouping));

    let totals = outcome.totals();
    let baseline = daily_costs(&outcome.points, args.network_tax).iter().map(DailyCost::total).sum();
    println!("{}", Summary::new(totals, baseline));

    let n_days = u32::try_from((last.date() - first.date()).num_days() + 1)?;
    let roi = Roi::builder()
        .capacity(config.capacity)
        .total(totals.total())
        .n_days(n_days)
        .cost_per_kwh(args.system_cost_per_kwh)
        .installation_cost(args.installation_cost)
        .lifetime_years(args.lifetime_years)
        .build()?;
    println!("{roi}");

    Ok(())
}
