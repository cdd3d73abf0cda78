use std::{cmp::Reverse, collections::BTreeMap};

use chrono::NaiveDateTime;
use itertools::{Itertools, iproduct};

use crate::{
    core::{
        battery::BatteryConfig,
        planner::{Intent, Plan},
        series::PricedPoint,
    },
    quantity::{energy::KilowattHours, rate::KilowattHourRate},
};

/// Buy-then-sell candidate.
#[derive(Copy, Clone, Debug)]
struct Trade<'a> {
    buy: &'a PricedPoint,
    sell: &'a PricedPoint,

    /// Profit per delivered kilowatt-hour after the round-trip losses.
    margin: KilowattHourRate,
}

/// Greedily match the cheapest third of the day with the most expensive third.
///
/// Every pair where the purchase happens strictly before the sale and the sale price beats the
/// purchase price corrected on the round-trip losses and the safety factor is a candidate.
/// The candidates are served most profitable first, each taking whatever is left of the
/// per-interval ceiling at both of its timestamps. This is a heuristic, not an optimal matching.
///
/// Charge intents hold the energy to buy, discharge intents hold the energy it should deliver.
pub fn plan(day: &[PricedPoint], config: &BatteryConfig, ceiling: KilowattHours) -> Plan {
    let round_trip = config.round_trip_efficiency();

    let ranked = day.iter().sorted_by_key(|point| (point.price, point.timestamp)).collect_vec();
    let n_candidates = ranked.len().div_ceil(3);
    let (buys, sells) = (&ranked[..n_candidates], &ranked[ranked.len() - n_candidates..]);

    let trades = iproduct!(buys.iter().copied(), sells.iter().copied())
        .filter(|(buy, sell)| {
            buy.timestamp < sell.timestamp
                && sell.price > buy.price / round_trip * config.price_threshold_factor
        })
        .map(|(buy, sell)| Trade { buy, sell, margin: sell.price - buy.price / round_trip })
        .sorted_by_key(|trade| (Reverse(trade.margin), trade.buy.timestamp, trade.sell.timestamp));

    let mut used: BTreeMap<NaiveDateTime, KilowattHours> = BTreeMap::new();
    let mut plan = Plan::new();
    for trade in trades {
        let free = |timestamp: NaiveDateTime| {
            ceiling - used.get(&timestamp).copied().unwrap_or_default()
        };
        let amount = free(trade.buy.timestamp).min(free(trade.sell.timestamp));
        if !amount.is_positive() {
            continue;
        }
        *used.entry(trade.buy.timestamp).or_default() += amount;
        *used.entry(trade.sell.timestamp).or_default() += amount;
        plan.entry(trade.buy.timestamp)
            .or_insert_with(|| Intent::charge(KilowattHours::ZERO, trade.buy.price))
            .amount += amount;
        plan.entry(trade.sell.timestamp)
            .or_insert_with(|| Intent::discharge(KilowattHours::ZERO, trade.sell.price))
            .amount += amount * round_trip;
    }
    plan
}
