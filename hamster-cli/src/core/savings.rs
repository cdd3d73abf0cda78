use chrono::NaiveDate;
use serde::Serialize;

use crate::{core::flow::FlowRecord, quantity::cost::Cost};

/// Battery savings within one calendar day.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct DailySavings {
    pub date: NaiveDate,

    /// Grid purchase avoided by discharging stored solar energy.
    pub gross_savings: Cost,

    /// Export income foregone by storing the solar energy.
    pub lost_revenue: Cost,

    /// Gross savings minus the lost revenue.
    pub net_savings: Cost,

    pub grid_arbitrage_savings: Cost,
}

impl DailySavings {
    /// Attributable savings: the lost revenue is already netted in.
    pub fn total(&self) -> Cost {
        self.net_savings + self.grid_arbitrage_savings
    }

    fn is_active(&self) -> bool {
        self.gross_savings != Cost::ZERO
            || self.lost_revenue != Cost::ZERO
            || self.grid_arbitrage_savings != Cost::ZERO
    }
}

/// Roll the ledger up into days, omitting the days without any battery activity.
///
/// The ledger must be chronological.
#[must_use]
pub fn aggregate(ledger: &[FlowRecord]) -> Vec<DailySavings> {
    ledger
        .chunk_by(|lhs, rhs| lhs.date() == rhs.date())
        .filter_map(|records| {
            let date = records.first()?.date();
            let gross_savings: Cost = records.iter().map(|record| record.solar_savings).sum();
            let lost_revenue: Cost = records.iter().map(|record| record.lost_revenue).sum();
            let grid_arbitrage_savings = records.iter().map(|record| record.grid_arbitrage).sum();
            let savings = DailySavings {
                date,
                gross_savings,
                lost_revenue,
                net_savings: gross_savings - lost_revenue,
                grid_arbitrage_savings,
            };
            savings.is_active().then_some(savings)
        })
        .collect()
}

/// Sums over any number of days.
#[must_use]
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::Sum,
)]
pub struct Totals {
    pub gross_savings: Cost,
    pub lost_revenue: Cost,
    pub net_savings: Cost,
    pub grid_arbitrage_savings: Cost,
}

impl Totals {
    pub fn total(&self) -> Cost {
        self.net_savings + self.grid_arbitrage_savings
    }
}

impl From<&DailySavings> for Totals {
    fn from(daily: &DailySavings) -> Self {
        Self {
            gross_savings: daily.gross_savings,
            lost_revenue: daily.lost_revenue,
            net_savings: daily.net_savings,
            grid_arbitrage_savings: daily.grid_arbitrage_savings,
        }
    }
}
