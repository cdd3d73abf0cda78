use std::fmt::{Display, Formatter};

use bon::bon;
use comfy_table::{Cell, Color, Table, modifiers, presets};

use crate::{
    core::savings::Totals,
    fmt::FormattedPercentage,
    prelude::*,
    quantity::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate},
};

/// Savings over the entire simulated range.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Summary {
    pub totals: Totals,

    /// What the grid supply would have cost without a battery.
    pub baseline: Cost,
}

impl Summary {
    pub const fn new(totals: Totals, baseline: Cost) -> Self {
        Self { totals, baseline }
    }

    /// Savings relative to the baseline bill, zero for a non-positive baseline.
    #[must_use]
    pub fn savings_ratio(&self) -> f64 {
        if self.baseline.is_positive() { (self.totals.total() / self.baseline).0 } else { 0.0 }
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let total = self.totals.total();
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL_CONDENSED)
            .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
            .enforce_styling()
            .set_header(vec![
                "Gross",
                "Lost revenue",
                "Net",
                "Grid arbitrage",
                "Total",
                "Baseline",
                "Saved",
            ])
            .add_row(vec![
                Cell::new(self.totals.gross_savings),
                Cell::new(self.totals.lost_revenue),
                Cell::new(self.totals.net_savings),
                Cell::new(self.totals.grid_arbitrage_savings),
                Cell::new(total).fg(if total >= Cost::ZERO { Color::Green } else { Color::Red }),
                Cell::new(self.baseline),
                Cell::new(FormattedPercentage(self.savings_ratio())),
            ]);
        write!(f, "{table}")
    }
}

/// Return on investment, extrapolated from the simulated range.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Roi {
    pub system_cost: Cost,
    pub monthly_savings: Cost,
    pub yearly_savings: Cost,

    /// Absent when the battery never pays back.
    pub payback_years: Option<f64>,

    pub lifetime_savings: Cost,
    pub roi: f64,
}

#[bon]
impl Roi {
    /// Extrapolate the `total` savings over `n_days` onto a month, a year, and the lifetime.
    ///
    /// The system cost is the price per kilowatt-hour of capacity plus the installation.
    /// Non-finite or negative assumptions are rejected.
    #[builder]
    pub fn new(
        capacity: KilowattHours,
        total: Cost,
        n_days: u32,
        #[builder(default = KilowattHourRate::new(800.0))] cost_per_kwh: KilowattHourRate,
        #[builder(default = Cost::new(2000.0))] installation_cost: Cost,
        #[builder(default = 10.0)] lifetime_years: f64,
    ) -> Result<Self> {
        ensure!(
            lifetime_years.is_finite() && lifetime_years >= 0.0,
            "lifetime must be finite and non-negative, got {lifetime_years}",
        );
        ensure!(
            cost_per_kwh.is_finite() && cost_per_kwh >= KilowattHourRate::ZERO,
            "system cost per kWh must be finite and non-negative, got {cost_per_kwh}",
        );
        ensure!(
            installation_cost.is_finite() && installation_cost >= Cost::ZERO,
            "installation cost must be finite and non-negative, got {installation_cost}",
        );
        ensure!(total.is_finite(), "total savings must be finite, got {total}");

        let system_cost = capacity * cost_per_kwh + installation_cost;
        let monthly_savings =
            if n_days == 0 { Cost::ZERO } else { total * (30.0 / f64::from(n_days)) };
        let yearly_savings = monthly_savings * 12.0;
        let payback_years = yearly_savings.is_positive().then(|| (system_cost / yearly_savings).0);
        let lifetime_savings = yearly_savings * lifetime_years;
        let roi = if system_cost.is_positive() {
            ((lifetime_savings - system_cost) / system_cost).0
        } else {
            0.0
        };
        Ok(Self {
            system_cost,
            monthly_savings,
            yearly_savings,
            payback_years,
            lifetime_savings,
            roi,
        })
    }
}

impl Display for Roi {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL_CONDENSED)
            .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
            .enforce_styling()
            .set_header(vec!["System cost", "Monthly", "Yearly", "Payback", "Lifetime", "ROI"])
            .add_row(vec![
                Cell::new(self.system_cost),
                Cell::new(self.monthly_savings),
                Cell::new(self.yearly_savings),
                match self.payback_years {
                    Some(years) => Cell::new(format!("{years:.1} years")),
                    None => Cell::new("never").fg(Color::Red),
                },
                Cell::new(self.lifetime_savings),
                Cell::new(FormattedPercentage(self.roi)).fg(if self.roi >= 0.0 {
                    Color::Green
                } else {
                    Color::Red
                }),
            ]);
        write!(f, "{table}")
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_savings_ratio() {
        let totals = Totals {
            net_savings: Cost::from(20.0),
            grid_arbitrage_savings: Cost::from(5.0),
            ..Totals::default()
        };
        assert_abs_diff_eq!(Summary::new(totals, Cost::from(100.0)).savings_ratio(), 0.25);
        assert_abs_diff_eq!(Summary::new(totals, Cost::ZERO).savings_ratio(), 0.0);
    }

    #[test]
    fn test_roi() {
        let roi = Roi::builder()
            .capacity(KilowattHours::from(10.0))
            .total(Cost::from(50.0))
            .n_days(15)
            .build()
            .unwrap();
        assert_abs_diff_eq!(roi.system_cost.0.0, 10_000.0);
        assert_abs_diff_eq!(roi.monthly_savings.0.0, 100.0);
        assert_abs_diff_eq!(roi.yearly_savings.0.0, 1200.0);
        assert_abs_diff_eq!(roi.payback_years.unwrap(), 10_000.0 / 1200.0);
        assert_abs_diff_eq!(roi.lifetime_savings.0.0, 12_000.0);
        assert_abs_diff_eq!(roi.roi, 0.2);
    }

    #[test]
    fn test_roi_without_savings() {
        let roi = Roi::builder()
            .capacity(KilowattHours::from(10.0))
            .total(Cost::from(-5.0))
            .n_days(30)
            .build()
            .unwrap();
        assert_eq!(roi.payback_years, None);
        assert!(roi.roi.is_finite());

        let roi = Roi::builder()
            .capacity(KilowattHours::ZERO)
            .total(Cost::ZERO)
            .n_days(0)
            .build()
            .unwrap();
        assert_eq!(roi.monthly_savings, Cost::ZERO);
        assert_eq!(roi.payback_years, None);
        assert!(roi.roi.is_finite());
    }

    #[test]
    fn test_roi_free_system() {
        let roi = Roi::builder()
            .capacity(KilowattHours::ZERO)
            .total(Cost::from(10.0))
            .n_days(30)
            .cost_per_kwh(KilowattHourRate::ZERO)
            .installation_cost(Cost::ZERO)
            .build()
            .unwrap();
        assert_eq!(roi.payback_years, Some(0.0));
        assert_abs_diff_eq!(roi.roi, 0.0);
    }

    #[test]
    fn test_roi_rejects_invalid_lifetime() {
        for lifetime_years in [f64::NAN, f64::INFINITY, -1.0] {
            let result = Roi::builder()
                .capacity(KilowattHours::from(10.0))
                .total(Cost::from(50.0))
                .n_days(30)
                .lifetime_years(lifetime_years)
                .build();
            assert!(result.is_err(), "{lifetime_years}");
        }
    }

    #[test]
    fn test_roi_rejects_invalid_costs() {
        let result = Roi::builder()
            .capacity(KilowattHours::from(10.0))
            .total(Cost::from(50.0))
            .n_days(30)
            .installation_cost(Cost::from(f64::NAN))
            .build();
        assert!(result.is_err());
    }
}
