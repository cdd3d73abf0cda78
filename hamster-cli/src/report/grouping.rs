use std::fmt::{Display, Formatter};

use chrono::{Datelike, NaiveDate, Weekday};

use crate::{core::savings::DailySavings, quantity::cost::Cost};

/// Reporting period.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Grouping {
    Day,

    /// ISO week, starting on Monday.
    Week,

    Month,
}

impl Grouping {
    /// Pick the period so that the report stays readable for the date range.
    pub fn for_range(start: NaiveDate, end: NaiveDate) -> Self {
        match (end - start).num_days() + 1 {
            ..=30 => Self::Day,
            31..=90 => Self::Week,
            _ => Self::Month,
        }
    }

    /// First date of the period containing the `date`.
    #[must_use]
    pub fn period_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => date,
            Self::Week => date.week(Weekday::Mon).first_day(),
            Self::Month => date.with_day(1).unwrap_or(date),
        }
    }
}

impl Display for Grouping {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Day => write!(f, "Day"),
            Self::Week => write!(f, "Week"),
            Self::Month => write!(f, "Month"),
        }
    }
}

/// Sum the chronological daily rows into periods, keyed by the period start.
#[must_use]
pub fn regroup(daily: &[DailySavings], grouping: Grouping) -> Vec<DailySavings> {
    daily
        .chunk_by(|lhs, rhs| grouping.period_start(lhs.date) == grouping.period_start(rhs.date))
        .map(|rows| {
            let sum = |field: fn(&DailySavings) -> Cost| rows.iter().map(field).sum::<Cost>();
            DailySavings {
                date: grouping.period_start(rows[0].date),
                gross_savings: sum(|row| row.gross_savings),
                lost_revenue: sum(|row| row.lost_revenue),
                net_savings: sum(|row| row.net_savings),
                grid_arbitrage_savings: sum(|row| row.grid_arbitrage_savings),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn savings(month: u32, day: u32, net: f64) -> DailySavings {
        DailySavings {
            date: date(month, day),
            gross_savings: Cost::from(net + 1.0),
            lost_revenue: Cost::from(1.0),
            net_savings: Cost::from(net),
            grid_arbitrage_savings: Cost::from(0.5),
        }
    }

    #[test]
    fn test_for_range() {
        assert_eq!(Grouping::for_range(date(1, 1), date(1, 30)), Grouping::Day);
        assert_eq!(Grouping::for_range(date(1, 1), date(1, 31)), Grouping::Week);
        assert_eq!(Grouping::for_range(date(1, 1), date(3, 30)), Grouping::Week);
        assert_eq!(Grouping::for_range(date(1, 1), date(3, 31)), Grouping::Month);
    }

    #[test]
    fn test_period_start() {
        // 2024-02-29 is a Thursday:
        assert_eq!(Grouping::Week.period_start(date(2, 29)), date(2, 26));
        assert_eq!(Grouping::Week.period_start(date(2, 26)), date(2, 26));
        assert_eq!(Grouping::Month.period_start(date(2, 29)), date(2, 1));
        assert_eq!(Grouping::Day.period_start(date(2, 29)), date(2, 29));
    }

    #[test]
    fn test_regroup_weeks() {
        let daily = [savings(2, 26, 1.0), savings(2, 29, 2.0), savings(3, 4, 3.0)];
        let weekly = regroup(&daily, Grouping::Week);
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly[0].date, date(2, 26));
        assert_abs_diff_eq!(weekly[0].net_savings.0.0, 3.0);
        assert_abs_diff_eq!(weekly[0].gross_savings.0.0, 5.0);
        assert_abs_diff_eq!(weekly[0].total().0.0, 4.0);
        assert_eq!(weekly[1].date, date(3, 4));
    }

    #[test]
    fn test_regroup_days_is_identity() {
        let daily = [savings(2, 26, 1.0), savings(2, 27, 2.0)];
        assert_eq!(regroup(&daily, Grouping::Day), daily);
    }
}
