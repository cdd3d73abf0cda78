pub mod cost;
pub mod energy;
pub mod power;
pub mod rate;

use std::ops::{Div, Mul};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

#[derive(
    Clone,
    Copy,
    Default,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Neg,
    derive_more::Sub,
    derive_more::SubAssign,
    derive_more::Sum,
)]
#[from(f64, OrderedFloat<f64>)]
#[serde(transparent)]
#[must_use]
pub struct Quantity<const POWER: isize, const TIME: isize, const COST: isize>(
    pub OrderedFloat<f64>,
);

impl<const POWER: isize, const TIME: isize, const COST: isize> Quantity<POWER, TIME, COST> {
    pub const ZERO: Self = Self(OrderedFloat(0.0));

    pub const fn new(value: f64) -> Self {
        Self(OrderedFloat(value))
    }

    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.0.0.is_finite()
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0.0 > 0.0
    }

    /// Clamp at zero from below.
    pub fn positive_part(self) -> Self {
        self.max(Self::ZERO)
    }
}

impl<const POWER: isize, const TIME: isize, const COST: isize> Mul<f64>
    for Quantity<POWER, TIME, COST>
{
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl<const POWER: isize, const TIME: isize, const COST: isize> Div<f64>
    for Quantity<POWER, TIME, COST>
{
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        Self(self.0 / rhs)
    }
}

impl<const POWER: isize, const TIME: isize, const COST: isize> Div<Self>
    for Quantity<POWER, TIME, COST>
{
    type Output = OrderedFloat<f64>;

    fn div(self, rhs: Self) -> Self::Output {
        self.0 / rhs.0
    }
}
