use std::{
    fmt::{Debug, Display, Formatter},
    ops::Mul,
};

use crate::{Quantity, cost::Cost, energy::KilowattHours};

/// Euro per kilowatt-hour.
pub type KilowattHourRate = Quantity<-1, -1, 1>;

impl Display for KilowattHourRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} €/kWh", self.0)
    }
}

impl Debug for KilowattHourRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}€/kWh", self.0)
    }
}

impl Mul<KilowattHours> for KilowattHourRate {
    type Output = Cost;

    fn mul(self, rhs: KilowattHours) -> Self::Output {
        rhs * self
    }
}
