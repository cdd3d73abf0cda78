//! Reporting on top of the simulation: baseline bills, period roll-ups, the summary and ROI.

mod cost;
mod grouping;
mod summary;

pub use self::{
    cost::{DailyCost, daily_costs},
    grouping::{Grouping, regroup},
    summary::{Roi, Summary},
};
