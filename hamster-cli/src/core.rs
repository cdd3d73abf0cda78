pub mod battery;
pub mod flow;
pub mod interval;
pub mod planner;
pub mod reading;
pub mod savings;
pub mod series;
pub mod simulation;
