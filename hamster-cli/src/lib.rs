//! Estimate the value of a home battery on top of an existing solar installation.
//!
//! Given metered grid supply and solar return along with day-ahead prices, the engine replays
//! every day with a simulated battery, planning solar storage and grid arbitrage per day and
//! carrying the battery state across day boundaries.

#![allow(clippy::doc_markdown)]

pub mod core;
pub mod fmt;
pub mod prelude;
pub mod report;

pub use hamster_quantities as quantity;
