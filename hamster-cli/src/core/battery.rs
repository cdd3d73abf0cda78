mod config;
mod executor;
mod state;

pub use self::{
    config::{BatteryConfig, InvalidConfig},
    executor::{Executor, Step},
    state::{BatteryState, Source},
};
