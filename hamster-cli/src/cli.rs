mod battery;
mod simulate;

use clap::{Parser, Subcommand};

pub use self::simulate::simulate;
use crate::cli::simulate::SimulateArgs;

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Replay the readings with a simulated battery and report what it would have saved.
    #[clap(name = "simulate")]
    Simulate(Box<SimulateArgs>),
}
