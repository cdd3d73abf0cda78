#![allow(clippy::doc_markdown)]

mod cli;
mod input;
mod ledger;
mod tables;

use clap::{Parser, crate_version};
use hamster::prelude::*;

use crate::cli::{Args, Command, simulate};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();

    match args.command {
        Command::Simulate(args) => {
            simulate(&args)?;
        }
    }

    info!("done!");
    Ok(())
}
