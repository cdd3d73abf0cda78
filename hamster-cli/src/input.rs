//! CSV inputs.

use std::path::Path;

use chrono::NaiveDateTime;
use hamster::{
    core::reading::{EnergyReading, PriceQuote, ReadingKind},
    prelude::*,
    quantity::{energy::KilowattHours, rate::KilowattHourRate},
};
use serde::{Deserialize, Deserializer, de};

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Deserialize)]
struct ReadingRow {
    #[serde(deserialize_with = "deserialize_timestamp")]
    timestamp: NaiveDateTime,

    #[serde(rename = "type")]
    kind: ReadingKind,

    value: KilowattHours,
}

#[derive(Deserialize)]
struct PriceRow {
    #[serde(deserialize_with = "deserialize_timestamp")]
    timestamp: NaiveDateTime,

    /// Empty or malformed prices are missing prices, not errors.
    #[serde(deserialize_with = "csv::invalid_option")]
    price: Option<KilowattHourRate>,
}

/// Read the `timestamp,type,value` energy readings.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_readings(path: &Path) -> Result<Vec<EnergyReading>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open `{}`", path.display()))?;
    parse_readings(&mut reader)
}

/// Read the `timestamp,price` quotes, skipping the ones without a usable price.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_prices(path: &Path) -> Result<Vec<PriceQuote>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open `{}`", path.display()))?;
    parse_prices(&mut reader)
}

fn parse_readings<R: std::io::Read>(reader: &mut csv::Reader<R>) -> Result<Vec<EnergyReading>> {
    reader
        .deserialize()
        .map(|row| {
            let row: ReadingRow = row.context("failed to read an energy reading")?;
            Ok(EnergyReading::new(row.timestamp, row.kind, row.value))
        })
        .collect()
}

fn parse_prices<R: std::io::Read>(reader: &mut csv::Reader<R>) -> Result<Vec<PriceQuote>> {
    let mut n_skipped = 0_usize;
    let mut quotes = Vec::new();
    for row in reader.deserialize() {
        let row: PriceRow = row.context("failed to read a price quote")?;
        match row.price {
            Some(price) => quotes.push(PriceQuote::new(row.timestamp, price)),
            None => n_skipped += 1,
        }
    }
    if n_skipped != 0 {
        warn!(n_skipped, "skipped rows without a price");
    }
    Ok(quotes)
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<NaiveDateTime, D::Error> {
    let text = String::deserialize(deserializer)?;
    parse_timestamp(text.trim())
        .ok_or_else(|| de::Error::custom(format!("unsupported timestamp: `{text}`")))
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}
