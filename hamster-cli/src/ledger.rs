//! Flow ledger export.

use std::{io::Write, path::Path};

use chrono::NaiveDateTime;
use hamster::{
    core::flow::{ChargeLimit, FlowRecord},
    prelude::*,
    quantity::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate},
};
use serde::Serialize;

/// Flat ledger row, since CSV cannot nest the battery state.
#[derive(Serialize)]
struct LedgerRow {
    timestamp: NaiveDateTime,
    price: KilowattHourRate,
    solar_to_battery: KilowattHours,
    solar_to_grid: KilowattHours,
    grid_to_battery: KilowattHours,
    battery_to_house: KilowattHours,
    battery_to_grid: KilowattHours,
    grid_to_house: KilowattHours,
    battery_to_house_solar: KilowattHours,
    battery_to_house_grid: KilowattHours,
    grid_import: KilowattHours,
    grid_export: KilowattHours,
    battery_level: KilowattHours,
    battery_solar: KilowattHours,
    battery_grid: KilowattHours,
    charge_limit: ChargeLimit,
    solar_savings: Cost,
    lost_revenue: Cost,
    grid_arbitrage: Cost,
}

impl From<&FlowRecord> for LedgerRow {
    fn from(record: &FlowRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            price: record.price,
            solar_to_battery: record.solar_to_battery,
            solar_to_grid: record.solar_to_grid,
            grid_to_battery: record.grid_to_battery,
            battery_to_house: record.battery_to_house,
            battery_to_grid: record.battery_to_grid,
            grid_to_house: record.grid_to_house,
            battery_to_house_solar: record.battery_to_house_solar,
            battery_to_house_grid: record.battery_to_house_grid,
            grid_import: record.grid_import(),
            grid_export: record.grid_export(),
            battery_level: record.battery.level,
            battery_solar: record.battery.solar,
            battery_grid: record.battery.grid,
            charge_limit: record.charge_limit,
            solar_savings: record.solar_savings,
            lost_revenue: record.lost_revenue,
            grid_arbitrage: record.grid_arbitrage,
        }
    }
}

#[instrument(skip_all, fields(path = %path.display()))]
pub fn write(path: &Path, ledger: &[FlowRecord]) -> Result {
    let writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create `{}`", path.display()))?;
    write_to(writer, ledger)?;
    info!(n_records = ledger.len(), "written the ledger");
    Ok(())
}

fn write_to<W: Write>(mut writer: csv::Writer<W>, ledger: &[FlowRecord]) -> Result {
    for record in ledger {
        writer.serialize(LedgerRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}
