//! Reading CLI commands and the consumption report

use anyhow::{bail, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::Subcommand;

use super::meter_cmd::resolve_meter;
use super::output::Output;
use crate::domain::{Consumption, Reading, ReadingId};
use crate::storage::MeterStore;

#[derive(Subcommand)]
pub enum ReadingCommands {
    /// Record a reading for a meter
    Add {
        /// Meter id or name
        meter: String,

        /// Dial value in kWh
        value: i64,

        /// When the reading was taken (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS,
        /// defaults to now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Change a reading's value or timestamp
    Edit {
        /// Meter id or name
        meter: String,

        /// Reading id
        id: ReadingId,

        /// New dial value in kWh
        #[arg(long)]
        value: Option<i64>,

        /// New timestamp
        #[arg(long)]
        at: Option<String>,
    },

    /// Delete a reading
    Rm {
        /// Meter id or name
        meter: String,

        /// Reading id
        id: ReadingId,
    },
}

pub fn run(cmd: ReadingCommands, store: &mut MeterStore, output: &Output) -> Result<()> {
    match cmd {
        ReadingCommands::Add { meter, value, at } => add_reading(store, output, &meter, value, at.as_deref()),
        ReadingCommands::Edit { meter, id, value, at } => {
            edit_reading(store, output, &meter, id, value, at.as_deref())
        }
        ReadingCommands::Rm { meter, id } => remove_reading(store, output, &meter, id),
    }
}

fn add_reading(
    store: &mut MeterStore,
    output: &Output,
    meter_key: &str,
    value: i64,
    at: Option<&str>,
) -> Result<()> {
    let mut meter = resolve_meter(store, meter_key)?;

    let taken_at = match at {
        Some(raw) => parse_taken_at(raw)?,
        None => chrono::Local::now().naive_local(),
    };

    meter.add_reading(Reading::new(value, taken_at)?);
    let merged = store.merge(&meter)?;

    // Fresh ids live on the returned instance only
    let recorded = merged.latest_reading()?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": recorded.id,
            "meter_id": merged.id,
            "value": recorded.value,
            "taken_at": recorded.taken_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }));
    } else {
        output.success(&format!(
            "Recorded reading #{} for {}: {} kWh at {}",
            recorded.id.map(|id| id.to_string()).unwrap_or_default(),
            merged.name,
            recorded.value,
            recorded.taken_at.format("%Y-%m-%d %H:%M")
        ));
    }

    Ok(())
}

fn edit_reading(
    store: &mut MeterStore,
    output: &Output,
    meter_key: &str,
    id: ReadingId,
    value: Option<i64>,
    at: Option<&str>,
) -> Result<()> {
    if value.is_none() && at.is_none() {
        bail!("Nothing to change: pass --value and/or --at");
    }

    let mut meter = resolve_meter(store, meter_key)?;
    let taken_at = at.map(parse_taken_at).transpose()?;

    let Some(reading) = meter.readings.iter_mut().find(|r| r.id == Some(id)) else {
        bail!("No reading #{} on meter '{}'", id, meter.name);
    };
    if let Some(value) = value {
        reading.value = value;
    }
    if let Some(taken_at) = taken_at {
        reading.taken_at = taken_at;
    }

    store.merge(&meter)?;
    output.success(&format!("Updated reading #{} on {}", id, meter.name));

    Ok(())
}

fn remove_reading(store: &mut MeterStore, output: &Output, meter_key: &str, id: ReadingId) -> Result<()> {
    let mut meter = resolve_meter(store, meter_key)?;

    let Some(reading) = meter.readings.iter().find(|r| r.id == Some(id)).cloned() else {
        bail!("No reading #{} on meter '{}'", id, meter.name);
    };

    // Detach, then upsert: the store drops the row as orphan removal
    meter.remove_reading(&reading);
    store.merge(&meter)?;

    output.success(&format!("Removed reading #{} from {}", id, meter.name));
    Ok(())
}

/// Shows consumption and cost for a reading (the latest one by default)
pub fn consumption(
    store: &MeterStore,
    output: &Output,
    meter_key: &str,
    reading_id: Option<ReadingId>,
) -> Result<()> {
    let meter = resolve_meter(store, meter_key)?;

    let reading = match reading_id {
        Some(id) => match meter.readings.iter().find(|r| r.id == Some(id)) {
            Some(reading) => reading,
            None => bail!("No reading #{} on meter '{}'", id, meter.name),
        },
        None => meter.latest_reading()?,
    };

    let previous = meter.previous_reading(reading);
    let derived = Consumption::compute(&meter, reading);

    if output.is_json() {
        output.data(&serde_json::json!({
            "meter_id": meter.id,
            "reading_id": reading.id,
            "previous_id": previous.id,
            "delta": derived.delta,
            "unit_price": derived.unit_price,
            "cost": derived.cost,
        }));
        return Ok(());
    }

    println!("Meter:       {} ({} ct/kWh)", meter.name, meter.unit_price);
    println!("Reading:     {}", reading_line(reading));
    println!("Previous:    {}", reading_line(previous));
    println!("Consumption: {} kWh", derived.delta);
    println!("Unit price:  {:.2}", derived.unit_price);
    println!("Cost:        {:.2}", derived.cost);

    Ok(())
}

fn reading_line(reading: &Reading) -> String {
    format!(
        "#{}  {}  {} kWh",
        reading.id.map(|id| id.to_string()).unwrap_or_default(),
        reading.taken_at.format("%Y-%m-%d %H:%M"),
        reading.value
    )
}

fn parse_taken_at(raw: &str) -> Result<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    bail!("Invalid timestamp '{}': expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS", raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_timestamps() {
        let dt = parse_taken_at("2023-01-02T10:30:00").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2023-01-02 10:30:00");

        let dt = parse_taken_at("2023-01-02 10:30:00").unwrap();
        assert_eq!(dt.format("%H:%M").to_string(), "10:30");
    }

    #[test]
    fn date_only_means_midnight() {
        let dt = parse_taken_at("2023-01-02").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2023-01-02 00:00:00");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_taken_at("yesterday").is_err());
        assert!(parse_taken_at("2023-13-45").is_err());
    }
}
