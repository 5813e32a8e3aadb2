//! Meter CLI commands

use anyhow::{bail, Result};
use clap::Subcommand;

use super::output::Output;
use crate::domain::{Meter, MeterId};
use crate::storage::MeterStore;

#[derive(Subcommand)]
pub enum MeterCommands {
    /// Add a meter
    Add {
        /// Display name
        name: String,

        /// Price per kWh in cents
        #[arg(long)]
        price: f64,
    },

    /// List meters
    List,

    /// Show one meter with its reading history
    Show {
        /// Meter id or name
        meter: String,
    },

    /// Change a meter's name or unit price
    Edit {
        /// Meter id or name
        meter: String,

        /// New display name
        #[arg(long)]
        name: Option<String>,

        /// New price per kWh in cents
        #[arg(long)]
        price: Option<f64>,
    },

    /// Delete a meter and every reading it owns
    Rm {
        /// Meter id or name
        meter: String,

        /// Delete even when readings are attached
        #[arg(long)]
        force: bool,
    },
}

pub fn run(cmd: MeterCommands, store: &mut MeterStore, output: &Output) -> Result<()> {
    match cmd {
        MeterCommands::Add { name, price } => add_meter(store, output, &name, price),
        MeterCommands::List => list_meters(store, output),
        MeterCommands::Show { meter } => show_meter(store, output, &meter),
        MeterCommands::Edit { meter, name, price } => edit_meter(store, output, &meter, name, price),
        MeterCommands::Rm { meter, force } => remove_meter(store, output, &meter, force),
    }
}

/// Resolves a meter argument: a numeric id first, then an exact name
pub(crate) fn resolve_meter(store: &MeterStore, key: &str) -> Result<Meter> {
    let meters = store.find_all()?;

    if let Ok(id) = key.parse::<MeterId>() {
        if let Some(meter) = meters.iter().find(|m| m.id == Some(id)) {
            return Ok(meter.clone());
        }
    }

    let mut named: Vec<&Meter> = meters.iter().filter(|m| m.name == key).collect();
    match named.len() {
        0 => bail!("No meter matches '{}' (see 'wattlog meter list')", key),
        1 => Ok(named.remove(0).clone()),
        n => bail!("'{}' is ambiguous: {} meters share that name, use the id instead", key, n),
    }
}

fn add_meter(store: &mut MeterStore, output: &Output, name: &str, price: f64) -> Result<()> {
    let meter = Meter::new(name, price)?;
    let merged = store.merge(&meter)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": merged.id,
            "name": merged.name,
            "unit_price": merged.unit_price,
        }));
    } else {
        output.success(&format!(
            "Created meter {}: {} ({} ct/kWh)",
            id_str(&merged),
            merged.name,
            merged.unit_price
        ));
    }

    Ok(())
}

fn list_meters(store: &MeterStore, output: &Output) -> Result<()> {
    let meters = store.find_all()?;

    if output.is_json() {
        let items: Vec<_> = meters
            .iter()
            .map(|m| {
                serde_json::json!({
                    "id": m.id,
                    "name": m.name,
                    "unit_price": m.unit_price,
                    "readings": m.readings.len(),
                })
            })
            .collect();
        output.data(&items);
        return Ok(());
    }

    if meters.is_empty() {
        output.success("No meters yet. Add one with 'wattlog meter add <name> --price <cents>'.");
        return Ok(());
    }

    for meter in &meters {
        println!(
            "{}\t{}\t{} ct/kWh\t{} reading(s)",
            id_str(meter),
            meter.name,
            meter.unit_price,
            meter.readings.len()
        );
    }

    Ok(())
}

fn show_meter(store: &MeterStore, output: &Output, key: &str) -> Result<()> {
    let meter = resolve_meter(store, key)?;

    if output.is_json() {
        output.data(&meter);
        return Ok(());
    }

    println!("{} ({} ct/kWh)", meter.name, meter.unit_price);
    if meter.readings.is_empty() {
        println!("  no readings");
    }
    for reading in &meter.readings {
        println!(
            "  #{}\t{}\t{} kWh",
            reading.id.map(|id| id.to_string()).unwrap_or_default(),
            reading.taken_at.format("%Y-%m-%d %H:%M"),
            reading.value
        );
    }

    Ok(())
}

fn edit_meter(
    store: &mut MeterStore,
    output: &Output,
    key: &str,
    name: Option<String>,
    price: Option<f64>,
) -> Result<()> {
    if name.is_none() && price.is_none() {
        bail!("Nothing to change: pass --name and/or --price");
    }

    let mut meter = resolve_meter(store, key)?;
    if let Some(name) = name {
        meter.name = name;
    }
    if let Some(price) = price {
        meter.unit_price = price;
    }

    let merged = store.merge(&meter)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": merged.id,
            "name": merged.name,
            "unit_price": merged.unit_price,
        }));
    } else {
        output.success(&format!(
            "Updated meter {}: {} ({} ct/kWh)",
            id_str(&merged),
            merged.name,
            merged.unit_price
        ));
    }

    Ok(())
}

fn remove_meter(store: &mut MeterStore, output: &Output, key: &str, force: bool) -> Result<()> {
    let meter = resolve_meter(store, key)?;

    if !force && !meter.readings.is_empty() {
        bail!(
            "Meter '{}' still owns {} reading(s); pass --force to delete them too",
            meter.name,
            meter.readings.len()
        );
    }

    store.delete(&meter)?;
    output.success(&format!("Deleted meter {} and its readings", meter.name));

    Ok(())
}

fn id_str(meter: &Meter) -> String {
    meter.id.map(|id| id.to_string()).unwrap_or_default()
}
