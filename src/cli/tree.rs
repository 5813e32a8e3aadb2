//! Overview of all meters with their readings
//!
//! Rendered over a tagged node type so every row is resolved by explicit
//! variant matching.

use anyhow::Result;

use super::output::Output;
use crate::domain::{Consumption, Meter, Reading};
use crate::storage::MeterStore;

/// One row of the rendered overview
enum TreeNode<'a> {
    Meter(&'a Meter),
    Reading { meter: &'a Meter, reading: &'a Reading },
}

pub fn show(store: &MeterStore, output: &Output) -> Result<()> {
    let meters = store.find_all()?;

    if output.is_json() {
        let items: Vec<_> = meters
            .iter()
            .map(|meter| {
                serde_json::json!({
                    "id": meter.id,
                    "name": meter.name,
                    "unit_price": meter.unit_price,
                    "readings": meter
                        .readings
                        .iter()
                        .map(|reading| {
                            let derived = Consumption::compute(meter, reading);
                            serde_json::json!({
                                "id": reading.id,
                                "value": reading.value,
                                "taken_at": reading.taken_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
                                "delta": derived.delta,
                                "cost": derived.cost,
                            })
                        })
                        .collect::<Vec<_>>(),
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

    let mut nodes = Vec::new();
    for meter in &meters {
        nodes.push(TreeNode::Meter(meter));
        for reading in &meter.readings {
            nodes.push(TreeNode::Reading { meter, reading });
        }
    }

    for node in nodes {
        match node {
            TreeNode::Meter(meter) => {
                println!(
                    "{} {} ({} ct/kWh)",
                    meter.id.map(|id| id.to_string()).unwrap_or_default(),
                    meter.name,
                    meter.unit_price
                );
            }
            TreeNode::Reading { meter, reading } => {
                let derived = Consumption::compute(meter, reading);
                println!(
                    "  #{}  {}  {} kWh  ({:+} kWh, {:.2})",
                    reading.id.map(|id| id.to_string()).unwrap_or_default(),
                    reading.taken_at.format("%Y-%m-%d %H:%M"),
                    reading.value,
                    derived.delta,
                    derived.cost
                );
            }
        }
    }

    Ok(())
}
