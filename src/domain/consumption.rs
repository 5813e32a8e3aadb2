//! Consumption and cost derivation
//!
//! Pure calculation over a meter and one of its readings. No store access,
//! no side effects; display formatting belongs to the caller.

use serde::Serialize;

use super::meter::Meter;
use super::reading::Reading;

/// Derived consumption figures for one reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Consumption {
    /// Consumed units since the previous reading. Zero for the first
    /// reading; negative when dial values decrease, which is accepted and
    /// passed through.
    pub delta: i64,

    /// Price per unit in major currency (the meter stores cents)
    pub unit_price: f64,

    /// `delta * unit_price`
    pub cost: f64,
}

impl Consumption {
    /// Derives consumption and cost for `reading` against its resolved
    /// previous reading on `meter`.
    pub fn compute(meter: &Meter, reading: &Reading) -> Self {
        let previous = meter.previous_reading(reading);
        let delta = reading.value - previous.value;
        let unit_price = meter.unit_price / 100.0;
        let cost = delta as f64 * unit_price;

        Self {
            delta,
            unit_price,
            cost,
        }
    }
}
