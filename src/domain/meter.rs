//! Meter domain model
//!
//! A meter is a billing point with a price per kWh and a history of dial
//! readings. The history is kept in ascending id order once loaded; the
//! previous-reading resolution below depends on that ordering.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::MeterId;
use super::reading::Reading;

/// Input rejected before it ever reaches the store
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Meter name must not be blank")]
    BlankName,

    #[error("Unit price must be a positive number of cents, got {0}")]
    NonPositivePrice(f64),

    #[error("Reading value must not be negative, got {0}")]
    NegativeValue(i64),
}

/// A meter has no readings to derive anything from yet
#[derive(Debug, Error, PartialEq)]
#[error("Meter '{meter}' has no readings")]
pub struct EmptyHistoryError {
    pub meter: String,
}

/// An electricity meter owning its reading history
///
/// Equality is identity: two meters are equal when they carry the same
/// store-assigned id. Transient meters have no identity and never compare
/// equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meter {
    /// Assigned by the store on first upsert; `None` while transient
    pub id: Option<MeterId>,

    /// Display name, never blank
    pub name: String,

    /// Price per kWh in minor currency units (cents)
    pub unit_price: f64,

    /// Owned readings, ascending by id once persisted
    #[serde(default)]
    pub readings: Vec<Reading>,
}

impl Meter {
    /// Creates a transient meter, rejecting blank names and non-positive
    /// prices
    pub fn new(name: impl Into<String>, unit_price: f64) -> Result<Self, ValidationError> {
        let meter = Self {
            id: None,
            name: name.into(),
            unit_price,
            readings: Vec::new(),
        };
        meter.validate()?;
        Ok(meter)
    }

    /// Checks the meter's invariants and those of every attached reading.
    ///
    /// The store calls this before any write, so invalid aggregates are
    /// rejected without touching the backing store.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankName);
        }
        if !(self.unit_price > 0.0) || !self.unit_price.is_finite() {
            return Err(ValidationError::NonPositivePrice(self.unit_price));
        }
        for reading in &self.readings {
            reading.validate()?;
        }

        Ok(())
    }

    /// Appends a reading to the owned history and sets its back-reference.
    /// Does not persist.
    pub fn add_reading(&mut self, mut reading: Reading) {
        reading.meter_id = self.id;
        self.readings.push(reading);
    }

    /// Detaches the first structurally-equal reading from the history.
    /// A no-op when no such reading is attached. Does not persist: the row
    /// disappears on the next upsert (orphan removal).
    pub fn remove_reading(&mut self, reading: &Reading) {
        if let Some(pos) = self.readings.iter().position(|r| r == reading) {
            self.readings.remove(pos);
        }
    }

    /// Returns the last reading in the history's current ordering
    pub fn latest_reading(&self) -> Result<&Reading, EmptyHistoryError> {
        self.readings.last().ok_or_else(|| EmptyHistoryError {
            meter: self.name.clone(),
        })
    }

    /// Resolves the reading that precedes `reference` in the history.
    ///
    /// Scans from the end backward and returns the first reading whose id
    /// is strictly less than the reference's id. Ids are the ordering key,
    /// not timestamps. When no earlier reading exists the reference itself
    /// is returned, which makes the first reading's derived consumption and
    /// cost both zero.
    pub fn previous_reading<'a>(&'a self, reference: &'a Reading) -> &'a Reading {
        let reference_id = match reference.id {
            Some(id) => id,
            None => return reference,
        };

        self.readings
            .iter()
            .rev()
            .find(|r| r.id.is_some_and(|id| id < reference_id))
            .unwrap_or(reference)
    }

    /// Returns true if this meter has not been persisted yet
    pub fn is_transient(&self) -> bool {
        self.id.is_none()
    }
}

impl PartialEq for Meter {
    fn eq(&self, other: &Self) -> bool {
        self.id.is_some() && self.id == other.id
    }
}
