//! Reading domain model
//!
//! A reading is one timestamped dial value recorded for a meter. The meter
//! exclusively owns its readings; a reading only carries a non-owning
//! back-reference to its meter as a stored foreign key.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::id::{MeterId, ReadingId};
use super::meter::ValidationError;

/// A dial reading taken from a meter
///
/// Equality is structural over the persisted fields (id, value, timestamp,
/// owner id). [`Meter::remove_reading`](super::Meter::remove_reading) uses
/// it to locate the entry to detach; nothing in the core orders or hashes
/// by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Assigned by the store on first upsert; `None` while transient
    pub id: Option<ReadingId>,

    /// Dial value, never negative
    pub value: i64,

    /// When the reading was taken. User-editable, so not guaranteed to be
    /// monotonic with id order.
    pub taken_at: NaiveDateTime,

    /// Owning meter, set when the reading is attached or loaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meter_id: Option<MeterId>,
}

impl Reading {
    /// Creates a transient reading, rejecting negative dial values
    pub fn new(value: i64, taken_at: NaiveDateTime) -> Result<Self, ValidationError> {
        if value < 0 {
            return Err(ValidationError::NegativeValue(value));
        }

        Ok(Self {
            id: None,
            value,
            taken_at,
            meter_id: None,
        })
    }

    /// Checks the reading's own invariants
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.value < 0 {
            return Err(ValidationError::NegativeValue(self.value));
        }

        Ok(())
    }

    /// Returns true if this reading has not been persisted yet
    pub fn is_transient(&self) -> bool {
        self.id.is_none()
    }
}
