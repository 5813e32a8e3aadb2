//! Store-assigned entity ids
//!
//! Ids are allocated by the backing store at insert time, strictly
//! increasing per entity type and never reused. An entity without an id is
//! transient: it has not been persisted yet. Reading ids are the sole
//! ordering key for a meter's history; timestamps are user-editable and
//! carry no ordering guarantee.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid meter id: expected a positive integer, got '{0}'")]
    InvalidMeterId(String),

    #[error("Invalid reading id: expected a positive integer, got '{0}'")]
    InvalidReadingId(String),
}

/// Identifier of a persisted meter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeterId(pub(crate) i64);

impl MeterId {
    /// Returns the raw row id
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for MeterId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for MeterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MeterId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.parse::<i64>() {
            Ok(raw) if raw > 0 => Ok(Self(raw)),
            _ => Err(IdError::InvalidMeterId(s.to_string())),
        }
    }
}

/// Identifier of a persisted reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadingId(pub(crate) i64);

impl ReadingId {
    /// Returns the raw row id
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ReadingId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ReadingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReadingId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.parse::<i64>() {
            Ok(raw) if raw > 0 => Ok(Self(raw)),
            _ => Err(IdError::InvalidReadingId(s.to_string())),
        }
    }
}
