//! wattlog - A local-first logbook for electricity meters
//!
//! Records meters and a time-ordered history of dial readings per meter,
//! and derives consumption and cost between successive readings. Data
//! lives in a single SQLite database; every store operation is one atomic
//! transaction.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{Consumption, EmptyHistoryError, Meter, MeterId, Reading, ReadingId, ValidationError};
pub use storage::{Config, MeterStore, StoreError};
