//! Storage layer for outcome tracking data.
//!
//! Defines the read-only repository traits the aggregators depend on, the
//! atomic achievement write path, and an in-memory backend.

#![warn(missing_docs)]

mod trait_;
mod memory;
mod dataset;

pub use trait_::{
    AchievementOutcome, AchievementUpdate, MetricCatalog, ObservationRow, OutcomeStore, Result,
    StoreError,
};
pub use memory::MemoryStore;
pub use dataset::{Dataset, Enrollment};
