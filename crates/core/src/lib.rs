//! Outcomes core data models.
//!
//! This crate defines the fundamental data structures for the outcome
//! metrics aggregation and achievement derivation engine.

#![warn(missing_docs)]

// Core identities
mod id;

// Metric catalog
mod metric;

// Observations and qualitative signals
mod observation;

// Goals and achievement state
mod goal;

// Reporting windows
mod window;

// Re-exports
pub use id::{GoalId, MetricId, ObservationId, ParticipantId, ProgramId};
pub use metric::{AchievementSpec, Band, MetricDefinition, MetricKind, ScaleSpec};
pub use observation::{
    MetricObservation, ObservationValue, ProgressDescriptor, QualitativeObservation, ValueError,
};
pub use goal::{AchievementStatus, Goal, StatusSource};
pub use window::DateRange;

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
