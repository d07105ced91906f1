//! Reporting window - the inclusive date range aggregations run over.

use serde::{Deserialize, Serialize};
use crate::Time;

/// Inclusive date range for a report or query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Start of the window, inclusive
    pub from: Time,

    /// End of the window, inclusive
    pub to: Time,
}

impl DateRange {
    /// Create a range; callers are expected to pass `from <= to`.
    pub fn new(from: Time, to: Time) -> Self {
        Self { from, to }
    }

    /// Whether a timestamp falls inside the window.
    pub fn contains(&self, t: Time) -> bool {
        t >= self.from && t <= self.to
    }

    /// Whether another period overlaps this window.
    pub fn overlaps(&self, from: Time, to: Time) -> bool {
        from <= self.to && to >= self.from
    }
}
