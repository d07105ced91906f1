//! Population aggregation over outcome metrics.
//!
//! Read-only aggregators that turn raw observations into band distributions,
//! success rates, trend series, the two-lens comparison, and the completeness
//! audit, with small-number suppression throughout.

#![warn(missing_docs)]

mod cohort;

pub mod distribution;
pub mod achievement;
pub mod trend;
pub mod two_lens;
pub mod completeness;
pub mod report;

#[cfg(test)]
pub(crate) mod testutil;

pub use distribution::{BandBreakdown, BandCount, DistributionAggregator, DistributionReport};
pub use achievement::{AchievementAggregator, AchievementReport};
pub use trend::{MetricTrend, MonthlyPoint, TrendAggregator};
pub use two_lens::{GapDirection, TwoLensComparator, TwoLensReport};
pub use completeness::{CompletenessAuditor, CompletenessLevel, CompletenessReport};
pub use report::ReportingService;

use outcomes_storage::StoreError;

/// Error type for aggregation operations.
pub type Result<T> = std::result::Result<T, AggregationError>;

/// Errors that can occur while computing a report.
#[derive(Debug, thiserror::Error)]
pub enum AggregationError {
    /// Underlying store failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
