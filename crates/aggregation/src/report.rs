//! Reporting facade over the aggregators.

use std::sync::Arc;
use outcomes_core::{DateRange, ProgramId};
use outcomes_storage::{MetricCatalog, OutcomeStore};

use crate::achievement::{AchievementAggregator, AchievementReport};
use crate::completeness::{CompletenessAuditor, CompletenessReport};
use crate::distribution::{DistributionAggregator, DistributionReport};
use crate::trend::{MetricTrend, TrendAggregator};
use crate::two_lens::{TwoLensComparator, TwoLensReport};
use crate::Result;

/// Entry point for the reporting boundary.
///
/// All surfaces are pure reads over a bounded window; they hold no state and
/// may run concurrently.
pub struct ReportingService {
    distributions: DistributionAggregator,
    achievements: AchievementAggregator,
    trends: TrendAggregator,
    two_lens: TwoLensComparator,
    completeness: CompletenessAuditor,
}

impl ReportingService {
    /// Create a service over the given repositories.
    pub fn new(catalog: Arc<dyn MetricCatalog>, store: Arc<dyn OutcomeStore>) -> Self {
        Self {
            distributions: DistributionAggregator::new(catalog.clone(), store.clone()),
            achievements: AchievementAggregator::new(catalog.clone(), store.clone()),
            trends: TrendAggregator::new(catalog.clone(), store.clone()),
            two_lens: TwoLensComparator::new(catalog, store.clone()),
            completeness: CompletenessAuditor::new(store),
        }
    }

    /// Band distributions for the program's scale metrics.
    pub async fn metric_distributions(
        &self,
        program: &ProgramId,
        range: DateRange,
    ) -> Result<Vec<DistributionReport>> {
        self.distributions.distributions(program, range).await
    }

    /// Success rates for the program's achievement metrics.
    pub async fn achievement_rates(
        &self,
        program: &ProgramId,
        range: DateRange,
    ) -> Result<Vec<AchievementReport>> {
        self.achievements.rates(program, range).await
    }

    /// Monthly trend series for the program's scale metrics.
    pub async fn metric_trends(
        &self,
        program: &ProgramId,
        range: DateRange,
    ) -> Result<Vec<MetricTrend>> {
        self.trends.trends(program, range).await
    }

    /// Self-report vs. staff-observed comparison.
    pub async fn two_lenses(&self, program: &ProgramId, range: DateRange) -> Result<TwoLensReport> {
        self.two_lens.compare(program, range).await
    }

    /// Enrollment coverage audit.
    pub async fn data_completeness(
        &self,
        program: &ProgramId,
        range: DateRange,
    ) -> Result<CompletenessReport> {
        self.completeness.audit(program, range).await
    }
}
