//! Monthly band-percentage trend series for scale metrics.

use std::collections::BTreeMap;
use std::sync::Arc;
use chrono::Datelike;
use serde::Serialize;
use outcomes_core::{DateRange, MetricDefinition, MetricId, ProgramId};
use outcomes_storage::{MetricCatalog, ObservationRow, OutcomeStore};

use crate::cohort::{reduce_latest_median, round1, tally_bands, MIN_POPULATION};
use crate::distribution::DistributionAggregator;
use crate::Result;

/// One month's band percentages for a metric.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyPoint {
    /// Calendar month, `YYYY-MM`
    pub month: String,

    /// Share of included participants in the unfavorable band, one decimal
    pub band_low_pct: f64,

    /// Share of included participants in the favorable band, one decimal
    pub band_high_pct: f64,

    /// Included participants that month
    pub total: usize,
}

/// Trend series for one metric.
#[derive(Debug, Clone, Serialize)]
pub struct MetricTrend {
    /// Metric reported on
    pub metric_id: MetricId,

    /// Metric display name
    pub metric_name: String,

    /// Ordered monthly points; months under the reporting minimum are
    /// dropped, not interpolated
    pub points: Vec<MonthlyPoint>,
}

/// Computes monthly trend series.
pub struct TrendAggregator {
    store: Arc<dyn OutcomeStore>,
    distributions: DistributionAggregator,
}

impl TrendAggregator {
    /// Create an aggregator over the given repositories.
    pub fn new(catalog: Arc<dyn MetricCatalog>, store: Arc<dyn OutcomeStore>) -> Self {
        Self {
            store: store.clone(),
            distributions: DistributionAggregator::new(catalog, store),
        }
    }

    /// Trend series for every scale metric linked to a goal in the program,
    /// ordered universal-first, then category, then name.
    pub async fn trends(&self, program: &ProgramId, range: DateRange) -> Result<Vec<MetricTrend>> {
        tracing::debug!(%program, "computing metric trends");

        let mut metrics = self.distributions.linked_scale_metrics(program).await?;
        metrics.sort_by_key(|m| m.ordering_key());

        let mut trends = Vec::new();
        for metric in &metrics {
            trends.push(self.trend_for_metric(metric, program, range).await?);
        }
        Ok(trends)
    }

    async fn trend_for_metric(
        &self,
        metric: &MetricDefinition,
        program: &ProgramId,
        range: DateRange,
    ) -> Result<MetricTrend> {
        let rows = self.store.observations(metric.id, program, range).await?;

        // BTreeMap keys keep the series in calendar order.
        let mut buckets: BTreeMap<String, Vec<ObservationRow>> = BTreeMap::new();
        for row in rows {
            buckets.entry(month_key(&row)).or_default().push(row);
        }

        let mut points = Vec::new();
        if let Some(spec) = metric.as_scale() {
            for (month, bucket) in buckets {
                let reduced = reduce_latest_median(&bucket, false);
                let total = reduced.medians.len();
                if total < MIN_POPULATION {
                    continue;
                }
                let tally = tally_bands(spec, &reduced.medians);
                points.push(MonthlyPoint {
                    month,
                    band_low_pct: round1(tally.low as f64 * 100.0 / total as f64),
                    band_high_pct: round1(tally.high as f64 * 100.0 / total as f64),
                    total,
                });
            }
        }

        Ok(MetricTrend {
            metric_id: metric.id,
            metric_name: metric.name.clone(),
            points,
        })
    }
}

fn month_key(row: &ObservationRow) -> String {
    format!(
        "{:04}-{:02}",
        row.effective_date.year(),
        row.effective_date.month()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{fixture_program, scale_metric};
    use chrono::{TimeZone, Utc};
    use outcomes_core::{Goal, MetricObservation, ObservationValue, ParticipantId};
    use outcomes_storage::MemoryStore;

    async fn seed_month(
        store: &MemoryStore,
        program: &ProgramId,
        metric_id: MetricId,
        year: i32,
        month: u32,
        n: usize,
        value: f64,
    ) {
        for i in 0..n {
            let goal = Goal::new(
                program.clone(),
                ParticipantId::new(format!("{year}-{month}-{i}")),
                vec![metric_id],
            );
            store.insert_goal(goal.clone()).await;
            let date = Utc.with_ymd_and_hms(year, month, 15, 12, 0, 0).unwrap();
            store
                .record_observation(MetricObservation::new(
                    metric_id,
                    goal.id,
                    ObservationValue::Numeric(value),
                    Some(date),
                ))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_months_in_order_with_small_month_dropped() {
        let store = Arc::new(MemoryStore::new());
        let program = fixture_program();
        let metric = scale_metric("confidence", Some(2.0), Some(4.0), true);
        store.insert_metric(metric.clone()).await;

        seed_month(&store, &program, metric.id, 2026, 1, 12, 1.0).await;
        seed_month(&store, &program, metric.id, 2026, 2, 4, 3.0).await; // dropped
        seed_month(&store, &program, metric.id, 2026, 3, 10, 5.0).await;

        let range = DateRange::new(
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 12, 31, 0, 0, 0).unwrap(),
        );
        let agg = TrendAggregator::new(store.clone(), store.clone());
        let trends = agg.trends(&program, range).await.unwrap();
        assert_eq!(trends.len(), 1);

        let points = &trends[0].points;
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].month, "2026-01");
        assert_eq!(points[0].band_low_pct, 100.0);
        assert_eq!(points[0].band_high_pct, 0.0);
        assert_eq!(points[0].total, 12);
        assert_eq!(points[1].month, "2026-03");
        assert_eq!(points[1].band_high_pct, 100.0);
    }

    #[tokio::test]
    async fn test_single_reading_participants_included_in_months() {
        // The whole-window "new participant" exclusion does not apply inside
        // month buckets; monthly cadence means one reading per month.
        let store = Arc::new(MemoryStore::new());
        let program = fixture_program();
        let metric = scale_metric("confidence", Some(2.0), Some(4.0), true);
        store.insert_metric(metric.clone()).await;

        seed_month(&store, &program, metric.id, 2026, 5, 10, 4.0).await;

        let range = DateRange::new(
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 12, 31, 0, 0, 0).unwrap(),
        );
        let agg = TrendAggregator::new(store.clone(), store.clone());
        let trends = agg.trends(&program, range).await.unwrap();
        let points = &trends[0].points;
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].total, 10);
        assert_eq!(points[0].band_high_pct, 100.0);
    }

    #[tokio::test]
    async fn test_latest_per_goal_within_month() {
        let store = Arc::new(MemoryStore::new());
        let program = fixture_program();
        let metric = scale_metric("confidence", Some(2.0), Some(4.0), true);
        store.insert_metric(metric.clone()).await;

        seed_month(&store, &program, metric.id, 2026, 5, 9, 3.0).await;

        // Tenth participant: early-month 1.0 superseded by late-month 5.0.
        let goal = Goal::new(program.clone(), ParticipantId::new("revised"), vec![metric.id]);
        store.insert_goal(goal.clone()).await;
        for (day, value) in [(2, 1.0), (28, 5.0)] {
            store
                .record_observation(MetricObservation::new(
                    metric.id,
                    goal.id,
                    ObservationValue::Numeric(value),
                    Some(Utc.with_ymd_and_hms(2026, 5, day, 12, 0, 0).unwrap()),
                ))
                .await
                .unwrap();
        }

        let range = DateRange::new(
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 12, 31, 0, 0, 0).unwrap(),
        );
        let agg = TrendAggregator::new(store.clone(), store.clone());
        let trends = agg.trends(&program, range).await.unwrap();
        let point = &trends[0].points[0];
        assert_eq!(point.total, 10);
        // Only the superseding 5.0 reaches the high band.
        assert_eq!(point.band_high_pct, 10.0);
        assert_eq!(point.band_low_pct, 0.0);
    }
}
