//! Shared fixtures for aggregator tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use chrono::{Duration, Utc};
use outcomes_core::{
    DateRange, Goal, MetricDefinition, MetricId, MetricKind, MetricObservation, ObservationValue,
    ParticipantId, ProgramId, ScaleSpec,
};
use outcomes_storage::{MemoryStore, OutcomeStore};

static SEED_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub(crate) fn fixture_program() -> ProgramId {
    ProgramId::new("test-program")
}

pub(crate) fn window() -> DateRange {
    let now = Utc::now();
    DateRange::new(now - Duration::days(30), now + Duration::days(1))
}

pub(crate) fn scale_metric(
    name: &str,
    threshold_low: Option<f64>,
    threshold_high: Option<f64>,
    higher_is_better: bool,
) -> MetricDefinition {
    MetricDefinition {
        id: MetricId::new(),
        name: name.to_string(),
        category: None,
        universal: false,
        kind: MetricKind::Scale(ScaleSpec {
            min_value: 1.0,
            max_value: 5.0,
            threshold_low,
            threshold_high,
            higher_is_better,
        }),
    }
}

/// Seed `n` distinct participants, each with one goal on the metric and two
/// readings at `value` (two, so the new-participant exclusion does not bite).
pub(crate) async fn seed_cohort(
    store: &MemoryStore,
    program: &ProgramId,
    metric_id: MetricId,
    n: usize,
    value: f64,
) {
    for _ in 0..n {
        let idx = SEED_COUNTER.fetch_add(1, Ordering::Relaxed);
        let goal = Goal::new(
            program.clone(),
            ParticipantId::new(format!("seed-{idx}")),
            vec![metric_id],
        );
        store.insert_goal(goal.clone()).await;
        for days_ago in [10i64, 2] {
            store
                .record_observation(MetricObservation::new(
                    metric_id,
                    goal.id,
                    ObservationValue::Numeric(value),
                    Some(Utc::now() - Duration::days(days_ago)),
                ))
                .await
                .unwrap();
        }
    }
}
