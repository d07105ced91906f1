//! Population success rates for achievement metrics.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use serde::Serialize;
use outcomes_core::{DateRange, MetricDefinition, MetricId, ParticipantId, ProgramId, Time};
use outcomes_storage::{MetricCatalog, OutcomeStore};

use crate::cohort::{round1, MIN_POPULATION};
use crate::Result;

/// Success rate of one achievement metric across a program's population.
#[derive(Debug, Clone, Serialize)]
pub struct AchievementReport {
    /// Metric reported on
    pub metric_id: MetricId,

    /// Metric display name
    pub metric_name: String,

    /// Reporting category
    pub category: Option<String>,

    /// Whether the metric is universal
    pub universal: bool,

    /// Participants with a reading in the window
    pub total: usize,

    /// Participants whose latest reading is a success value
    pub successes: usize,

    /// Success rate, one decimal
    pub rate_pct: f64,

    /// Configured target rate, if any
    pub target_rate: Option<f64>,
}

/// Computes population success rates.
pub struct AchievementAggregator {
    catalog: Arc<dyn MetricCatalog>,
    store: Arc<dyn OutcomeStore>,
}

impl AchievementAggregator {
    /// Create an aggregator over the given repositories.
    pub fn new(catalog: Arc<dyn MetricCatalog>, store: Arc<dyn OutcomeStore>) -> Self {
        Self { catalog, store }
    }

    /// Success rates for every achievement metric linked to a goal in the
    /// program, ordered universal-first, then category, then name. Metrics
    /// with fewer than 10 participating individuals are omitted.
    pub async fn rates(
        &self,
        program: &ProgramId,
        range: DateRange,
    ) -> Result<Vec<AchievementReport>> {
        tracing::debug!(%program, "computing achievement rates");

        let mut metrics = self.linked_achievement_metrics(program).await?;
        metrics.sort_by_key(|m| m.ordering_key());

        let mut reports = Vec::new();
        for metric in &metrics {
            if let Some(report) = self.rate_for_metric(metric, program, range).await? {
                reports.push(report);
            }
        }
        Ok(reports)
    }

    async fn rate_for_metric(
        &self,
        metric: &MetricDefinition,
        program: &ProgramId,
        range: DateRange,
    ) -> Result<Option<AchievementReport>> {
        let Some(spec) = metric.as_achievement() else {
            return Ok(None);
        };

        let rows = self.store.observations(metric.id, program, range).await?;

        // Latest reading per participant, regardless of goal.
        let mut latest: HashMap<ParticipantId, (Time, String)> = HashMap::new();
        for row in rows {
            let Some(category) = row.value.as_category() else {
                tracing::warn!(
                    goal_id = %row.goal_id,
                    "numeric reading on achievement metric, skipping"
                );
                continue;
            };
            let slot = latest.entry(row.participant_id.clone());
            slot.and_modify(|existing| {
                if row.effective_date >= existing.0 {
                    *existing = (row.effective_date, category.to_string());
                }
            })
            .or_insert((row.effective_date, category.to_string()));
        }

        let total = latest.len();
        if total < MIN_POPULATION {
            return Ok(None);
        }

        let successes = latest
            .values()
            .filter(|(_, category)| spec.is_success(category))
            .count();

        Ok(Some(AchievementReport {
            metric_id: metric.id,
            metric_name: metric.name.clone(),
            category: metric.category.clone(),
            universal: metric.universal,
            total,
            successes,
            rate_pct: round1(successes as f64 * 100.0 / total as f64),
            target_rate: spec.target_rate,
        }))
    }

    async fn linked_achievement_metrics(
        &self,
        program: &ProgramId,
    ) -> Result<Vec<MetricDefinition>> {
        let goals = self.store.goals_for_program(program).await?;
        let mut seen: HashSet<MetricId> = HashSet::new();
        let mut metrics = Vec::new();
        for goal in &goals {
            for metric_id in &goal.metric_ids {
                if !seen.insert(*metric_id) {
                    continue;
                }
                match self.catalog.metric(*metric_id).await? {
                    Some(metric) => {
                        if metric.as_achievement().is_some() {
                            metrics.push(metric);
                        }
                    }
                    None => {
                        tracing::warn!(
                            metric_id = %metric_id,
                            goal_id = %goal.id,
                            "goal references missing metric definition, skipping"
                        );
                    }
                }
            }
        }
        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{fixture_program, window};
    use chrono::{Duration, Utc};
    use outcomes_core::{
        AchievementSpec, Goal, MetricKind, MetricObservation, ObservationValue,
    };
    use outcomes_storage::MemoryStore;

    fn housed_metric(target_rate: Option<f64>) -> MetricDefinition {
        MetricDefinition {
            id: MetricId::new(),
            name: "stable-housing".into(),
            category: Some("housing".into()),
            universal: false,
            kind: MetricKind::Achievement(AchievementSpec {
                options: vec!["housed".into(), "at_risk".into(), "unhoused".into()],
                success_values: vec!["housed".into()],
                target_rate,
            }),
        }
    }

    async fn seed_participant(
        store: &MemoryStore,
        program: &ProgramId,
        metric_id: MetricId,
        name: &str,
        readings: &[(&str, i64)],
    ) {
        let goal = Goal::new(program.clone(), ParticipantId::new(name), vec![metric_id]);
        store.insert_goal(goal.clone()).await;
        for (label, days_ago) in readings {
            store
                .record_observation(MetricObservation::new(
                    metric_id,
                    goal.id,
                    ObservationValue::Categorical(label.to_string()),
                    Some(Utc::now() - Duration::days(*days_ago)),
                ))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_latest_reading_decides_success() {
        let store = Arc::new(MemoryStore::new());
        let program = fixture_program();
        let metric = housed_metric(Some(70.0));
        store.insert_metric(metric.clone()).await;

        // 8 currently housed; one of them was unhoused earlier in the window.
        for i in 0..8 {
            let readings: &[(&str, i64)] = if i == 0 {
                &[("unhoused", 20), ("housed", 2)]
            } else {
                &[("housed", 2)]
            };
            seed_participant(&store, &program, metric.id, &format!("h-{i}"), readings).await;
        }
        // 4 not housed; one slipped back after being housed.
        for i in 0..4 {
            let readings: &[(&str, i64)] = if i == 0 {
                &[("housed", 20), ("at_risk", 2)]
            } else {
                &[("unhoused", 2)]
            };
            seed_participant(&store, &program, metric.id, &format!("u-{i}"), readings).await;
        }

        let agg = AchievementAggregator::new(store.clone(), store.clone());
        let reports = agg.rates(&program, window()).await.unwrap();
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.total, 12);
        assert_eq!(report.successes, 8);
        assert_eq!(report.rate_pct, 66.7);
        assert_eq!(report.target_rate, Some(70.0));
    }

    #[tokio::test]
    async fn test_below_minimum_is_omitted() {
        let store = Arc::new(MemoryStore::new());
        let program = fixture_program();
        let metric = housed_metric(None);
        store.insert_metric(metric.clone()).await;

        for i in 0..9 {
            seed_participant(&store, &program, metric.id, &format!("p-{i}"), &[("housed", 2)])
                .await;
        }

        let agg = AchievementAggregator::new(store.clone(), store.clone());
        let reports = agg.rates(&program, window()).await.unwrap();
        assert!(reports.is_empty());
    }

    #[tokio::test]
    async fn test_one_reading_per_participant_across_goals() {
        let store = Arc::new(MemoryStore::new());
        let program = fixture_program();
        let metric = housed_metric(None);
        store.insert_metric(metric.clone()).await;

        for i in 0..9 {
            seed_participant(&store, &program, metric.id, &format!("p-{i}"), &[("unhoused", 2)])
                .await;
        }
        // Tenth participant has two goals; only the latest reading counts.
        seed_participant(&store, &program, metric.id, "multi", &[("unhoused", 10)]).await;
        seed_participant(&store, &program, metric.id, "multi", &[("housed", 1)]).await;

        let agg = AchievementAggregator::new(store.clone(), store.clone());
        let reports = agg.rates(&program, window()).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].total, 10);
        assert_eq!(reports[0].successes, 1);
        assert_eq!(reports[0].rate_pct, 10.0);
    }
}
