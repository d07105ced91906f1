//! In-memory store implementation.
//!
//! Holds the full dataset behind a single `RwLock`; reads take the read
//! guard, and the achievement write path runs its check-and-write sequence
//! entirely under the write guard, which gives the per-goal atomicity the
//! derivation engine relies on.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use outcomes_core::{
    AchievementStatus, DateRange, Goal, GoalId, MetricDefinition, MetricId, MetricObservation,
    ParticipantId, ProgramId, QualitativeObservation, StatusSource,
};
use crate::dataset::{Dataset, Enrollment};
use crate::trait_::{
    AchievementOutcome, AchievementUpdate, MetricCatalog, ObservationRow, OutcomeStore, Result,
    StoreError,
};

/// In-memory backend implementing both the catalog and the outcome store.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    metrics: HashMap<MetricId, MetricDefinition>,
    confidence_metric: Option<MetricId>,
    goals: HashMap<GoalId, Goal>,
    observations: Vec<MetricObservation>,
    qualitative: Vec<QualitativeObservation>,
    enrollments: Vec<Enrollment>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Create a store pre-loaded from a dataset snapshot.
    pub fn from_dataset(dataset: Dataset) -> Self {
        let inner = Inner {
            metrics: dataset.metrics.into_iter().map(|m| (m.id, m)).collect(),
            confidence_metric: dataset.confidence_metric,
            goals: dataset.goals.into_iter().map(|g| (g.id, g)).collect(),
            observations: dataset.observations,
            qualitative: dataset.qualitative,
            enrollments: dataset.enrollments,
        };
        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Add a metric definition to the catalog.
    pub async fn insert_metric(&self, metric: MetricDefinition) {
        self.inner.write().await.metrics.insert(metric.id, metric);
    }

    /// Designate the self-reported confidence metric.
    pub async fn set_confidence_metric(&self, id: MetricId) {
        self.inner.write().await.confidence_metric = Some(id);
    }

    /// Add a goal.
    pub async fn insert_goal(&self, goal: Goal) {
        self.inner.write().await.goals.insert(goal.id, goal);
    }

    /// Add an enrollment period.
    pub async fn insert_enrollment(&self, enrollment: Enrollment) {
        self.inner.write().await.enrollments.push(enrollment);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricCatalog for MemoryStore {
    async fn metric(&self, id: MetricId) -> Result<Option<MetricDefinition>> {
        Ok(self.inner.read().await.metrics.get(&id).cloned())
    }

    async fn confidence_metric(&self) -> Result<Option<MetricId>> {
        Ok(self.inner.read().await.confidence_metric)
    }
}

#[async_trait]
impl OutcomeStore for MemoryStore {
    async fn record_observation(&self, observation: MetricObservation) -> Result<()> {
        self.inner.write().await.observations.push(observation);
        Ok(())
    }

    async fn observations(
        &self,
        metric_id: MetricId,
        program: &ProgramId,
        range: DateRange,
    ) -> Result<Vec<ObservationRow>> {
        let inner = self.inner.read().await;
        let mut rows = Vec::new();
        for obs in &inner.observations {
            if obs.metric_id != metric_id || !range.contains(obs.effective_date) {
                continue;
            }
            let Some(goal) = inner.goals.get(&obs.goal_id) else {
                tracing::warn!(goal_id = %obs.goal_id, "observation references missing goal, skipping");
                continue;
            };
            if &goal.program_id != program {
                continue;
            }
            rows.push(ObservationRow {
                participant_id: goal.participant_id.clone(),
                goal_id: obs.goal_id,
                value: obs.value.clone(),
                effective_date: obs.effective_date,
            });
        }
        Ok(rows)
    }

    async fn observations_for_goal(
        &self,
        goal_id: GoalId,
        metric_id: MetricId,
    ) -> Result<Vec<MetricObservation>> {
        let inner = self.inner.read().await;
        let mut history: Vec<MetricObservation> = inner
            .observations
            .iter()
            .filter(|o| o.goal_id == goal_id && o.metric_id == metric_id)
            .cloned()
            .collect();
        history.sort_by_key(|o| o.recorded_at);
        Ok(history)
    }

    async fn goals_for_program(&self, program: &ProgramId) -> Result<Vec<Goal>> {
        let inner = self.inner.read().await;
        Ok(inner
            .goals
            .values()
            .filter(|g| &g.program_id == program)
            .cloned()
            .collect())
    }

    async fn load_goal(&self, id: GoalId) -> Result<Option<Goal>> {
        Ok(self.inner.read().await.goals.get(&id).cloned())
    }

    async fn apply_achievement(
        &self,
        goal_id: GoalId,
        update: AchievementUpdate,
    ) -> Result<AchievementOutcome> {
        let mut inner = self.inner.write().await;
        let goal = inner
            .goals
            .get_mut(&goal_id)
            .ok_or_else(|| StoreError::NotFound(format!("goal {}", goal_id)))?;

        // Human judgment is sticky; re-checked here under the write lock so
        // an assessment landing after the caller's read still wins.
        if goal.is_worker_assessed() {
            return Ok(AchievementOutcome::Blocked);
        }

        let mut status = update.status;
        // A goal that already achieved once is sustaining, not newly achieved.
        if status == AchievementStatus::Achieved && goal.first_achieved_at.is_some() {
            status = AchievementStatus::Sustaining;
        }

        let now = chrono::Utc::now();
        if status.is_achieved() && goal.first_achieved_at.is_none() {
            goal.first_achieved_at = Some(now);
        }
        goal.achievement_status = status;
        goal.achievement_status_source = StatusSource::AutoComputed;
        goal.status_updated_at = now;
        Ok(AchievementOutcome::Applied)
    }

    async fn set_worker_assessment(
        &self,
        goal_id: GoalId,
        status: AchievementStatus,
    ) -> Result<()> {
        let mut inner = self.inner.write().await;
        let goal = inner
            .goals
            .get_mut(&goal_id)
            .ok_or_else(|| StoreError::NotFound(format!("goal {}", goal_id)))?;

        let now = chrono::Utc::now();
        if status.is_achieved() && goal.first_achieved_at.is_none() {
            goal.first_achieved_at = Some(now);
        }
        goal.achievement_status = status;
        goal.achievement_status_source = StatusSource::WorkerAssessed;
        goal.status_updated_at = now;
        Ok(())
    }

    async fn active_participants(
        &self,
        program: &ProgramId,
        range: DateRange,
    ) -> Result<HashSet<ParticipantId>> {
        let inner = self.inner.read().await;
        Ok(inner
            .enrollments
            .iter()
            .filter(|e| {
                &e.program_id == program
                    && range.overlaps(
                        e.enrolled_from,
                        e.enrolled_to.unwrap_or(chrono::DateTime::<chrono::Utc>::MAX_UTC),
                    )
            })
            .map(|e| e.participant_id.clone())
            .collect())
    }

    async fn scored_participants(
        &self,
        program: &ProgramId,
        range: DateRange,
    ) -> Result<HashSet<ParticipantId>> {
        let inner = self.inner.read().await;
        let mut participants = HashSet::new();
        for obs in &inner.observations {
            if !range.contains(obs.effective_date) {
                continue;
            }
            if let Some(goal) = inner.goals.get(&obs.goal_id) {
                if &goal.program_id == program {
                    participants.insert(goal.participant_id.clone());
                }
            }
        }
        Ok(participants)
    }

    async fn record_qualitative(&self, observation: QualitativeObservation) -> Result<()> {
        self.inner.write().await.qualitative.push(observation);
        Ok(())
    }

    async fn qualitative_for_goal(&self, goal_id: GoalId) -> Result<Vec<QualitativeObservation>> {
        let inner = self.inner.read().await;
        let mut history: Vec<QualitativeObservation> = inner
            .qualitative
            .iter()
            .filter(|q| q.goal_id == goal_id)
            .cloned()
            .collect();
        history.sort_by_key(|q| q.effective_date);
        Ok(history)
    }

    async fn qualitative_for_program(
        &self,
        program: &ProgramId,
        range: DateRange,
    ) -> Result<Vec<QualitativeObservation>> {
        let inner = self.inner.read().await;
        Ok(inner
            .qualitative
            .iter()
            .filter(|q| {
                range.contains(q.effective_date)
                    && inner
                        .goals
                        .get(&q.goal_id)
                        .is_some_and(|g| &g.program_id == program)
            })
            .cloned()
            .collect())
    }
}
