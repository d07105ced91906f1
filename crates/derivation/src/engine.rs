//! Achievement derivation engine.
//!
//! Recomputes a goal's achievement status after an observation write. The
//! hook is a resilience boundary: persisting the observation must never fail
//! because the derivation has a bug, so errors are logged and swallowed —
//! the source observation stays durable and recomputation can be retried.

use std::sync::Arc;
use outcomes_core::{Goal, GoalId, ScaleSpec};
use outcomes_storage::{
    AchievementOutcome, AchievementUpdate, MetricCatalog, OutcomeStore, StoreError,
};

use crate::rules;

/// Errors that can occur during status recomputation.
#[derive(Debug, thiserror::Error)]
pub enum DerivationError {
    /// Underlying store failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The goal does not exist
    #[error("goal not found: {0}")]
    GoalNotFound(GoalId),
}

/// Derives and persists per-goal achievement status.
pub struct AchievementEngine {
    catalog: Arc<dyn MetricCatalog>,
    store: Arc<dyn OutcomeStore>,
}

impl AchievementEngine {
    /// Create an engine over the given repositories.
    pub fn new(catalog: Arc<dyn MetricCatalog>, store: Arc<dyn OutcomeStore>) -> Self {
        Self { catalog, store }
    }

    /// Hook for the write path, called after an observation transaction
    /// commits. Never propagates errors to the caller.
    pub async fn on_observation_written(&self, goal_id: GoalId) {
        if let Err(error) = self.recompute(goal_id).await {
            tracing::error!(
                %goal_id,
                %error,
                "achievement recomputation failed; source observation remains stored"
            );
        }
    }

    /// Recompute a goal's status from its full observation history.
    ///
    /// Idempotent: the status is a pure function of the history, so redundant
    /// invocations are safe. The final write re-checks the worker-assessed
    /// guard atomically in the store.
    pub async fn recompute(&self, goal_id: GoalId) -> Result<AchievementOutcome, DerivationError> {
        let goal = self
            .store
            .load_goal(goal_id)
            .await?
            .ok_or(DerivationError::GoalNotFound(goal_id))?;

        // Human judgment is sticky; skip the computation entirely.
        if goal.is_worker_assessed() {
            tracing::debug!(%goal_id, "goal is worker-assessed, skipping recomputation");
            return Ok(AchievementOutcome::Blocked);
        }

        let achieved_once = goal.first_achieved_at.is_some();
        let status = match self.primary_scale(&goal).await? {
            Some((metric_id, spec)) => {
                let history = self.store.observations_for_goal(goal_id, metric_id).await?;
                let points: Vec<f64> = history.iter().filter_map(|o| o.value.as_numeric()).collect();
                rules::quantitative_status(&points, &spec, achieved_once)
            }
            None => {
                let signals = self.store.qualitative_for_goal(goal_id).await?;
                let latest = signals.iter().rev().find_map(|q| q.descriptor);
                rules::qualitative_status(latest, achieved_once)
            }
        };

        Ok(self
            .store
            .apply_achievement(goal_id, AchievementUpdate { status })
            .await?)
    }

    /// The goal's primary metric as a scale spec, if the primary metric is
    /// scale-typed. A primary metric with no surviving definition falls
    /// through to the qualitative path.
    async fn primary_scale(&self, goal: &Goal) -> Result<Option<(outcomes_core::MetricId, ScaleSpec)>, DerivationError> {
        let Some(metric_id) = goal.primary_metric() else {
            return Ok(None);
        };
        match self.catalog.metric(metric_id).await? {
            Some(metric) => Ok(metric.as_scale().cloned().map(|spec| (metric_id, spec))),
            None => {
                tracing::warn!(
                    %metric_id,
                    goal_id = %goal.id,
                    "primary metric has no definition, using qualitative path"
                );
                Ok(None)
            }
        }
    }
}
