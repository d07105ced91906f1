//! Goal model - a participant-level outcome target with derived achievement state.

use serde::{Deserialize, Serialize};
use crate::id::{GoalId, MetricId, ParticipantId, ProgramId};
use crate::Time;

/// An outcome a participant is working toward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier
    pub id: GoalId,

    /// Program this goal belongs to
    pub program_id: ProgramId,

    /// Participant working toward the goal
    pub participant_id: ParticipantId,

    /// Linked metrics, ordered; index 0 is the primary metric
    pub metric_ids: Vec<MetricId>,

    /// Current trajectory/outcome classification
    pub achievement_status: AchievementStatus,

    /// Who last set the status
    pub achievement_status_source: StatusSource,

    /// First time the goal reached achieved/sustaining; once set, never
    /// cleared and never moved earlier
    pub first_achieved_at: Option<Time>,

    /// When the status was last written
    pub status_updated_at: Time,
}

impl Goal {
    /// Create a goal in its initial state.
    pub fn new(
        program_id: ProgramId,
        participant_id: ParticipantId,
        metric_ids: Vec<MetricId>,
    ) -> Self {
        Self {
            id: GoalId::new(),
            program_id,
            participant_id,
            metric_ids,
            achievement_status: AchievementStatus::InProgress,
            achievement_status_source: StatusSource::AutoComputed,
            first_achieved_at: None,
            status_updated_at: chrono::Utc::now(),
        }
    }

    /// The primary metric driving achievement derivation, if any is linked.
    pub fn primary_metric(&self) -> Option<MetricId> {
        self.metric_ids.first().copied()
    }

    /// Whether a human assessment blocks automatic status writes.
    pub fn is_worker_assessed(&self) -> bool {
        self.achievement_status_source == StatusSource::WorkerAssessed
    }
}

/// Trajectory/outcome classification for a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementStatus {
    /// No usable signal yet
    InProgress,
    /// Recent readings trend in the favorable direction
    Improving,
    /// Recent readings are flat or mixed
    NoChange,
    /// Recent readings trend in the unfavorable direction
    Worsening,
    /// Target reached for the first time
    Achieved,
    /// Target still met after a prior achievement
    Sustaining,
    /// Judged unreachable; only ever set by a human
    NotAttainable,
}

impl AchievementStatus {
    /// Whether this status represents the target being met.
    pub fn is_achieved(self) -> bool {
        matches!(self, AchievementStatus::Achieved | AchievementStatus::Sustaining)
    }
}

/// Origin of a goal's current achievement status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSource {
    /// Written by the derivation engine
    AutoComputed,
    /// Written by a worker; blocks automatic recomputation until reset
    WorkerAssessed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_goal_initial_state() {
        let goal = Goal::new(
            ProgramId::new("youth-housing"),
            ParticipantId::new("p-1"),
            vec![MetricId::new(), MetricId::new()],
        );
        assert_eq!(goal.achievement_status, AchievementStatus::InProgress);
        assert_eq!(goal.achievement_status_source, StatusSource::AutoComputed);
        assert!(goal.first_achieved_at.is_none());
        assert!(!goal.is_worker_assessed());
    }

    #[test]
    fn test_primary_metric_is_index_zero() {
        let first = MetricId::new();
        let goal = Goal::new(
            ProgramId::new("p"),
            ParticipantId::new("x"),
            vec![first, MetricId::new()],
        );
        assert_eq!(goal.primary_metric(), Some(first));

        let bare = Goal::new(ProgramId::new("p"), ParticipantId::new("x"), Vec::new());
        assert_eq!(bare.primary_metric(), None);
    }

    #[test]
    fn test_is_achieved() {
        assert!(AchievementStatus::Achieved.is_achieved());
        assert!(AchievementStatus::Sustaining.is_achieved());
        assert!(!AchievementStatus::Improving.is_achieved());
        assert!(!AchievementStatus::NotAttainable.is_achieved());
    }
}
