//! Repository trait abstractions.

use async_trait::async_trait;
use std::collections::HashSet;
use outcomes_core::{
    AchievementStatus, DateRange, Goal, GoalId, MetricDefinition, MetricId, MetricObservation,
    ObservationValue, ParticipantId, ProgramId, QualitativeObservation, Time,
};

/// Error type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Read-only metric catalog.
///
/// The catalog is shared configuration; injecting it keeps the aggregators
/// pure and testable with fixtures.
#[async_trait]
pub trait MetricCatalog: Send + Sync {
    /// Look up a metric definition.
    async fn metric(&self, id: MetricId) -> Result<Option<MetricDefinition>>;

    /// The metric designated as the self-reported confidence measure,
    /// consumed by the two-lens comparison.
    async fn confidence_metric(&self) -> Result<Option<MetricId>>;
}

/// A metric reading joined with the participant behind its goal.
#[derive(Debug, Clone)]
pub struct ObservationRow {
    /// Participant the goal belongs to
    pub participant_id: ParticipantId,

    /// Goal the reading is attached to
    pub goal_id: GoalId,

    /// Resolved value
    pub value: ObservationValue,

    /// When the reading applies
    pub effective_date: Time,
}

/// An automatic status update, applied atomically per goal.
#[derive(Debug, Clone, Copy)]
pub struct AchievementUpdate {
    /// Newly derived status
    pub status: AchievementStatus,
}

/// Result of attempting an automatic status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AchievementOutcome {
    /// The update was persisted
    Applied,
    /// A worker assessment blocks automatic writes; nothing changed
    Blocked,
}

/// Store abstraction for outcome tracking data.
///
/// Aggregators only read; the single mutating path for achievement state is
/// [`OutcomeStore::apply_achievement`], which must be atomic per goal.
#[async_trait]
pub trait OutcomeStore: Send + Sync {
    // === Observations ===

    /// Record a metric observation. Observations are append-only.
    async fn record_observation(&self, observation: MetricObservation) -> Result<()>;

    /// Readings of one metric across a program within a window, joined with
    /// participants, filtered by effective date.
    async fn observations(
        &self,
        metric_id: MetricId,
        program: &ProgramId,
        range: DateRange,
    ) -> Result<Vec<ObservationRow>>;

    /// Full history of one metric on one goal, ordered by recording time.
    async fn observations_for_goal(
        &self,
        goal_id: GoalId,
        metric_id: MetricId,
    ) -> Result<Vec<MetricObservation>>;

    // === Goals ===

    /// All goals in a program.
    async fn goals_for_program(&self, program: &ProgramId) -> Result<Vec<Goal>>;

    /// Load a goal by ID.
    async fn load_goal(&self, id: GoalId) -> Result<Option<Goal>>;

    /// Apply an automatically derived status.
    ///
    /// The whole check-and-write runs under the store's write lock: a
    /// worker assessment present at write time blocks the update even if the
    /// caller read the goal before the assessment landed. `first_achieved_at`
    /// is set on the first achieved/sustaining status and never cleared.
    async fn apply_achievement(
        &self,
        goal_id: GoalId,
        update: AchievementUpdate,
    ) -> Result<AchievementOutcome>;

    /// Record a worker's assessment, blocking automatic writes until reset.
    async fn set_worker_assessment(
        &self,
        goal_id: GoalId,
        status: AchievementStatus,
    ) -> Result<()>;

    // === Enrollment ===

    /// Participants actively enrolled in the program during the window.
    async fn active_participants(
        &self,
        program: &ProgramId,
        range: DateRange,
    ) -> Result<HashSet<ParticipantId>>;

    /// Participants with at least one observation of any metric in the window.
    async fn scored_participants(
        &self,
        program: &ProgramId,
        range: DateRange,
    ) -> Result<HashSet<ParticipantId>>;

    // === Qualitative signals ===

    /// Record a qualitative observation.
    async fn record_qualitative(&self, observation: QualitativeObservation) -> Result<()>;

    /// Qualitative history for one goal, ordered by effective date.
    async fn qualitative_for_goal(&self, goal_id: GoalId) -> Result<Vec<QualitativeObservation>>;

    /// Qualitative observations across a program within a window.
    async fn qualitative_for_program(
        &self,
        program: &ProgramId,
        range: DateRange,
    ) -> Result<Vec<QualitativeObservation>>;
}
