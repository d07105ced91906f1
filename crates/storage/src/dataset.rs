//! Serde dataset format for fixtures and the CLI.
//!
//! A dataset is a full snapshot of catalog, goals, observations, qualitative
//! signals, and enrollment periods, loadable into a [`crate::MemoryStore`].

use serde::{Deserialize, Serialize};
use outcomes_core::{
    Goal, MetricDefinition, MetricId, MetricObservation, ParticipantId, ProgramId,
    QualitativeObservation, Time,
};
use crate::trait_::Result;

/// An enrollment period for a participant in a program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    /// Enrolled participant
    pub participant_id: ParticipantId,

    /// Program enrolled in
    pub program_id: ProgramId,

    /// Start of the enrollment period
    pub enrolled_from: Time,

    /// End of the enrollment period; open-ended when absent
    pub enrolled_to: Option<Time>,
}

/// Full data snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// Metric definitions
    #[serde(default)]
    pub metrics: Vec<MetricDefinition>,

    /// Metric designated as the self-reported confidence measure
    #[serde(default)]
    pub confidence_metric: Option<MetricId>,

    /// Goals
    #[serde(default)]
    pub goals: Vec<Goal>,

    /// Metric observations
    #[serde(default)]
    pub observations: Vec<MetricObservation>,

    /// Qualitative observations
    #[serde(default)]
    pub qualitative: Vec<QualitativeObservation>,

    /// Enrollment periods
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
}

impl Dataset {
    /// Parse a dataset from JSON.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Serialize the dataset to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
