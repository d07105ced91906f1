//! Observation models - immutable metric readings and qualitative descriptors.

use serde::{Deserialize, Serialize};
use crate::id::{GoalId, MetricId, ObservationId};
use crate::metric::MetricKind;
use crate::Time;

/// Error resolving a raw observation value.
#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    /// A scale metric received a value that does not parse as a number
    #[error("not a numeric value: {0:?}")]
    NotNumeric(String),
}

/// A metric reading, resolved into a tagged value at ingestion.
///
/// Aggregation code matches on the variant and never re-parses raw strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationValue {
    /// Numeric reading on a scale metric
    Numeric(f64),
    /// Category label on an achievement metric
    Categorical(String),
}

impl ObservationValue {
    /// Resolve a raw string against the metric's kind.
    ///
    /// Scale metrics require a parseable number; achievement metrics take the
    /// label as-is (catalog-level validation is out of scope).
    pub fn resolve(raw: &str, kind: &MetricKind) -> Result<Self, ValueError> {
        match kind {
            MetricKind::Scale(_) => raw
                .trim()
                .parse::<f64>()
                .map(ObservationValue::Numeric)
                .map_err(|_| ValueError::NotNumeric(raw.to_string())),
            MetricKind::Achievement(_) => Ok(ObservationValue::Categorical(raw.trim().to_string())),
        }
    }

    /// Numeric value, if this is a numeric reading.
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            ObservationValue::Numeric(v) => Some(*v),
            ObservationValue::Categorical(_) => None,
        }
    }

    /// Category label, if this is a categorical reading.
    pub fn as_category(&self) -> Option<&str> {
        match self {
            ObservationValue::Categorical(s) => Some(s),
            ObservationValue::Numeric(_) => None,
        }
    }
}

/// A time-stamped metric reading tied to a participant's goal.
///
/// Append-only: never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricObservation {
    /// Unique identifier
    pub id: ObservationId,

    /// Metric observed
    pub metric_id: MetricId,

    /// Goal the reading is attached to
    pub goal_id: GoalId,

    /// Resolved value
    pub value: ObservationValue,

    /// Explicit backdate if provided, else the recording time
    pub effective_date: Time,

    /// When the record was created
    pub recorded_at: Time,
}

impl MetricObservation {
    /// Create an observation, defaulting `effective_date` to the recording time.
    pub fn new(
        metric_id: MetricId,
        goal_id: GoalId,
        value: ObservationValue,
        effective_date: Option<Time>,
    ) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: ObservationId::new(),
            metric_id,
            goal_id,
            value,
            effective_date: effective_date.unwrap_or(now),
            recorded_at: now,
        }
    }
}

/// Free-form progress signal recorded by staff alongside a note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualitativeObservation {
    /// Goal the signal is attached to
    pub goal_id: GoalId,

    /// Progress descriptor; notes may omit it
    pub descriptor: Option<ProgressDescriptor>,

    /// When the signal applies
    pub effective_date: Time,
}

/// Staff-observed progress descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressDescriptor {
    /// Things are getting harder
    Harder,
    /// Holding steady
    Holding,
    /// Starting to shift
    Shifting,
    /// In a good place
    GoodPlace,
}
