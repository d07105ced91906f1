//! Shared per-participant reduction used by the distribution, trend, and
//! two-lens aggregators.
//!
//! The reduction guarantees each participant contributes at most one unit to
//! a population: latest numeric reading per goal, then the median across the
//! participant's goals.

use std::collections::HashMap;
use outcomes_core::{Band, GoalId, ParticipantId, ScaleSpec, Time};
use outcomes_storage::ObservationRow;

/// Minimum included participants for a metric (or month) to be reported.
pub(crate) const MIN_POPULATION: usize = 10;

/// Band counts below this render as the suppression marker.
pub(crate) const SUPPRESS_BELOW: usize = 5;

/// Round to one decimal place.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Result of reducing a window of observation rows.
pub(crate) struct CohortReduction {
    /// One median value per included participant
    pub medians: Vec<(ParticipantId, f64)>,

    /// Participants excluded for having a single reading in the window
    pub new_participants: usize,
}

/// Reduce rows to one value per participant.
///
/// Non-numeric readings on a scale metric are skipped and logged. When
/// `exclude_single` is set, a participant with exactly one reading across the
/// window and all their goals is counted as "new" instead of included.
pub(crate) fn reduce_latest_median(rows: &[ObservationRow], exclude_single: bool) -> CohortReduction {
    // participant -> goal -> latest (effective_date, value)
    let mut per_participant: HashMap<&ParticipantId, HashMap<GoalId, (Time, f64)>> = HashMap::new();
    let mut reading_counts: HashMap<&ParticipantId, usize> = HashMap::new();

    for row in rows {
        let Some(value) = row.value.as_numeric() else {
            tracing::warn!(
                goal_id = %row.goal_id,
                "non-numeric reading on scale metric, skipping"
            );
            continue;
        };
        *reading_counts.entry(&row.participant_id).or_default() += 1;
        let latest = per_participant
            .entry(&row.participant_id)
            .or_default()
            .entry(row.goal_id);
        latest
            .and_modify(|slot| {
                if row.effective_date >= slot.0 {
                    *slot = (row.effective_date, value);
                }
            })
            .or_insert((row.effective_date, value));
    }

    let mut medians = Vec::new();
    let mut new_participants = 0;
    for (participant, goals) in per_participant {
        if exclude_single && reading_counts.get(participant).copied() == Some(1) {
            new_participants += 1;
            continue;
        }
        let mut values: Vec<f64> = goals.values().map(|(_, v)| *v).collect();
        values.sort_by(|a, b| a.total_cmp(b));
        medians.push((participant.clone(), median_of_sorted(&values)));
    }

    CohortReduction {
        medians,
        new_participants,
    }
}

fn median_of_sorted(values: &[f64]) -> f64 {
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}

/// Band counts for a reduced cohort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BandTally {
    pub low: usize,
    pub mid: usize,
    pub high: usize,
}

impl BandTally {
    /// Included participants across all bands.
    pub fn total(&self) -> usize {
        self.low + self.mid + self.high
    }
}

/// Classify each participant median into a band and tally.
pub(crate) fn tally_bands(spec: &ScaleSpec, medians: &[(ParticipantId, f64)]) -> BandTally {
    let mut tally = BandTally::default();
    for (_, value) in medians {
        match spec.classify_band(*value) {
            Band::Low => tally.low += 1,
            Band::Mid => tally.mid += 1,
            Band::High => tally.high += 1,
        }
    }
    tally
}
