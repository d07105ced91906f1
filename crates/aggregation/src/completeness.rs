//! Data completeness audit: enrollment vs. scored-participant coverage.

use std::sync::Arc;
use serde::Serialize;
use outcomes_core::{DateRange, ProgramId};
use outcomes_storage::OutcomeStore;

use crate::cohort::round1;
use crate::Result;

/// Coverage level bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletenessLevel {
    /// Above 80% of enrolled participants have scores
    Full,
    /// Between 50% and 80% inclusive
    Partial,
    /// Below 50%, or nobody enrolled
    Low,
}

impl CompletenessLevel {
    fn from_pct(pct: f64) -> Self {
        if pct > 80.0 {
            CompletenessLevel::Full
        } else if pct >= 50.0 {
            CompletenessLevel::Partial
        } else {
            CompletenessLevel::Low
        }
    }
}

/// Enrollment coverage for a program window.
#[derive(Debug, Clone, Serialize)]
pub struct CompletenessReport {
    /// Distinct participants actively enrolled during the window
    pub enrolled_count: usize,

    /// Distinct participants with at least one observation in the window
    pub with_scores_count: usize,

    /// Coverage percentage, one decimal; 0 when nobody is enrolled
    pub completeness_pct: f64,

    /// Coverage level
    pub level: CompletenessLevel,
}

/// Audits observation coverage against enrollment.
pub struct CompletenessAuditor {
    store: Arc<dyn OutcomeStore>,
}

impl CompletenessAuditor {
    /// Create an auditor over the given store.
    pub fn new(store: Arc<dyn OutcomeStore>) -> Self {
        Self { store }
    }

    /// Audit a program window.
    pub async fn audit(&self, program: &ProgramId, range: DateRange) -> Result<CompletenessReport> {
        tracing::debug!(%program, "auditing data completeness");

        let enrolled = self.store.active_participants(program, range).await?;
        let scored = self.store.scored_participants(program, range).await?;

        let enrolled_count = enrolled.len();
        let with_scores_count = scored.len();
        let completeness_pct = if enrolled_count == 0 {
            0.0
        } else {
            round1(with_scores_count as f64 * 100.0 / enrolled_count as f64)
        };

        Ok(CompletenessReport {
            enrolled_count,
            with_scores_count,
            completeness_pct,
            level: CompletenessLevel::from_pct(completeness_pct),
        })
    }
}
