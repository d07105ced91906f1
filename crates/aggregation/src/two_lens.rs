//! Two-lens comparison: self-reported confidence vs. staff-observed signal.

use std::sync::Arc;
use serde::Serialize;
use outcomes_core::{DateRange, ProgramId, ProgressDescriptor};
use outcomes_storage::{MetricCatalog, OutcomeStore};

use crate::cohort::{round1, MIN_POPULATION};
use crate::distribution::DistributionAggregator;
use crate::Result;

/// Which lens reads higher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapDirection {
    /// Participants rate themselves above the staff-observed signal
    ParticipantsHigher,
    /// Staff observe more progress than participants report
    StaffHigher,
    /// The two lenses agree
    Aligned,
}

/// Outcome of the two-lens comparison.
///
/// Either stream below its population minimum yields the explicit
/// insufficient-data variant, never a partial number.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TwoLensReport {
    /// One or both streams are below the reporting minimum
    InsufficientData {
        /// Included participants in the self-report distribution
        self_report_total: usize,
        /// Qualitative observations with a descriptor in the window
        staff_observed_total: usize,
    },
    /// Both streams cleared the minimum
    Comparison {
        /// High-band share of the confidence metric distribution
        self_report_pct: f64,
        /// Share of staff descriptors marking a good place
        staff_observed_pct: f64,
        /// Self-report minus staff-observed, one decimal
        gap_pct: f64,
        /// Sign of the gap, no dead-band
        direction: GapDirection,
    },
}

/// Compares the self-report and staff-observed lenses.
pub struct TwoLensComparator {
    catalog: Arc<dyn MetricCatalog>,
    store: Arc<dyn OutcomeStore>,
    distributions: DistributionAggregator,
}

impl TwoLensComparator {
    /// Create a comparator over the given repositories.
    pub fn new(catalog: Arc<dyn MetricCatalog>, store: Arc<dyn OutcomeStore>) -> Self {
        Self {
            catalog: catalog.clone(),
            store: store.clone(),
            distributions: DistributionAggregator::new(catalog, store),
        }
    }

    /// Run the comparison for a program window.
    pub async fn compare(&self, program: &ProgramId, range: DateRange) -> Result<TwoLensReport> {
        tracing::debug!(%program, "computing two-lens comparison");

        let descriptors: Vec<ProgressDescriptor> = self
            .store
            .qualitative_for_program(program, range)
            .await?
            .into_iter()
            .filter_map(|q| q.descriptor)
            .collect();
        let staff_observed_total = descriptors.len();

        let self_report = match self.catalog.confidence_metric().await? {
            Some(metric_id) => match self.catalog.metric(metric_id).await? {
                Some(metric) => {
                    self.distributions
                        .distribution_for_metric(&metric, program, range)
                        .await?
                }
                None => {
                    tracing::warn!(%metric_id, "configured confidence metric has no definition");
                    None
                }
            },
            None => None,
        };

        let Some(self_report) = self_report else {
            return Ok(TwoLensReport::InsufficientData {
                self_report_total: 0,
                staff_observed_total,
            });
        };
        if staff_observed_total < MIN_POPULATION {
            return Ok(TwoLensReport::InsufficientData {
                self_report_total: self_report.total,
                staff_observed_total,
            });
        }

        let self_report_pct = self_report.band_high.pct;
        let good_place = descriptors
            .iter()
            .filter(|d| **d == ProgressDescriptor::GoodPlace)
            .count();
        let staff_observed_pct = round1(good_place as f64 * 100.0 / staff_observed_total as f64);

        let gap_pct = round1(self_report_pct - staff_observed_pct);
        let direction = if gap_pct > 0.0 {
            GapDirection::ParticipantsHigher
        } else if gap_pct < 0.0 {
            GapDirection::StaffHigher
        } else {
            GapDirection::Aligned
        };

        Ok(TwoLensReport::Comparison {
            self_report_pct,
            staff_observed_pct,
            gap_pct,
            direction,
        })
    }
}
