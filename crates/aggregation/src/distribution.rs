//! Population band distributions for scale metrics.

use std::collections::HashSet;
use std::sync::Arc;
use serde::Serialize;
use outcomes_core::{DateRange, MetricDefinition, MetricId, ProgramId};
use outcomes_storage::{MetricCatalog, OutcomeStore};

use crate::cohort::{
    reduce_latest_median, round1, tally_bands, BandTally, MIN_POPULATION, SUPPRESS_BELOW,
};
use crate::Result;

/// A band count, suppressed below the privacy threshold.
///
/// Suppressed counts serialize and display as the literal `"<5"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandCount {
    /// Count large enough to disclose
    Exact(usize),
    /// Count below the suppression threshold
    Suppressed,
}

impl BandCount {
    fn from_count(count: usize) -> Self {
        if count < SUPPRESS_BELOW {
            BandCount::Suppressed
        } else {
            BandCount::Exact(count)
        }
    }
}

impl std::fmt::Display for BandCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BandCount::Exact(n) => n.fmt(f),
            BandCount::Suppressed => "<5".fmt(f),
        }
    }
}

impl Serialize for BandCount {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            BandCount::Exact(n) => serializer.serialize_u64(*n as u64),
            BandCount::Suppressed => serializer.serialize_str("<5"),
        }
    }
}

/// One band's share of the population.
#[derive(Debug, Clone, Serialize)]
pub struct BandBreakdown {
    /// Participant count, possibly suppressed
    pub count: BandCount,

    /// Share of included participants, one decimal
    pub pct: f64,
}

/// Band distribution of one metric across a program's population.
#[derive(Debug, Clone, Serialize)]
pub struct DistributionReport {
    /// Metric reported on
    pub metric_id: MetricId,

    /// Metric display name
    pub metric_name: String,

    /// Reporting category
    pub category: Option<String>,

    /// Whether the metric is universal
    pub universal: bool,

    /// Included participants
    pub total: usize,

    /// Participants excluded as new (single reading in the window)
    pub new_participants: usize,

    /// Unfavorable band
    pub band_low: BandBreakdown,

    /// Middle band
    pub band_mid: BandBreakdown,

    /// Favorable band
    pub band_high: BandBreakdown,
}

fn breakdown(count: usize, total: usize) -> BandBreakdown {
    BandBreakdown {
        count: BandCount::from_count(count),
        pct: round1(count as f64 * 100.0 / total as f64),
    }
}

/// Computes population band distributions.
pub struct DistributionAggregator {
    catalog: Arc<dyn MetricCatalog>,
    store: Arc<dyn OutcomeStore>,
}

impl DistributionAggregator {
    /// Create an aggregator over the given repositories.
    pub fn new(catalog: Arc<dyn MetricCatalog>, store: Arc<dyn OutcomeStore>) -> Self {
        Self { catalog, store }
    }

    /// Band distributions for every scale metric linked to a goal in the
    /// program, ordered universal-first, then category, then name. Metrics
    /// with fewer than 10 included participants are omitted.
    pub async fn distributions(
        &self,
        program: &ProgramId,
        range: DateRange,
    ) -> Result<Vec<DistributionReport>> {
        tracing::debug!(%program, "computing metric distributions");

        let mut metrics = self.linked_scale_metrics(program).await?;
        metrics.sort_by_key(|m| m.ordering_key());

        let mut reports = Vec::new();
        for metric in &metrics {
            if let Some(report) = self.distribution_for_metric(metric, program, range).await? {
                reports.push(report);
            }
        }
        Ok(reports)
    }

    /// Distribution for a single scale metric; `None` when the included
    /// population is below the reporting minimum.
    pub async fn distribution_for_metric(
        &self,
        metric: &MetricDefinition,
        program: &ProgramId,
        range: DateRange,
    ) -> Result<Option<DistributionReport>> {
        let Some(spec) = metric.as_scale() else {
            return Ok(None);
        };

        let rows = self.store.observations(metric.id, program, range).await?;
        let reduced = reduce_latest_median(&rows, true);
        if reduced.medians.len() < MIN_POPULATION {
            return Ok(None);
        }

        let tally: BandTally = tally_bands(spec, &reduced.medians);
        let total = tally.total();
        Ok(Some(DistributionReport {
            metric_id: metric.id,
            metric_name: metric.name.clone(),
            category: metric.category.clone(),
            universal: metric.universal,
            total,
            new_participants: reduced.new_participants,
            band_low: breakdown(tally.low, total),
            band_mid: breakdown(tally.mid, total),
            band_high: breakdown(tally.high, total),
        }))
    }

    /// Scale metric definitions linked to at least one goal in the program.
    /// Goals referencing missing definitions are skipped.
    pub(crate) async fn linked_scale_metrics(
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
                        if metric.as_scale().is_some() {
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
