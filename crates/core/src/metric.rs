//! Metric catalog models - definitions, thresholds, and band classification.

use serde::{Deserialize, Serialize};
use crate::id::MetricId;

/// A metric definition from the program's catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricDefinition {
    /// Unique identifier
    pub id: MetricId,

    /// Display name
    pub name: String,

    /// Reporting category (e.g. "housing", "wellbeing")
    pub category: Option<String>,

    /// Universal metrics sort ahead of program-specific ones in reports
    pub universal: bool,

    /// Scale or achievement semantics
    pub kind: MetricKind,
}

impl MetricDefinition {
    /// The scale spec, if this is a scale metric.
    pub fn as_scale(&self) -> Option<&ScaleSpec> {
        match &self.kind {
            MetricKind::Scale(spec) => Some(spec),
            MetricKind::Achievement(_) => None,
        }
    }

    /// The achievement spec, if this is an achievement metric.
    pub fn as_achievement(&self) -> Option<&AchievementSpec> {
        match &self.kind {
            MetricKind::Achievement(spec) => Some(spec),
            MetricKind::Scale(_) => None,
        }
    }

    /// Sort key for report ordering: universal first, then category, then name.
    pub fn ordering_key(&self) -> (bool, String, String) {
        (
            !self.universal,
            self.category.clone().unwrap_or_default(),
            self.name.clone(),
        )
    }
}

/// Metric semantics. The enum keeps scale-only and achievement-only
/// fields mutually exclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MetricKind {
    /// Numeric scale with banded thresholds
    Scale(ScaleSpec),

    /// Categorical metric with designated success values
    Achievement(AchievementSpec),
}

/// Configuration for a scale (numeric) metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleSpec {
    /// Lowest valid value
    pub min_value: f64,

    /// Highest valid value
    pub max_value: f64,

    /// Upper bound of the low band; defaults to the lower third of the range
    pub threshold_low: Option<f64>,

    /// Lower bound of the high band; defaults to the upper third of the range
    pub threshold_high: Option<f64>,

    /// When false, a low raw score is the favorable signal
    pub higher_is_better: bool,
}

impl ScaleSpec {
    /// Effective band boundaries, falling back to thirds of the range.
    pub fn band_bounds(&self) -> (f64, f64) {
        let third = (self.max_value - self.min_value) / 3.0;
        let low = self.threshold_low.unwrap_or(self.min_value + third);
        let high = self.threshold_high.unwrap_or(self.max_value - third);
        (low, high)
    }

    /// Classify a value into a population band.
    ///
    /// Raw placement is by threshold; when `higher_is_better` is false the
    /// low/high assignment is mirrored so `Band::High` always means favorable.
    pub fn classify_band(&self, value: f64) -> Band {
        let (low, high) = self.band_bounds();
        let raw = if value <= low {
            Band::Low
        } else if value >= high {
            Band::High
        } else {
            Band::Mid
        };
        if self.higher_is_better {
            raw
        } else {
            raw.mirrored()
        }
    }

    /// The target value for achievement derivation: the favorable end of the range.
    pub fn target_value(&self) -> f64 {
        if self.higher_is_better {
            self.max_value
        } else {
            self.min_value
        }
    }

    /// Whether a value meets the target, respecting direction.
    pub fn meets_target(&self, value: f64) -> bool {
        if self.higher_is_better {
            value >= self.max_value
        } else {
            value <= self.min_value
        }
    }
}

/// Configuration for an achievement (categorical) metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementSpec {
    /// Allowed category labels
    pub options: Vec<String>,

    /// Labels counted as success
    pub success_values: Vec<String>,

    /// Target success rate for the population, percentage
    pub target_rate: Option<f64>,
}

impl AchievementSpec {
    /// Whether a category label counts as success.
    pub fn is_success(&self, value: &str) -> bool {
        self.success_values.iter().any(|v| v == value)
    }
}

/// Population band a scale value falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    /// Unfavorable segment
    Low,
    /// Middle segment
    Mid,
    /// Favorable segment
    High,
}

impl Band {
    /// Swap low and high, used for lower-is-better metrics.
    pub fn mirrored(self) -> Self {
        match self {
            Band::Low => Band::High,
            Band::Mid => Band::Mid,
            Band::High => Band::Low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale(low: Option<f64>, high: Option<f64>, higher_is_better: bool) -> ScaleSpec {
        ScaleSpec {
            min_value: 1.0,
            max_value: 5.0,
            threshold_low: low,
            threshold_high: high,
            higher_is_better,
        }
    }

    #[test]
    fn test_explicit_thresholds() {
        let spec = scale(Some(2.0), Some(4.0), true);
        assert_eq!(spec.classify_band(1.0), Band::Low);
        assert_eq!(spec.classify_band(2.0), Band::Low);
        assert_eq!(spec.classify_band(3.0), Band::Mid);
        assert_eq!(spec.classify_band(4.0), Band::High);
        assert_eq!(spec.classify_band(5.0), Band::High);
    }

    #[test]
    fn test_default_thirds() {
        // Range 1-5 splits at 1 + 4/3 and 5 - 4/3.
        let spec = scale(None, None, true);
        let (low, high) = spec.band_bounds();
        assert!((low - 7.0 / 3.0).abs() < 1e-9);
        assert!((high - 11.0 / 3.0).abs() < 1e-9);
        assert_eq!(spec.classify_band(2.0), Band::Low);
        assert_eq!(spec.classify_band(3.0), Band::Mid);
        assert_eq!(spec.classify_band(4.0), Band::High);
    }

    #[test]
    fn test_mirrored_when_lower_is_better() {
        let spec = scale(Some(2.0), Some(4.0), false);
        // A low raw score is the favorable band.
        assert_eq!(spec.classify_band(1.0), Band::High);
        assert_eq!(spec.classify_band(3.0), Band::Mid);
        assert_eq!(spec.classify_band(5.0), Band::Low);
    }

    #[test]
    fn test_target_direction() {
        let up = scale(None, None, true);
        assert!(up.meets_target(5.0));
        assert!(!up.meets_target(4.9));

        let down = scale(None, None, false);
        assert!(down.meets_target(1.0));
        assert!(!down.meets_target(1.1));
    }

    #[test]
    fn test_achievement_success_membership() {
        let spec = AchievementSpec {
            options: vec!["housed".into(), "at_risk".into(), "unhoused".into()],
            success_values: vec!["housed".into()],
            target_rate: None,
        };
        assert!(spec.is_success("housed"));
        assert!(!spec.is_success("at_risk"));
    }

    #[test]
    fn test_ordering_key_universal_first() {
        let mut a = MetricDefinition {
            id: MetricId::new(),
            name: "zeta".into(),
            category: Some("wellbeing".into()),
            universal: true,
            kind: MetricKind::Scale(scale(None, None, true)),
        };
        let b = MetricDefinition {
            id: MetricId::new(),
            name: "alpha".into(),
            category: Some("housing".into()),
            universal: false,
            kind: MetricKind::Scale(scale(None, None, true)),
        };
        assert!(a.ordering_key() < b.ordering_key());
        a.universal = false;
        assert!(a.ordering_key() > b.ordering_key());
    }
}
