//! Pure status-derivation rules.
//!
//! These functions take the observation history and decide a status; all
//! storage and locking concerns live in the engine.

use outcomes_core::{AchievementStatus, ProgressDescriptor, ScaleSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Improved,
    Worsened,
    Flat,
}

fn direction(prev: f64, next: f64, higher_is_better: bool) -> Direction {
    if next == prev {
        Direction::Flat
    } else if (next > prev) == higher_is_better {
        Direction::Improved
    } else {
        Direction::Worsened
    }
}

/// Derive a status from a goal's numeric reading history, in recording order.
///
/// The target test comes first: a latest reading at the favorable end of the
/// range is achieved (or sustaining after a prior achievement), and falling
/// back off a previously met target is worsening. Otherwise the sparse-data
/// rule applies: one reading gives no signal, two give a direct pairwise
/// direction, three or more are judged by the last two deltas.
pub fn quantitative_status(
    points: &[f64],
    spec: &ScaleSpec,
    achieved_once: bool,
) -> AchievementStatus {
    let Some(&latest) = points.last() else {
        return AchievementStatus::InProgress;
    };

    if spec.meets_target(latest) {
        return if achieved_once {
            AchievementStatus::Sustaining
        } else {
            AchievementStatus::Achieved
        };
    }
    if points[..points.len() - 1].iter().any(|p| spec.meets_target(*p)) {
        return AchievementStatus::Worsening;
    }

    match points {
        [_] => AchievementStatus::InProgress,
        [prev, next] => match direction(*prev, *next, spec.higher_is_better) {
            Direction::Improved => AchievementStatus::Improving,
            Direction::Worsened => AchievementStatus::Worsening,
            Direction::Flat => AchievementStatus::NoChange,
        },
        _ => {
            let recent = &points[points.len() - 3..];
            let first = direction(recent[0], recent[1], spec.higher_is_better);
            let second = direction(recent[1], recent[2], spec.higher_is_better);
            // Majority vote over the two deltas; the three points carry
            // equal weight, with no extra weight on recency.
            match (first, second) {
                (Direction::Improved, Direction::Improved) => AchievementStatus::Improving,
                (Direction::Worsened, Direction::Worsened) => AchievementStatus::Worsening,
                _ => AchievementStatus::NoChange,
            }
        }
    }
}

/// Derive a status from the most recent staff descriptor.
pub fn qualitative_status(
    descriptor: Option<ProgressDescriptor>,
    achieved_once: bool,
) -> AchievementStatus {
    match descriptor {
        None => AchievementStatus::InProgress,
        Some(ProgressDescriptor::Harder) => AchievementStatus::Worsening,
        Some(ProgressDescriptor::Holding) => AchievementStatus::NoChange,
        Some(ProgressDescriptor::Shifting) => AchievementStatus::Improving,
        Some(ProgressDescriptor::GoodPlace) => {
            if achieved_once {
                AchievementStatus::Sustaining
            } else {
                AchievementStatus::Achieved
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(higher_is_better: bool) -> ScaleSpec {
        ScaleSpec {
            min_value: 0.0,
            max_value: 10.0,
            threshold_low: None,
            threshold_high: None,
            higher_is_better,
        }
    }

    #[test]
    fn test_no_points_is_in_progress() {
        assert_eq!(
            quantitative_status(&[], &spec(true), false),
            AchievementStatus::InProgress
        );
    }

    #[test]
    fn test_single_point_is_in_progress() {
        assert_eq!(
            quantitative_status(&[4.0], &spec(true), false),
            AchievementStatus::InProgress
        );
    }

    #[test]
    fn test_two_points_pairwise() {
        assert_eq!(
            quantitative_status(&[3.0, 6.0], &spec(true), false),
            AchievementStatus::Improving
        );
        assert_eq!(
            quantitative_status(&[6.0, 3.0], &spec(true), false),
            AchievementStatus::Worsening
        );
        assert_eq!(
            quantitative_status(&[4.0, 4.0], &spec(true), false),
            AchievementStatus::NoChange
        );
        // Direction respects lower-is-better.
        assert_eq!(
            quantitative_status(&[6.0, 3.0], &spec(false), false),
            AchievementStatus::Improving
        );
    }

    #[test]
    fn test_three_point_vote() {
        assert_eq!(
            quantitative_status(&[6.0, 4.0, 2.0], &spec(true), false),
            AchievementStatus::Worsening
        );
        assert_eq!(
            quantitative_status(&[2.0, 4.0, 6.0], &spec(true), false),
            AchievementStatus::Improving
        );
        // Mixed deltas are no change.
        assert_eq!(
            quantitative_status(&[2.0, 6.0, 4.0], &spec(true), false),
            AchievementStatus::NoChange
        );
        // Only the last three points are considered.
        assert_eq!(
            quantitative_status(&[9.0, 1.0, 2.0, 3.0], &spec(true), false),
            AchievementStatus::Improving
        );
    }

    #[test]
    fn test_target_achieved_then_sustaining() {
        assert_eq!(
            quantitative_status(&[5.0, 10.0], &spec(true), false),
            AchievementStatus::Achieved
        );
        assert_eq!(
            quantitative_status(&[5.0, 10.0, 10.0], &spec(true), true),
            AchievementStatus::Sustaining
        );
    }

    #[test]
    fn test_fell_off_target_is_worsening() {
        // Previously met the target, latest no longer does; the pairwise
        // rule alone would call 10 -> 8 -> 9 mixed, but the target rule wins.
        assert_eq!(
            quantitative_status(&[10.0, 8.0, 9.0], &spec(true), true),
            AchievementStatus::Worsening
        );
    }

    #[test]
    fn test_target_for_lower_is_better() {
        assert_eq!(
            quantitative_status(&[5.0, 0.0], &spec(false), false),
            AchievementStatus::Achieved
        );
        assert_eq!(
            quantitative_status(&[0.0, 4.0], &spec(false), false),
            AchievementStatus::Worsening
        );
    }

    #[test]
    fn test_qualitative_mapping() {
        assert_eq!(
            qualitative_status(Some(ProgressDescriptor::Harder), false),
            AchievementStatus::Worsening
        );
        assert_eq!(
            qualitative_status(Some(ProgressDescriptor::Holding), false),
            AchievementStatus::NoChange
        );
        assert_eq!(
            qualitative_status(Some(ProgressDescriptor::Shifting), false),
            AchievementStatus::Improving
        );
        assert_eq!(
            qualitative_status(Some(ProgressDescriptor::GoodPlace), false),
            AchievementStatus::Achieved
        );
        assert_eq!(
            qualitative_status(Some(ProgressDescriptor::GoodPlace), true),
            AchievementStatus::Sustaining
        );
        assert_eq!(qualitative_status(None, false), AchievementStatus::InProgress);
    }
}
