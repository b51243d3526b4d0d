//! Turning a point gain into level ups.

use crate::LevelError;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Minimum time between two accepted gains for one member.
pub const GAIN_COOLDOWN: Duration = Duration::from_secs(15);
/// Threshold of a fresh record.
pub const BASE_XP_MAX: i64 = 100;
/// How much the threshold grows per level gained.
pub const XP_MAX_STEP: i64 = 100;

/// The part of a record the algorithm works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Standing {
    pub xp: i64,
    pub xp_max: i64,
    pub level: i64,
}

/// Result of applying one gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gain {
    pub before: Standing,
    pub after: Standing,
    pub levels_gained: i64,
}

impl Gain {
    #[must_use]
    pub fn leveled_up(&self) -> bool {
        self.levels_gained > 0
    }
}

/// Checks the cooldown, returns the Duration left if a cooldown is active.
#[must_use]
pub fn cooldown_remaining(last_gain: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<Duration> {
    let last_gain = last_gain?;
    // a clock that went backwards counts as no time having passed.
    let elapsed = (now - last_gain).to_std().unwrap_or(Duration::ZERO);

    GAIN_COOLDOWN.checked_sub(elapsed).filter(|left| !left.is_zero())
}

/// Adds `points * multiplier` to `standing`, carrying over as many levels as it covers.
///
/// A multiplier below one is treated as one.
pub fn apply_gain(standing: Standing, points: i64, multiplier: i64) -> Result<Gain, LevelError> {
    if standing.xp_max <= 0 || standing.xp < 0 || standing.xp >= standing.xp_max {
        return Err(LevelError::Invariant(format!(
            "record holds xp {} with threshold {}",
            standing.xp, standing.xp_max
        )));
    }
    if points <= 0 {
        return Err(LevelError::Validation("Points gained must be positive.".into()));
    }

    let too_large = || LevelError::Validation("That gain is too large to track.".into());
    let mut accumulated = points
        .checked_mul(multiplier.max(1))
        .and_then(|gain| gain.checked_add(standing.xp))
        .ok_or_else(too_large)?;

    let mut after = standing;
    let mut levels_gained = 0;
    while accumulated >= after.xp_max {
        let levels = accumulated / after.xp_max;
        accumulated -= after.xp_max * levels;
        after.xp_max = XP_MAX_STEP
            .checked_mul(levels)
            .and_then(|step| step.checked_add(after.xp_max))
            .ok_or_else(too_large)?;
        after.level = after.level.checked_add(levels).ok_or_else(too_large)?;
        levels_gained += levels;
    }
    after.xp = accumulated;

    Ok(Gain {
        before: standing,
        after,
        levels_gained,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn standing(xp: i64, xp_max: i64, level: i64) -> Standing {
        Standing { xp, xp_max, level }
    }

    #[test]
    fn small_gain_stays_on_level() {
        let gain = apply_gain(standing(10, 100, 1), 15, 1).unwrap();
        assert_eq!(gain.after, standing(25, 100, 1));
        assert!(!gain.leveled_up());
    }

    #[test]
    fn crossing_one_threshold() {
        let gain = apply_gain(standing(90, 100, 1), 25, 1).unwrap();
        assert_eq!(gain.after, standing(15, 200, 2));
        assert_eq!(gain.levels_gained, 1);
    }

    #[test]
    fn crossing_several_thresholds_at_once() {
        let gain = apply_gain(standing(0, 100, 1), 250, 1).unwrap();
        assert_eq!(gain.after, standing(50, 300, 3));
        assert_eq!(gain.levels_gained, 2);
    }

    #[test]
    fn landing_exactly_on_threshold_levels_up() {
        let gain = apply_gain(standing(80, 100, 4), 20, 1).unwrap();
        assert_eq!(gain.after, standing(0, 200, 5));
    }

    #[test]
    fn multiplier_scales_points() {
        let gain = apply_gain(standing(0, 100, 1), 20, 5).unwrap();
        assert_eq!(gain.after, standing(0, 200, 2));
    }

    #[test]
    fn multiplier_below_one_counts_as_one() {
        let gain = apply_gain(standing(0, 100, 1), 20, 0).unwrap();
        assert_eq!(gain.after, standing(20, 100, 1));
        let gain = apply_gain(standing(0, 100, 1), 20, -7).unwrap();
        assert_eq!(gain.after, standing(20, 100, 1));
    }

    #[test]
    fn xp_stays_below_threshold_for_any_gain() {
        let mut current = standing(0, BASE_XP_MAX, 1);
        for (i, points) in (1..=20).cycle().take(500).enumerate() {
            let multiplier = (i % 7) as i64 + 1;
            current = apply_gain(current, points * 13, multiplier).unwrap().after;
            assert!(current.xp >= 0 && current.xp < current.xp_max, "{current:?}");
        }
    }

    #[test]
    fn huge_gain_is_rejected_not_wrapped() {
        assert!(matches!(
            apply_gain(standing(0, 100, 1), i64::MAX, 2),
            Err(LevelError::Validation(_))
        ));
    }

    #[test]
    fn broken_records_are_invariant_violations() {
        assert!(matches!(
            apply_gain(standing(0, 0, 1), 5, 1),
            Err(LevelError::Invariant(_))
        ));
        assert!(matches!(
            apply_gain(standing(-1, 100, 1), 5, 1),
            Err(LevelError::Invariant(_))
        ));
    }

    #[test]
    fn non_positive_points_are_rejected() {
        assert!(matches!(
            apply_gain(standing(0, 100, 1), 0, 1),
            Err(LevelError::Validation(_))
        ));
    }

    #[test]
    fn cooldown_window() {
        let now = Utc::now();
        assert_eq!(cooldown_remaining(None, now), None);
        assert_eq!(
            cooldown_remaining(Some(now - TimeDelta::seconds(5)), now),
            Some(Duration::from_secs(10))
        );
        assert_eq!(cooldown_remaining(Some(now - TimeDelta::seconds(15)), now), None);
        assert_eq!(cooldown_remaining(Some(now - TimeDelta::seconds(60)), now), None);
        assert_eq!(
            cooldown_remaining(Some(now + TimeDelta::seconds(3)), now),
            Some(GAIN_COOLDOWN)
        );
    }
}
