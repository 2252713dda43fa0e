//! Role and location resolution: pairing-role labels from handicap level and
//! consistency, the Steady/Explosive axis from adjusted deviation, and the
//! home/away preference from the side-to-side performance gap.

use crate::metrics::SubsetMetrics;

/// Consistency score below which a player is too unpredictable for a fixed role.
const DEPENDABLE_SCORE_FLOOR: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Role {
    Anchor,
    Gunner,
    Wildcard,
}

/// Separate axis from [Role]: shot-to-shot volatility once handicap is
/// discounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum PlayerType {
    Steady,
    Explosive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum LocationPreference {
    #[strum(serialize = "HOME (Strong)")]
    HomeStrong,
    #[strum(serialize = "HOME")]
    Home,
    #[strum(serialize = "ANY")]
    Any,
    #[strum(serialize = "AWAY")]
    Away,
    #[strum(serialize = "AWAY (Strong)")]
    AwayStrong,
}

impl LocationPreference {
    pub fn leans_home(&self) -> bool {
        matches!(self, LocationPreference::HomeStrong | LocationPreference::Home)
    }

    pub fn leans_away(&self) -> bool {
        matches!(self, LocationPreference::AwayStrong | LocationPreference::Away)
    }
}

/// Inconsistency trumps handicap; among the dependable, the lower-handicap half
/// of the pool anchors.
pub fn role(consistency_score: f64, handicap_index: f64, median_hi: f64) -> Role {
    if consistency_score < DEPENDABLE_SCORE_FLOOR {
        Role::Wildcard
    } else if handicap_index < median_hi {
        Role::Anchor
    } else {
        Role::Gunner
    }
}

/// Ties at the median resolve toward Steady.
pub fn player_type(adjusted_stdev: f64, median_adjusted_stdev: f64) -> PlayerType {
    if adjusted_stdev <= median_adjusted_stdev {
        PlayerType::Steady
    } else {
        PlayerType::Explosive
    }
}

/// Requires `min_rounds_per_side` on each of HOME and AWAY; a big sample on one
/// side cannot compensate for a thin one on the other. Bucket boundaries are
/// inclusive toward the stronger label.
pub fn location_preference(
    home: &SubsetMetrics,
    away: &SubsetMetrics,
    min_rounds_per_side: usize,
) -> Option<LocationPreference> {
    if home.rounds < min_rounds_per_side || away.rounds < min_rounds_per_side {
        return None;
    }
    let (home_gap, away_gap) = (home.avg_gap?, away.avg_gap?);
    let advantage = away_gap - home_gap;
    Some(if advantage >= 1.0 {
        LocationPreference::HomeStrong
    } else if advantage >= 0.5 {
        LocationPreference::Home
    } else if advantage > -0.5 {
        LocationPreference::Any
    } else if advantage > -1.0 {
        LocationPreference::Away
    } else {
        LocationPreference::AwayStrong
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side(rounds: usize, avg_gap: f64) -> SubsetMetrics {
        SubsetMetrics {
            rounds,
            avg_gap: Some(avg_gap),
            ..SubsetMetrics::default()
        }
    }

    #[test]
    fn inconsistency_overrides_handicap() {
        assert_eq!(Role::Wildcard, role(4.0, 2.0, 15.0));
        assert_eq!(Role::Anchor, role(6.0, 2.0, 15.0));
    }

    #[test]
    fn handicap_splits_the_dependable() {
        assert_eq!(Role::Anchor, role(8.0, 10.0, 15.0));
        assert_eq!(Role::Gunner, role(8.0, 20.0, 15.0));
        // exactly at the median counts as the higher-handicap half
        assert_eq!(Role::Gunner, role(8.0, 15.0, 15.0));
    }

    #[test]
    fn median_adjusted_stdev_ties_toward_steady() {
        assert_eq!(PlayerType::Steady, player_type(2.5, 2.5));
        assert_eq!(PlayerType::Steady, player_type(1.0, 2.5));
        assert_eq!(PlayerType::Explosive, player_type(2.6, 2.5));
    }

    #[test]
    fn minimum_applies_per_side() {
        // plenty of away rounds cannot rescue a two-round home sample
        assert_eq!(None, location_preference(&side(2, 1.0), &side(10, 3.0), 3));
        assert_eq!(None, location_preference(&side(10, 1.0), &side(2, 3.0), 3));
        assert!(location_preference(&side(3, 1.0), &side(3, 3.0), 3).is_some());
    }

    #[test]
    fn boundaries_lean_toward_the_stronger_label() {
        let at = |advantage: f64| {
            location_preference(&side(5, 0.0), &side(5, advantage), 3).unwrap()
        };
        assert_eq!(LocationPreference::HomeStrong, at(1.5));
        assert_eq!(LocationPreference::HomeStrong, at(1.0));
        assert_eq!(LocationPreference::Home, at(0.5));
        assert_eq!(LocationPreference::Any, at(0.49));
        assert_eq!(LocationPreference::Any, at(0.0));
        assert_eq!(LocationPreference::Any, at(-0.49));
        assert_eq!(LocationPreference::Away, at(-0.5));
        assert_eq!(LocationPreference::AwayStrong, at(-1.0));
        assert_eq!(LocationPreference::AwayStrong, at(-2.0));
    }
}
