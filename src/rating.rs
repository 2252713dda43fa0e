//! Pipeline orchestration: rounds → per-player metrics → pool-relative
//! classification → blended scores → role and location resolution. Classification
//! is the synchronisation point — thresholds are only cut once every player's
//! metrics for a subset are final.

use chrono::NaiveDate;
use tracing::debug;

use crate::blend::{self, BlendedScore};
use crate::classify::{ConsistencyRating, PerformanceRating, Thresholds, Tier, TrendRating};
use crate::config::Config;
use crate::metrics::{self, PlayerMetrics};
use crate::roles::{self, LocationPreference, PlayerType, Role};
use crate::rounds::{RoundStore, Subset};
use crate::stats::SliceExt;

/// One row of the ratings table. Rows whose [PlayerRating::blended] is `None`
/// are retained with an exclusion reason rather than silently dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRating {
    pub player_id: String,
    pub player_name: String,
    pub rounds_all: usize,
    pub rounds_home: usize,
    pub rounds_away: usize,
    pub rounds_per_week: f64,
    pub current_handicap_index: Option<f64>,
    pub avg_gap_all: Option<f64>,
    pub performance: Option<PerformanceRating>,
    pub trend: Option<TrendRating>,
    pub consistency: Option<ConsistencyRating>,
    pub cvs_all: Option<f64>,
    pub cvs_home: Option<f64>,
    pub blended: Option<BlendedScore>,
    pub role: Option<Role>,
    pub player_type: Option<PlayerType>,
    pub location: Option<LocationPreference>,
}

impl PlayerRating {
    pub fn performance_score(&self) -> Option<f64> {
        self.performance.map(PerformanceRating::score)
    }

    pub fn trend_score(&self) -> Option<f64> {
        self.trend.map(TrendRating::score)
    }

    pub fn consistency_score(&self) -> Option<f64> {
        self.consistency.map(ConsistencyRating::score)
    }

    /// Why this row carries no blended score, when it doesn't.
    pub fn exclusion_reason(&self) -> Option<&'static str> {
        if self.blended.is_some() {
            return None;
        }
        if self.consistency.is_none() {
            Some("fewer than 2 rounds")
        } else {
            Some("no trend sample on both sides of the split")
        }
    }
}

/// Tier per classified metric for one player within one subset.
#[derive(Debug, Clone, Copy, Default)]
struct SubsetTiers {
    performance: Option<Tier>,
    trend: Option<Tier>,
    consistency: Option<Tier>,
}

/// Runs the full rating pipeline over every player with at least one round in
/// the window, producing a deterministically ordered table.
pub fn rate(store: &RoundStore, config: &Config, now: NaiveDate) -> Vec<PlayerRating> {
    let windows = store.windows(now, config.window_weeks);
    let metrics: Vec<_> = windows
        .iter()
        .map(|window| metrics::compute(window, now, config.window_weeks, config.consistency_factor))
        .collect();
    debug!("rating {} players as of {now}", metrics.len());

    let all_tiers = classify_subset(&metrics, Subset::All, config, |_| true);
    let home_tiers = classify_subset(&metrics, Subset::Home, config, |m| {
        m.home.rounds >= config.min_rounds_per_side
    });

    let median_hi = {
        let pool: Vec<f64> = metrics
            .iter()
            .zip(all_tiers.iter())
            .filter(|(_, tiers)| tiers.consistency.is_some())
            .filter_map(|(m, _)| m.current_handicap_index)
            .collect();
        pool.median()
    };
    let median_adjusted_stdev = {
        let pool: Vec<f64> = metrics.iter().filter_map(|m| m.adjusted_stdev).collect();
        pool.median()
    };

    let mut ratings: Vec<_> = metrics
        .iter()
        .zip(all_tiers.iter().zip(home_tiers.iter()))
        .map(|(m, (all, home))| build_rating(m, all, home, median_hi, median_adjusted_stdev, config))
        .collect();

    ratings.sort_by(|a, b| {
        let a_score = a.blended.map(|blended| blended.value).unwrap_or(f64::MIN);
        let b_score = b.blended.map(|blended| blended.value).unwrap_or(f64::MIN);
        b_score
            .total_cmp(&a_score)
            .then_with(|| a.player_name.cmp(&b.player_name))
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
    ratings
}

fn build_rating(
    m: &PlayerMetrics,
    all: &SubsetTiers,
    home: &SubsetTiers,
    median_hi: Option<f64>,
    median_adjusted_stdev: Option<f64>,
    config: &Config,
) -> PlayerRating {
    let cvs_all = blend::combined_value_score(
        all.performance.map(Tier::score),
        all.consistency.map(Tier::score),
        all.trend.map(Tier::score),
        &config.score_weights,
    );
    let cvs_home = blend::combined_value_score(
        home.performance.map(Tier::score),
        home.consistency.map(Tier::score),
        home.trend.map(Tier::score),
        &config.score_weights,
    );
    let blended = blend::blend(cvs_home, cvs_all, config.home_blend_weight);

    let consistency: Option<ConsistencyRating> = all.consistency.map(Into::into);
    let role = match (
        consistency.map(ConsistencyRating::score),
        m.current_handicap_index,
        median_hi,
    ) {
        (Some(score), Some(hi), Some(median)) => Some(roles::role(score, hi, median)),
        _ => None,
    };
    let player_type = match (m.adjusted_stdev, median_adjusted_stdev) {
        (Some(adjusted), Some(median)) => Some(roles::player_type(adjusted, median)),
        _ => None,
    };
    let location = roles::location_preference(&m.home, &m.away, config.min_rounds_per_side);

    PlayerRating {
        player_id: m.player_id.clone(),
        player_name: m.player_name.clone(),
        rounds_all: m.all.rounds,
        rounds_home: m.home.rounds,
        rounds_away: m.away.rounds,
        rounds_per_week: m.rounds_per_week,
        current_handicap_index: m.current_handicap_index,
        avg_gap_all: m.all.avg_gap,
        performance: all.performance.map(Into::into),
        trend: all.trend.map(Into::into),
        consistency,
        cvs_all,
        cvs_home,
        blended,
        role,
        player_type,
        location,
    }
}

/// Cuts thresholds for one subset over the eligible pool and tiers every
/// eligible player against them. Ineligible players and undefined metrics yield
/// `None` tiers.
fn classify_subset(
    metrics: &[PlayerMetrics],
    subset: Subset,
    config: &Config,
    eligible: impl Fn(&PlayerMetrics) -> bool,
) -> Vec<SubsetTiers> {
    let pool = |pick: fn(&crate::metrics::SubsetMetrics) -> Option<f64>| -> Vec<f64> {
        metrics
            .iter()
            .filter(|m| eligible(m))
            .filter_map(|m| pick(m.subset(subset)))
            .collect()
    };
    let performance = Thresholds::over_pool(&pool(|s| s.avg_gap), &config.cut_points);
    let trend = Thresholds::over_pool(&pool(|s| s.trend_change), &config.cut_points);
    let consistency = Thresholds::over_pool(&pool(|s| s.stdev_gap), &config.cut_points);
    debug!(
        "classified {subset} over {} eligible players",
        metrics.iter().filter(|m| eligible(m)).count()
    );

    metrics
        .iter()
        .map(|m| {
            if !eligible(m) {
                return SubsetTiers::default();
            }
            let s = m.subset(subset);
            SubsetTiers {
                performance: tier_of(&performance, s.avg_gap),
                trend: tier_of(&trend, s.trend_change),
                consistency: tier_of(&consistency, s.stdev_gap),
            }
        })
        .collect()
}

fn tier_of(thresholds: &Option<Thresholds>, value: Option<f64>) -> Option<Tier> {
    match (thresholds, value) {
        (Some(thresholds), Some(value)) => Some(thresholds.tier(value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blend::BlendBasis;
    use crate::testing::round_on;

    fn now() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    /// Five players; gaps ordered alice < bob < carol < dan. erin has a single
    /// round and no classifiable consistency or trend.
    fn league() -> RoundStore {
        let mut rounds = vec![];
        for (player, base_gap) in [("alice", 0.0), ("bob", 1.0), ("carol", 2.0), ("dan", 3.0)] {
            for (date, wobble) in [
                ("2024-03-10", 0.2),
                ("2024-03-24", -0.2),
                ("2024-05-12", 0.2),
                ("2024-05-26", -0.2),
            ] {
                rounds.push(round_on(player, date, true, 10.0 + base_gap + wobble, 10.0));
            }
            // a few away rounds so location preference can resolve
            for date in ["2024-03-17", "2024-04-21", "2024-05-19"] {
                rounds.push(round_on(player, date, false, 12.0 + base_gap, 10.0));
            }
        }
        rounds.push(round_on("erin", "2024-05-26", true, 12.0, 10.0));
        RoundStore::from_records(rounds)
    }

    #[test]
    fn table_ordered_by_blended_then_name() {
        let ratings = rate(&league(), &Config::default(), now());
        assert_eq!(5, ratings.len());
        let scored: Vec<_> = ratings.iter().filter(|r| r.blended.is_some()).collect();
        for pair in scored.windows(2) {
            assert!(
                pair[0].blended.unwrap().value >= pair[1].blended.unwrap().value,
                "table must be ordered by blended score"
            );
        }
        // erin has no blended score and sinks to the bottom with a reason
        assert_eq!("erin", ratings.last().unwrap().player_name);
        assert!(ratings.last().unwrap().exclusion_reason().is_some());
    }

    #[test]
    fn blended_requires_all_three_ratings() {
        for rating in rate(&league(), &Config::default(), now()) {
            if rating.blended.is_some() {
                assert!(rating.performance.is_some(), "{}", rating.player_name);
                assert!(rating.trend.is_some(), "{}", rating.player_name);
                assert!(rating.consistency.is_some(), "{}", rating.player_name);
            }
        }
    }

    #[test]
    fn best_gap_earns_best_performance() {
        let ratings = rate(&league(), &Config::default(), now());
        let alice = ratings.iter().find(|r| r.player_name == "alice").unwrap();
        let dan = ratings.iter().find(|r| r.player_name == "dan").unwrap();
        assert_eq!(Some(PerformanceRating::Excellent), alice.performance);
        assert_eq!(Some(PerformanceRating::Poor), dan.performance);
        assert!(alice.blended.unwrap().value > dan.blended.unwrap().value);
    }

    #[test]
    fn home_blend_flagged_when_home_sample_thin() {
        let mut rounds = vec![];
        for (player, base_gap) in [("alice", 0.0), ("bob", 1.0), ("carol", 2.0)] {
            for (date, home) in [
                ("2024-03-10", true),
                ("2024-03-24", true),
                ("2024-05-12", true),
                ("2024-05-26", true),
            ] {
                rounds.push(round_on(player, date, home, 10.0 + base_gap, 10.0));
            }
        }
        // dan plays enough, but only twice at home
        for (date, home) in [
            ("2024-03-10", true),
            ("2024-03-24", false),
            ("2024-04-07", false),
            ("2024-05-12", true),
            ("2024-05-26", false),
        ] {
            rounds.push(round_on("dan", date, home, 11.5, 10.0));
        }
        let ratings = rate(&RoundStore::from_records(rounds), &Config::default(), now());
        let alice = ratings.iter().find(|r| r.player_name == "alice").unwrap();
        let dan = ratings.iter().find(|r| r.player_name == "dan").unwrap();
        assert_eq!(BlendBasis::HomeAndAll, alice.blended.unwrap().basis);
        assert_eq!(None, dan.cvs_home);
        assert_eq!(BlendBasis::AllOnly, dan.blended.unwrap().basis);
        assert_eq!(dan.cvs_all, Some(dan.blended.unwrap().value));
    }

    #[test]
    fn reruns_are_identical() {
        let store = league();
        let config = Config::default();
        assert_eq!(rate(&store, &config, now()), rate(&store, &config, now()));
    }
}
