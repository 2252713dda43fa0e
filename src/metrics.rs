//! The metric calculator: per-player scalar metrics derived from a
//! [PlayerWindow](crate::rounds::PlayerWindow), separately for the ALL, HOME and
//! AWAY slices. Pure per-player computation with no cross-player coupling.

use chrono::{Duration, NaiveDate};

use crate::rounds::{PlayerWindow, Subset};
use crate::stats::SliceExt;

/// Recency horizon splitting a subset's rounds into the trend's recent and
/// oldest slices, measured back from the analysis instant.
const TREND_SPLIT_WEEKS: i64 = 6;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubsetMetrics {
    pub rounds: usize,
    /// Mean of differential − open HI; lower is better. `None` without rounds.
    pub avg_gap: Option<f64>,
    /// Sample standard deviation of the gap; `None` below two rounds.
    pub stdev_gap: Option<f64>,
    /// Recent-vs-oldest mean-gap change damped by [Self::trend_confidence];
    /// `None` whenever either slice is empty.
    pub trend_change: Option<f64>,
    /// min/max ratio of the two slice counts; 0 when either slice is empty.
    pub trend_confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMetrics {
    pub player_id: String,
    pub player_name: String,
    pub all: SubsetMetrics,
    pub home: SubsetMetrics,
    pub away: SubsetMetrics,
    /// Mean open handicap index across the window.
    pub current_handicap_index: Option<f64>,
    /// stdev(ALL) + handicap × consistency factor; the Steady/Explosive signal.
    pub adjusted_stdev: Option<f64>,
    pub rounds_per_week: f64,
}

impl PlayerMetrics {
    pub fn subset(&self, subset: Subset) -> &SubsetMetrics {
        match subset {
            Subset::All => &self.all,
            Subset::Home => &self.home,
            Subset::Away => &self.away,
        }
    }
}

pub fn compute(
    window: &PlayerWindow,
    now: NaiveDate,
    window_weeks: u32,
    consistency_factor: f64,
) -> PlayerMetrics {
    let trend_split = now - Duration::weeks(TREND_SPLIT_WEEKS);
    let all = subset_metrics(window, Subset::All, trend_split);
    let home = subset_metrics(window, Subset::Home, trend_split);
    let away = subset_metrics(window, Subset::Away, trend_split);

    let current_handicap_index = window.open_handicap_indices().mean();
    let adjusted_stdev = match (all.stdev_gap, current_handicap_index) {
        (Some(stdev), Some(hi)) => Some(stdev + hi * consistency_factor),
        _ => None,
    };

    PlayerMetrics {
        player_id: window.player_id.clone(),
        player_name: window.player_name.clone(),
        rounds_per_week: all.rounds as f64 / window_weeks as f64,
        all,
        home,
        away,
        current_handicap_index,
        adjusted_stdev,
    }
}

fn subset_metrics(window: &PlayerWindow, subset: Subset, trend_split: NaiveDate) -> SubsetMetrics {
    let gaps = window.gaps(subset);
    let (recent, oldest): (Vec<_>, Vec<_>) = window
        .rounds(subset)
        .partition(|round| round.date_played >= trend_split);

    let trend_confidence = if recent.is_empty() || oldest.is_empty() {
        0.0
    } else {
        let (shorter, longer) = if recent.len() <= oldest.len() {
            (recent.len(), oldest.len())
        } else {
            (oldest.len(), recent.len())
        };
        shorter as f64 / longer as f64
    };
    let trend_change = if trend_confidence > 0.0 {
        let recent_mean = mean_gap(&recent);
        let oldest_mean = mean_gap(&oldest);
        Some((recent_mean - oldest_mean) * trend_confidence)
    } else {
        None
    };

    SubsetMetrics {
        rounds: gaps.len(),
        avg_gap: gaps.mean(),
        stdev_gap: gaps.stdev(),
        trend_change,
        trend_confidence,
    }
}

fn mean_gap(rounds: &[&crate::rounds::RoundRecord]) -> f64 {
    let gaps: Vec<_> = rounds.iter().map(|round| round.gap()).collect();
    gaps.mean().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rounds::RoundStore;
    use crate::testing::round_on;
    use assert_float_eq::*;

    fn now() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn window_of(rounds: Vec<crate::rounds::RoundRecord>) -> PlayerWindow {
        RoundStore::from_records(rounds)
            .windows(now(), 12)
            .remove(0)
    }

    #[test]
    fn stdev_undefined_below_two_rounds() {
        let window = window_of(vec![round_on("p1", "2024-05-20", true, 10.0, 9.0)]);
        let metrics = compute(&window, now(), 12, 0.10);
        assert_eq!(1, metrics.all.rounds);
        assert_eq!(Some(1.0), metrics.all.avg_gap);
        assert_eq!(None, metrics.all.stdev_gap);
        assert_eq!(None, metrics.adjusted_stdev);
    }

    #[test]
    fn trend_requires_rounds_in_both_slices() {
        // all rounds recent: no trend verdict, confidence pinned to zero
        let window = window_of(vec![
            round_on("p1", "2024-05-20", true, 10.0, 9.0),
            round_on("p1", "2024-05-25", true, 11.0, 9.0),
        ]);
        let metrics = compute(&window, now(), 12, 0.10);
        assert_eq!(None, metrics.all.trend_change);
        assert_eq!(0.0, metrics.all.trend_confidence);
    }

    #[test]
    fn trend_damped_by_confidence() {
        // oldest slice: gaps 3.0, 3.0; recent slice: gap 1.0 over one round
        let window = window_of(vec![
            round_on("p1", "2024-03-20", true, 12.0, 9.0),
            round_on("p1", "2024-03-27", true, 12.0, 9.0),
            round_on("p1", "2024-05-25", true, 10.0, 9.0),
        ]);
        let metrics = compute(&window, now(), 12, 0.10);
        assert_f64_near!(0.5, metrics.all.trend_confidence);
        // raw change −2.0 × confidence 0.5
        assert_f64_near!(-1.0, metrics.all.trend_change.unwrap());
    }

    #[test]
    fn adjusted_stdev_folds_in_handicap() {
        let window = window_of(vec![
            round_on("p1", "2024-05-20", true, 8.0, 10.0),
            round_on("p1", "2024-05-25", true, 12.0, 10.0),
        ]);
        let metrics = compute(&window, now(), 12, 0.10);
        let stdev = metrics.all.stdev_gap.unwrap();
        assert_float_relative_eq!(stdev + 1.0, metrics.adjusted_stdev.unwrap(), 1e-9);
        assert_eq!(Some(10.0), metrics.current_handicap_index);
    }

    #[test]
    fn sides_are_computed_independently() {
        let window = window_of(vec![
            round_on("p1", "2024-05-20", true, 10.0, 9.0),
            round_on("p1", "2024-05-21", true, 12.0, 9.0),
            round_on("p1", "2024-05-22", false, 15.0, 9.0),
        ]);
        let metrics = compute(&window, now(), 12, 0.10);
        assert_f64_near!(2.0, metrics.home.avg_gap.unwrap());
        assert_f64_near!(6.0, metrics.away.avg_gap.unwrap());
        assert_eq!(None, metrics.away.stdev_gap);
        assert_f64_near!(0.25, metrics.rounds_per_week);
    }
}
