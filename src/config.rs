//! Run configuration: analysis window, percentile cut-points, blend weights and
//! the pairing constraint set. Everything here changes season to season, so it is
//! all externally overridable through a JSON file; the defaults reproduce the
//! league's standing rules.

use std::fs::File;
use std::path::Path;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::pairing::ConstraintSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The league's home course; rounds elsewhere are AWAY.
    pub home_course: String,

    /// Trailing analysis window in weeks.
    pub window_weeks: u32,

    /// Ascending quantile cut-points bounding the five rating buckets.
    pub cut_points: [f64; 4],

    /// Weight of the HOME combined score in the blended score; the remainder
    /// goes to ALL.
    pub home_blend_weight: f64,

    pub score_weights: ScoreWeights,

    /// Rounds required on each of HOME and AWAY before side-comparison metrics
    /// are considered meaningful.
    pub min_rounds_per_side: usize,

    /// Handicap-index multiplier folded into the adjusted deviation used for the
    /// Steady/Explosive split.
    pub consistency_factor: f64,

    pub constraints: ConstraintSet,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            home_course: "KRUGERSDORP GOLF CLUB".into(),
            window_weeks: 12,
            cut_points: [0.2, 0.4, 0.6, 0.8],
            home_blend_weight: 0.7,
            score_weights: ScoreWeights::default(),
            min_rounds_per_side: 3,
            consistency_factor: 0.10,
            constraints: ConstraintSet::default(),
        }
    }
}

impl Config {
    pub fn read_json_file(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let file = File::open(path)?;
        let config: Config = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.home_course.trim().is_empty() {
            bail!("home course must be specified");
        }
        if self.window_weeks == 0 {
            bail!("analysis window must span at least one week");
        }
        let mut previous = 0.0;
        for &cut in &self.cut_points {
            if cut <= previous || cut >= 1.0 {
                bail!("cut-points must be strictly ascending within (0, 1)");
            }
            previous = cut;
        }
        if !(0.0..=1.0).contains(&self.home_blend_weight) {
            bail!("home blend weight must lie in [0, 1]");
        }
        self.score_weights.validate()?;
        if self.min_rounds_per_side == 0 {
            bail!("minimum rounds per side must be at least 1");
        }
        if self.consistency_factor < 0.0 {
            bail!("consistency factor cannot be negative");
        }
        self.constraints.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub performance: f64,
    pub consistency: f64,
    pub trend: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            performance: 0.6,
            consistency: 0.3,
            trend: 0.1,
        }
    }
}

impl ScoreWeights {
    const TOLERANCE: f64 = 1e-9;

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.performance < 0.0 || self.consistency < 0.0 || self.trend < 0.0 {
            bail!("score weights cannot be negative");
        }
        let sum = self.performance + self.consistency + self.trend;
        if (sum - 1.0).abs() > Self::TOLERANCE {
            bail!("score weights must sum to 1, got {sum}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn rejects_unordered_cut_points() {
        let config = Config {
            cut_points: [0.2, 0.6, 0.4, 0.8],
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_lopsided_score_weights() {
        let config = Config {
            score_weights: ScoreWeights {
                performance: 0.6,
                consistency: 0.3,
                trend: 0.3,
            },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_window() {
        let config = Config {
            window_weeks: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
