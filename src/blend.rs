//! The score blender: folds the three classification scores into one combined
//! value score per subset, then blends the HOME and ALL combined scores into the
//! headline ranking figure. A missing ingredient disqualifies the score outright
//! rather than degrading into a best-effort average.

use crate::config::ScoreWeights;

/// Which combined scores fed the blended figure. Anything other than
/// [BlendBasis::HomeAndAll] marks reduced confidence — the fallback is explicit
/// output, never silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum BlendBasis {
    #[strum(serialize = "HOME+ALL")]
    HomeAndAll,
    #[strum(serialize = "ALL only")]
    AllOnly,
    #[strum(serialize = "HOME only")]
    HomeOnly,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendedScore {
    pub value: f64,
    pub basis: BlendBasis,
}

/// Weighted combined value score for one subset. Defined only when all three
/// scores are — a player missing any one rating receives no combined score.
pub fn combined_value_score(
    performance: Option<f64>,
    consistency: Option<f64>,
    trend: Option<f64>,
    weights: &ScoreWeights,
) -> Option<f64> {
    match (performance, consistency, trend) {
        (Some(performance), Some(consistency), Some(trend)) => Some(
            performance * weights.performance
                + consistency * weights.consistency
                + trend * weights.trend,
        ),
        _ => None,
    }
}

/// `home_weight`·HOME + (1 − `home_weight`)·ALL when both are defined; exact
/// single-sided fallback with the basis flagged otherwise.
pub fn blend(home: Option<f64>, all: Option<f64>, home_weight: f64) -> Option<BlendedScore> {
    match (home, all) {
        (Some(home), Some(all)) => Some(BlendedScore {
            value: home_weight * home + (1.0 - home_weight) * all,
            basis: BlendBasis::HomeAndAll,
        }),
        (None, Some(all)) => Some(BlendedScore {
            value: all,
            basis: BlendBasis::AllOnly,
        }),
        (Some(home), None) => Some(BlendedScore {
            value: home,
            basis: BlendBasis::HomeOnly,
        }),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;

    fn weights() -> ScoreWeights {
        ScoreWeights::default()
    }

    #[test]
    fn combined_score_weights_components() {
        let cvs = combined_value_score(Some(10.0), Some(6.0), Some(2.0), &weights()).unwrap();
        assert_f64_near!(8.0, cvs);
    }

    #[test]
    fn combined_score_requires_every_component() {
        assert_eq!(None, combined_value_score(Some(10.0), Some(6.0), None, &weights()));
        assert_eq!(None, combined_value_score(Some(10.0), None, Some(2.0), &weights()));
        assert_eq!(None, combined_value_score(None, Some(6.0), Some(2.0), &weights()));
    }

    #[test]
    fn blend_weights_home_over_all() {
        let blended = blend(Some(8.0), Some(6.0), 0.7).unwrap();
        assert_f64_near!(7.4, blended.value);
        assert_eq!(BlendBasis::HomeAndAll, blended.basis);
    }

    #[test]
    fn blend_falls_back_to_all_exactly() {
        let blended = blend(None, Some(6.4), 0.7).unwrap();
        assert_f64_near!(6.4, blended.value);
        assert_eq!(BlendBasis::AllOnly, blended.basis);
    }

    #[test]
    fn blend_undefined_without_either_side() {
        assert_eq!(None, blend(None, None, 0.7));
    }
}
