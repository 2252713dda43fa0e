//! The percentile classifier: converts continuous metrics into five-tier ratings
//! against quantile cut-points computed over the *current* pool. Thresholds are
//! recomputed from scratch on every run — a pure function of (pool, cut-points)
//! with no state carried between runs — so a given raw value may earn a different
//! rating whenever the pool changes.

use crate::stats::SliceExt;

/// Quantile cut values bounding the five buckets for one metric and one pool.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    cuts: Vec<f64>,
}

impl Thresholds {
    /// Computes cut values over the pool's defined metric values using linear
    /// interpolation between order statistics. `None` for an empty pool.
    pub fn over_pool(pool: &[f64], cut_points: &[f64; 4]) -> Option<Self> {
        if pool.is_empty() {
            return None;
        }
        let cuts = cut_points
            .iter()
            .map(|&q| pool.quantile(q).expect("non-empty pool"))
            .collect();
        Some(Self { cuts })
    }

    /// Buckets a value. Metrics are oriented lower-is-better, so the first
    /// bucket is the best. Buckets are lower-inclusive and upper-exclusive,
    /// except the last, which is closed at both ends.
    pub fn tier(&self, value: f64) -> Tier {
        for (index, &cut) in self.cuts.iter().enumerate() {
            if value < cut {
                return Tier::ALL[index];
            }
        }
        Tier::Bottom
    }
}

/// Ordinal quality band; best first. Backs every categorical rating with a fixed
/// point value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Top,
    Upper,
    Middle,
    Lower,
    Bottom,
}

impl Tier {
    pub const ALL: [Tier; 5] = [Tier::Top, Tier::Upper, Tier::Middle, Tier::Lower, Tier::Bottom];

    pub fn score(self) -> f64 {
        10.0 - 2.0 * self as u8 as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum PerformanceRating {
    Excellent,
    Good,
    Average,
    #[strum(serialize = "Below Average")]
    BelowAverage,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum TrendRating {
    #[strum(serialize = "Improving Strongly")]
    ImprovingStrongly,
    Improving,
    Stable,
    Declining,
    #[strum(serialize = "Declining Strongly")]
    DecliningStrongly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ConsistencyRating {
    #[strum(serialize = "Very Consistent")]
    VeryConsistent,
    Consistent,
    #[strum(serialize = "Moderately Consistent")]
    ModeratelyConsistent,
    Variable,
    #[strum(serialize = "Very Variable")]
    VeryVariable,
}

macro_rules! tier_backed {
    ($rating:ident) => {
        impl From<Tier> for $rating {
            fn from(tier: Tier) -> Self {
                $rating::ALL[tier as u8 as usize]
            }
        }
        impl $rating {
            pub fn score(self) -> f64 {
                10.0 - 2.0 * self as u8 as f64
            }
        }
    };
}

impl PerformanceRating {
    const ALL: [PerformanceRating; 5] = [
        PerformanceRating::Excellent,
        PerformanceRating::Good,
        PerformanceRating::Average,
        PerformanceRating::BelowAverage,
        PerformanceRating::Poor,
    ];
}
impl TrendRating {
    const ALL: [TrendRating; 5] = [
        TrendRating::ImprovingStrongly,
        TrendRating::Improving,
        TrendRating::Stable,
        TrendRating::Declining,
        TrendRating::DecliningStrongly,
    ];
}
impl ConsistencyRating {
    const ALL: [ConsistencyRating; 5] = [
        ConsistencyRating::VeryConsistent,
        ConsistencyRating::Consistent,
        ConsistencyRating::ModeratelyConsistent,
        ConsistencyRating::Variable,
        ConsistencyRating::VeryVariable,
    ];
}

tier_backed!(PerformanceRating);
tier_backed!(TrendRating);
tier_backed!(ConsistencyRating);
