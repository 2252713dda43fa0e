//! Utilities for summarising slices of sample values.

pub trait SliceExt {
    fn sum(&self) -> f64;
    fn mean(&self) -> Option<f64>;
    fn stdev(&self) -> Option<f64>;
    fn median(&self) -> Option<f64>;
    fn quantile(&self, q: f64) -> Option<f64>;
}
impl SliceExt for [f64] {
    fn sum(&self) -> f64 {
        self.iter().sum()
    }

    fn mean(&self) -> Option<f64> {
        match self.len() {
            0 => None,
            len => Some(self.sum() / len as f64),
        }
    }

    /// Sample standard deviation (N−1 denominator). `None` for fewer than two samples.
    fn stdev(&self) -> Option<f64> {
        if self.len() < 2 {
            return None;
        }
        let mean = self.sum() / self.len() as f64;
        let sum_sq: f64 = self.iter().map(|value| (value - mean).powi(2)).sum();
        Some((sum_sq / (self.len() - 1) as f64).sqrt())
    }

    fn median(&self) -> Option<f64> {
        self.quantile(0.5)
    }

    /// The `q`-quantile using linear interpolation between order statistics: the
    /// value at fractional position `q`·(N−1) of the sorted sample. `None` for an
    /// empty slice.
    fn quantile(&self, q: f64) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        debug_assert!((0.0..=1.0).contains(&q), "quantile {q} out of range");
        let mut sorted = self.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let position = q * (sorted.len() - 1) as f64;
        let lower = position.floor() as usize;
        let upper = position.ceil() as usize;
        if lower == upper {
            return Some(sorted[lower]);
        }
        let fraction = position - lower as f64;
        Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;

    #[test]
    fn sum() {
        let data = [0.0, 0.1, 0.2];
        assert_f64_near!(0.3, data.sum(), 1);
    }

    #[test]
    fn mean() {
        let data = [1.0, 2.0, 6.0];
        assert_f64_near!(3.0, data.mean().unwrap());
        let empty: [f64; 0] = [];
        assert_eq!(None, empty.mean());
    }

    #[test]
    fn stdev_sample() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_float_relative_eq!(2.138, data.stdev().unwrap(), 0.001);
    }

    #[test]
    fn stdev_undefined_below_two_samples() {
        let empty: [f64; 0] = [];
        assert_eq!(None, empty.stdev());
        assert_eq!(None, [5.0].stdev());
        assert!([5.0, 5.0].stdev().unwrap() >= 0.0);
    }

    #[test]
    fn median_odd_and_even() {
        assert_f64_near!(2.0, [3.0, 1.0, 2.0].median().unwrap());
        assert_f64_near!(2.5, [4.0, 1.0, 2.0, 3.0].median().unwrap());
    }

    #[test]
    fn quantile_interpolates_between_order_statistics() {
        let data = [1.0, 3.0];
        assert_f64_near!(1.4, data.quantile(0.2).unwrap());
        assert_f64_near!(2.6, data.quantile(0.8).unwrap());

        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_f64_near!(1.8, data.quantile(0.2).unwrap());
        assert_f64_near!(3.0, data.quantile(0.5).unwrap());
        assert_f64_near!(5.0, data.quantile(1.0).unwrap());
    }

    #[test]
    fn quantile_unaffected_by_input_order() {
        let data = [5.0, 1.0, 4.0, 2.0, 3.0];
        assert_f64_near!(1.8, data.quantile(0.2).unwrap());
    }
}
