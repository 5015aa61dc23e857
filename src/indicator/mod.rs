//! Stateless indicator primitives over price sequences.
//!
//! The moving average keeps a warm-up gap: indices before `period - 1`
//! have no value. The exponential moving average is seeded with the first
//! sample and is defined at every index. Cross-detection in the strategy
//! layer relies on this asymmetry.

/// Simple moving average via a running sum.
///
/// `out[i]` is `None` for `i < period - 1`, otherwise the arithmetic mean
/// of the trailing `period` values ending at `i`.
pub fn sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    if period == 0 {
        return vec![None; n];
    }
    let mut out = vec![None; n];
    let mut sum = 0.0;
    for (i, &v) in values.iter().enumerate() {
        sum += v;
        if i >= period {
            sum -= values[i - period];
        }
        if i + 1 >= period {
            out[i] = Some(sum / period as f64);
        }
    }
    out
}

/// Exponential moving average, seeded at `values[0]`.
///
/// `ema[i] = values[i] * k + ema[i-1] * (1 - k)` with `k = 2 / (period + 1)`.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev = values[0];
    out.push(prev);
    for &v in &values[1..] {
        prev = v * k + prev * (1.0 - k);
        out.push(prev);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_warm_up_gap() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let out = sma(&values, 3);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_eq!(out[2], Some(2.0));
        assert_eq!(out[3], Some(3.0));
        assert_eq!(out[4], Some(4.0));
    }

    #[test]
    fn test_sma_matches_window_mean_exactly() {
        let values = [2.5, 7.0, 1.5, 9.0, 4.0, 6.5, 3.0];
        let period = 4;
        let out = sma(&values, period);
        for i in 0..values.len() {
            if i + 1 < period {
                assert!(out[i].is_none());
            } else {
                let mean: f64 =
                    values[i + 1 - period..=i].iter().sum::<f64>() / period as f64;
                assert!((out[i].unwrap() - mean).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_sma_period_longer_than_series() {
        assert!(sma(&[1.0, 2.0], 5).iter().all(Option::is_none));
        assert!(sma(&[1.0, 2.0], 0).iter().all(Option::is_none));
    }

    #[test]
    fn test_ema_seed_and_recurrence() {
        let values = [10.0, 11.0, 12.0];
        let out = ema(&values, 3);
        let k = 2.0 / 4.0;
        assert_eq!(out[0], 10.0);
        assert!((out[1] - (11.0 * k + 10.0 * (1.0 - k))).abs() < 1e-12);
        assert!((out[2] - (12.0 * k + out[1] * (1.0 - k))).abs() < 1e-12);
    }

    #[test]
    fn test_ema_no_warm_up_gap() {
        // every index defined, unlike sma
        let values = [3.0; 8];
        assert_eq!(ema(&values, 5).len(), 8);
        assert_eq!(sma(&values, 5).iter().filter(|v| v.is_some()).count(), 4);
    }

    #[test]
    fn test_ema_empty() {
        assert!(ema(&[], 5).is_empty());
    }
}
