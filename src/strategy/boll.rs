//! Bollinger band breakout strategy (布林带突破).

use crate::indicator::sma;

use super::Signal;

/// Population standard deviation of `window` around `mean`
fn window_std(window: &[f64], mean: f64) -> f64 {
    let sq: f64 = window.iter().map(|v| (v - mean) * (v - mean)).sum();
    (sq / window.len() as f64).sqrt()
}

/// Buy when the close crosses from at-or-below the previous upper band to
/// above the current upper band; sell symmetrically at the lower band.
///
/// The bands at both the current and the previous bar are recomputed over
/// their full trailing windows on every step.
pub fn signals(closes: &[f64], period: usize, mult: f64) -> Vec<Signal> {
    let mid = sma(closes, period);
    let n = closes.len();
    let mut out = vec![Signal::Hold; n];
    for i in 1..n {
        let (mid_prev, mid_cur) = match (mid[i - 1], mid[i]) {
            (Some(a), Some(b)) => (a, b),
            _ => continue,
        };
        let std_cur = window_std(&closes[i + 1 - period..=i], mid_cur);
        let upper = mid_cur + mult * std_cur;
        let lower = mid_cur - mult * std_cur;

        let std_prev = window_std(&closes[i - period..i], mid_prev);
        let prev_upper = mid_prev + mult * std_prev;
        let prev_lower = mid_prev - mult * std_prev;

        if closes[i - 1] <= prev_upper && closes[i] > upper {
            out[i] = Signal::Buy;
        } else if closes[i - 1] >= prev_lower && closes[i] < lower {
            out[i] = Signal::Sell;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_range_window_is_silent() {
        // zero variance collapses the bands onto the mean; equality on the
        // previous bar alone must not fire
        let out = signals(&vec![50.0; 30], 5, 2.0);
        assert!(out.iter().all(|s| *s == Signal::Hold));
    }

    #[test]
    fn test_upper_breakout_fires_buy() {
        // quiet base then a hard spike through the upper band:
        // window [9 x 100, 120] has mean 102, std 6, upper 114 < 120
        let mut closes = vec![100.0; 15];
        closes.push(120.0);
        let out = signals(&closes, 10, 2.0);
        assert_eq!(out[15], Signal::Buy);
        assert_eq!(out.iter().filter(|s| **s == Signal::Buy).count(), 1);
    }

    #[test]
    fn test_lower_breakdown_fires_sell() {
        let mut closes = vec![100.0; 15];
        closes.push(80.0);
        let out = signals(&closes, 10, 2.0);
        assert_eq!(out[15], Signal::Sell);
    }

    #[test]
    fn test_population_std_divisor() {
        // divide by n, not n-1
        let window = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let mean = window.iter().sum::<f64>() / window.len() as f64;
        assert!((window_std(&window, mean) - 2.0).abs() < 1e-12);
    }
}
