//! KDJ crossing strategy (KDJ 金叉死叉).

use super::Signal;

/// RSV over the trailing window, with the zero-range case pinned to 50
fn rsv_at(closes: &[f64], highs: &[f64], lows: &[f64], i: usize, period: usize) -> f64 {
    let window = i + 1 - period..=i;
    let hi = highs[window.clone()].iter().cloned().fold(f64::MIN, f64::max);
    let lo = lows[window].iter().cloned().fold(f64::MAX, f64::min);
    if hi == lo {
        50.0
    } else {
        (closes[i] - lo) / (hi - lo) * 100.0
    }
}

/// %K/%D smoothed from RSV, both seeded at 50 on the first valid bar.
/// Buy only on a K-over-D upward cross while K is still below 30; sell
/// only on the downward cross while K is above 70. The zone condition
/// filters out crossings in the middle range.
pub fn signals(closes: &[f64], highs: &[f64], lows: &[f64], period: usize) -> Vec<Signal> {
    let n = closes.len();
    let mut out = vec![Signal::Hold; n];
    if period == 0 || n < period {
        return out;
    }

    let mut k = vec![50.0; n];
    let mut d = vec![50.0; n];
    for i in period - 1..n {
        let rsv = rsv_at(closes, highs, lows, i, period);
        if i > period - 1 {
            k[i] = (2.0 * k[i - 1] + rsv) / 3.0;
            d[i] = (2.0 * d[i - 1] + k[i]) / 3.0;
        }
    }

    for i in period..n {
        if k[i - 1] <= d[i - 1] && k[i] > d[i] && k[i] < 30.0 {
            out[i] = Signal::Buy;
        } else if k[i - 1] >= d[i - 1] && k[i] < d[i] && k[i] > 70.0 {
            out[i] = Signal::Sell;
        }
    }
    out
}
