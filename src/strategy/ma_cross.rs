//! Dual moving-average crossing strategy (双均线交叉).

use crate::indicator::sma;

use super::Signal;

/// Buy when the short MA crosses above the long MA, sell on the opposite
/// crossing. Bars inside either warm-up gap produce no signal.
pub fn signals(closes: &[f64], short: usize, long: usize) -> Vec<Signal> {
    let ma_s = sma(closes, short);
    let ma_l = sma(closes, long);
    let n = closes.len();
    let mut out = vec![Signal::Hold; n];
    for i in 1..n {
        let (s_prev, l_prev, s, l) = match (ma_s[i - 1], ma_l[i - 1], ma_s[i], ma_l[i]) {
            (Some(a), Some(b), Some(c), Some(d)) => (a, b, c, d),
            _ => continue,
        };
        if s_prev <= l_prev && s > l {
            out[i] = Signal::Buy;
        } else if s_prev >= l_prev && s < l {
            out[i] = Signal::Sell;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warm_up_produces_no_signal() {
        let closes = vec![10.0; 10];
        let out = signals(&closes, 2, 5);
        assert!(out.iter().all(|s| *s == Signal::Hold));
    }

    #[test]
    fn test_cross_fires_once_per_transition() {
        // ramp down then up: one death cross, one golden cross
        let closes = [
            10.0, 10.0, 10.0, 10.0, 10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 10.0,
        ];
        let out = signals(&closes, 2, 5);
        let buys = out.iter().filter(|s| **s == Signal::Buy).count();
        let sells = out.iter().filter(|s| **s == Signal::Sell).count();
        assert_eq!(buys, 1);
        assert_eq!(sells, 1);
        let sell_idx = out.iter().position(|s| *s == Signal::Sell).unwrap();
        let buy_idx = out.iter().position(|s| *s == Signal::Buy).unwrap();
        assert!(sell_idx < buy_idx);
    }

    #[test]
    fn test_sustained_state_stays_silent() {
        // short stays above long after the cross: no repeated buys
        let mut closes = vec![10.0; 8];
        closes.extend(std::iter::repeat(15.0).take(8));
        let out = signals(&closes, 2, 5);
        assert_eq!(out.iter().filter(|s| **s == Signal::Buy).count(), 1);
    }
}
