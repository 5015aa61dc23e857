//! MACD crossing strategy (MACD 金叉死叉).

use crate::indicator::ema;

use super::Signal;

/// DIF = EMA(fast) - EMA(slow); DEA = EMA(DIF, signal). Buy when DIF
/// crosses above DEA, sell on the downward crossing. Evaluation starts at
/// index `slow` to skip the unstable early EMA region.
pub fn signals(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Vec<Signal> {
    let n = closes.len();
    let mut out = vec![Signal::Hold; n];
    if n == 0 {
        return out;
    }

    let ema_fast = ema(closes, fast);
    let ema_slow = ema(closes, slow);
    let dif: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let dea = ema(&dif, signal);

    for i in slow.max(1)..n {
        if dif[i - 1] <= dea[i - 1] && dif[i] > dea[i] {
            out[i] = Signal::Buy;
        } else if dif[i - 1] >= dea[i - 1] && dif[i] < dea[i] {
            out[i] = Signal::Sell;
        }
    }
    out
}
