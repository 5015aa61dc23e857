//! Performance statistics derived from the trade log and equity curve.

use super::base::{EquityPoint, PerformanceMetrics, TradeRecord};

/// Trading days per year used for annualization
const ANNUAL_TRADING_DAYS: f64 = 252.0;

/// Reported when the trade log contains no losing trade
const PROFIT_FACTOR_CAP: f64 = 999.0;

/// Round to 2 decimal places at the reporting boundary
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to 1 decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Reduce a finished run to its summary statistics.
///
/// Internal accumulation keeps full precision; only the returned fields
/// are rounded.
pub fn calculate_metrics(
    trades: &[TradeRecord],
    equity: &[EquityPoint],
    capital: f64,
) -> PerformanceMetrics {
    let final_equity = equity.last().map(|e| e.value).unwrap_or(capital);
    let total_return = (final_equity - capital) / capital * 100.0;

    let days = equity.len();
    let years = if days > 0 {
        days as f64 / ANNUAL_TRADING_DAYS
    } else {
        1.0
    };
    let annual_return = if years > 0.0 && final_equity > 0.0 {
        ((final_equity / capital).powf(1.0 / years) - 1.0) * 100.0
    } else {
        0.0
    };

    let mut peak = capital;
    let mut max_drawdown = 0.0_f64;
    for point in equity {
        if point.value > peak {
            peak = point.value;
        }
        let drawdown = if peak > 0.0 {
            (point.value - peak) / peak * 100.0
        } else {
            0.0
        };
        if drawdown < max_drawdown {
            max_drawdown = drawdown;
        }
    }

    // a trade with pnl <= 0 counts as a loss
    let gross_profit: f64 = trades.iter().filter(|t| t.pnl > 0.0).map(|t| t.pnl).sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.pnl <= 0.0)
        .map(|t| t.pnl)
        .sum::<f64>()
        .abs();
    let wins = trades.iter().filter(|t| t.pnl > 0.0).count();

    let win_rate = if trades.is_empty() {
        0.0
    } else {
        wins as f64 / trades.len() as f64 * 100.0
    };
    let profit_factor = if gross_loss > 0.0 {
        round2(gross_profit / gross_loss)
    } else {
        PROFIT_FACTOR_CAP
    };
    let avg_holding_days = if trades.is_empty() {
        0.0
    } else {
        trades.iter().map(|t| t.holding_days as f64).sum::<f64>() / trades.len() as f64
    };

    PerformanceMetrics {
        total_return: round2(total_return),
        annual_return: round2(annual_return),
        max_drawdown: round2(max_drawdown),
        win_rate: round1(win_rate),
        total_trades: trades.len(),
        profit_factor,
        avg_holding_days: round1(avg_holding_days),
    }
}
