//! Backtesting base types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Trading parameters of one backtest run
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Starting capital (currency)
    pub capital: f64,
    /// Fixed position size in lots
    pub lots: u32,
    /// Commission per lot, charged on entry and exit
    pub commission: f64,
    /// Currency value of one point of price movement per lot
    pub multiplier: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            capital: 100_000.0,
            lots: 1,
            commission: 5.0,
            multiplier: 10.0,
        }
    }
}

/// Direction of an executed fill marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerAction {
    Buy,
    Sell,
}

/// Chart marker for an executed buy/sell fill
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalMarker {
    pub date: NaiveDate,
    pub action: MarkerAction,
    pub price: f64,
}

/// One closed round trip
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    /// Realized profit and loss (currency)
    pub pnl: f64,
    /// Realized profit and loss as percent of starting capital
    pub pnl_pct: f64,
    /// Calendar days between entry and exit
    pub holding_days: i64,
}

/// Mark-to-market account value at one bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Summary statistics of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Total return, percent
    pub total_return: f64,
    /// Compound annualized return, percent
    pub annual_return: f64,
    /// Most negative drawdown from a running equity peak, percent
    pub max_drawdown: f64,
    /// Winning trades over total trades, percent
    pub win_rate: f64,
    pub total_trades: usize,
    /// Gross winning profit over gross losing loss; 999.0 when no loss
    pub profit_factor: f64,
    pub avg_holding_days: f64,
}

/// Aggregate outcome of one backtest run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub metrics: PerformanceMetrics,
    pub equity: Vec<EquityPoint>,
    pub trades: Vec<TradeRecord>,
    pub signals: Vec<SignalMarker>,
}
