//! Backtest engine: event-driven walk with next-bar-open execution.
//!
//! Long-only, single position. A signal fires on its bar but the fill
//! happens at the *next* bar's open, modelling the unavoidable one-bar
//! execution lag of daily data. If the series ends while a position is
//! open it is liquidated at the last close and the final equity point is
//! replaced with the realized cash value, so every run ends flat.

use crate::backtesting::statistics::{calculate_metrics, round2};
use crate::error::Result;
use crate::market::DailySeries;
use crate::strategy::{Signal, StrategyKind, StrategyParams};

use super::base::{
    BacktestConfig, BacktestResult, EquityPoint, MarkerAction, SignalMarker, TradeRecord,
};

/// Backtest engine over one immutable price series
pub struct BacktestEngine<'a> {
    series: &'a DailySeries,
}

impl<'a> BacktestEngine<'a> {
    pub fn new(series: &'a DailySeries) -> Self {
        Self { series }
    }

    /// Run one (strategy, parameter-set) tuple to completion.
    ///
    /// Parameter validation happens before the walk; the walk itself never
    /// fails, short input just yields a degenerate (empty) trade log.
    pub fn run(
        &self,
        strategy: StrategyKind,
        params: &StrategyParams,
        config: &BacktestConfig,
    ) -> Result<BacktestResult> {
        let signals = strategy.compute_signals(self.series, params)?;
        tracing::debug!(
            "回测开始: {} {} 共{}根K线",
            self.series.symbol,
            strategy.key(),
            self.series.len()
        );
        Ok(self.simulate(&signals, config))
    }

    /// Walk the signal series bar by bar, mutating position/cash state
    fn simulate(&self, signals: &[Signal], config: &BacktestConfig) -> BacktestResult {
        let series = self.series;
        let n = series.len();
        let lots = config.lots as f64;

        let mut trades: Vec<TradeRecord> = Vec::new();
        let mut markers: Vec<SignalMarker> = Vec::new();
        let mut equity: Vec<EquityPoint> = Vec::with_capacity(n);

        let mut cash = config.capital;
        let mut pos = 0.0_f64;
        let mut entry_price = 0.0;
        let mut entry_idx = 0usize;

        for i in 0..n {
            match signals[i] {
                Signal::Buy if pos == 0.0 && i + 1 < n => {
                    let exec_price = series.opens[i + 1];
                    pos = lots;
                    entry_price = exec_price;
                    entry_idx = i + 1;
                    cash -= config.commission * lots;
                    markers.push(SignalMarker {
                        date: series.dates[i + 1],
                        action: MarkerAction::Buy,
                        price: exec_price,
                    });
                }
                Signal::Sell if pos > 0.0 && i + 1 < n => {
                    let exec_price = series.opens[i + 1];
                    let pnl = (exec_price - entry_price) * config.multiplier * pos
                        - config.commission * pos;
                    cash += pnl;
                    trades.push(self.make_trade(entry_idx, i + 1, entry_price, exec_price, pnl, config));
                    markers.push(SignalMarker {
                        date: series.dates[i + 1],
                        action: MarkerAction::Sell,
                        price: exec_price,
                    });
                    pos = 0.0;
                }
                _ => {}
            }

            let unrealised = if pos > 0.0 {
                (series.closes[i] - entry_price) * config.multiplier * pos
            } else {
                0.0
            };
            equity.push(EquityPoint {
                date: series.dates[i],
                value: round2(cash + unrealised),
            });
        }

        // Forced liquidation at the last close: no further bar exists to
        // absorb the execution lag.
        if pos > 0.0 {
            let exec_price = series.closes[n - 1];
            let pnl =
                (exec_price - entry_price) * config.multiplier * pos - config.commission * pos;
            cash += pnl;
            trades.push(self.make_trade(entry_idx, n - 1, entry_price, exec_price, pnl, config));
            markers.push(SignalMarker {
                date: series.dates[n - 1],
                action: MarkerAction::Sell,
                price: exec_price,
            });
            if let Some(last) = equity.last_mut() {
                last.value = round2(cash);
            }
        }

        let metrics = calculate_metrics(&trades, &equity, config.capital);
        BacktestResult {
            metrics,
            equity,
            trades,
            signals: markers,
        }
    }

    fn make_trade(
        &self,
        entry_idx: usize,
        exit_idx: usize,
        entry_price: f64,
        exit_price: f64,
        pnl: f64,
        config: &BacktestConfig,
    ) -> TradeRecord {
        let entry_date = self.series.dates[entry_idx];
        let exit_date = self.series.dates[exit_idx];
        TradeRecord {
            entry_date,
            entry_price: round2(entry_price),
            exit_date,
            exit_price: round2(exit_price),
            pnl: round2(pnl),
            pnl_pct: round2(pnl / config.capital * 100.0),
            holding_days: (exit_date - entry_date).num_days(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::DailyBar;
    use chrono::{Duration, NaiveDate};

    fn series_from_closes(closes: &[f64]) -> DailySeries {
        // opens shifted half a point above close so tests can tell a fill
        // at the open apart from one at the close
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut series = DailySeries::new("C0");
        for (i, &close) in closes.iter().enumerate() {
            series.push(DailyBar {
                date: start + Duration::days(i as i64),
                open: close + 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 100,
            });
        }
        series
    }

    fn ma_cross_params(short: f64, long: f64) -> StrategyParams {
        let mut params = StrategyParams::new();
        params.insert("short".to_string(), short);
        params.insert("long".to_string(), long);
        params
    }

    /// 26-bar dip-then-spike scenario: the 2-bar MA crosses above the
    /// 5-bar MA at index 21 and the fill must land at bar 22's open.
    fn dip_spike_closes() -> Vec<f64> {
        let mut closes = vec![10.0; 26];
        closes[19] = 8.0;
        closes[20] = 12.0;
        closes
    }

    #[test]
    fn test_buy_fills_at_next_bar_open() {
        let series = series_from_closes(&dip_spike_closes());
        let result = BacktestEngine::new(&series)
            .run(StrategyKind::MaCross, &ma_cross_params(2.0, 5.0), &BacktestConfig::default())
            .unwrap();

        let buy = result
            .signals
            .iter()
            .find(|m| m.action == MarkerAction::Buy)
            .expect("the golden cross must produce a buy fill");
        // signal on bar 21, fill on bar 22
        assert_eq!(buy.date, series.dates[22]);
        assert_eq!(buy.price, series.opens[22]);
        assert_ne!(buy.price, series.closes[21]);

        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].entry_date, series.dates[22]);
        assert_eq!(result.trades[0].entry_price, 10.5);
    }

    #[test]
    fn test_run_ends_flat_with_forced_liquidation() {
        // rising tail keeps the position open until the end of the series
        let mut closes = vec![10.0; 10];
        closes.extend((1..=10).map(|i| 10.0 + i as f64));
        let series = series_from_closes(&closes);
        let config = BacktestConfig::default();
        let result = BacktestEngine::new(&series)
            .run(StrategyKind::MaCross, &ma_cross_params(2.0, 5.0), &config)
            .unwrap();

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        // liquidated at the last close, not an open
        assert_eq!(trade.exit_date, *series.dates.last().unwrap());
        assert_eq!(trade.exit_price, *series.closes.last().unwrap());

        // final equity equals realized cash: capital plus every trade pnl
        // minus the entry-side commission debited per fill
        let total_pnl: f64 = result.trades.iter().map(|t| t.pnl).sum();
        let entry_fees = config.commission * config.lots as f64 * result.trades.len() as f64;
        let last = result.equity.last().unwrap();
        assert!((last.value - (config.capital + total_pnl - entry_fees)).abs() < 1e-9);
    }

    #[test]
    fn test_trade_log_is_ordered_and_paired() {
        // several full cycles
        let mut closes = Vec::new();
        for _ in 0..3 {
            closes.extend([10.0, 10.0, 10.0, 10.0, 10.0, 8.0, 12.0, 10.0, 10.0, 10.0]);
        }
        let series = series_from_closes(&closes);
        let result = BacktestEngine::new(&series)
            .run(StrategyKind::MaCross, &ma_cross_params(2.0, 5.0), &BacktestConfig::default())
            .unwrap();

        for trade in &result.trades {
            assert!(trade.exit_date > trade.entry_date);
        }
        for pair in result.trades.windows(2) {
            assert!(pair[1].entry_date >= pair[0].exit_date);
        }
        // markers alternate buy/sell starting with a buy
        for (i, marker) in result.signals.iter().enumerate() {
            let expected = if i % 2 == 0 { MarkerAction::Buy } else { MarkerAction::Sell };
            assert_eq!(marker.action, expected);
        }
    }

    #[test]
    fn test_commission_debited_on_entry() {
        let series = series_from_closes(&dip_spike_closes());
        let config = BacktestConfig::default();
        let result = BacktestEngine::new(&series)
            .run(StrategyKind::MaCross, &ma_cross_params(2.0, 5.0), &config)
            .unwrap();

        // equity on the fill bar reflects the commission and the
        // mark-to-market loss against the entry open
        let fill_equity = result.equity[22].value;
        let unrealised = (series.closes[22] - series.opens[22]) * config.multiplier;
        let expected = config.capital - config.commission + unrealised;
        assert!((fill_equity - expected).abs() < 1e-9);
    }

    #[test]
    fn test_identical_inputs_identical_results() {
        let series = series_from_closes(&dip_spike_closes());
        let engine = BacktestEngine::new(&series);
        let params = ma_cross_params(2.0, 5.0);
        let config = BacktestConfig::default();
        let a = engine.run(StrategyKind::MaCross, &params, &config).unwrap();
        let b = engine.run(StrategyKind::MaCross, &params, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_short_input_degenerates_to_empty_log() {
        let series = series_from_closes(&[10.0, 11.0, 12.0]);
        let result = BacktestEngine::new(&series)
            .run(StrategyKind::MaCross, &ma_cross_params(2.0, 5.0), &BacktestConfig::default())
            .unwrap();
        assert!(result.trades.is_empty());
        assert_eq!(result.equity.len(), 3);
        assert_eq!(result.metrics.total_trades, 0);
    }
}
