//! Presentation payloads and request orchestration.
//!
//! The serializable structures here are what a web front end consumes;
//! `run_backtest` is the caller boundary that validates a request before
//! the simulation engine is involved.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::backtesting::statistics::round2;
use crate::backtesting::{BacktestConfig, BacktestEngine, BacktestResult};
use crate::error::{KlineError, Result};
use crate::market::{contract_multiplier, is_known_symbol, CsvDatafeed, DailySeries, SYMBOLS};
use crate::strategy::{StrategyKind, StrategyParams};

/// Minimum number of bars a backtest request must cover
pub const MIN_BACKTEST_BARS: usize = 30;

/// Chart overlay MA window
const OVERLAY_MA_PERIOD: usize = 20;

/// Rows per table page are clamped to this
const MAX_PAGE_SIZE: usize = 500;

/// One symbol catalog entry for the front end
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SymbolEntry {
    pub code: &'static str,
    pub name: &'static str,
}

/// Catalog listing, the `/api/symbols` payload
pub fn list_symbols() -> Vec<SymbolEntry> {
    SYMBOLS
        .iter()
        .map(|s| SymbolEntry {
            code: s.code,
            name: s.name,
        })
        .collect()
}

/// Candlestick payload: `k` rows are `[open, close, low, high]`
/// (the candlestick series order ECharts expects)
#[derive(Debug, Clone, Serialize)]
pub struct KlinePayload {
    pub dates: Vec<NaiveDate>,
    pub k: Vec<[f64; 4]>,
    pub vol: Vec<i64>,
    pub ma20: Vec<Option<f64>>,
}

pub fn kline_payload(series: &DailySeries) -> KlinePayload {
    KlinePayload {
        dates: series.dates.clone(),
        k: (0..series.len())
            .map(|i| {
                [
                    round2(series.opens[i]),
                    round2(series.closes[i]),
                    round2(series.lows[i]),
                    round2(series.highs[i]),
                ]
            })
            .collect(),
        vol: series.volumes.clone(),
        ma20: series.ma(OVERLAY_MA_PERIOD),
    }
}

/// One data table row
#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    pub ma20: Option<f64>,
}

/// Paged table payload
#[derive(Debug, Clone, Serialize)]
pub struct TablePage {
    pub total: usize,
    pub page: usize,
    pub size: usize,
    pub rows: Vec<TableRow>,
}

/// Slice the series into one table page; page starts at 1, size is
/// clamped to 1..=500
pub fn table_page(series: &DailySeries, page: usize, size: usize) -> TablePage {
    let page = page.max(1);
    let size = size.clamp(1, MAX_PAGE_SIZE);
    let ma20 = series.ma(OVERLAY_MA_PERIOD);
    let total = series.len();
    let start = (page - 1).saturating_mul(size).min(total);
    let end = (start + size).min(total);

    let rows = (start..end)
        .map(|i| {
            let bar = series.bar(i);
            TableRow {
                date: bar.date,
                open: round2(bar.open),
                high: round2(bar.high),
                low: round2(bar.low),
                close: round2(bar.close),
                volume: bar.volume,
                ma20: ma20[i],
            }
        })
        .collect();

    TablePage {
        total,
        page,
        size,
        rows,
    }
}

/// Backtest request as posted by the front end
#[derive(Debug, Clone, Deserialize)]
pub struct BacktestRequest {
    pub symbol: String,
    pub strategy: String,
    #[serde(default)]
    pub params: StrategyParams,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub capital: Option<f64>,
    #[serde(default)]
    pub lots: Option<u32>,
    #[serde(default)]
    pub commission: Option<f64>,
}

/// Candlestick bar echoed back with the backtest result
#[derive(Debug, Clone, Copy, Serialize)]
pub struct KlineBar {
    pub time: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Backtest result plus the bars it ran over
#[derive(Debug, Clone, Serialize)]
pub struct BacktestResponse {
    #[serde(flatten)]
    pub result: BacktestResult,
    pub kline: Vec<KlineBar>,
}

/// Structured failure object returned at the presentation boundary
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&KlineError> for ErrorResponse {
    fn from(err: &KlineError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

/// Validate a request and run the backtest.
///
/// Checks run in a fixed order: strategy key, symbol, data presence,
/// date-range slice, bar-count minimum.
pub fn run_backtest(feed: &CsvDatafeed, req: &BacktestRequest) -> Result<BacktestResponse> {
    let strategy = StrategyKind::from_key(&req.strategy)
        .ok_or_else(|| KlineError::UnknownStrategy(req.strategy.clone()))?;
    if !is_known_symbol(&req.symbol) {
        return Err(KlineError::UnknownSymbol(req.symbol.clone()));
    }

    let series = feed.load_series(&req.symbol)?;
    if series.is_empty() {
        return Err(KlineError::NoData(req.symbol.clone()));
    }
    let series = series.slice_by_date(req.start_date, req.end_date);
    if series.len() < MIN_BACKTEST_BARS {
        return Err(KlineError::InsufficientBars {
            required: MIN_BACKTEST_BARS,
            actual: series.len(),
        });
    }

    let config = BacktestConfig {
        capital: req.capital.unwrap_or(100_000.0),
        lots: req.lots.unwrap_or(1),
        commission: req.commission.unwrap_or(5.0),
        multiplier: contract_multiplier(&req.symbol),
    };
    let result = BacktestEngine::new(&series).run(strategy, &req.params, &config)?;

    let kline = (0..series.len())
        .map(|i| {
            let bar = series.bar(i);
            KlineBar {
                time: bar.date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
            }
        })
        .collect();

    Ok(BacktestResponse { result, kline })
}
