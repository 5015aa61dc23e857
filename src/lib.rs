//! Kline Engine - futures daily K-line data and strategy backtesting
//!
//! This crate manages daily OHLCV series for a small set of commodity
//! futures (corn, corn starch, egg continuous main contracts) and
//! evaluates rule-based trading strategies against them:
//!
//! - CSV data store with remote supplement from the Sina daily endpoint
//! - Indicator primitives (SMA with warm-up gap, seeded EMA)
//! - Four built-in strategies: MA cross, MACD, Bollinger breakout, KDJ
//! - Long-only simulation with next-bar-open execution
//! - Performance statistics and serializable presentation payloads
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use kline_engine::app::{run_backtest, BacktestRequest};
//! use kline_engine::market::CsvDatafeed;
//!
//! let feed = CsvDatafeed::from_settings();
//! let req = BacktestRequest {
//!     symbol: "C0".to_string(),
//!     strategy: "ma_cross".to_string(),
//!     params: Default::default(),
//!     start_date: None,
//!     end_date: None,
//!     capital: None,
//!     lots: None,
//!     commission: None,
//! };
//! let result = run_backtest(&feed, &req);
//! ```

pub mod app;
pub mod backtesting;
pub mod chart;
pub mod error;
pub mod indicator;
pub mod logger;
pub mod market;
pub mod strategy;

// Re-export commonly used types
pub use app::{run_backtest, BacktestRequest, BacktestResponse, ErrorResponse};
pub use backtesting::{
    BacktestConfig, BacktestEngine, BacktestResult, EquityPoint, PerformanceMetrics, SignalMarker,
    TradeRecord,
};
pub use error::{KlineError, Result};
pub use market::{CsvDatafeed, DailyBar, DailySeries, SinaProvider};
pub use strategy::{strategy_catalog, Signal, StrategyKind, StrategyParams};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
