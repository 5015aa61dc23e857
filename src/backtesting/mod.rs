//! Strategy backtesting: simulation engine and performance statistics.

pub mod base;
pub mod engine;
pub mod statistics;

pub use base::{
    BacktestConfig, BacktestResult, EquityPoint, MarkerAction, PerformanceMetrics, SignalMarker,
    TradeRecord,
};
pub use engine::BacktestEngine;
pub use statistics::calculate_metrics;
