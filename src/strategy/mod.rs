//! Built-in signal strategies.
//!
//! Each strategy is a pure function of the price history plus parameters,
//! emitting one [`Signal`] per bar. Crossing strategies only fire on the
//! bar where the crossing condition transitions, never on sustained
//! states.

pub mod base;
pub mod boll;
pub mod kdj;
pub mod ma_cross;
pub mod macd;

pub use base::{strategy_catalog, ParamSpec, Signal, StrategyInfo, StrategyKind, StrategyParams};
