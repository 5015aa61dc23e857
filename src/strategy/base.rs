//! Strategy framework base types: signals, parameter schema, registry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{KlineError, Result};
use crate::market::DailySeries;

use super::{boll, kdj, ma_cross, macd};

/// Per-bar directive, independent of whether it can be acted upon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

/// One parameter of a strategy's schema
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ParamSpec {
    pub key: &'static str,
    /// Chinese label shown by front ends
    pub label: &'static str,
    pub default: f64,
    pub min: f64,
    pub max: f64,
}

/// Caller-supplied parameter overrides, keyed by schema key
pub type StrategyParams = HashMap<String, f64>;

const MA_CROSS_PARAMS: &[ParamSpec] = &[
    ParamSpec { key: "short", label: "短期周期", default: 5.0, min: 2.0, max: 60.0 },
    ParamSpec { key: "long", label: "长期周期", default: 20.0, min: 5.0, max: 250.0 },
];

const MACD_PARAMS: &[ParamSpec] = &[
    ParamSpec { key: "fast", label: "快线", default: 12.0, min: 2.0, max: 50.0 },
    ParamSpec { key: "slow", label: "慢线", default: 26.0, min: 5.0, max: 100.0 },
    ParamSpec { key: "signal", label: "信号线", default: 9.0, min: 2.0, max: 30.0 },
];

const BOLL_PARAMS: &[ParamSpec] = &[
    ParamSpec { key: "period", label: "周期", default: 20.0, min: 5.0, max: 100.0 },
    ParamSpec { key: "mult", label: "倍数", default: 2.0, min: 0.5, max: 4.0 },
];

const KDJ_PARAMS: &[ParamSpec] = &[
    ParamSpec { key: "period", label: "周期", default: 9.0, min: 3.0, max: 50.0 },
];

/// The closed set of built-in strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    MaCross,
    Macd,
    Boll,
    Kdj,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::MaCross,
        StrategyKind::Macd,
        StrategyKind::Boll,
        StrategyKind::Kdj,
    ];

    /// Resolve a registry key such as `ma_cross`
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.key() == key)
    }

    pub fn key(self) -> &'static str {
        match self {
            StrategyKind::MaCross => "ma_cross",
            StrategyKind::Macd => "macd",
            StrategyKind::Boll => "boll",
            StrategyKind::Kdj => "kdj",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            StrategyKind::MaCross => "双均线交叉",
            StrategyKind::Macd => "MACD 金叉死叉",
            StrategyKind::Boll => "布林带突破",
            StrategyKind::Kdj => "KDJ 金叉死叉",
        }
    }

    pub fn param_specs(self) -> &'static [ParamSpec] {
        match self {
            StrategyKind::MaCross => MA_CROSS_PARAMS,
            StrategyKind::Macd => MACD_PARAMS,
            StrategyKind::Boll => BOLL_PARAMS,
            StrategyKind::Kdj => KDJ_PARAMS,
        }
    }

    /// Whether the strategy reads the high/low columns
    pub fn needs_high_low(self) -> bool {
        matches!(self, StrategyKind::Kdj)
    }

    /// Resolve one schema parameter: caller override or schema default,
    /// rejected when outside the schema range.
    fn resolve(self, params: &StrategyParams, key: &str) -> Result<f64> {
        let spec = self
            .param_specs()
            .iter()
            .find(|s| s.key == key)
            .expect("parameter key must exist in the schema");
        let value = params.get(key).copied().unwrap_or(spec.default);
        if value < spec.min || value > spec.max {
            return Err(KlineError::ParamOutOfRange {
                key: key.to_string(),
                value,
                min: spec.min,
                max: spec.max,
            });
        }
        Ok(value)
    }

    /// Compute the per-bar signal series for this strategy.
    ///
    /// Parameters are validated against the schema before any work runs.
    pub fn compute_signals(self, series: &DailySeries, params: &StrategyParams) -> Result<Vec<Signal>> {
        match self {
            StrategyKind::MaCross => {
                let short = self.resolve(params, "short")? as usize;
                let long = self.resolve(params, "long")? as usize;
                Ok(ma_cross::signals(&series.closes, short, long))
            }
            StrategyKind::Macd => {
                let fast = self.resolve(params, "fast")? as usize;
                let slow = self.resolve(params, "slow")? as usize;
                let signal = self.resolve(params, "signal")? as usize;
                Ok(macd::signals(&series.closes, fast, slow, signal))
            }
            StrategyKind::Boll => {
                let period = self.resolve(params, "period")? as usize;
                let mult = self.resolve(params, "mult")?;
                Ok(boll::signals(&series.closes, period, mult))
            }
            StrategyKind::Kdj => {
                let period = self.resolve(params, "period")? as usize;
                Ok(kdj::signals(&series.closes, &series.highs, &series.lows, period))
            }
        }
    }
}

/// Registry entry served to front ends
#[derive(Debug, Clone, Serialize)]
pub struct StrategyInfo {
    pub key: &'static str,
    pub name: &'static str,
    pub params: Vec<ParamSpec>,
}

/// Full strategy registry listing
pub fn strategy_catalog() -> Vec<StrategyInfo> {
    StrategyKind::ALL
        .iter()
        .map(|kind| StrategyInfo {
            key: kind.key(),
            name: kind.display_name(),
            params: kind.param_specs().to_vec(),
        })
        .collect()
}
