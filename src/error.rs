//! Error types shared across the K-line data system.

use thiserror::Error;

/// Unified error taxonomy for ingestion, validation and backtesting.
#[derive(Debug, Error)]
pub enum KlineError {
    /// Strategy key not present in the registry
    #[error("未知策略: {0}")]
    UnknownStrategy(String),

    /// Symbol code not present in the catalog
    #[error("未知品种: {0}")]
    UnknownSymbol(String),

    /// No usable rows for the symbol
    #[error("无数据: {0}")]
    NoData(String),

    /// Fewer bars than the backtest boundary requires
    #[error("数据不足（至少需要 {required} 根 K 线，当前 {actual} 根）")]
    InsufficientBars { required: usize, actual: usize },

    /// Strategy parameter outside its schema range
    #[error("参数 {key}={value} 超出范围（允许 {min} ~ {max}）")]
    ParamOutOfRange {
        key: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("CSV 读写失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("序列化失败: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("数据服务请求失败: {0}")]
    Http(#[from] reqwest::Error),
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, KlineError>;
