//! Market data layer: symbol catalog, daily series, CSV store, remote
//! provider and global settings.

pub mod constant;
pub mod datafeed;
pub mod object;
pub mod provider;
pub mod setting;

pub use constant::{contract_multiplier, is_known_symbol, symbol_name, SymbolInfo, SYMBOLS};
pub use datafeed::{CsvDatafeed, DataMeta};
pub use object::{DailyBar, DailySeries};
pub use provider::{HistoryProvider, SinaProvider, SupplementReport};
pub use setting::{settings, Settings, SETTINGS};
