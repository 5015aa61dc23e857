//! Global setting of the K-line data system.

use std::fs;
use std::path::PathBuf;
use std::sync::{LazyLock, RwLock};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// File read next to the working directory for overrides
const SETTING_FILE: &str = "kline_setting.json";

/// Runtime configuration, overridable via `kline_setting.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the per-symbol CSV files
    pub data_dir: PathBuf,
    /// Last date served by the primary (Sina) history dump
    pub cutoff_date: NaiveDate,
    /// First date the supplement step fills in
    pub supplement_start: NaiveDate,
    /// HTTP timeout for the remote provider, seconds
    pub request_timeout_secs: u64,
    /// Pause between per-symbol requests, milliseconds
    pub request_pause_ms: u64,
    pub log_console: bool,
    pub log_file: bool,
    /// Log level name: trace/debug/info/warn/error
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            cutoff_date: NaiveDate::from_ymd_opt(2024, 7, 17).unwrap(),
            supplement_start: NaiveDate::from_ymd_opt(2024, 7, 18).unwrap(),
            request_timeout_secs: 30,
            request_pause_ms: 500,
            log_console: true,
            log_file: true,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load from the override file if present, defaults otherwise
    fn load() -> Self {
        match fs::read_to_string(SETTING_FILE) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!("配置文件 {} 解析失败，使用默认配置: {}", SETTING_FILE, e);
                    Settings::default()
                }
            },
            Err(_) => Settings::default(),
        }
    }
}

/// Global settings instance
pub static SETTINGS: LazyLock<RwLock<Settings>> = LazyLock::new(|| RwLock::new(Settings::load()));

/// Snapshot of the current settings
pub fn settings() -> Settings {
    SETTINGS.read().unwrap().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.data_dir, PathBuf::from("data"));
        assert!(s.supplement_start > s.cutoff_date);
        assert_eq!(s.log_level, "info");
    }

    #[test]
    fn test_partial_override_round_trip() {
        let s: Settings = serde_json::from_str(r#"{"data_dir": "other", "log_file": false}"#).unwrap();
        assert_eq!(s.data_dir, PathBuf::from("other"));
        assert!(!s.log_file);
        // untouched fields keep their defaults
        assert_eq!(s.request_timeout_secs, 30);
    }
}
