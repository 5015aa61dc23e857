//! CSV datafeed for the local daily K-line store.
//!
//! One file per symbol, named `{code}_{name}_历史日K.csv` with the
//! canonical Chinese header. A corrupt line never invalidates the rest of
//! the file: malformed rows are skipped one by one and reported through
//! the log.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{KlineError, Result};
use crate::market::constant::{symbol_name, SYMBOLS};
use crate::market::object::{DailyBar, DailySeries};
use crate::market::setting::settings;

/// CSV header shared by every reader and writer of the store
pub const CSV_HEADER: [&str; 6] = [
    "日期",
    "开盘(元/吨)",
    "最高(元/吨)",
    "最低(元/吨)",
    "收盘(元/吨)",
    "成交量(手)",
];

/// Data store summary: latest date across symbols, rows per symbol
#[derive(Debug, Clone, Default, Serialize)]
pub struct DataMeta {
    pub data_end_date: Option<NaiveDate>,
    /// Chinese symbol name -> row count
    pub counts: BTreeMap<String, usize>,
}

const META_CACHE_TTL: Duration = Duration::from_secs(60);

/// get_data_meta cache, keyed by data directory
static META_CACHE: LazyLock<Mutex<Option<(PathBuf, Instant, DataMeta)>>> =
    LazyLock::new(|| Mutex::new(None));

/// Datafeed over a directory of per-symbol CSV files
#[derive(Debug, Clone)]
pub struct CsvDatafeed {
    data_dir: PathBuf,
}

impl CsvDatafeed {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Datafeed rooted at the configured data directory
    pub fn from_settings() -> Self {
        Self::new(settings().data_dir)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// CSV path for a catalog symbol
    pub fn csv_path(&self, code: &str) -> Result<PathBuf> {
        let name = symbol_name(code).ok_or_else(|| KlineError::UnknownSymbol(code.to_string()))?;
        Ok(self.data_dir.join(format!("{}_{}_历史日K.csv", code, name)))
    }

    /// Load a symbol's series. A missing file yields an empty series;
    /// malformed rows and duplicate dates are skipped.
    pub fn load_series(&self, code: &str) -> Result<DailySeries> {
        let path = self.csv_path(code)?;
        let mut series = DailySeries::new(code);
        if !path.exists() {
            return Ok(series);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&path)?;

        let mut skipped = 0usize;
        for record in reader.records() {
            let record = match record {
                Ok(r) => r,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };
            match parse_row(&record) {
                Some(bar) => {
                    // ingestion dedup keeps dates strictly increasing
                    if series.last_date().is_some_and(|last| bar.date <= last) {
                        skipped += 1;
                        continue;
                    }
                    series.push(bar);
                }
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::warn!(
                "{}: 跳过 {} 行无效数据（共读入 {} 行）",
                path.display(),
                skipped,
                series.len()
            );
        }
        Ok(series)
    }

    /// Write a series back to its canonical CSV file
    pub fn save_series(&self, series: &DailySeries) -> Result<PathBuf> {
        let path = self.csv_path(&series.symbol)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(CSV_HEADER)?;
        for i in 0..series.len() {
            let bar = series.bar(i);
            writer.write_record([
                bar.date.format("%Y-%m-%d").to_string(),
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.volume.to_string(),
            ])?;
        }
        writer.flush()?;
        Ok(path)
    }

    /// Latest date and per-symbol row counts, cached for 60 seconds
    pub fn data_meta(&self) -> DataMeta {
        let mut cache = META_CACHE.lock().unwrap();
        if let Some((dir, stamp, meta)) = cache.as_ref() {
            if *dir == self.data_dir && stamp.elapsed() < META_CACHE_TTL {
                return meta.clone();
            }
        }

        let mut meta = DataMeta::default();
        for info in SYMBOLS {
            let series = match self.load_series(info.code) {
                Ok(s) if !s.is_empty() => s,
                _ => continue,
            };
            if let Some(last) = series.last_date() {
                if meta.data_end_date.map_or(true, |cur| last > cur) {
                    meta.data_end_date = Some(last);
                }
            }
            meta.counts.insert(info.name.to_string(), series.len());
        }

        *cache = Some((self.data_dir.clone(), Instant::now(), meta.clone()));
        meta
    }
}

/// Parse one CSV row into a bar; anything malformed yields `None`
fn parse_row(record: &csv::StringRecord) -> Option<DailyBar> {
    if record.len() < 6 {
        return None;
    }
    let date = NaiveDate::parse_from_str(record.get(0)?.trim(), "%Y-%m-%d").ok()?;
    let open: f64 = record.get(1)?.trim().parse().ok()?;
    let high: f64 = record.get(2)?.trim().parse().ok()?;
    let low: f64 = record.get(3)?.trim().parse().ok()?;
    let close: f64 = record.get(4)?.trim().parse().ok()?;
    let volume: f64 = record.get(5)?.trim().parse().ok()?;
    Some(DailyBar {
        date,
        open,
        high,
        low,
        close,
        volume: volume as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("C0_玉米_历史日K.csv");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_skips_malformed_rows() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "\u{feff}日期,开盘(元/吨),最高(元/吨),最低(元/吨),收盘(元/吨),成交量(手)\n\
             2024-01-02,2400,2410,2390,2405,12345\n\
             not-a-date,1,2,3,4,5\n\
             2024-01-03,2405,abc,2395,2410,11111\n\
             2024-01-04,2410,2420,2400,2415,10000.0\n",
        );

        let feed = CsvDatafeed::new(dir.path());
        let series = feed.load_series("C0").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes, vec![2405.0, 2415.0]);
        assert_eq!(series.volumes, vec![12345, 10000]);
    }

    #[test]
    fn test_load_dedups_dates() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "日期,开盘(元/吨),最高(元/吨),最低(元/吨),收盘(元/吨),成交量(手)\n\
             2024-01-02,1,2,3,4,5\n\
             2024-01-02,9,9,9,9,9\n\
             2024-01-03,1,2,3,5,5\n",
        );

        let feed = CsvDatafeed::new(dir.path());
        let series = feed.load_series("C0").unwrap();
        assert_eq!(series.len(), 2);
        // first occurrence wins
        assert_eq!(series.closes[0], 4.0);
    }

    #[test]
    fn test_missing_file_is_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let feed = CsvDatafeed::new(dir.path());
        assert!(feed.load_series("C0").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_symbol_rejected() {
        let feed = CsvDatafeed::new("data");
        assert!(matches!(
            feed.load_series("RB0"),
            Err(KlineError::UnknownSymbol(_))
        ));
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let feed = CsvDatafeed::new(dir.path());

        let mut series = DailySeries::new("CS0");
        series.push(DailyBar {
            date: "2024-01-02".parse().unwrap(),
            open: 2900.5,
            high: 2920.0,
            low: 2890.0,
            close: 2910.0,
            volume: 4321,
        });
        feed.save_series(&series).unwrap();

        let loaded = feed.load_series("CS0").unwrap();
        assert_eq!(loaded, series);
    }

    #[test]
    fn test_data_meta_counts_and_latest_date() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "日期,开盘(元/吨),最高(元/吨),最低(元/吨),收盘(元/吨),成交量(手)\n\
             2024-01-02,1,2,3,4,5\n\
             2024-01-03,1,2,3,4,5\n",
        );

        let feed = CsvDatafeed::new(dir.path());
        let meta = feed.data_meta();
        assert_eq!(meta.data_end_date, Some("2024-01-03".parse().unwrap()));
        assert_eq!(meta.counts.get("玉米"), Some(&2));
        assert!(meta.counts.get("鸡蛋").is_none());
    }
}
