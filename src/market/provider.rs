//! Remote daily K-line provider (新浪财经接口).
//!
//! The endpoint serves the full daily history of a continuous main
//! contract as a JSON array of `[date, open, high, low, close, volume]`
//! rows. Provider failures are soft: per-symbol errors are logged and the
//! batch moves on.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::market::constant::SYMBOLS;
use crate::market::datafeed::CsvDatafeed;
use crate::market::object::{DailyBar, DailySeries};
use crate::market::setting::settings;

/// 新浪期货日K线接口（主力连续合约，返回自上市起全部日线）
const API_URL: &str =
    "http://stock2.finance.sina.com.cn/futures/api/json.php/IndexService.getInnerFuturesDailyKLine";
const REFERER: &str = "http://finance.sina.com.cn";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Outcome of one supplement merge
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SupplementReport {
    pub before: usize,
    pub added: usize,
    pub total: usize,
}

/// Abstract daily-history source, the seam for swapping data services
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Full daily history for one symbol, ascending by date
    async fn fetch_daily_history(&self, code: &str) -> Result<Vec<DailyBar>>;
}

/// HTTP client over the Sina daily K-line API
pub struct SinaProvider {
    client: reqwest::Client,
}

impl SinaProvider {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings().request_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }
}

impl Default for SinaProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryProvider for SinaProvider {
    async fn fetch_daily_history(&self, code: &str) -> Result<Vec<DailyBar>> {
        let text = self
            .client
            .get(API_URL)
            .query(&[("symbol", code)])
            .header("Referer", REFERER)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let value: Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("{}: 接口响应不是有效 JSON: {}", code, e);
                Value::Null
            }
        };
        Ok(parse_rows(&value))
    }
}

/// Full refresh: fetch every catalog symbol from its listing date and
/// overwrite the local CSV. Returns the number of symbols updated.
pub async fn fetch_all<P: HistoryProvider>(provider: &P, feed: &CsvDatafeed) -> usize {
    let pause = Duration::from_millis(settings().request_pause_ms);
    let mut updated = 0usize;
    for info in SYMBOLS {
        tracing::info!("正在拉取: {} ({}) - {}", info.name, info.code, info.note);
        match provider.fetch_daily_history(info.code).await {
            Ok(bars) if bars.is_empty() => {
                tracing::warn!("{}: 无数据，跳过", info.name);
            }
            Ok(bars) => {
                let mut series = DailySeries::new(info.code);
                for bar in bars {
                    series.push(bar);
                }
                match feed.save_series(&series) {
                    Ok(path) => {
                        tracing::info!(
                            "{}: 共 {} 条，已保存 {}",
                            info.name,
                            series.len(),
                            path.display()
                        );
                        updated += 1;
                    }
                    Err(e) => tracing::warn!("{}: 保存失败: {}", info.name, e),
                }
            }
            Err(e) => tracing::warn!("{}: 拉取失败: {}", info.name, e),
        }
        tokio::time::sleep(pause).await;
    }
    updated
}

/// Merge rows newer than the configured cutoff into the existing CSV
pub async fn supplement<P: HistoryProvider>(
    provider: &P,
    feed: &CsvDatafeed,
    code: &str,
) -> Result<SupplementReport> {
    let existing = feed.load_series(code)?;
    let fetched = provider.fetch_daily_history(code).await?;
    let cutoff = settings().cutoff_date;
    let (merged, added) = merge_bars(&existing, &fetched, cutoff);
    feed.save_series(&merged)?;
    Ok(SupplementReport {
        before: existing.len(),
        added,
        total: merged.len(),
    })
}

/// Supplement every catalog symbol; per-symbol failures are soft
pub async fn supplement_all<P: HistoryProvider>(provider: &P, feed: &CsvDatafeed) -> usize {
    let pause = Duration::from_millis(settings().request_pause_ms);
    let mut updated = 0usize;
    for info in SYMBOLS {
        match supplement(provider, feed, info.code).await {
            Ok(report) => {
                tracing::info!(
                    "{}: 原有 {} 条，新增 {} 条，合计 {} 条",
                    info.name,
                    report.before,
                    report.added,
                    report.total
                );
                updated += 1;
            }
            Err(e) => tracing::warn!("{}: 补全失败: {}", info.name, e),
        }
        tokio::time::sleep(pause).await;
    }
    updated
}

/// Merge fetched bars dated after `cutoff` into the existing series,
/// deduplicated by date and sorted ascending.
pub fn merge_bars(
    existing: &DailySeries,
    fetched: &[DailyBar],
    cutoff: NaiveDate,
) -> (DailySeries, usize) {
    let mut seen: HashSet<NaiveDate> = existing.dates.iter().copied().collect();
    let mut bars: Vec<DailyBar> = (0..existing.len()).map(|i| existing.bar(i)).collect();

    let mut added = 0usize;
    for bar in fetched {
        if bar.date > cutoff && seen.insert(bar.date) {
            bars.push(*bar);
            added += 1;
        }
    }
    bars.sort_by_key(|b| b.date);

    let mut merged = DailySeries::new(existing.symbol.clone());
    for bar in bars {
        merged.push(bar);
    }
    (merged, added)
}

/// Decode the endpoint's row array, skipping anything malformed
fn parse_rows(value: &Value) -> Vec<DailyBar> {
    let rows = match value.as_array() {
        Some(rows) => rows,
        None => return Vec::new(),
    };
    let mut bars = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;
    for row in rows {
        match parse_row(row) {
            Some(bar) => bars.push(bar),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::warn!("接口返回 {} 行无法解析，已跳过", skipped);
    }
    bars
}

fn parse_row(row: &Value) -> Option<DailyBar> {
    let fields = row.as_array()?;
    if fields.len() < 6 {
        return None;
    }
    let date = NaiveDate::parse_from_str(fields[0].as_str()?.trim(), "%Y-%m-%d").ok()?;
    Some(DailyBar {
        date,
        open: field_f64(&fields[1])?,
        high: field_f64(&fields[2])?,
        low: field_f64(&fields[3])?,
        close: field_f64(&fields[4])?,
        volume: field_f64(&fields[5])? as i64,
    })
}

/// The endpoint encodes numbers as strings; tolerate both
fn field_f64(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}
