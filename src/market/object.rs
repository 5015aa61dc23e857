//! Basic data structures for daily K-line series.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::indicator;

/// One trading day's OHLCV record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Daily K-line series held as parallel columns.
///
/// All columns share the same length; index `i` is trading day `i`.
/// The series is immutable for the duration of a backtest run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    pub symbol: String,
    pub dates: Vec<NaiveDate>,
    pub opens: Vec<f64>,
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
    pub closes: Vec<f64>,
    pub volumes: Vec<i64>,
}

impl DailySeries {
    /// Create an empty series for a symbol
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Append one bar, keeping all columns in step
    pub fn push(&mut self, bar: DailyBar) {
        self.dates.push(bar.date);
        self.opens.push(bar.open);
        self.highs.push(bar.high);
        self.lows.push(bar.low);
        self.closes.push(bar.close);
        self.volumes.push(bar.volume);
    }

    /// Bar at index `i`; panics on out-of-range like slice indexing
    pub fn bar(&self, i: usize) -> DailyBar {
        DailyBar {
            date: self.dates[i],
            open: self.opens[i],
            high: self.highs[i],
            low: self.lows[i],
            close: self.closes[i],
            volume: self.volumes[i],
        }
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Restrict to `[start, end]` by date.
    ///
    /// `start` keeps from the first bar dated at or after it, `end` keeps
    /// through the last bar dated at or before it. A bound that matches no
    /// bar leaves that side untrimmed.
    pub fn slice_by_date(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> DailySeries {
        if self.is_empty() {
            return self.clone();
        }

        let from = match start {
            Some(s) => self.dates.iter().position(|d| *d >= s).unwrap_or(0),
            None => 0,
        };
        let to = match end {
            Some(e) => self
                .dates
                .iter()
                .rposition(|d| *d <= e)
                .unwrap_or(self.len() - 1),
            None => self.len() - 1,
        };
        if from > to {
            return DailySeries::new(self.symbol.clone());
        }

        DailySeries {
            symbol: self.symbol.clone(),
            dates: self.dates[from..=to].to_vec(),
            opens: self.opens[from..=to].to_vec(),
            highs: self.highs[from..=to].to_vec(),
            lows: self.lows[from..=to].to_vec(),
            closes: self.closes[from..=to].to_vec(),
            volumes: self.volumes[from..=to].to_vec(),
        }
    }

    /// Expand to every calendar day between the first and last bar.
    ///
    /// Non-trading days carry the previous bar's prices with volume 0.
    pub fn fill_calendar_days(&self) -> DailySeries {
        let (first, last) = match (self.dates.first(), self.dates.last()) {
            (Some(f), Some(l)) => (*f, *l),
            _ => return self.clone(),
        };

        let mut filled = DailySeries::new(self.symbol.clone());
        let mut cursor = 0usize;
        let mut prev = self.bar(0);
        let mut day = first;
        while day <= last {
            if cursor < self.len() && self.dates[cursor] == day {
                prev = self.bar(cursor);
                filled.push(prev);
                cursor += 1;
            } else {
                filled.push(DailyBar {
                    date: day,
                    volume: 0,
                    ..prev
                });
            }
            day = day + Duration::days(1);
        }
        filled
    }

    /// Moving average of closes for chart overlay, rounded to 2 decimals
    pub fn ma(&self, period: usize) -> Vec<Option<f64>> {
        indicator::sma(&self.closes, period)
            .into_iter()
            .map(|v| v.map(|x| (x * 100.0).round() / 100.0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn sample() -> DailySeries {
        let mut series = DailySeries::new("C0");
        for (date, close) in [
            ("2024-01-02", 2400.0),
            ("2024-01-03", 2410.0),
            ("2024-01-04", 2420.0),
            ("2024-01-08", 2405.0),
        ] {
            series.push(DailyBar {
                date: d(date),
                open: close - 5.0,
                high: close + 10.0,
                low: close - 10.0,
                close,
                volume: 1000,
            });
        }
        series
    }

    #[test]
    fn test_slice_by_date() {
        let series = sample();

        let mid = series.slice_by_date(Some(d("2024-01-03")), Some(d("2024-01-04")));
        assert_eq!(mid.len(), 2);
        assert_eq!(mid.dates[0], d("2024-01-03"));
        assert_eq!(mid.dates[1], d("2024-01-04"));

        // bound between trading days snaps inward
        let tail = series.slice_by_date(Some(d("2024-01-05")), None);
        assert_eq!(tail.len(), 1);
        assert_eq!(tail.dates[0], d("2024-01-08"));

        // bound matching no bar leaves that side untrimmed
        let all = series.slice_by_date(None, Some(d("2023-12-31")));
        assert_eq!(all.len(), series.len());
    }

    #[test]
    fn test_fill_calendar_days() {
        let series = sample();
        let filled = series.fill_calendar_days();

        // 2024-01-02 .. 2024-01-08 inclusive
        assert_eq!(filled.len(), 7);
        // weekend rows copy the previous close with zero volume
        let sat = filled.bar(4);
        assert_eq!(sat.date, d("2024-01-06"));
        assert_eq!(sat.close, 2420.0);
        assert_eq!(sat.volume, 0);
        // trading rows are untouched
        assert_eq!(filled.bar(6), series.bar(3));
    }

    #[test]
    fn test_ma_overlay_warm_up() {
        let series = sample();
        let ma = series.ma(3);
        assert_eq!(ma[0], None);
        assert_eq!(ma[1], None);
        assert_eq!(ma[2], Some(2410.0));
    }
}
