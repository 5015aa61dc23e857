//! Standalone K-line chart page generation.
//!
//! Renders every symbol's candlestick/MA20/volume data into one
//! self-contained ECharts HTML page with a symbol selector and a
//! zoom-linked data table.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};

use crate::app::{kline_payload, KlinePayload};
use crate::error::{KlineError, Result};
use crate::market::{CsvDatafeed, SYMBOLS};

const TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="zh-CN">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>玉米 / 玉米淀粉 / 鸡蛋 日K线</title>
  <script src="https://cdn.jsdelivr.net/npm/echarts@5.4.3/dist/echarts.min.js"></script>
  <style>
    * { box-sizing: border-box; }
    body { margin: 0; font-family: "Microsoft YaHei", sans-serif; background: #1a1a2e; color: #eee; min-height: 100vh; }
    .toolbar { padding: 12px 16px; display: flex; align-items: center; gap: 12px; flex-wrap: wrap; }
    .toolbar select { padding: 6px 10px; font-size: 14px; border-radius: 6px; border: 1px solid #444; background: #2d2d44; color: #eee; cursor: pointer; }
    #chart { width: 100%; height: 50vh; min-height: 320px; }
    .table-wrap { padding: 0 16px 16px; max-height: 45vh; overflow: auto; }
    .table-wrap table { width: 100%; border-collapse: collapse; font-size: 13px; }
    .table-wrap th, .table-wrap td { padding: 6px 10px; text-align: right; border-bottom: 1px solid #333; }
    .table-wrap th { text-align: left; position: sticky; top: 0; background: #1a1a2e; }
  </style>
</head>
<body>
  <div class="toolbar">
    <label for="symbol">品种：</label>
    <select id="symbol"></select>
    <span style="color:#888;font-size:12px;">拖拽图表选区或滑动条，下方表格跟随显示对应区间</span>
  </div>
  <div id="chart"></div>
  <div class="table-wrap">
    <table><thead><tr><th>日期</th><th>开盘</th><th>最高</th><th>最低</th><th>收盘</th><th>成交量</th></tr></thead><tbody id="tb"></tbody></table>
  </div>
  <script>
    var names = __NAMES__;
    var allDates = __ALL_DATES__;
    var allK = __ALL_K__;
    var allVol = __ALL_VOL__;
    var allMa20 = __ALL_MA20__;

    var sel = document.getElementById("symbol");
    names.forEach(function(n) { var o = document.createElement("option"); o.value = n; o.textContent = n; sel.appendChild(o); });

    var chart = echarts.init(document.getElementById("chart"));
    var tb = document.getElementById("tb");

    function fillTable(name, i0, i1) {
      var dates = allDates[name], k = allK[name], vol = allVol[name];
      i0 = Math.max(0, Math.floor(i0));
      i1 = Math.min(dates.length, Math.ceil(i1));
      var html = "";
      for (var i = i0; i < i1; i++) {
        var r = k[i];
        html += "<tr><td>" + dates[i] + "</td><td>" + r[0] + "</td><td>" + r[3] + "</td><td>" + r[2] + "</td><td>" + r[1] + "</td><td>" + vol[i] + "</td></tr>";
      }
      tb.innerHTML = html;
    }

    function update(name) {
      var dates = allDates[name], kData = allK[name], volData = allVol[name], ma20 = allMa20[name];
      var volBar = volData.map(function(v, i) {
        var c = kData[i][0] <= kData[i][1] ? "#26a69a" : "#ef5350";
        return { value: v, itemStyle: { color: c } };
      });
      var ma20Data = ma20.map(function(v) { return v == null ? "-" : v; });
      chart.setOption({
        animation: false,
        tooltip: { trigger: "axis", axisPointer: { type: "cross" } },
        legend: { data: ["K线", "MA20", "成交量"], top: 0 },
        grid: [{ left: "10%", right: "8%", top: "8%", height: "50%" }, { left: "10%", right: "8%", top: "65%", height: "28%" }],
        xAxis: [
          { type: "category", data: dates, gridIndex: 0 },
          { type: "category", data: dates, gridIndex: 1, axisLabel: { show: false } }
        ],
        yAxis: [
          { scale: true, gridIndex: 0, splitLine: { lineStyle: { opacity: 0.2 } } },
          { scale: true, gridIndex: 1, splitLine: { show: false } }
        ],
        dataZoom: [
          { type: "inside", xAxisIndex: [0, 1], start: 70, end: 100 },
          { type: "slider", xAxisIndex: [0, 1], start: 70, end: 100 }
        ],
        series: [
          { name: "K线", type: "candlestick", data: kData, xAxisIndex: 0, yAxisIndex: 0 },
          { name: "MA20", type: "line", data: ma20Data, xAxisIndex: 0, yAxisIndex: 0, symbol: "none", lineStyle: { color: "#ffa726", width: 2 }, smooth: true },
          { name: "成交量", type: "bar", data: volBar, xAxisIndex: 1, yAxisIndex: 1 }
        ]
      }, true);
      chart.off("dataZoom");
      chart.on("dataZoom", function() {
        var opt = chart.getOption();
        var dz = opt.dataZoom && opt.dataZoom[0];
        if (!dz || dz.start == null) return;
        var len = dates.length;
        fillTable(name, (dz.start / 100) * len, (dz.end / 100) * len);
      });
      var len = dates.length;
      fillTable(name, len * 0.7, len);
    }
    update(sel.value);
    sel.addEventListener("change", function() { update(sel.value); });
    window.addEventListener("resize", function() { chart.resize(); });
  </script>
</body>
</html>
"##;

/// Render the chart page from named datasets
pub fn render_kline_page(datasets: &[(String, KlinePayload)]) -> String {
    let names: Vec<&str> = datasets.iter().map(|(name, _)| name.as_str()).collect();

    let mut all_dates = Map::new();
    let mut all_k = Map::new();
    let mut all_vol = Map::new();
    let mut all_ma20 = Map::new();
    for (name, payload) in datasets {
        all_dates.insert(name.clone(), json!(payload.dates));
        all_k.insert(name.clone(), json!(payload.k));
        all_vol.insert(name.clone(), json!(payload.vol));
        all_ma20.insert(name.clone(), json!(payload.ma20));
    }

    TEMPLATE
        .replace("__NAMES__", &json!(names).to_string())
        .replace("__ALL_DATES__", &Value::Object(all_dates).to_string())
        .replace("__ALL_K__", &Value::Object(all_k).to_string())
        .replace("__ALL_VOL__", &Value::Object(all_vol).to_string())
        .replace("__ALL_MA20__", &Value::Object(all_ma20).to_string())
}

/// Load every catalog symbol and write the chart page to `out_path`
pub fn generate_kline_html(feed: &CsvDatafeed, out_path: &Path) -> Result<PathBuf> {
    let mut datasets = Vec::new();
    for info in SYMBOLS {
        let series = feed.load_series(info.code)?;
        if series.is_empty() {
            continue;
        }
        datasets.push((info.name.to_string(), kline_payload(&series)));
    }
    if datasets.is_empty() {
        return Err(KlineError::NoData(
            "未找到任何 CSV 数据，请先执行 fetch / supplement".to_string(),
        ));
    }

    let html = render_kline_page(&datasets);
    fs::write(out_path, html)?;
    tracing::info!("已生成: {}", out_path.display());
    Ok(out_path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{DailyBar, DailySeries};

    fn payload() -> KlinePayload {
        let mut series = DailySeries::new("C0");
        series.push(DailyBar {
            date: "2024-01-02".parse().unwrap(),
            open: 2400.0,
            high: 2410.0,
            low: 2390.0,
            close: 2405.0,
            volume: 1000,
        });
        kline_payload(&series)
    }

    #[test]
    fn test_render_embeds_datasets() {
        let html = render_kline_page(&[("玉米".to_string(), payload())]);
        assert!(html.contains(r#"["玉米"]"#));
        assert!(html.contains("2024-01-02"));
        assert!(html.contains("echarts"));
        assert!(!html.contains("__NAMES__"));
        assert!(!html.contains("__ALL_MA20__"));
    }

    #[test]
    fn test_generate_requires_data() {
        let dir = tempfile::tempdir().unwrap();
        let feed = CsvDatafeed::new(dir.path());
        let out = dir.path().join("kline.html");
        assert!(matches!(
            generate_kline_html(&feed, &out),
            Err(KlineError::NoData(_))
        ));
    }

    #[test]
    fn test_generate_writes_page() {
        let dir = tempfile::tempdir().unwrap();
        let feed = CsvDatafeed::new(dir.path());
        let mut series = DailySeries::new("JD0");
        for i in 0..5 {
            series.push(DailyBar {
                date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1 + i as u32).unwrap(),
                open: 3500.0,
                high: 3520.0,
                low: 3480.0,
                close: 3510.0,
                volume: 100,
            });
        }
        feed.save_series(&series).unwrap();

        let out = dir.path().join("kline.html");
        generate_kline_html(&feed, &out).unwrap();
        let html = fs::read_to_string(&out).unwrap();
        assert!(html.contains("鸡蛋"));
        assert!(html.contains("candlestick"));
    }
}
