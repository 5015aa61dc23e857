//! 期货日K线数据系统 - CLI entry point
//!
//! One binary covers the whole workflow: fetch history, supplement the
//! latest rows, fill calendar gaps, export the chart page and run
//! strategy backtests.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use kline_engine::app::{self, BacktestRequest, BacktestResponse};
use kline_engine::chart;
use kline_engine::error::Result;
use kline_engine::logger;
use kline_engine::market::{provider, settings, CsvDatafeed, SinaProvider, SYMBOLS};
use kline_engine::strategy::{strategy_catalog, StrategyParams};

#[derive(Parser)]
#[command(
    name = "kline_engine",
    version,
    about = "期货日K线数据系统：拉取/补全/导出玉米、玉米淀粉、鸡蛋主力连续日K，并运行策略回测"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 从新浪拉取全部历史日K（自上市起），覆盖本地 CSV
    Fetch,
    /// 补全截止日期之后的最新数据，与现有 CSV 合并
    Supplement,
    /// 将 CSV 补全为全部日历日期（非交易日沿用前一交易日，量为 0）
    FillDates,
    /// 根据 CSV 生成带 K 线图 + MA20 的 HTML 页面
    Export {
        #[arg(long, default_value = "kline.html")]
        out: PathBuf,
    },
    /// 全流程：fetch -> supplement -> [fill-dates] -> export
    All {
        /// 补全全部日历日期
        #[arg(long)]
        fill_dates: bool,
    },
    /// 运行策略回测
    Backtest {
        #[arg(long)]
        symbol: String,
        /// 策略键：ma_cross / macd / boll / kdj
        #[arg(long)]
        strategy: String,
        /// 策略参数，形如 --param short=5，可重复
        #[arg(long = "param")]
        params: Vec<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long, default_value_t = 100_000.0)]
        capital: f64,
        #[arg(long, default_value_t = 1)]
        lots: u32,
        #[arg(long, default_value_t = 5.0)]
        commission: f64,
        /// 输出完整 JSON 结果而非统计摘要
        #[arg(long)]
        json: bool,
    },
    /// 查看数据概况：最新日期与各品种条数
    Meta,
    /// 列出支持的品种与策略
    Symbols,
}

#[tokio::main]
async fn main() {
    logger::init_logger();
    let cli = Cli::parse();
    if let Err(e) = run(cli.command).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command) -> Result<()> {
    let feed = CsvDatafeed::from_settings();

    match command {
        Command::Fetch => {
            fs::create_dir_all(feed.data_dir())?;
            let updated = provider::fetch_all(&SinaProvider::new(), &feed).await;
            tracing::info!("拉取完成，更新 {} 个品种", updated);
        }
        Command::Supplement => {
            fs::create_dir_all(feed.data_dir())?;
            let updated = provider::supplement_all(&SinaProvider::new(), &feed).await;
            tracing::info!("补全完成，更新 {} 个品种", updated);
        }
        Command::FillDates => fill_dates(&feed)?,
        Command::Export { out } => {
            chart::generate_kline_html(&feed, &out)?;
        }
        Command::All { fill_dates: fill } => {
            fs::create_dir_all(feed.data_dir())?;
            let sina = SinaProvider::new();
            tracing::info!("======== 1/4 拉取新浪历史 ========");
            provider::fetch_all(&sina, &feed).await;
            tracing::info!("======== 2/4 补全最新数据 ========");
            provider::supplement_all(&sina, &feed).await;
            if fill {
                tracing::info!("======== 3/4 补全日历 ========");
                fill_dates(&feed)?;
            } else {
                tracing::info!("（跳过补全日历，仅交易日）");
            }
            tracing::info!("======== 4/4 导出图表 ========");
            chart::generate_kline_html(&feed, &PathBuf::from("kline.html"))?;
            tracing::info!("数据系统全流程完成");
        }
        Command::Backtest {
            symbol,
            strategy,
            params,
            start,
            end,
            capital,
            lots,
            commission,
            json,
        } => {
            let req = BacktestRequest {
                symbol: symbol.clone(),
                strategy: strategy.clone(),
                params: parse_params(&params),
                start_date: start,
                end_date: end,
                capital: Some(capital),
                lots: Some(lots),
                commission: Some(commission),
            };
            let resp = app::run_backtest(&feed, &req)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&resp)?);
            } else {
                print_statistics(&symbol, &strategy, &resp);
            }
        }
        Command::Meta => {
            let meta = feed.data_meta();
            match meta.data_end_date {
                Some(date) => println!("数据截止日期: {}", date),
                None => println!("数据截止日期: 无数据"),
            }
            for (name, count) in &meta.counts {
                println!("{}: {} 条", name, count);
            }
        }
        Command::Symbols => {
            println!("品种:");
            for info in SYMBOLS {
                println!("  {} {} - {}", info.code, info.name, info.note);
            }
            println!("策略:");
            for info in strategy_catalog() {
                let params: Vec<String> = info
                    .params
                    .iter()
                    .map(|p| format!("{}={}", p.key, p.default))
                    .collect();
                println!("  {} {} ({})", info.key, info.name, params.join(", "));
            }
            println!("数据目录: {}", settings().data_dir.display());
        }
    }
    Ok(())
}

/// Rewrite every symbol's CSV with calendar-day gaps filled
fn fill_dates(feed: &CsvDatafeed) -> Result<()> {
    for info in SYMBOLS {
        let series = feed.load_series(info.code)?;
        if series.is_empty() {
            continue;
        }
        let filled = series.fill_calendar_days();
        let path = feed.save_series(&filled)?;
        tracing::info!(
            "{}: 已补全为全部日期，共 {} 行 -> {}",
            info.name,
            filled.len(),
            path.display()
        );
    }
    Ok(())
}

/// Parse repeated `key=value` parameter flags; unparsable entries are
/// dropped with a warning, matching the tolerant coercion of the web form
fn parse_params(raw: &[String]) -> StrategyParams {
    let mut params = StrategyParams::new();
    for entry in raw {
        match entry.split_once('=') {
            Some((key, value)) => match value.trim().parse::<f64>() {
                Ok(v) => {
                    params.insert(key.trim().to_string(), v);
                }
                Err(_) => tracing::warn!("忽略无法解析的参数: {}", entry),
            },
            None => tracing::warn!("忽略无法解析的参数: {}", entry),
        }
    }
    params
}

fn print_statistics(symbol: &str, strategy: &str, resp: &BacktestResponse) {
    let m = &resp.result.metrics;
    println!();
    println!("============= 回测统计 =============");
    println!("品种: {}  策略: {}", symbol, strategy);
    println!("K线数量: {}", resp.kline.len());
    println!("总收益率: {:.2}%", m.total_return);
    println!("年化收益: {:.2}%", m.annual_return);
    println!("最大回撤: {:.2}%", m.max_drawdown);
    println!("胜率: {:.1}%", m.win_rate);
    println!("交易次数: {}", m.total_trades);
    println!("盈亏比: {:.2}", m.profit_factor);
    println!("平均持仓天数: {:.1}", m.avg_holding_days);
    println!("====================================");
    println!();
}
