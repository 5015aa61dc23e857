//! Logging initialisation for the K-line data system.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Local;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::market::settings;

/// Per-day log file under `logs/`
fn log_file_path() -> PathBuf {
    let date = Local::now().format("%Y%m%d");
    PathBuf::from("logs").join(format!("kline_engine_{}.log", date))
}

/// Initialize the global tracing subscriber from settings.
///
/// `RUST_LOG` overrides the configured level. Must only be called once.
pub fn init_logger() {
    let cfg = settings();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.log_level.clone()));

    let console_layer = cfg.log_console.then(|| {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
    });

    let file_layer = if cfg.log_file {
        let path = log_file_path();
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .expect("Failed to open log file");
        Some(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();
}
