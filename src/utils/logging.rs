use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::config::Config;

pub struct LoggingGuards {
    _file_guard: WorkerGuard,
    _json_guard: WorkerGuard,
}

fn parse_log_level(value: &str) -> LevelFilter {
    match value.trim().to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" | "warning" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

/// Stdout plus daily-rolling plain and JSON files under logs/. The returned
/// guards must live as long as the process so the non-blocking writers
/// flush.
pub fn init_logging(config: &Config) -> LoggingGuards {
    let logs_dir = Path::new("logs");
    if let Err(err) = fs::create_dir_all(logs_dir) {
        eprintln!("Failed to create logs directory: {err}");
    }

    let file_appender = tracing_appender::rolling::daily(logs_dir, "server.log");
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);

    let json_appender = tracing_appender::rolling::daily(logs_dir, "server.jsonl");
    let (json_writer, json_guard) = tracing_appender::non_blocking(json_appender);

    let level = parse_log_level(&config.log_level);
    let filter = Targets::new()
        .with_default(level)
        .with_target("hyper", LevelFilter::WARN)
        .with_target("hyper_util", LevelFilter::WARN)
        .with_target("reqwest", LevelFilter::WARN);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_filter(filter.clone());
    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_filter(filter.clone());
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(json_writer)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .with(json_layer)
        .init();

    LoggingGuards {
        _file_guard: file_guard,
        _json_guard: json_guard,
    }
}
